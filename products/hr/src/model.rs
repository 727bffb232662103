//! Directory records and the drafts/patches that create and change them.
//!
//! Every employee field deserializes from both its display name
//! (`firstName`) and its storage name (`first_name_c`); the record id accepts
//! `id` and `Id`. Serialization always uses the display shape, with
//! [`Employee::storage_shape`] available for the storage one.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::{HrError, ValidationErrors},
    onboarding::{self, OnboardingStep},
};

/// Store-assigned record identity.
pub type RecordId = i32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Employee,
    Department,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Employee => "employee",
            RecordKind::Department => "department",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for EmployeeStatus {
    type Err = HrError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(EmployeeStatus::Active),
            "inactive" => Ok(EmployeeStatus::Inactive),
            other => Err(HrError::invalid_field(
                "status",
                format!("unknown status `{other}`"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(alias = "Id")]
    pub id: RecordId,
    #[serde(alias = "first_name_c")]
    pub first_name: String,
    #[serde(alias = "last_name_c")]
    pub last_name: String,
    #[serde(alias = "email_c")]
    pub email: String,
    #[serde(alias = "phone_c")]
    pub phone: String,
    #[serde(default, alias = "photo_url_c", deserialize_with = "blank_as_none")]
    pub photo_url: Option<String>,
    #[serde(alias = "role_c")]
    pub role: String,
    #[serde(alias = "department_c")]
    pub department: String,
    #[serde(alias = "start_date_c", with = "wire_date")]
    pub start_date: NaiveDate,
    #[serde(default, alias = "status_c", deserialize_with = "loose_status")]
    pub status: EmployeeStatus,
    #[serde(default, deserialize_with = "loose_id")]
    pub manager_id: Option<RecordId>,
    #[serde(default = "onboarding::template_steps")]
    pub onboarding_progress: Vec<OnboardingStep>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    /// Build a record from a draft, applying creation defaults.
    pub fn from_draft(id: RecordId, draft: NewEmployee) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone: draft.phone,
            photo_url: draft.photo_url.filter(|url| !url.trim().is_empty()),
            role: draft.role,
            department: draft.department,
            start_date: draft.start_date,
            status: draft.status,
            manager_id: draft.manager_id,
            onboarding_progress: draft
                .onboarding_progress
                .unwrap_or_else(onboarding::template_steps),
        }
    }

    /// Shallow merge: only fields present in `patch` change.
    pub fn apply(&mut self, patch: EmployeePatch) {
        if let Some(value) = patch.first_name {
            self.first_name = value;
        }
        if let Some(value) = patch.last_name {
            self.last_name = value;
        }
        if let Some(value) = patch.email {
            self.email = value;
        }
        if let Some(value) = patch.phone {
            self.phone = value;
        }
        if let Some(value) = patch.photo_url {
            self.photo_url = value;
        }
        if let Some(value) = patch.role {
            self.role = value;
        }
        if let Some(value) = patch.department {
            self.department = value;
        }
        if let Some(value) = patch.start_date {
            self.start_date = value;
        }
        if let Some(value) = patch.status {
            self.status = value;
        }
        if let Some(value) = patch.manager_id {
            self.manager_id = value;
        }
        if let Some(value) = patch.onboarding_progress {
            self.onboarding_progress = value;
        }
    }

    /// Storage-named view of this record (`first_name_c`, ...).
    pub fn storage_shape(&self) -> EmployeeStorageShape<'_> {
        EmployeeStorageShape {
            id: self.id,
            first_name_c: &self.first_name,
            last_name_c: &self.last_name,
            email_c: &self.email,
            phone_c: &self.phone,
            photo_url_c: self.photo_url.as_deref().unwrap_or_default(),
            role_c: &self.role,
            department_c: &self.department,
            start_date_c: wire_date::format(self.start_date),
            status_c: self.status.as_str(),
            manager_id: self.manager_id,
            onboarding_progress: &self.onboarding_progress,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmployeeStorageShape<'a> {
    #[serde(rename = "Id")]
    pub id: RecordId,
    pub first_name_c: &'a str,
    pub last_name_c: &'a str,
    pub email_c: &'a str,
    pub phone_c: &'a str,
    pub photo_url_c: &'a str,
    pub role_c: &'a str,
    pub department_c: &'a str,
    pub start_date_c: String,
    pub status_c: &'static str,
    #[serde(rename = "managerId")]
    pub manager_id: Option<RecordId>,
    #[serde(rename = "onboardingProgress")]
    pub onboarding_progress: &'a [OnboardingStep],
}

/// Fields for a new employee. Any caller-supplied id is ignored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[serde(default, alias = "first_name_c")]
    pub first_name: String,
    #[serde(default, alias = "last_name_c")]
    pub last_name: String,
    #[serde(default, alias = "email_c")]
    pub email: String,
    #[serde(default, alias = "phone_c")]
    pub phone: String,
    #[serde(default, alias = "photo_url_c", deserialize_with = "blank_as_none")]
    pub photo_url: Option<String>,
    #[serde(default, alias = "role_c")]
    pub role: String,
    #[serde(default, alias = "department_c")]
    pub department: String,
    #[serde(alias = "start_date_c", with = "wire_date")]
    pub start_date: NaiveDate,
    #[serde(default, alias = "status_c", deserialize_with = "loose_status")]
    pub status: EmployeeStatus,
    #[serde(default, deserialize_with = "loose_id")]
    pub manager_id: Option<RecordId>,
    #[serde(default)]
    pub onboarding_progress: Option<Vec<OnboardingStep>>,
}

impl NewEmployee {
    pub fn validate(&self) -> Result<(), HrError> {
        let mut errors = ValidationErrors::default();
        errors.require("firstName", &self.first_name);
        errors.require("lastName", &self.last_name);
        errors.require("email", &self.email);
        errors.require("phone", &self.phone);
        errors.require("role", &self.role);
        errors.require("department", &self.department);
        errors.into_result()
    }
}

/// Partial employee update. `photo_url` and `manager_id` use a nested
/// option so callers can clear them: `Some(None)` removes the value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    #[serde(default, alias = "first_name_c")]
    pub first_name: Option<String>,
    #[serde(default, alias = "last_name_c")]
    pub last_name: Option<String>,
    #[serde(default, alias = "email_c")]
    pub email: Option<String>,
    #[serde(default, alias = "phone_c")]
    pub phone: Option<String>,
    #[serde(default, alias = "photo_url_c", deserialize_with = "present_blank_as_none")]
    pub photo_url: Option<Option<String>>,
    #[serde(default, alias = "role_c")]
    pub role: Option<String>,
    #[serde(default, alias = "department_c")]
    pub department: Option<String>,
    #[serde(default, alias = "start_date_c", with = "wire_date::option")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, alias = "status_c", deserialize_with = "present_loose_status")]
    pub status: Option<EmployeeStatus>,
    #[serde(default, deserialize_with = "present_loose_id")]
    pub manager_id: Option<Option<RecordId>>,
    #[serde(default)]
    pub onboarding_progress: Option<Vec<OnboardingStep>>,
}

impl EmployeePatch {
    /// Supplied text fields must not be blank; absent ones are fine.
    pub fn validate(&self) -> Result<(), HrError> {
        let mut errors = ValidationErrors::default();
        let supplied = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("role", &self.role),
            ("department", &self.department),
        ];
        for (field, value) in supplied {
            if let Some(value) = value {
                errors.require(field, value);
            }
        }
        errors.into_result()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[serde(alias = "Id")]
    pub id: RecordId,
    pub name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "loose_id")]
    pub head_id: Option<RecordId>,
    #[serde(default, deserialize_with = "loose_id")]
    pub parent_department_id: Option<RecordId>,
    /// Set at creation and never recomputed; see [`crate::filter::members_of`].
    #[serde(default)]
    pub employee_count: i32,
}

impl Department {
    pub fn from_draft(id: RecordId, draft: NewDepartment) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description.filter(|text| !text.trim().is_empty()),
            head_id: draft.head_id,
            parent_department_id: draft.parent_department_id,
            employee_count: 0,
        }
    }

    pub fn apply(&mut self, patch: DepartmentPatch) {
        if let Some(value) = patch.name {
            self.name = value;
        }
        if let Some(value) = patch.description {
            self.description = value;
        }
        if let Some(value) = patch.head_id {
            self.head_id = value;
        }
        if let Some(value) = patch.parent_department_id {
            self.parent_department_id = value;
        }
        if let Some(value) = patch.employee_count {
            self.employee_count = value;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDepartment {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "loose_id")]
    pub head_id: Option<RecordId>,
    #[serde(default, deserialize_with = "loose_id")]
    pub parent_department_id: Option<RecordId>,
}

impl NewDepartment {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), HrError> {
        let mut errors = ValidationErrors::default();
        errors.require("name", &self.name);
        errors.into_result()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present_blank_as_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_loose_id")]
    pub head_id: Option<Option<RecordId>>,
    #[serde(default, deserialize_with = "present_loose_id")]
    pub parent_department_id: Option<Option<RecordId>>,
    #[serde(default)]
    pub employee_count: Option<i32>,
}

impl DepartmentPatch {
    pub fn validate(&self) -> Result<(), HrError> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            errors.require("name", name);
        }
        errors.into_result()
    }
}

/// Ids arrive as numbers, numeric strings, empty strings or null.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseId {
    Number(RecordId),
    Text(String),
}

fn loose_id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LooseId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LooseId::Number(id)) => Ok(Some(id)),
        Some(LooseId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(LooseId::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn present_loose_id<'de, D>(deserializer: D) -> Result<Option<Option<RecordId>>, D::Error>
where
    D: Deserializer<'de>,
{
    loose_id(deserializer).map(Some)
}

/// Blank or null status means active; other text goes through `FromStr`.
fn loose_status<'de, D>(deserializer: D) -> Result<EmployeeStatus, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) if !text.trim().is_empty() => text.parse().map_err(serde::de::Error::custom),
        _ => Ok(EmployeeStatus::default()),
    }
}

/// Patch form: blank or null leaves the status alone.
fn present_loose_status<'de, D>(deserializer: D) -> Result<Option<EmployeeStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) if !text.trim().is_empty() => {
            text.parse().map(Some).map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.trim().is_empty()))
}

fn present_blank_as_none<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    blank_as_none(deserializer).map(Some)
}

/// Start dates travel as ISO-8601 date-times but mean a calendar date.
pub mod wire_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(date: NaiveDate) -> String {
        format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
    }

    /// Accepts `2024-01-15`, `2024-01-15T00:00:00.000Z` and offset-less
    /// date-times. The date part is taken as written.
    pub fn parse(value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
            return Some(stamp.date_naive());
        }
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|stamp| stamp.date())
    }

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date `{raw}`")))
    }

    pub mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date `{raw}`"))),
            }
        }
    }
}
