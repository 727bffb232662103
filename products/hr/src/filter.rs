//! Visible-subset computation for the employee list.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::model::Employee;

/// Free-text query plus exact department and role constraints.
///
/// Blank inputs impose no constraint; any other value is compared as given.
/// The three predicates are ANDed and the query matches case-insensitively
/// against first name, last name, email or role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct EmployeeFilter {
    #[serde(default, alias = "q")]
    pub query: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl EmployeeFilter {
    pub fn new(
        query: impl Into<String>,
        department: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            query: Some(query.into()),
            department: Some(department.into()),
            role: Some(role.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        constraint(&self.query).is_none()
            && constraint(&self.department).is_none()
            && constraint(&self.role).is_none()
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        if let Some(query) = constraint(&self.query) {
            let needle = query.to_lowercase();
            let hit = [
                &employee.first_name,
                &employee.last_name,
                &employee.email,
                &employee.role,
            ]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(department) = constraint(&self.department) {
            if employee.department != department {
                return false;
            }
        }
        if let Some(role) = constraint(&self.role) {
            if employee.role != role {
                return false;
            }
        }
        true
    }

    /// Matching employees, in input order. `employees` is left untouched.
    pub fn apply<'a>(&self, employees: &'a [Employee]) -> Vec<&'a Employee> {
        employees.iter().filter(|e| self.matches(e)).collect()
    }
}

fn constraint(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|raw| !raw.trim().is_empty())
}

/// Owned-result form of [`EmployeeFilter::apply`].
pub fn filter_employees(
    employees: &[Employee],
    query: &str,
    department: &str,
    role: &str,
) -> Vec<Employee> {
    EmployeeFilter::new(query, department, role)
        .apply(employees)
        .into_iter()
        .cloned()
        .collect()
}

/// Distinct roles across `employees`, sorted.
pub fn distinct_roles(employees: &[Employee]) -> Vec<String> {
    distinct(employees.iter().map(|e| e.role.as_str()))
}

/// Distinct department names across `employees`, sorted.
pub fn distinct_departments(employees: &[Employee]) -> Vec<String> {
    distinct(employees.iter().map(|e| e.department.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Employees whose `department` equals `department_name` exactly.
///
/// Membership is keyed by name, so renaming a department leaves its former
/// members pointing at the old name.
pub fn members_of<'a>(department_name: &str, employees: &'a [Employee]) -> Vec<&'a Employee> {
    employees
        .iter()
        .filter(|e| e.department == department_name)
        .collect()
}
