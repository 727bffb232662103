mod departments;
mod employees;
mod reports;

use async_graphql::{
    Context, EmptySubscription, Error, ErrorExtensions, ID, MaybeUndefined, MergedObject, Object,
    Schema, SimpleObject,
};
use chrono::NaiveDate;
use platform_api::{ApiError, ApiResult, internal_error};
use products_hr::{BatchOutcome, RecordId, model::wire_date};
use serde::Serialize;
use tracing::instrument;

use crate::directory::Directory;

pub use departments::{DepartmentMutation, DepartmentQuery};
pub use employees::{EmployeeMutation, EmployeeQuery};
pub use reports::ReportQuery;

pub type SchemaType = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(directory: Directory) -> SchemaType {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(directory)
        .finish()
}

#[derive(MergedObject, Default)]
pub struct QueryRoot(HealthQuery, EmployeeQuery, DepartmentQuery, ReportQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(EmployeeMutation, DepartmentMutation);

#[derive(Default)]
pub struct HealthQuery;

#[Object]
impl HealthQuery {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self) -> ApiResult<HealthPayload> {
        Ok(HealthPayload { ok: true })
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> ApiResult<String> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }
}

#[derive(Clone, Debug, SimpleObject, Serialize)]
pub struct HealthPayload {
    pub ok: bool,
}

/// Per-id result of a batch delete.
#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "BatchOutcome")]
pub struct BatchOutcomeNode {
    pub succeeded: Vec<ID>,
    pub failed: Vec<BatchFailureNode>,
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "BatchFailure")]
pub struct BatchFailureNode {
    pub id: ID,
    pub code: String,
    pub message: String,
}

impl From<BatchOutcome> for BatchOutcomeNode {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            succeeded: outcome.succeeded.into_iter().map(to_id).collect(),
            failed: outcome
                .failed
                .into_iter()
                .map(|failure| {
                    let err = ApiError::from(failure.error);
                    BatchFailureNode {
                        id: to_id(failure.id),
                        code: err.code().to_string(),
                        message: err.to_string(),
                    }
                })
                .collect(),
        }
    }
}

fn directory<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Directory> {
    ctx.data::<Directory>().map_err(|err| {
        internal_error(anyhow::anyhow!("directory services missing: {}", err.message))
    })
}

fn invalid_input(message: impl Into<String>) -> Error {
    ApiError::InvalidInput(message.into()).extend()
}

fn to_id(id: RecordId) -> ID {
    ID(id.to_string())
}

fn parse_id(field: &str, id: &ID) -> async_graphql::Result<RecordId> {
    id.as_str()
        .trim()
        .parse()
        .map_err(|_| invalid_input(format!("{field} must be a numeric id")))
}

fn parse_ids(field: &str, ids: &[ID]) -> async_graphql::Result<Vec<RecordId>> {
    ids.iter().map(|id| parse_id(field, id)).collect()
}

/// Blank ids mean "no reference".
fn parse_optional_id(field: &str, id: Option<&ID>) -> async_graphql::Result<Option<RecordId>> {
    match id {
        Some(id) if !id.trim().is_empty() => parse_id(field, id).map(Some),
        _ => Ok(None),
    }
}

fn parse_date(field: &str, raw: &str) -> async_graphql::Result<NaiveDate> {
    wire_date::parse(raw).ok_or_else(|| {
        invalid_input(format!(
            "{field} must be an ISO-8601 date or date-time, got `{raw}`"
        ))
    })
}

/// `null` clears, absent leaves untouched; blank text clears too.
fn patch_text(value: MaybeUndefined<String>) -> Option<Option<String>> {
    match value {
        MaybeUndefined::Undefined => None,
        MaybeUndefined::Null => Some(None),
        MaybeUndefined::Value(text) => Some(Some(text).filter(|t| !t.trim().is_empty())),
    }
}

fn patch_id(field: &str, value: MaybeUndefined<ID>) -> async_graphql::Result<Option<Option<RecordId>>> {
    match value {
        MaybeUndefined::Undefined => Ok(None),
        MaybeUndefined::Null => Ok(Some(None)),
        MaybeUndefined::Value(id) => parse_optional_id(field, Some(&id)).map(Some),
    }
}

/// Blank input drops the constraint; anything else is matched as typed.
fn sanitize_optional_filter(value: Option<String>) -> Option<String> {
    value.filter(|input| !input.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use async_graphql::{Request, Variables};
    use serde_json::{Value, json};

    fn schema() -> SchemaType {
        build_schema(Directory::in_memory(Duration::ZERO))
    }

    async fn run(schema: &SchemaType, query: &str, variables: Value) -> async_graphql::Response {
        schema
            .execute(Request::new(query).variables(Variables::from_json(variables)))
            .await
    }

    fn error_code(response: &async_graphql::Response) -> Option<String> {
        let err = response.errors.first()?;
        let value = err.extensions.as_ref()?.get("code")?.clone();
        match value {
            async_graphql::Value::String(code) => Some(code),
            _ => None,
        }
    }

    const CREATE: &str = r#"
        mutation Create($input: EmployeeInput!) {
            createEmployee(input: $input) {
                id firstName fullName startDate status photoUrl onboardingPercentage
                onboardingProgress { id completed }
            }
        }
    "#;

    fn employee_input(first: &str, department: &str, role: &str) -> Value {
        json!({
            "input": {
                "firstName": first,
                "lastName": "Doe",
                "email": format!("{}@example.test", first.to_lowercase()),
                "phone": "555",
                "photoUrl": "",
                "role": role,
                "department": department,
                "startDate": "2024-01-15"
            }
        })
    }

    async fn create(schema: &SchemaType, first: &str, department: &str, role: &str) -> String {
        let response = run(schema, CREATE, employee_input(first, department, role)).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        body["createEmployee"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_query_returns_ok() {
        let schema = schema();
        let response = schema.execute(Request::new("{ health { ok } }")).await;
        assert!(response.errors.is_empty());
        let body = response.data.into_json().unwrap();
        assert_eq!(body, json!({"health": {"ok": true}}));
    }

    #[tokio::test]
    async fn create_employee_applies_defaults() {
        let schema = schema();
        let response = run(&schema, CREATE, employee_input("Jane", "Eng", "Developer")).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        let created = &body["createEmployee"];
        assert_eq!(created["id"], json!("1"));
        assert_eq!(created["fullName"], json!("Jane Doe"));
        assert_eq!(created["startDate"], json!("2024-01-15T00:00:00.000Z"));
        assert_eq!(created["status"], json!("ACTIVE"));
        assert_eq!(created["photoUrl"], Value::Null);
        assert_eq!(created["onboardingPercentage"], json!(0));
        assert_eq!(created["onboardingProgress"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn blank_fields_fail_validation() {
        let schema = schema();
        let response = run(&schema, CREATE, employee_input(" ", "Eng", "Developer")).await;
        assert_eq!(error_code(&response).as_deref(), Some("VALIDATION_FAILED"));
        assert_eq!(
            response.errors[0].message,
            "validation failed: firstName must not be empty"
        );
    }

    #[tokio::test]
    async fn filters_and_roles() {
        let schema = schema();
        create(&schema, "Jane", "Eng", "Developer").await;
        create(&schema, "John", "Sales", "Manager").await;
        create(&schema, "Ann", "Eng", "Manager").await;

        let response = run(
            &schema,
            r#"query($filter: EmployeeFilterInput) {
                employees(filter: $filter) { firstName }
                roles
            }"#,
            json!({ "filter": { "q": "  ", "department": "Eng", "role": "Manager" } }),
        )
        .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        assert_eq!(body["employees"], json!([{ "firstName": "Ann" }]));
        assert_eq!(body["roles"], json!(["Developer", "Manager"]));
    }

    #[tokio::test]
    async fn filter_values_are_not_trimmed() {
        let schema = schema();
        create(&schema, "Jane", "Eng", "Developer").await;

        let response = run(
            &schema,
            r#"query($filter: EmployeeFilterInput) { employees(filter: $filter) { firstName } }"#,
            json!({ "filter": { "department": " Eng" } }),
        )
        .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        assert_eq!(body["employees"], json!([]));
    }

    #[tokio::test]
    async fn schema_without_directory_reports_internal_error() {
        let schema = Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
            .finish();
        let response = schema.execute(Request::new("{ roles }")).await;
        assert_eq!(error_code(&response).as_deref(), Some("INTERNAL"));
        assert_eq!(response.errors[0].message, "internal server error");
    }

    #[tokio::test]
    async fn missing_records_report_not_found() {
        let schema = schema();
        let response = run(
            &schema,
            r#"mutation { updateEmployee(id: "42", input: { lastName: "C" }) { id } }"#,
            json!({}),
        )
        .await;
        assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));
        assert_eq!(response.errors[0].message, "employee 42 not found");

        let response = run(&schema, r#"{ employee(id: "abc") { id } }"#, json!({})).await;
        assert_eq!(error_code(&response).as_deref(), Some("INVALID_INPUT"));
    }

    #[tokio::test]
    async fn update_employee_merges_and_clears() {
        let schema = schema();
        let id = create(&schema, "Jane", "Eng", "Developer").await;
        let response = run(
            &schema,
            r#"mutation($id: ID!) {
                updateEmployee(id: $id, input: { status: INACTIVE, managerId: null, startDate: "2023-02-01T00:00:00.000Z" }) {
                    firstName status managerId startDate
                }
            }"#,
            json!({ "id": id }),
        )
        .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        assert_eq!(
            body["updateEmployee"],
            json!({
                "firstName": "Jane",
                "status": "INACTIVE",
                "managerId": null,
                "startDate": "2023-02-01T00:00:00.000Z"
            })
        );
    }

    #[tokio::test]
    async fn toggle_onboarding_step_twice_restores_progress() {
        let schema = schema();
        let id = create(&schema, "Jane", "Eng", "Developer").await;
        let toggle = r#"mutation($id: ID!) {
            toggleOnboardingStep(employeeId: $id, stepId: 3) { completedCount totalSteps percentage isComplete }
        }"#;

        let body = run(&schema, toggle, json!({ "id": id })).await.data.into_json().unwrap();
        assert_eq!(
            body["toggleOnboardingStep"],
            json!({ "completedCount": 1, "totalSteps": 7, "percentage": 14, "isComplete": false })
        );

        let body = run(&schema, toggle, json!({ "id": id })).await.data.into_json().unwrap();
        assert_eq!(body["toggleOnboardingStep"]["completedCount"], json!(0));

        let response = run(
            &schema,
            r#"mutation($id: ID!) { toggleOnboardingStep(employeeId: $id, stepId: 9) { percentage } }"#,
            json!({ "id": id }),
        )
        .await;
        assert_eq!(error_code(&response).as_deref(), Some("VALIDATION_FAILED"));
    }

    #[tokio::test]
    async fn department_members_are_derived_by_name() {
        let schema = schema();
        create(&schema, "Jane", "Engineering", "Developer").await;
        create(&schema, "John", "Engineering", "Developer").await;
        create(&schema, "Ann", "Sales", "Manager").await;

        let response = run(
            &schema,
            r#"mutation { createDepartment(input: { name: "Engineering", description: "" }) { id employeeCount description } }"#,
            json!({}),
        )
        .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        assert_eq!(body["createDepartment"]["employeeCount"], json!(0));
        assert_eq!(body["createDepartment"]["description"], Value::Null);
        let id = body["createDepartment"]["id"].as_str().unwrap().to_string();

        let response = run(
            &schema,
            r#"query($id: ID!) {
                departmentMembers(id: $id) { firstName }
                department(id: $id) { name members { firstName } }
                directoryOverview { departmentCount employeeCount averagePerDepartment }
            }"#,
            json!({ "id": id }),
        )
        .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        assert_eq!(
            body["departmentMembers"],
            json!([{ "firstName": "Jane" }, { "firstName": "John" }])
        );
        assert_eq!(body["department"]["members"].as_array().unwrap().len(), 2);
        assert_eq!(
            body["directoryOverview"],
            json!({ "departmentCount": 1, "employeeCount": 3, "averagePerDepartment": 3 })
        );
    }

    #[tokio::test]
    async fn batch_delete_reports_each_id() {
        let schema = schema();
        let first = create(&schema, "Jane", "Eng", "Developer").await;
        let response = run(
            &schema,
            r#"mutation($ids: [ID!]!) {
                deleteEmployees(ids: $ids) { succeeded failed { id code } }
            }"#,
            json!({ "ids": [first, "77"] }),
        )
        .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        assert_eq!(
            body["deleteEmployees"],
            json!({ "succeeded": [first], "failed": [{ "id": "77", "code": "NOT_FOUND" }] })
        );
    }

    #[tokio::test]
    async fn export_summary_lists_recent_hires() {
        let schema = schema();
        create(&schema, "Jane", "Eng", "Developer").await;
        let body = run(
            &schema,
            "{ exportSummary { total active departments roles recentAdditions { firstName } } }",
            json!({}),
        )
        .await
        .data
        .into_json()
        .unwrap();
        assert_eq!(
            body["exportSummary"],
            json!({
                "total": 1,
                "active": 1,
                "departments": 1,
                "roles": 1,
                "recentAdditions": [{ "firstName": "Jane" }]
            })
        );
    }

    #[test]
    fn schema_sdl_names_the_directory_operations() {
        let sdl = schema().sdl();
        for field in ["employees(", "toggleOnboardingStep(", "deleteDepartments(", "exportSummary"] {
            assert!(sdl.contains(field), "missing {field}");
        }
    }
}
