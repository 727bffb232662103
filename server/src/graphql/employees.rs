use async_graphql::{Context, Enum, ID, InputObject, MaybeUndefined, Object, SimpleObject};
use platform_api::directory_error;
use products_hr::{
    Employee, EmployeePatch, EmployeeStatus, NewEmployee, OnboardingEditor, OnboardingProgress,
    OnboardingStep, RecordId,
    filter::{self, EmployeeFilter},
    model::wire_date,
};
use tracing::{info_span, instrument, Instrument};

use super::{
    BatchOutcomeNode, directory, parse_date, parse_id, parse_ids, parse_optional_id, patch_id,
    patch_text, sanitize_optional_filter, to_id,
};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(name = "EmployeeStatus")]
pub enum StatusValue {
    Active,
    Inactive,
}

impl From<EmployeeStatus> for StatusValue {
    fn from(value: EmployeeStatus) -> Self {
        match value {
            EmployeeStatus::Active => StatusValue::Active,
            EmployeeStatus::Inactive => StatusValue::Inactive,
        }
    }
}

impl From<StatusValue> for EmployeeStatus {
    fn from(value: StatusValue) -> Self {
        match value {
            StatusValue::Active => EmployeeStatus::Active,
            StatusValue::Inactive => EmployeeStatus::Inactive,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Employee")]
pub struct EmployeeNode {
    pub id: ID,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub photo_url: Option<String>,
    pub role: String,
    pub department: String,
    /// ISO-8601 date-time at midnight UTC.
    pub start_date: String,
    pub status: StatusValue,
    pub manager_id: Option<ID>,
    pub onboarding_progress: Vec<OnboardingStepNode>,
    pub onboarding_percentage: i32,
}

impl From<Employee> for EmployeeNode {
    fn from(employee: Employee) -> Self {
        let percentage = OnboardingProgress::of(&employee.onboarding_progress).percentage;
        Self {
            id: to_id(employee.id),
            full_name: employee.full_name(),
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: employee.email,
            phone: employee.phone,
            photo_url: employee.photo_url,
            role: employee.role,
            department: employee.department,
            start_date: wire_date::format(employee.start_date),
            status: employee.status.into(),
            manager_id: employee.manager_id.map(to_id),
            onboarding_progress: employee
                .onboarding_progress
                .into_iter()
                .map(OnboardingStepNode::from)
                .collect(),
            onboarding_percentage: i32::from(percentage),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "OnboardingStep")]
pub struct OnboardingStepNode {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

impl From<OnboardingStep> for OnboardingStepNode {
    fn from(step: OnboardingStep) -> Self {
        Self {
            id: i32::from(step.id),
            title: step.title,
            description: step.description,
            completed: step.completed,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "OnboardingProgress")]
pub struct OnboardingProgressNode {
    pub employee_id: ID,
    pub completed_count: i32,
    pub total_steps: i32,
    pub percentage: i32,
    pub is_complete: bool,
    pub steps: Vec<OnboardingStepNode>,
}

impl OnboardingProgressNode {
    fn new(employee_id: RecordId, steps: &[OnboardingStep]) -> Self {
        let progress = OnboardingProgress::of(steps);
        Self {
            employee_id: to_id(employee_id),
            completed_count: progress.completed_count as i32,
            total_steps: progress.total_steps as i32,
            percentage: i32::from(progress.percentage),
            is_complete: progress.is_complete(),
            steps: steps.iter().cloned().map(OnboardingStepNode::from).collect(),
        }
    }
}

#[derive(InputObject, Clone)]
pub struct OnboardingStepInput {
    pub id: u8,
    pub title: String,
    #[graphql(default)]
    pub description: String,
    #[graphql(default)]
    pub completed: bool,
}

impl From<OnboardingStepInput> for OnboardingStep {
    fn from(input: OnboardingStepInput) -> Self {
        Self {
            id: input.id,
            title: input.title,
            description: input.description,
            completed: input.completed,
        }
    }
}

#[derive(InputObject, Default, Clone)]
pub struct EmployeeFilterInput {
    pub q: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
}

impl From<EmployeeFilterInput> for EmployeeFilter {
    fn from(input: EmployeeFilterInput) -> Self {
        Self {
            query: sanitize_optional_filter(input.q),
            department: sanitize_optional_filter(input.department),
            role: sanitize_optional_filter(input.role),
        }
    }
}

#[derive(InputObject, Clone)]
pub struct EmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub photo_url: Option<String>,
    pub role: String,
    pub department: String,
    /// `2024-01-15` or `2024-01-15T00:00:00.000Z`.
    pub start_date: String,
    pub status: Option<StatusValue>,
    pub manager_id: Option<ID>,
    pub onboarding_progress: Option<Vec<OnboardingStepInput>>,
}

impl EmployeeInput {
    fn into_draft(self) -> async_graphql::Result<NewEmployee> {
        Ok(NewEmployee {
            start_date: parse_date("startDate", &self.start_date)?,
            manager_id: parse_optional_id("managerId", self.manager_id.as_ref())?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            photo_url: self.photo_url,
            role: self.role,
            department: self.department,
            status: self.status.map(Into::into).unwrap_or_default(),
            onboarding_progress: self
                .onboarding_progress
                .map(|steps| steps.into_iter().map(OnboardingStep::from).collect()),
        })
    }
}

#[derive(InputObject, Clone)]
pub struct EmployeePatchInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: MaybeUndefined<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub start_date: Option<String>,
    pub status: Option<StatusValue>,
    pub manager_id: MaybeUndefined<ID>,
    pub onboarding_progress: Option<Vec<OnboardingStepInput>>,
}

impl EmployeePatchInput {
    fn into_patch(self) -> async_graphql::Result<EmployeePatch> {
        let start_date = match self.start_date {
            Some(raw) => Some(parse_date("startDate", &raw)?),
            None => None,
        };
        Ok(EmployeePatch {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            photo_url: patch_text(self.photo_url),
            role: self.role,
            department: self.department,
            start_date,
            status: self.status.map(Into::into),
            manager_id: patch_id("managerId", self.manager_id)?,
            onboarding_progress: self
                .onboarding_progress
                .map(|steps| steps.into_iter().map(OnboardingStep::from).collect()),
        })
    }
}

#[derive(Default)]
pub struct EmployeeQuery;

#[Object]
impl EmployeeQuery {
    async fn employees(
        &self,
        ctx: &Context<'_>,
        filter: Option<EmployeeFilterInput>,
    ) -> async_graphql::Result<Vec<EmployeeNode>> {
        let filter = EmployeeFilter::from(filter.unwrap_or_default());
        let span = info_span!(
            "graphql.employees",
            has_q = filter.query.is_some(),
            department = filter.department.as_deref().unwrap_or(""),
            role = filter.role.as_deref().unwrap_or("")
        );
        let rows = directory(ctx)?
            .filtered_employees(&filter)
            .instrument(span)
            .await
            .map_err(directory_error)?;
        Ok(rows.into_iter().map(EmployeeNode::from).collect())
    }

    #[instrument(name = "graphql.employee", skip(self, ctx))]
    async fn employee(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<EmployeeNode> {
        let id = parse_id("id", &id)?;
        let employee = directory(ctx)?
            .employees
            .get_by_id(id)
            .await
            .map_err(directory_error)?;
        Ok(employee.into())
    }

    /// Distinct roles across all employees, sorted.
    #[instrument(name = "graphql.roles", skip_all)]
    async fn roles(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<String>> {
        let employees = directory(ctx)?
            .employees
            .get_all()
            .await
            .map_err(directory_error)?;
        Ok(filter::distinct_roles(&employees))
    }

    #[instrument(name = "graphql.onboarding_progress", skip(self, ctx))]
    async fn onboarding_progress(
        &self,
        ctx: &Context<'_>,
        employee_id: ID,
    ) -> async_graphql::Result<OnboardingProgressNode> {
        let id = parse_id("employeeId", &employee_id)?;
        let employee = directory(ctx)?
            .employees
            .get_by_id(id)
            .await
            .map_err(directory_error)?;
        Ok(OnboardingProgressNode::new(
            employee.id,
            &employee.onboarding_progress,
        ))
    }
}

#[derive(Default)]
pub struct EmployeeMutation;

#[Object]
impl EmployeeMutation {
    #[instrument(name = "graphql.create_employee", skip_all)]
    async fn create_employee(
        &self,
        ctx: &Context<'_>,
        input: EmployeeInput,
    ) -> async_graphql::Result<EmployeeNode> {
        let draft = input.into_draft()?;
        let created = directory(ctx)?
            .employees
            .create(draft)
            .await
            .map_err(directory_error)?;
        Ok(created.into())
    }

    #[instrument(name = "graphql.update_employee", skip(self, ctx, input))]
    async fn update_employee(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: EmployeePatchInput,
    ) -> async_graphql::Result<EmployeeNode> {
        let id = parse_id("id", &id)?;
        let patch = input.into_patch()?;
        let updated = directory(ctx)?
            .employees
            .update(id, patch)
            .await
            .map_err(directory_error)?;
        Ok(updated.into())
    }

    /// Replaces the whole checklist.
    #[instrument(name = "graphql.update_onboarding_progress", skip(self, ctx, steps))]
    async fn update_onboarding_progress(
        &self,
        ctx: &Context<'_>,
        employee_id: ID,
        steps: Vec<OnboardingStepInput>,
    ) -> async_graphql::Result<EmployeeNode> {
        let id = parse_id("employeeId", &employee_id)?;
        let steps = steps.into_iter().map(OnboardingStep::from).collect();
        let updated = directory(ctx)?
            .employees
            .update_onboarding_progress(id, steps)
            .await
            .map_err(directory_error)?;
        Ok(updated.into())
    }

    /// Flips one step and persists the checklist.
    #[instrument(name = "graphql.toggle_onboarding_step", skip(self, ctx))]
    async fn toggle_onboarding_step(
        &self,
        ctx: &Context<'_>,
        employee_id: ID,
        step_id: u8,
    ) -> async_graphql::Result<OnboardingProgressNode> {
        let id = parse_id("employeeId", &employee_id)?;
        let directory = directory(ctx)?;
        let employee = directory
            .employees
            .get_by_id(id)
            .await
            .map_err(directory_error)?;
        let mut editor = OnboardingEditor::new(&employee);
        editor
            .toggle(&directory.employees, step_id)
            .await
            .map_err(directory_error)?;
        Ok(OnboardingProgressNode::new(
            editor.employee_id(),
            editor.steps(),
        ))
    }

    #[instrument(name = "graphql.delete_employee", skip(self, ctx))]
    async fn delete_employee(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        let id = parse_id("id", &id)?;
        directory(ctx)?
            .employees
            .delete(id)
            .await
            .map_err(directory_error)?;
        Ok(true)
    }

    #[instrument(name = "graphql.delete_employees", skip_all)]
    async fn delete_employees(
        &self,
        ctx: &Context<'_>,
        ids: Vec<ID>,
    ) -> async_graphql::Result<BatchOutcomeNode> {
        let ids = parse_ids("ids", &ids)?;
        let outcome = directory(ctx)?.employees.delete_many(&ids).await;
        Ok(outcome.into())
    }
}
