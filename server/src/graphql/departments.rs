use async_graphql::{ComplexObject, Context, ID, InputObject, MaybeUndefined, Object, SimpleObject};
use platform_api::directory_error;
use products_hr::{Department, DepartmentPatch, NewDepartment, filter};
use tracing::instrument;

use super::{
    BatchOutcomeNode, directory, employees::EmployeeNode, parse_id, parse_ids, parse_optional_id,
    patch_id, patch_text, to_id,
};

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Department", complex)]
pub struct DepartmentNode {
    pub id: ID,
    pub name: String,
    pub description: Option<String>,
    pub head_id: Option<ID>,
    pub parent_department_id: Option<ID>,
    /// Stored count; see `members` for the live one.
    pub employee_count: i32,
}

#[ComplexObject]
impl DepartmentNode {
    /// Employees whose department name matches this one.
    async fn members(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<EmployeeNode>> {
        let employees = directory(ctx)?
            .employees
            .get_all()
            .await
            .map_err(directory_error)?;
        Ok(filter::members_of(&self.name, &employees)
            .into_iter()
            .cloned()
            .map(EmployeeNode::from)
            .collect())
    }
}

impl From<Department> for DepartmentNode {
    fn from(department: Department) -> Self {
        Self {
            id: to_id(department.id),
            name: department.name,
            description: department.description,
            head_id: department.head_id.map(to_id),
            parent_department_id: department.parent_department_id.map(to_id),
            employee_count: department.employee_count,
        }
    }
}

#[derive(InputObject, Clone)]
pub struct DepartmentInput {
    pub name: String,
    pub description: Option<String>,
    pub head_id: Option<ID>,
    pub parent_department_id: Option<ID>,
}

impl DepartmentInput {
    fn into_draft(self) -> async_graphql::Result<NewDepartment> {
        Ok(NewDepartment {
            head_id: parse_optional_id("headId", self.head_id.as_ref())?,
            parent_department_id: parse_optional_id(
                "parentDepartmentId",
                self.parent_department_id.as_ref(),
            )?,
            name: self.name,
            description: self.description,
        })
    }
}

#[derive(InputObject, Clone)]
pub struct DepartmentPatchInput {
    pub name: Option<String>,
    pub description: MaybeUndefined<String>,
    pub head_id: MaybeUndefined<ID>,
    pub parent_department_id: MaybeUndefined<ID>,
    pub employee_count: Option<i32>,
}

impl DepartmentPatchInput {
    fn into_patch(self) -> async_graphql::Result<DepartmentPatch> {
        Ok(DepartmentPatch {
            name: self.name,
            description: patch_text(self.description),
            head_id: patch_id("headId", self.head_id)?,
            parent_department_id: patch_id("parentDepartmentId", self.parent_department_id)?,
            employee_count: self.employee_count,
        })
    }
}

#[derive(Default)]
pub struct DepartmentQuery;

#[Object]
impl DepartmentQuery {
    #[instrument(name = "graphql.departments", skip_all)]
    async fn departments(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<DepartmentNode>> {
        let rows = directory(ctx)?
            .departments
            .get_all()
            .await
            .map_err(directory_error)?;
        Ok(rows.into_iter().map(DepartmentNode::from).collect())
    }

    #[instrument(name = "graphql.department", skip(self, ctx))]
    async fn department(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<DepartmentNode> {
        let id = parse_id("id", &id)?;
        let department = directory(ctx)?
            .departments
            .get_by_id(id)
            .await
            .map_err(directory_error)?;
        Ok(department.into())
    }

    #[instrument(name = "graphql.department_members", skip(self, ctx))]
    async fn department_members(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<Vec<EmployeeNode>> {
        let id = parse_id("id", &id)?;
        let directory = directory(ctx)?;
        let employees = directory
            .employees
            .get_all()
            .await
            .map_err(directory_error)?;
        let members = directory
            .departments
            .roster(id, &employees)
            .await
            .map_err(directory_error)?;
        Ok(members.into_iter().map(EmployeeNode::from).collect())
    }
}

#[derive(Default)]
pub struct DepartmentMutation;

#[Object]
impl DepartmentMutation {
    #[instrument(name = "graphql.create_department", skip_all)]
    async fn create_department(
        &self,
        ctx: &Context<'_>,
        input: DepartmentInput,
    ) -> async_graphql::Result<DepartmentNode> {
        let draft = input.into_draft()?;
        let created = directory(ctx)?
            .departments
            .create(draft)
            .await
            .map_err(directory_error)?;
        Ok(created.into())
    }

    #[instrument(name = "graphql.update_department", skip(self, ctx, input))]
    async fn update_department(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: DepartmentPatchInput,
    ) -> async_graphql::Result<DepartmentNode> {
        let id = parse_id("id", &id)?;
        let patch = input.into_patch()?;
        let updated = directory(ctx)?
            .departments
            .update(id, patch)
            .await
            .map_err(directory_error)?;
        Ok(updated.into())
    }

    #[instrument(name = "graphql.delete_department", skip(self, ctx))]
    async fn delete_department(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        let id = parse_id("id", &id)?;
        directory(ctx)?
            .departments
            .delete(id)
            .await
            .map_err(directory_error)?;
        Ok(true)
    }

    #[instrument(name = "graphql.delete_departments", skip_all)]
    async fn delete_departments(
        &self,
        ctx: &Context<'_>,
        ids: Vec<ID>,
    ) -> async_graphql::Result<BatchOutcomeNode> {
        let ids = parse_ids("ids", &ids)?;
        let outcome = directory(ctx)?.departments.delete_many(&ids).await;
        Ok(outcome.into())
    }
}
