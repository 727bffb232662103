use async_graphql::{Context, Object, SimpleObject};
use platform_api::directory_error;
use products_hr::stats::{DirectoryOverview, ExportSummary};
use tracing::instrument;

use super::{directory, employees::EmployeeNode};

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "DirectoryOverview")]
pub struct DirectoryOverviewNode {
    pub department_count: i32,
    pub employee_count: i32,
    pub average_per_department: i32,
}

impl From<DirectoryOverview> for DirectoryOverviewNode {
    fn from(overview: DirectoryOverview) -> Self {
        Self {
            department_count: overview.department_count as i32,
            employee_count: overview.employee_count as i32,
            average_per_department: overview.average_per_department as i32,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "ExportSummary")]
pub struct ExportSummaryNode {
    pub total: i32,
    pub active: i32,
    pub departments: i32,
    pub roles: i32,
    pub recent_additions: Vec<EmployeeNode>,
}

impl From<ExportSummary> for ExportSummaryNode {
    fn from(summary: ExportSummary) -> Self {
        Self {
            total: summary.total as i32,
            active: summary.active as i32,
            departments: summary.departments as i32,
            roles: summary.roles as i32,
            recent_additions: summary
                .recent_additions
                .into_iter()
                .map(EmployeeNode::from)
                .collect(),
        }
    }
}

#[derive(Default)]
pub struct ReportQuery;

#[Object]
impl ReportQuery {
    #[instrument(name = "graphql.directory_overview", skip_all)]
    async fn directory_overview(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<DirectoryOverviewNode> {
        let directory = directory(ctx)?;
        let departments = directory
            .departments
            .get_all()
            .await
            .map_err(directory_error)?;
        let employees = directory
            .employees
            .get_all()
            .await
            .map_err(directory_error)?;
        Ok(DirectoryOverview::compute(&departments, &employees).into())
    }

    #[instrument(name = "graphql.export_summary", skip_all)]
    async fn export_summary(&self, ctx: &Context<'_>) -> async_graphql::Result<ExportSummaryNode> {
        let employees = directory(ctx)?
            .employees
            .get_all()
            .await
            .map_err(directory_error)?;
        Ok(ExportSummary::compute(&employees).into())
    }
}
