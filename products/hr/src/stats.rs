//! Derived directory figures. Nothing here is stored.

use crate::{
    filter,
    model::{Department, Employee},
};

const RECENT_ADDITIONS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectoryOverview {
    pub department_count: usize,
    pub employee_count: usize,
    /// `round(employees / departments)`, 0 when either side is empty.
    pub average_per_department: usize,
}

impl DirectoryOverview {
    pub fn compute(departments: &[Department], employees: &[Employee]) -> Self {
        let department_count = departments.len();
        let employee_count = employees.len();
        let average_per_department = if department_count == 0 || employee_count == 0 {
            0
        } else {
            (employee_count as f64 / department_count as f64).round() as usize
        };
        Self {
            department_count,
            employee_count,
            average_per_department,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    pub total: usize,
    pub active: usize,
    pub departments: usize,
    pub roles: usize,
    pub recent_additions: Vec<Employee>,
}

impl ExportSummary {
    pub fn compute(employees: &[Employee]) -> Self {
        let mut recent = employees.to_vec();
        recent.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        recent.truncate(RECENT_ADDITIONS);
        Self {
            total: employees.len(),
            active: employees.iter().filter(|e| e.is_active()).count(),
            departments: filter::distinct_departments(employees).len(),
            roles: filter::distinct_roles(employees).len(),
            recent_additions: recent,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        model::{EmployeeStatus, NewDepartment},
        onboarding::template_steps,
    };

    fn employee(id: i32, department: &str, role: &str, day: u32) -> Employee {
        Employee {
            id,
            first_name: format!("E{id}"),
            last_name: "Test".into(),
            email: format!("e{id}@corp.test"),
            phone: "555".into(),
            photo_url: None,
            role: role.into(),
            department: department.into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            status: if id % 2 == 0 {
                EmployeeStatus::Inactive
            } else {
                EmployeeStatus::Active
            },
            manager_id: None,
            onboarding_progress: template_steps(),
        }
    }

    #[test]
    fn overview_rounds_the_average() {
        let departments: Vec<_> = (1..=3)
            .map(|id| Department::from_draft(id, NewDepartment::named(format!("D{id}"))))
            .collect();
        let employees: Vec<_> = (1..=8).map(|id| employee(id, "D1", "Eng", id as u32)).collect();
        let overview = DirectoryOverview::compute(&departments, &employees);
        assert_eq!(overview.department_count, 3);
        assert_eq!(overview.employee_count, 8);
        assert_eq!(overview.average_per_department, 3);
        assert_eq!(DirectoryOverview::compute(&[], &employees).average_per_department, 0);
    }

    #[test]
    fn summary_counts_and_recent_hires() {
        let employees = vec![
            employee(1, "Eng", "Engineer", 3),
            employee(2, "Eng", "Manager", 20),
            employee(3, "Sales", "Engineer", 9),
            employee(4, "Ops", "Analyst", 1),
            employee(5, "Ops", "Analyst", 15),
            employee(6, "Eng", "Engineer", 28),
        ];
        let summary = ExportSummary::compute(&employees);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.active, 3);
        assert_eq!(summary.departments, 3);
        assert_eq!(summary.roles, 3);
        let recent: Vec<i32> = summary.recent_additions.iter().map(|e| e.id).collect();
        assert_eq!(recent, [6, 2, 5, 3, 1]);
    }
}
