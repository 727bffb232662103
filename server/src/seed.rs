//! Demo fixtures for an empty directory.

use chrono::NaiveDate;
use products_hr::{EmployeeStatus, HrResult, NewDepartment, NewEmployee, RecordId};
use tracing::info;

use crate::directory::Directory;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub departments: usize,
    pub employees: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.departments == 0 && self.employees == 0
    }
}

const DEPARTMENTS: [(&str, &str); 5] = [
    ("Engineering", "Builds and runs the product"),
    ("Sales", "Finds and closes new business"),
    ("Marketing", "Brand, campaigns and events"),
    ("Human Resources", "Hiring, onboarding and people operations"),
    ("Finance", "Budgets, payroll and reporting"),
];

struct DemoEmployee {
    first_name: &'static str,
    last_name: &'static str,
    role: &'static str,
    department: &'static str,
    start: (i32, u32, u32),
    status: EmployeeStatus,
    /// Index into the employees created before this one.
    manager: Option<usize>,
}

const EMPLOYEES: [DemoEmployee; 8] = [
    DemoEmployee {
        first_name: "Sarah",
        last_name: "Johnson",
        role: "Engineering Manager",
        department: "Engineering",
        start: (2019, 3, 4),
        status: EmployeeStatus::Active,
        manager: None,
    },
    DemoEmployee {
        first_name: "Michael",
        last_name: "Chen",
        role: "Senior Developer",
        department: "Engineering",
        start: (2020, 7, 13),
        status: EmployeeStatus::Active,
        manager: Some(0),
    },
    DemoEmployee {
        first_name: "Priya",
        last_name: "Patel",
        role: "Developer",
        department: "Engineering",
        start: (2024, 1, 15),
        status: EmployeeStatus::Active,
        manager: Some(0),
    },
    DemoEmployee {
        first_name: "David",
        last_name: "Okafor",
        role: "Account Executive",
        department: "Sales",
        start: (2021, 9, 1),
        status: EmployeeStatus::Active,
        manager: None,
    },
    DemoEmployee {
        first_name: "Emma",
        last_name: "Rossi",
        role: "Sales Associate",
        department: "Sales",
        start: (2023, 5, 22),
        status: EmployeeStatus::Inactive,
        manager: Some(3),
    },
    DemoEmployee {
        first_name: "Lucas",
        last_name: "Meyer",
        role: "Marketing Specialist",
        department: "Marketing",
        start: (2022, 11, 7),
        status: EmployeeStatus::Active,
        manager: None,
    },
    DemoEmployee {
        first_name: "Aisha",
        last_name: "Bello",
        role: "HR Generalist",
        department: "Human Resources",
        start: (2024, 6, 3),
        status: EmployeeStatus::Active,
        manager: None,
    },
    DemoEmployee {
        first_name: "Tom",
        last_name: "Nguyen",
        role: "Financial Analyst",
        department: "Finance",
        start: (2018, 2, 19),
        status: EmployeeStatus::Active,
        manager: None,
    },
];

/// Inserts the demo departments and employees unless either table already
/// holds records.
pub async fn seed_if_empty(directory: &Directory) -> HrResult<SeedReport> {
    let departments = directory.departments.get_all().await?;
    let employees = directory.employees.get_all().await?;
    if !departments.is_empty() || !employees.is_empty() {
        info!(
            departments = departments.len(),
            employees = employees.len(),
            "directory already populated; skipping seed"
        );
        return Ok(SeedReport::default());
    }

    let mut report = SeedReport::default();
    for (name, description) in DEPARTMENTS {
        directory
            .departments
            .create(NewDepartment {
                description: Some(description.to_string()),
                ..NewDepartment::named(name)
            })
            .await?;
        report.departments += 1;
    }

    let mut created: Vec<RecordId> = Vec::with_capacity(EMPLOYEES.len());
    for demo in &EMPLOYEES {
        let employee = directory.employees.create(draft(demo, &created)).await?;
        created.push(employee.id);
        report.employees += 1;
    }

    info!(
        departments = report.departments,
        employees = report.employees,
        "demo directory seeded"
    );
    Ok(report)
}

fn draft(demo: &DemoEmployee, created: &[RecordId]) -> NewEmployee {
    let (year, month, day) = demo.start;
    NewEmployee {
        first_name: demo.first_name.to_string(),
        last_name: demo.last_name.to_string(),
        email: format!(
            "{}.{}@example.com",
            demo.first_name.to_lowercase(),
            demo.last_name.to_lowercase()
        ),
        phone: format!("+1 555 01{:02}", created.len()),
        photo_url: None,
        role: demo.role.to_string(),
        department: demo.department.to_string(),
        start_date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN),
        status: demo.status,
        manager_id: demo.manager.and_then(|index| created.get(index).copied()),
        onboarding_progress: None,
    }
}
