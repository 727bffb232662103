//! CSV export of the employee table.
//!
//! Every field is quoted and embedded quotes are doubled. Rows are joined
//! with `\n` and the payload carries no trailing newline.

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

use crate::model::Employee;

pub const CSV_MIME: &str = "text/csv; charset=utf-8";

pub const CSV_HEADER: [&str; 9] = [
    "ID",
    "First Name",
    "Last Name",
    "Email",
    "Phone",
    "Role",
    "Department",
    "Start Date",
    "Status",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no employee data to export")]
    Empty,
    #[error("failed to encode csv: {0}")]
    Encode(#[from] csv::Error),
    #[error("failed to flush csv buffer: {0}")]
    Flush(#[from] std::io::Error),
    #[error("csv output was not utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A ready-to-download export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

impl CsvExport {
    pub fn mime(&self) -> &'static str {
        CSV_MIME
    }
}

/// `employees_<yyyy-MM-dd>.csv`
pub fn export_filename(today: NaiveDate) -> String {
    format!("employees_{}.csv", today.format("%Y-%m-%d"))
}

pub fn to_csv(employees: &[Employee]) -> Result<String, ExportError> {
    if employees.is_empty() {
        return Err(ExportError::Empty);
    }
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for employee in employees {
        writer.write_record([
            employee.id.to_string(),
            employee.first_name.clone(),
            employee.last_name.clone(),
            employee.email.clone(),
            employee.phone.clone(),
            employee.role.clone(),
            employee.department.clone(),
            employee.start_date.format("%Y-%m-%d").to_string(),
            employee.status.as_str().to_string(),
        ])?;
    }
    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    let mut content = String::from_utf8(bytes)?;
    if content.ends_with('\n') {
        content.pop();
    }
    Ok(content)
}

pub fn export_employees(employees: &[Employee], today: NaiveDate) -> Result<CsvExport, ExportError> {
    Ok(CsvExport {
        filename: export_filename(today),
        content: to_csv(employees)?,
    })
}
