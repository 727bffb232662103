//! Table models for the employee directory.

pub mod departments;
pub mod employees;
