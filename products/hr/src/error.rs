use std::fmt;

use thiserror::Error;

use crate::model::{RecordId, RecordKind};

pub type HrResult<T> = Result<T, HrError>;

/// Failures surfaced by stores and services.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HrError {
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: RecordId },
    #[error("validation failed: {0}")]
    ValidationFailed(ValidationErrors),
    #[error("backing store unavailable: {0}")]
    TransportFailure(String),
}

impl HrError {
    pub fn not_found(kind: RecordKind, id: RecordId) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailure(message.into())
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::default();
        errors.push(field, message);
        Self::ValidationFailed(errors)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A rejected write. Carries per-field detail when the rejecting side
/// supplied it, otherwise a single message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub message: Option<String>,
    pub fields: Vec<FieldError>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl ValidationErrors {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            fields: Vec::new(),
        }
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Records `field` as missing when `value` is blank.
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be empty");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.fields.is_empty()
    }

    pub fn into_result(self) -> HrResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(HrError::ValidationFailed(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.message {
            return f.write_str(message);
        }
        let mut first = true;
        for field in &self.fields {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", field.field, field.message)?;
            first = false;
        }
        Ok(())
    }
}
