use std::sync::Arc;

use async_graphql::{Error, ErrorExtensions, Value};
use products_hr::HrError;
use thiserror::Error;

/// Shared GraphQL result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("validation failed: {message}")]
    ValidationFailed {
        message: String,
        fields: Vec<(String, String)>,
    },
    #[error("directory backend unavailable")]
    TransportFailure(String),
    #[error("bad request: {0}")]
    InvalidInput(String),
    #[error("internal server error")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ValidationFailed { .. } => "VALIDATION_FAILED",
            ApiError::TransportFailure(_) => "TRANSPORT_FAILURE",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::internal(value)
    }
}

impl From<HrError> for ApiError {
    fn from(value: HrError) -> Self {
        match value {
            HrError::NotFound { kind, id } => ApiError::NotFound(format!("{kind} {id}")),
            HrError::ValidationFailed(errors) => ApiError::ValidationFailed {
                message: errors.to_string(),
                fields: errors
                    .fields
                    .into_iter()
                    .map(|field| (field.field, field.message))
                    .collect(),
            },
            HrError::TransportFailure(detail) => ApiError::TransportFailure(detail),
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> Error {
        let mut err = Error::new(self.to_string());
        err = err.extend_with(|_err, e| {
            e.set("code", self.code());
        });
        match self {
            ApiError::InvalidInput(_) => {
                err = err.extend_with(|_err, e| {
                    e.set("type", "BAD_REQUEST");
                });
            }
            ApiError::ValidationFailed { fields, .. } if !fields.is_empty() => {
                let detail: Vec<Value> = fields
                    .iter()
                    .map(|(field, message)| {
                        Value::List(vec![Value::from(field.as_str()), Value::from(message.as_str())])
                    })
                    .collect();
                err = err.extend_with(|_err, e| {
                    e.set("fields", Value::List(detail));
                });
            }
            ApiError::TransportFailure(detail) => {
                tracing::warn!(%detail, "directory backend failure surfaced to client");
            }
            _ => {}
        }
        err
    }
}

/// Convert a directory failure into a GraphQL error payload.
pub fn directory_error(err: HrError) -> Error {
    ApiError::from(err).extend()
}

/// Convert any error into a GraphQL error payload while hiding internals.
pub fn internal_error(err: impl Into<anyhow::Error>) -> Error {
    let err = err.into();
    tracing::error!(error = %err, "internal error");
    ApiError::internal(err).extend()
}
