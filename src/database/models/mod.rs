pub mod job;

pub use job::{job_fields, APPLICANT_COUNTER, JOB_FIELDS};

use serde_json::Value;

use crate::database::store::Document;

/// A request body that cannot be stored as a document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Accept any JSON object as a document body; reject arrays and scalars.
pub fn require_object(body: Value) -> Result<Document, ValidationError> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(ValidationError::new(format!(
            "Request body must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
