//! Error taxonomy for reasoner tasks.
//!
//! Every stage of a task (extraction, persona calls, aggregation) returns
//! [`TaskError`]. Nothing is recovered locally; the error travels up to the
//! CLI or HTTP layer, which decides how to present it.

use thiserror::Error;

/// Result type for reasoner tasks.
pub type TaskResult<T> = std::result::Result<T, TaskError>;

/// Failure of a reasoner task.
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    /// Caller-supplied input is missing fields or violates a constraint.
    #[error("Invalid input: {0}")]
    Input(String),

    /// A completion came back but did not match the declared shape.
    #[error("Response did not match schema {schema}: {message}")]
    SchemaValidation { schema: String, message: String },

    /// The completion service was unreachable or failed at transport level.
    #[error("Upstream call failed: {0}")]
    UpstreamCall(String),

    /// A single task exceeded its time budget.
    #[error("Task {task} timed out after {seconds}s")]
    Timeout { task: String, seconds: u64 },

    /// No task is registered under the requested name.
    #[error("Unknown task: {0}")]
    UnknownTask(String),
}

impl TaskError {
    /// Shorthand for a schema validation failure.
    pub fn schema(schema: impl Into<String>, message: impl Into<String>) -> Self {
        TaskError::SchemaValidation {
            schema: schema.into(),
            message: message.into(),
        }
    }

    /// Stable snake_case label, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::Input(_) => "input_error",
            TaskError::SchemaValidation { .. } => "schema_validation_error",
            TaskError::UpstreamCall(_) => "upstream_call_error",
            TaskError::Timeout { .. } => "timeout",
            TaskError::UnknownTask(_) => "unknown_task",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(TaskError::Input("x".into()).kind(), "input_error");
        assert_eq!(TaskError::schema("S", "bad").kind(), "schema_validation_error");
        assert_eq!(TaskError::UpstreamCall("down".into()).kind(), "upstream_call_error");
        assert_eq!(
            TaskError::Timeout {
                task: "t".into(),
                seconds: 3
            }
            .kind(),
            "timeout"
        );
        assert_eq!(TaskError::UnknownTask("nope".into()).kind(), "unknown_task");
    }

    #[test]
    fn test_error_display() {
        let err = TaskError::schema("PurchaseIntent", "probability out of range");
        assert_eq!(
            err.to_string(),
            "Response did not match schema PurchaseIntent: probability out of range"
        );

        let err = TaskError::Timeout {
            task: "persona_retiree".into(),
            seconds: 30,
        };
        assert_eq!(err.to_string(), "Task persona_retiree timed out after 30s");
    }
}
