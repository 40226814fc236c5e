//! Completion client trait and the typed structured-call helper.

use crate::error::{TaskError, TaskResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// A single structured-completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction (persona, role).
    pub system: String,
    /// User instruction.
    pub user: String,
    /// Name of the expected output type, used in error messages.
    pub schema_name: &'static str,
    /// JSON schema the reply must conform to.
    pub schema: Value,
}

/// A service that answers prompts with a JSON value shaped by a schema.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Issue one completion call.
    ///
    /// Transport failures map to [`TaskError::UpstreamCall`]; replies that
    /// are not JSON at all map to [`TaskError::SchemaValidation`].
    async fn complete(&self, request: CompletionRequest) -> TaskResult<Value>;
}

/// A type that can be requested as structured output.
pub trait StructuredOutput: DeserializeOwned + JsonSchema {
    /// Name reported in validation errors.
    const NAME: &'static str;

    /// Constraints that the JSON schema alone cannot enforce on decode.
    fn validate(&self) -> Result<(), String>;
}

/// Ask `client` for a `T`, then decode and validate the reply.
pub async fn structured<T: StructuredOutput>(
    client: &dyn CompletionClient,
    system: impl Into<String>,
    user: impl Into<String>,
) -> TaskResult<T> {
    let schema = serde_json::to_value(schemars::schema_for!(T))
        .map_err(|e| TaskError::schema(T::NAME, e.to_string()))?;

    let request = CompletionRequest {
        system: system.into(),
        user: user.into(),
        schema_name: T::NAME,
        schema,
    };

    debug!("Requesting structured completion for {}", T::NAME);
    let value = client.complete(request).await?;

    let parsed: T =
        serde_json::from_value(value).map_err(|e| TaskError::schema(T::NAME, e.to_string()))?;
    parsed
        .validate()
        .map_err(|message| TaskError::schema(T::NAME, message))?;

    Ok(parsed)
}

/// Parse model output as JSON, tolerating a surrounding markdown fence.
pub fn parse_json_content(schema_name: &str, content: &str) -> TaskResult<Value> {
    let trimmed = content.trim();

    let body = match trimmed.strip_prefix("```") {
        Some(rest) => {
            // Drop the language tag line, then the closing fence
            let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
            rest.trim_end().trim_end_matches("```")
        }
        None => trimmed,
    };

    serde_json::from_str(body.trim()).map_err(|e| {
        TaskError::schema(
            schema_name,
            format!("reply is not valid JSON ({}): {}", e, truncate(trimmed, 200)),
        )
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
