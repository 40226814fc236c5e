//! Named reasoner tasks and the registry that dispatches to them.
//!
//! Tasks are plain functions from a JSON input record to a JSON output
//! record. The registry is built once at startup and is read-only after.

pub mod builtin;

pub use builtin::{EchoReasoner, EntrypointReasoner, PersonaReasoner};

use crate::error::{TaskError, TaskResult};
use crate::panel::PersonaPanel;
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A named task reachable through the registry.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Unprefixed task name, e.g. `echo`.
    fn name(&self) -> String;

    /// One-line description shown by `list` and `/api/v1/reasoners`.
    fn description(&self) -> String;

    async fn call(&self, input: Value) -> TaskResult<Value>;
}

/// Listing entry for a registered task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonerInfo {
    pub name: String,
    pub description: String,
}

/// Fixed table of tasks keyed by prefixed name.
pub struct Registry {
    prefix: String,
    reasoners: BTreeMap<String, Arc<dyn Reasoner>>,
}

impl Registry {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            reasoners: BTreeMap::new(),
        }
    }

    /// Full name a task is registered under.
    pub fn qualified_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}_{}", self.prefix, name)
        }
    }

    /// Add a task. Names must be unique.
    pub fn register(&mut self, reasoner: Arc<dyn Reasoner>) -> Result<()> {
        let name = self.qualified_name(&reasoner.name());
        if self.reasoners.contains_key(&name) {
            bail!("Reasoner already registered: {}", name);
        }

        debug!("Registered reasoner {}", name);
        self.reasoners.insert(name, reasoner);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Reasoner>> {
        self.reasoners.get(name)
    }

    pub fn len(&self) -> usize {
        self.reasoners.len()
    }

    /// Registered tasks, sorted by name.
    pub fn list(&self) -> Vec<ReasonerInfo> {
        self.reasoners
            .iter()
            .map(|(name, reasoner)| ReasonerInfo {
                name: name.clone(),
                description: reasoner.description(),
            })
            .collect()
    }

    /// Run the task registered under `name`.
    pub async fn dispatch(&self, name: &str, input: Value) -> TaskResult<Value> {
        let reasoner = self
            .get(name)
            .ok_or_else(|| TaskError::UnknownTask(name.to_string()))?;

        info!("Executing {}", name);
        reasoner.call(input).await
    }
}

/// Build the registry holding echo, the panel entrypoint and one task per
/// persona.
pub fn build_registry(prefix: &str, panel: Arc<PersonaPanel>) -> Result<Registry> {
    let mut registry = Registry::new(prefix);

    registry.register(Arc::new(EchoReasoner))?;
    registry.register(Arc::new(EntrypointReasoner::new(panel.clone())))?;

    for index in 0..panel.personas().len() {
        registry.register(Arc::new(PersonaReasoner::new(panel.clone(), index)))?;
    }

    info!("Registered {} reasoners", registry.len());
    Ok(registry)
}

/// Decode a task input record, mapping failures to [`TaskError::Input`].
pub fn parse_input<T: DeserializeOwned>(input: Value) -> TaskResult<T> {
    serde_json::from_value(input).map_err(|e| TaskError::Input(e.to_string()))
}

/// Encode a task output record.
pub fn to_output<T: Serialize>(output: &T) -> TaskResult<Value> {
    serde_json::to_value(output).map_err(|e| TaskError::Input(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedClient;
    use crate::notes::TracingNotes;
    use crate::panel::default_personas;
    use serde_json::json;

    fn test_panel() -> Arc<PersonaPanel> {
        let client = ScriptedClient::new(|_| Ok(json!({"probability": 0.5, "reasoning": "ok"})));
        Arc::new(
            PersonaPanel::new(Arc::new(client), Arc::new(TracingNotes), default_personas())
                .unwrap(),
        )
    }

    #[test]
    fn test_registry_names() {
        let registry = build_registry("demo", test_panel()).unwrap();
        assert_eq!(registry.len(), 7);

        let names: Vec<String> = registry.list().into_iter().map(|r| r.name).collect();
        assert!(names.contains(&"demo_echo".to_string()));
        assert!(names.contains(&"demo_entrypoint".to_string()));
        assert!(names.contains(&"demo_persona_retiree".to_string()));

        // Sorted for stable listings
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_empty_prefix() {
        let registry = Registry::new("");
        assert_eq!(registry.qualified_name("echo"), "echo");
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = Registry::new("demo");
        registry.register(Arc::new(EchoReasoner)).unwrap();
        assert!(registry.register(Arc::new(EchoReasoner)).is_err());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_task() {
        let registry = build_registry("demo", test_panel()).unwrap();
        let err = registry.dispatch("demo_missing", json!({})).await.unwrap_err();
        assert!(matches!(err, TaskError::UnknownTask(ref name) if name == "demo_missing"));
    }

    #[tokio::test]
    async fn test_dispatch_echo() {
        let registry = build_registry("demo", test_panel()).unwrap();
        let output = registry
            .dispatch("demo_echo", json!({"message": "Hello World"}))
            .await
            .unwrap();
        assert_eq!(
            output,
            json!({"original": "Hello World", "echoed": "Hello World", "length": 11})
        );
    }
}
