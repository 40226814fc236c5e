//! Built-in reasoners: echo, the panel entrypoint and the persona tasks.

use super::{parse_input, to_output, Reasoner};
use crate::error::{TaskError, TaskResult};
use crate::models::{EchoOutput, MessageInput, ProductQuery};
use crate::panel::PersonaPanel;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Returns the message unchanged along with its character count.
pub struct EchoReasoner;

#[async_trait]
impl Reasoner for EchoReasoner {
    fn name(&self) -> String {
        "echo".to_string()
    }

    fn description(&self) -> String {
        "Echo a message back with its length (no AI)".to_string()
    }

    async fn call(&self, input: Value) -> TaskResult<Value> {
        let input: MessageInput = parse_input(input)?;
        to_output(&EchoOutput::from_message(&input.message))
    }
}

/// Full market-research pipeline on a free-text message.
pub struct EntrypointReasoner {
    panel: Arc<PersonaPanel>,
}

impl EntrypointReasoner {
    pub fn new(panel: Arc<PersonaPanel>) -> Self {
        Self { panel }
    }
}

#[async_trait]
impl Reasoner for EntrypointReasoner {
    fn name(&self) -> String {
        "entrypoint".to_string()
    }

    fn description(&self) -> String {
        format!(
            "Extract product and price, consult {} personas, summarize",
            self.panel.personas().len()
        )
    }

    async fn call(&self, input: Value) -> TaskResult<Value> {
        let input: MessageInput = parse_input(input)?;
        let summary = self.panel.run(&input.message).await?;
        to_output(&summary)
    }
}

/// A single persona, callable on its own.
pub struct PersonaReasoner {
    panel: Arc<PersonaPanel>,
    index: usize,
}

impl PersonaReasoner {
    /// `index` must be a valid position in the panel's persona list.
    pub fn new(panel: Arc<PersonaPanel>, index: usize) -> Self {
        Self { panel, index }
    }
}

#[async_trait]
impl Reasoner for PersonaReasoner {
    fn name(&self) -> String {
        format!("persona_{}", self.panel.personas()[self.index].id)
    }

    fn description(&self) -> String {
        format!(
            "Purchase probability from persona: {}",
            self.panel.personas()[self.index].name
        )
    }

    async fn call(&self, input: Value) -> TaskResult<Value> {
        let query: ProductQuery = parse_input(input)?;
        query.validate().map_err(TaskError::Input)?;

        let persona = &self.panel.personas()[self.index];
        let intent = self.panel.consult(persona, &query).await?;
        to_output(&intent)
    }
}
