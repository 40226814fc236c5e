//! Persona panel market research.
//!
//! The pipeline runs in three stages:
//! 1. extract a product description and price from the raw message,
//! 2. ask every persona concurrently how likely they are to buy it,
//! 3. consolidate all answers into one summary.
//!
//! Any error aborts the run. Persona calls are fail-fast: one failed
//! persona cancels the others and no summary is produced.

pub mod fanout;
pub mod persona;
pub mod prompts;

pub use fanout::fan_out;
pub use persona::{default_personas, Persona};

use crate::error::{TaskError, TaskResult};
use crate::llm::{structured, CompletionClient, StructuredOutput};
use crate::models::{PanelStats, ProductExtraction, ProductQuery, PurchaseIntent, ResearchSummary};
use crate::notes::{Note, NoteSink};
use anyhow::{ensure, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Runs persona panels against an injected completion client.
pub struct PersonaPanel {
    client: Arc<dyn CompletionClient>,
    notes: Arc<dyn NoteSink>,
    personas: Vec<Persona>,
    worker_timeout: Option<Duration>,
}

impl PersonaPanel {
    /// Create a panel. At least one persona is required.
    pub fn new(
        client: Arc<dyn CompletionClient>,
        notes: Arc<dyn NoteSink>,
        personas: Vec<Persona>,
    ) -> Result<Self> {
        ensure!(!personas.is_empty(), "A persona panel needs at least one persona");

        Ok(Self {
            client,
            notes,
            personas,
            worker_timeout: None,
        })
    }

    /// Bound every persona call. `None` disables the limit.
    pub fn with_worker_timeout(mut self, limit: Option<Duration>) -> Self {
        self.worker_timeout = limit;
        self
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    /// Run the full pipeline on a free-text message.
    pub async fn run(&self, message: &str) -> TaskResult<ResearchSummary> {
        if message.trim().is_empty() {
            return Err(TaskError::Input("message must not be empty".to_string()));
        }

        info!("Parsing input");
        let query: ProductQuery = self.extract(message).await?.into();

        info!("Running {} personas in parallel", self.personas.len());
        let intents = self.survey(&query).await?;

        info!("Generating final summary");
        self.summarize(&intents).await
    }

    /// Extract description and price from the message.
    pub async fn extract(&self, message: &str) -> TaskResult<ProductExtraction> {
        let extraction: ProductExtraction = structured(
            self.client.as_ref(),
            prompts::EXTRACTION_SYSTEM_PROMPT,
            prompts::extraction_prompt(message),
        )
        .await?;

        debug!(
            "Extracted '{}' at {}",
            extraction.product_description, extraction.price
        );
        Ok(extraction)
    }

    /// Ask one persona about the product. Emits one note on success.
    pub async fn consult(&self, persona: &Persona, query: &ProductQuery) -> TaskResult<PurchaseIntent> {
        let intent: PurchaseIntent = structured(
            self.client.as_ref(),
            persona.instruction.as_str(),
            prompts::persona_prompt(query),
        )
        .await?;

        self.notes.note(Note::new(
            format!("{}: {}", persona.name, intent),
            [persona.tag(), "sentiment".to_string()],
        ));

        Ok(intent)
    }

    /// Ask every persona concurrently. Results follow persona order.
    pub async fn survey(&self, query: &ProductQuery) -> TaskResult<Vec<PurchaseIntent>> {
        fan_out(&self.personas, self.worker_timeout, |persona| {
            self.consult(persona, query)
        })
        .await
    }

    /// Consolidate all persona answers into one summary.
    pub async fn summarize(&self, intents: &[PurchaseIntent]) -> TaskResult<ResearchSummary> {
        if let Some(stats) = PanelStats::from_intents(intents) {
            debug!(
                "Panel probability mean {:.2} (min {:.2}, max {:.2})",
                stats.mean, stats.min, stats.max
            );
        }

        let results_json = serde_json::to_string(intents)
            .map_err(|e| TaskError::schema(ResearchSummary::NAME, e.to_string()))?;

        structured(
            self.client.as_ref(),
            prompts::summary_system_prompt(intents.len()),
            prompts::summary_prompt(&results_json),
        )
        .await
    }
}
