//! Data models for the persona panel.
//!
//! This module contains the input and output records of every reasoner
//! task, plus the validation rules applied to structured LLM output.

use crate::llm::StructuredOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw request carrying an unstructured message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageInput {
    /// Free-text message from the caller.
    pub message: String,
}

/// Output of the echo task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoOutput {
    pub original: String,
    pub echoed: String,
    /// Number of characters (not bytes) in the message.
    pub length: usize,
}

impl EchoOutput {
    /// Echo a message back.
    pub fn from_message(message: &str) -> Self {
        Self {
            original: message.to_string(),
            echoed: message.to_string(),
            length: message.chars().count(),
        }
    }
}

/// Product description and price extracted from a free-text message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProductExtraction {
    /// Product description based on user input
    pub product_description: String,
    /// Price of item based on user input
    #[schemars(range(min = 0.0))]
    pub price: f64,
}

impl StructuredOutput for ProductExtraction {
    const NAME: &'static str = "ProductExtraction";

    fn validate(&self) -> Result<(), String> {
        check_price(self.price)
    }
}

impl From<ProductExtraction> for ProductQuery {
    fn from(extraction: ProductExtraction) -> Self {
        Self {
            product_description: extraction.product_description,
            price: extraction.price,
        }
    }
}

/// Input shared by every persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductQuery {
    pub product_description: String,
    pub price: f64,
}

impl ProductQuery {
    /// Check caller-supplied values before any completion call is made.
    pub fn validate(&self) -> Result<(), String> {
        check_price(self.price)
    }
}

/// One persona's answer about buying the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PurchaseIntent {
    /// Probability of persona buying this item
    #[schemars(range(min = 0.0, max = 1.0))]
    pub probability: f64,
    /// Explanation of why this is the case
    pub reasoning: String,
}

impl StructuredOutput for PurchaseIntent {
    const NAME: &'static str = "PurchaseIntent";

    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(format!(
                "probability must be within [0.0, 1.0], got {}",
                self.probability
            ));
        }
        Ok(())
    }
}

impl fmt::Display for PurchaseIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (probability: {})", self.reasoning, self.probability)
    }
}

/// Consolidated result of a persona panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResearchSummary {
    /// Summary of the market research result from every persona
    pub summary: String,
}

impl StructuredOutput for ResearchSummary {
    const NAME: &'static str = "ResearchSummary";

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Probability statistics over a completed panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl PanelStats {
    /// Returns `None` for an empty panel.
    pub fn from_intents(intents: &[PurchaseIntent]) -> Option<Self> {
        if intents.is_empty() {
            return None;
        }

        let mut min = f64::MAX;
        let mut max = f64::MIN;
        let mut total = 0.0;

        for intent in intents {
            min = min.min(intent.probability);
            max = max.max(intent.probability);
            total += intent.probability;
        }

        Some(Self {
            mean: total / intents.len() as f64,
            min,
            max,
        })
    }
}

fn check_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price < 0.0 {
        return Err(format!("price must be a non-negative number, got {}", price));
    }
    Ok(())
}
