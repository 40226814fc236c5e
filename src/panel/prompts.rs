//! Prompt text for the panel stages.

use crate::models::ProductQuery;

/// System prompt for the extraction step.
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a language parser.";

pub fn extraction_prompt(message: &str) -> String {
    format!(
        "Given this message: {}. Extract price and product description information",
        message
    )
}

pub fn persona_prompt(query: &ProductQuery) -> String {
    format!(
        "Tell me the probability of you buying this item: {}, given the price is {}. \
         Also, remember to provide reasons for your decision.",
        query.product_description, query.price
    )
}

pub fn summary_system_prompt(persona_count: usize) -> String {
    format!(
        "You are a professional market research presenter. Consolidate results from {} \
         personas into a professional summary and recommendation.",
        persona_count
    )
}

/// User prompt embedding the persona results as a JSON array.
pub fn summary_prompt(results_json: &str) -> String {
    format!("Persona Data: {}", results_json)
}
