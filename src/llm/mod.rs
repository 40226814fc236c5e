//! Structured-completion clients.
//!
//! The panel only ever talks to a language model through
//! [`CompletionClient`], so tests can swap in a scripted stub.

pub mod client;
pub mod ollama;

#[cfg(test)]
pub mod testing;

pub use client::{structured, CompletionClient, CompletionRequest, StructuredOutput};
pub use ollama::{OllamaClient, OllamaConfig};
