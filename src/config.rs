//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.persona-panel.toml` files.

use crate::panel::{default_personas, Persona};
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".persona-panel.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Agent node identity.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Panel members, in the order their results are reported.
    #[serde(default = "default_personas")]
    pub personas: Vec<Persona>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            model: ModelConfig::default(),
            pipeline: PipelineConfig::default(),
            server: ServerConfig::default(),
            personas: default_personas(),
        }
    }
}

/// Agent node identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Node id used in execute URLs (`<node_id>.<task>`).
    #[serde(default = "default_node_id")]
    pub node_id: String,

    /// Version reported by the health endpoint.
    #[serde(default = "default_version")]
    pub version: String,

    /// Prefix prepended to every task name.
    #[serde(default = "default_router_prefix")]
    pub router_prefix: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            version: default_version(),
            router_prefix: default_router_prefix(),
        }
    }
}

fn default_node_id() -> String {
    "my-agent".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_router_prefix() -> String {
    "demo".to_string()
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: Option<usize>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Environment variable holding an optional bearer API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            ollama_url: default_ollama_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> Option<usize> {
    Some(4096)
}

fn default_timeout() -> u64 {
    120
}

fn default_api_key_env() -> String {
    "PERSONA_PANEL_API_KEY".to_string()
}

impl ModelConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Per-persona time limit in seconds. 0 disables the limit.
    #[serde(default = "default_worker_timeout")]
    pub worker_timeout_seconds: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_timeout_seconds: default_worker_timeout(),
        }
    }
}

/// Kept below the model request timeout so a slow persona surfaces as a
/// task timeout rather than an upstream error.
fn default_worker_timeout() -> u64 {
    100
}

impl PipelineConfig {
    pub fn worker_timeout(&self) -> Option<Duration> {
        match self.worker_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Try the following ports when the configured one is taken.
    #[serde(default = "default_true")]
    pub auto_port: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auto_port: true,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.personas.is_empty(), "At least one persona is required");

        let mut seen = HashSet::new();
        for persona in &self.personas {
            ensure!(!persona.id.trim().is_empty(), "Persona id must not be empty");
            ensure!(
                seen.insert(persona.id.as_str()),
                "Duplicate persona id: {}",
                persona.id
            );
        }

        ensure!(
            !self.agent.node_id.contains('.'),
            "Node id must not contain '.': {}",
            self.agent.node_id
        );
        ensure!(self.model.timeout_seconds > 0, "Model timeout must be at least 1 second");

        let worker = self.pipeline.worker_timeout_seconds;
        if worker != 0 && worker >= self.model.timeout_seconds {
            warn!(
                "Worker timeout ({}s) is not below the model timeout ({}s); slow personas will fail as upstream errors",
                worker, self.model.timeout_seconds
            );
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values explicitly provided on the command line override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.ollama_url {
            self.model.ollama_url = url.clone();
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(worker_timeout) = args.worker_timeout {
            self.pipeline.worker_timeout_seconds = worker_timeout;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> Result<String> {
        let config = Config::default();
        toml::to_string_pretty(&config).context("Failed to serialize default config")
    }
}
