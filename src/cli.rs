//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Persona Panel - LLM persona panels for quick market research
///
/// Registers a handful of reasoner tasks (echo, a persona-panel pipeline,
/// one task per persona) and runs them from the command line or over HTTP.
///
/// Examples:
///   persona-panel list
///   persona-panel run demo_echo --message "Hello World"
///   persona-panel run demo_entrypoint --message "Wireless earbuds for $45" --show-notes
///   persona-panel serve --port 8000
///   persona-panel init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .persona-panel.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Model to use (overrides config)
    #[arg(short, long, global = true, env = "PERSONA_PANEL_MODEL")]
    pub model: Option<String>,

    /// Ollama API endpoint URL (overrides config)
    #[arg(long, global = true, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Temperature for LLM responses (0.0 - 2.0)
    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds for each LLM call
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Time limit in seconds for each persona (0 disables)
    #[arg(long, global = true, value_name = "SECS")]
    pub worker_timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List registered reasoner tasks
    List,

    /// Run a single task and print its JSON output
    Run {
        /// Task name, e.g. demo_entrypoint
        task: String,

        /// Task input as a JSON object
        #[arg(short, long, value_name = "JSON", conflicts_with = "message")]
        input: Option<String>,

        /// Shorthand for --input '{"message": "..."}'
        #[arg(long, value_name = "TEXT")]
        message: Option<String>,

        /// Also write the result to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print the notes emitted during the run
        #[arg(long)]
        show_notes: bool,
    },

    /// Serve tasks over HTTP
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Fail instead of trying the next port when the port is taken
        #[arg(long)]
        no_auto_port: bool,
    },

    /// Generate a default .persona-panel.toml configuration file
    InitConfig,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 2.0".to_string());
            }
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Command::Run { input, message, .. } = &self.command {
            if input.is_none() && message.is_none() {
                return Err("Provide task input with --input or --message".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(command: Command) -> Args {
        Args {
            command,
            config: None,
            model: None,
            ollama_url: None,
            temperature: None,
            timeout: None,
            worker_timeout: None,
            verbose: false,
            quiet: false,
        }
    }

    fn run_command() -> Command {
        Command::Run {
            task: "demo_echo".to_string(),
            input: None,
            message: Some("hi".to_string()),
            output: None,
            show_notes: false,
        }
    }

    #[test]
    fn test_parse_run() {
        let args = Args::try_parse_from([
            "persona-panel",
            "run",
            "demo_entrypoint",
            "--message",
            "Wireless earbuds for $45",
            "--show-notes",
        ])
        .unwrap();

        match args.command {
            Command::Run {
                task,
                message,
                show_notes,
                ..
            } => {
                assert_eq!(task, "demo_entrypoint");
                assert_eq!(message.as_deref(), Some("Wireless earbuds for $45"));
                assert!(show_notes);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve() {
        let args =
            Args::try_parse_from(["persona-panel", "serve", "--no-auto-port", "--port", "9000"])
                .unwrap();
        assert_eq!(
            args.command,
            Command::Serve {
                host: None,
                port: Some(9000),
                no_auto_port: true,
            }
        );

        // Auto-port stays on unless disabled
        let args = Args::try_parse_from(["persona-panel", "serve"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Serve {
                no_auto_port: false,
                ..
            }
        ));

        assert!(Args::try_parse_from(["persona-panel", "serve", "--auto-port"]).is_err());
    }

    #[test]
    fn test_input_and_message_conflict() {
        let result = Args::try_parse_from([
            "persona-panel",
            "run",
            "demo_echo",
            "--input",
            "{}",
            "--message",
            "hi",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_requires_run_input() {
        let args = make_args(Command::Run {
            task: "demo_echo".to_string(),
            input: None,
            message: None,
            output: None,
            show_notes: false,
        });
        assert!(args.validate().is_err());
        assert!(make_args(run_command()).validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args(Command::List);
        args.ollama_url = Some("localhost:11434".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_temperature_and_timeout() {
        let mut args = make_args(Command::List);
        args.temperature = Some(2.5);
        assert!(args.validate().is_err());

        args.temperature = Some(0.7);
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args(Command::List);
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(Command::List);
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
