use clap::{Parser, Subcommand};
use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::llm::providers::openai::DEFAULT_API_URL;

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub web: WebConfig,
    pub llm: LlmConfig,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP API and web UI (default)
    Serve,
    /// Ask a running server to turn a question into SQL
    Ask {
        /// Target database
        #[arg(short, long)]
        database: String,

        /// Additional context for the model
        #[arg(long)]
        context: Option<String>,

        /// Run the generated query through the execute endpoint
        #[arg(long)]
        execute: bool,

        /// Base URL of the server (defaults to the configured host and port)
        #[arg(long)]
        api_url: Option<String>,

        /// Natural language question
        question: String,
    },
}

/// Values taken from the process environment, layered above the
/// configuration file and below command line flags.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub api_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            api_key: var("OPENAI_API_KEY"),
            model: var("OPENAI_CHAT_MODEL"),
            api_url: var("OPENAI_API_URL"),
            host: var("API_HOST"),
            port: var("API_PORT"),
        }
    }
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        Self::load(args, &EnvOverrides::from_env())
    }

    pub fn load(args: &CliArgs, env: &EnvOverrides) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let mut config_builder = Config::builder()
            .set_default("web.host", defaults.web.host)?
            .set_default("web.port", i64::from(defaults.web.port))?
            .set_default("llm.model", defaults.llm.model)?
            .set_default("llm.api_url", defaults.llm.api_url)?
            .set_default("llm.timeout_secs", defaults.llm.timeout_secs as i64)?;

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            let default_locations = [
                "config.toml",
                "config/config.toml",
                "/etc/text2sql/config.toml",
            ];

            if let Some(location) = default_locations.iter().find(|l| Path::new(l).exists()) {
                config_builder =
                    config_builder.add_source(File::new(location, config::FileFormat::Toml));
            }
        }

        config_builder = config_builder
            .set_override_option("llm.api_key", env.api_key.clone())?
            .set_override_option("llm.model", env.model.clone())?
            .set_override_option("llm.api_url", env.api_url.clone())?
            .set_override_option("web.host", env.host.clone())?
            .set_override_option("web.port", env.port.clone())?;

        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        // Override with command line args if provided
        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }

        Ok(config)
    }

    /// Base URL for client commands. An explicit `--api-url` wins and no
    /// configuration is read; otherwise the configured bind address is used.
    pub fn api_base_url(
        args: &CliArgs,
        api_url: Option<&str>,
        env: &EnvOverrides,
    ) -> Result<String, ConfigError> {
        if let Some(url) = api_url {
            return Ok(url.to_string());
        }
        let config = Self::load(args, env)?;
        Ok(format!("http://{}:{}", config.web.host, config.web.port))
    }

    pub fn command(args: &CliArgs) -> Command {
        args.command.clone().unwrap_or(Command::Serve)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            llm: LlmConfig::default(),
        }
    }
}
