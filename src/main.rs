use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

mod client;
mod config;
mod db;
mod llm;
mod query;
mod util;
mod web;

use crate::client::ApiClient;
use crate::config::{AppConfig, CliArgs, Command, EnvOverrides};
use crate::db::schema_registry::SchemaRegistry;
use crate::llm::LlmManager;
use crate::query::QueryService;
use crate::query::models::GenerationRequest;
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A local .env may supply OPENAI_API_KEY and friends
    dotenv::dotenv().ok();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Initialize logging
    init_tracing(args.log_json);

    match AppConfig::command(&args) {
        Command::Serve => {
            let config = match AppConfig::new(&args) {
                Ok(config) => config,
                Err(e) => {
                    error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            };
            serve(config).await
        }
        Command::Ask {
            database,
            context,
            execute,
            api_url,
            question,
        } => {
            // Configuration is only consulted when no --api-url was given
            let base_url =
                match AppConfig::api_base_url(&args, api_url.as_deref(), &EnvOverrides::from_env()) {
                    Ok(url) => url,
                    Err(e) => {
                        error!("Failed to load configuration: {}", e);
                        return Err(e.into());
                    }
                };
            let client = ApiClient::new(&base_url)?;
            let request = GenerationRequest {
                question,
                database,
                context,
            };

            if let Err(e) = client::ask(&client, request, execute).await {
                error!("{}", e);
                return Err(e.into());
            }
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = Arc::new(SchemaRegistry::builtin());
    if registry.is_empty() {
        warn!("No databases registered; every generation request will fail");
    }
    info!("Loaded schemas for databases: {:?}", registry.list_names());

    // One completion client for the whole process
    info!("Initializing LLM client with model: {}", config.llm.model);
    let llm_manager = match LlmManager::new(&config.llm) {
        Ok(manager) => Arc::new(manager),
        Err(e) => {
            error!("Failed to initialize LLM client: {}", e);
            return Err(e.into());
        }
    };

    let query = QueryService::new(registry, llm_manager);
    let app_state = Arc::new(AppState::new(query));

    // Start the web server
    info!("Starting Text2SQL server on {}:{}", config.web.host, config.web.port);
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
