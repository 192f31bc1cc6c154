pub mod prompt;
pub mod providers;

use crate::config::LlmConfig;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use tracing::{debug, info};

/// Fixed confidence reported for every generated query. The model gives no
/// calibrated certainty, so this number does not measure anything.
pub const PLACEHOLDER_CONFIDENCE: f64 = 0.9;

#[derive(Debug)]
pub enum LlmError {
    ConnectionError(String),
    ResponseError(String),
    ConfigError(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ConnectionError(msg) => write!(f, "LLM connection error: {}", msg),
            LlmError::ResponseError(msg) => write!(f, "LLM response error: {}", msg),
            LlmError::ConfigError(msg) => write!(f, "LLM configuration error: {}", msg),
        }
    }
}

impl Error for LlmError {}

/// One chat-completion round trip: a system prompt and a user message in,
/// the model's raw reply out.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSql {
    pub sql: String,
    pub explanation: String,
    pub confidence: f64,
}

/// Owns the single completion client used for the lifetime of the process.
pub struct LlmManager {
    generator: Box<dyn SqlGenerator>,
    model: String,
}

impl LlmManager {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let provider = providers::openai::OpenAiProvider::new(config)?;
        Ok(Self::with_generator(Box::new(provider), config.model.clone()))
    }

    pub fn with_generator(generator: Box<dyn SqlGenerator>, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_sql(
        &self,
        question: &str,
        database: &str,
        schema: &str,
        context: Option<&str>,
    ) -> Result<GeneratedSql, LlmError> {
        let system_prompt = prompt::system_prompt(database, schema);
        let user_message = prompt::user_message(question, context);
        debug!("System prompt for {}: {}", database, system_prompt);
        debug!("User message: {}", user_message);

        info!("Requesting SQL from model {}", self.model);
        let content = self.generator.complete(&system_prompt, &user_message).await?;
        debug!("Raw completion: {}", content);

        let sql = prompt::extract_sql(&content);
        if sql.is_empty() {
            return Err(LlmError::ResponseError(
                "Model returned an empty response".to_string(),
            ));
        }

        Ok(GeneratedSql {
            sql,
            explanation: prompt::explanation(question, database),
            confidence: PLACEHOLDER_CONFIDENCE,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Replies with a fixed completion and records the prompts it was given.
    pub struct FixedReply {
        reply: String,
        pub seen: Mutex<Vec<(String, String)>>,
    }

    impl FixedReply {
        pub fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SqlGenerator for FixedReply {
        async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError> {
            self.seen
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_message.to_string()));
            Ok(self.reply.clone())
        }
    }

    /// Fails every call the way an unreachable endpoint would.
    pub struct Unreachable;

    #[async_trait]
    impl SqlGenerator for Unreachable {
        async fn complete(&self, _: &str, _: &str) -> Result<String, LlmError> {
            Err(LlmError::ConnectionError("connection refused".to_string()))
        }
    }
}
