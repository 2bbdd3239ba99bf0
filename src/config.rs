//! Environment-driven configuration, loaded once at process start.

use crate::error::{Result, ZaxError};

/// Runtime configuration for the assistant.
///
/// Constructed once from the environment and passed by reference into the
/// components that need it. There are no process-wide singletons.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,
    /// Schema the assistant answers questions about.
    pub db_schema: String,
    /// API key for the chat-completions endpoint.
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Model identifier sent with every completion request.
    pub model: String,
    /// Bound on execution attempts in the correction loop.
    pub max_retries: u32,
    /// Run the LLM review pass over generated SQL before executing it.
    pub check_generated_sql: bool,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// `DATABASE_URL` and `LLM_API_KEY` are required; everything else has a
    /// default. Call `dotenv::dotenv().ok()` before this if a `.env` file
    /// should be honored.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ZaxError::Config("DATABASE_URL not set in environment".to_string()))?;

        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| ZaxError::Config("LLM_API_KEY not set in environment".to_string()))?;

        let base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let model =
            std::env::var("LLM_MODEL").unwrap_or_else(|_| "llama3-70b-8192".to_string());

        let db_schema = std::env::var("DB_SCHEMA").unwrap_or_else(|_| "info".to_string());

        let max_retries = match std::env::var("MAX_RETRIES") {
            Ok(v) => v
                .parse::<u32>()
                .map_err(|_| ZaxError::Config(format!("MAX_RETRIES is not a number: {}", v)))?,
            Err(_) => 3,
        };
        if max_retries < 1 {
            return Err(ZaxError::Config("MAX_RETRIES must be at least 1".to_string()));
        }

        let check_generated_sql = std::env::var("CHECK_GENERATED_SQL")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        Ok(Self {
            database_url,
            db_schema,
            api_key,
            base_url,
            model,
            max_retries,
            check_generated_sql,
        })
    }
}
