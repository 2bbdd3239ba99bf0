//! LLM collaborator client for an OpenAI-compatible chat-completions API.

use crate::config::Config;
use crate::error::{Result, ZaxError};
use crate::execution_loop::SqlCorrector;
use crate::prompts;
use async_trait::async_trait;

/// The language-model calls the assistant depends on. Each returns plain
/// text; SQL-producing calls return a bare statement with markup stripped.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Draft a SQL statement from the schema context and the question.
    async fn generate_sql(&self, schema_context: &str, question: &str) -> Result<String>;

    /// Review a generated statement for common mistakes; returns the fixed
    /// statement or the input unchanged.
    async fn review_sql(&self, sql: &str) -> Result<String>;

    /// Correct a failing statement given the database's error text.
    async fn correct_sql(&self, sql: &str, db_error: &str, question: &str) -> Result<String>;

    /// Turn a successful result payload into a user-facing answer.
    async fn format_answer(&self, question: &str, db_result: &str) -> Result<String>;
}

// Anything that can correct SQL for the assistant can serve as the
// execution loop's corrector.
#[async_trait]
impl<T: LanguageModel + ?Sized> SqlCorrector for T {
    async fn correct_sql(&self, sql: &str, db_error: &str, question: &str) -> Result<String> {
        LanguageModel::correct_sql(self, sql, db_error, question).await
    }
}

pub struct LlmClient {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            api_key,
            base_url,
            model,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.api_key.clone(),
            config.base_url.clone(),
            config.model.clone(),
        )
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "temperature": 0.1,
            "max_tokens": 1000
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ZaxError::Llm(format!("LLM API call failed: {}", e)))?;

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ZaxError::Llm(format!("Failed to parse LLM response: {}", e)))?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ZaxError::Llm("No content in LLM response".to_string()))?;

        Ok(content.to_string())
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn generate_sql(&self, schema_context: &str, question: &str) -> Result<String> {
        let system = prompts::generation_system(schema_context);
        let raw = self.chat(&system, question).await?;
        Ok(strip_sql_markup(&raw))
    }

    async fn review_sql(&self, sql: &str) -> Result<String> {
        let raw = self.chat(prompts::QUERY_CHECK_SYSTEM, sql).await?;
        Ok(strip_sql_markup(&raw))
    }

    async fn correct_sql(&self, sql: &str, db_error: &str, question: &str) -> Result<String> {
        let system = prompts::correction_system(sql, db_error);
        let raw = self.chat(&system, question).await?;
        Ok(strip_sql_markup(&raw))
    }

    async fn format_answer(&self, question: &str, db_result: &str) -> Result<String> {
        let user = prompts::answer_user_prompt(question, db_result);
        self.chat("You are a helpful database assistant.", &user)
            .await
    }
}

/// Strip code fences and a leading `sql` language tag from model output.
/// Models are instructed not to emit them but frequently do anyway.
pub fn strip_sql_markup(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        text = match after.find("```") {
            Some(end) => &after[..end],
            None => after,
        };
    }
    let text = text.trim();
    let text = text
        .strip_prefix("sql")
        .map(|t| t.trim_start())
        .unwrap_or(text);

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_plain_sql_unchanged() {
        assert_eq!(
            strip_sql_markup("SELECT email FROM info.customers LIMIT 5;"),
            "SELECT email FROM info.customers LIMIT 5;"
        );
    }

    #[test]
    fn test_strip_fenced_block() {
        let raw = "```sql\nSELECT 1;\n```";
        assert_eq!(strip_sql_markup(raw), "SELECT 1;");
    }

    #[test]
    fn test_strip_unterminated_fence() {
        let raw = "```sql\nSELECT 1;";
        assert_eq!(strip_sql_markup(raw), "SELECT 1;");
    }

    #[test]
    fn test_strip_whitespace_only() {
        assert_eq!(strip_sql_markup("   \n"), "");
    }
}
