//! SQL assistant orchestrator: keyword extraction, schema matching, SQL
//! generation, bounded execution, and answer formatting.

use crate::catalog::SchemaCatalog;
use crate::config::Config;
use crate::error::Result;
use crate::execution_loop::{ExecutionLoop, QueryOutcome, QueryRunner};
use crate::keywords;
use crate::llm::LanguageModel;
use crate::matcher;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Response surface of the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub kind: ResponseKind,
    /// Natural language answer, or an explanation of why there is none.
    pub answer: String,
    /// The final SQL attempted, when one was produced.
    pub sql: Option<String>,
    /// Execution attempts consumed by the correction loop.
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKind {
    /// Query succeeded and the answer is grounded in its result rows.
    Answered,
    /// No schema element matched the question.
    NoSchemaMatch,
    /// Generation or execution failed terminally; not a fault.
    CouldNotAnswer,
}

pub struct SqlAssistant {
    catalog: Arc<SchemaCatalog>,
    llm: Arc<dyn LanguageModel>,
    runner: Arc<dyn QueryRunner>,
    max_retries: u32,
    check_generated_sql: bool,
}

impl SqlAssistant {
    pub fn new(
        catalog: Arc<SchemaCatalog>,
        llm: Arc<dyn LanguageModel>,
        runner: Arc<dyn QueryRunner>,
        config: &Config,
    ) -> Self {
        Self {
            catalog,
            llm,
            runner,
            max_retries: config.max_retries,
            check_generated_sql: config.check_generated_sql,
        }
    }

    /// Answer one natural-language question end to end.
    ///
    /// All expected failures come back as an `AssistantResponse`; an `Err`
    /// means a misconfigured collaborator (unreachable LLM endpoint), not a
    /// bad question.
    pub async fn answer(&self, question: &str) -> Result<AssistantResponse> {
        let extracted = keywords::extract(question, self.catalog.stopwords());
        let matched = matcher::match_keywords(&extracted, &self.catalog);
        info!(keywords = ?extracted, tables = ?matched.tables, "matched schema subset");

        if matched.tables.is_empty() {
            return Ok(AssistantResponse {
                kind: ResponseKind::NoSchemaMatch,
                answer: "I could not relate your question to anything in the database schema."
                    .to_string(),
                sql: None,
                attempts: 0,
            });
        }

        let schema_context = self.catalog.schema_context(&matched.tables);
        let mut sql = self.llm.generate_sql(&schema_context, question).await?;
        if self.check_generated_sql && !sql.trim().is_empty() {
            sql = self.llm.review_sql(&sql).await?;
        }

        let execution_loop = ExecutionLoop::new(self.max_retries);
        let outcome = execution_loop
            .execute_with_correction(&sql, question, &*self.runner, &*self.llm)
            .await;

        match outcome {
            QueryOutcome::Succeeded {
                sql,
                result,
                attempts,
            } => {
                let answer = self.llm.format_answer(question, &result).await?;
                Ok(AssistantResponse {
                    kind: ResponseKind::Answered,
                    answer,
                    sql: Some(sql),
                    attempts,
                })
            }
            QueryOutcome::ExhaustedRetries {
                last_sql,
                last_error,
                attempts,
                error_kind,
            } => {
                warn!(%error_kind, attempts, "could not answer question");
                Ok(AssistantResponse {
                    kind: ResponseKind::CouldNotAnswer,
                    answer: format!(
                        "Sorry, the system was unable to generate a working SQL query for your request after {} attempts. Last error: {}",
                        attempts, last_error
                    ),
                    sql: if last_sql.is_empty() { None } else { Some(last_sql) },
                    attempts,
                })
            }
        }
    }
}
