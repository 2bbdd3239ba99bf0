//! Execute/verify/correct loop with bounded retries.
//!
//! The loop never regenerates SQL from scratch: each correction round fixes
//! the immediately preceding failing query using the concrete database
//! error, which bounds the external calls at `max_retries` executions and
//! `max_retries - 1` corrections.

use crate::error::Result;
use crate::execution_loop::classifier::{ErrorClassifier, SqlErrorKind};
use async_trait::async_trait;
use tracing::{info, warn};

/// Runs SQL against the database. Must never fail; failures come back as a
/// textual payload recognizable by [`is_db_error`].
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn run_query(&self, sql: &str) -> String;
}

/// Produces a corrected SQL statement from a failing one and the database's
/// error text.
#[async_trait]
pub trait SqlCorrector: Send + Sync {
    async fn correct_sql(&self, sql: &str, db_error: &str, question: &str) -> Result<String>;
}

/// Classify an execution payload: error payloads either carry the literal
/// `Error:` prefix or mention "error" somewhere.
///
/// Known limitation: a legitimate result row containing the word "error"
/// is misclassified as a failure.
pub fn is_db_error(result: &str) -> bool {
    result.starts_with("Error:") || result.to_lowercase().contains("error")
}

/// Terminal outcome of the loop. Failure is data, never a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Succeeded {
        sql: String,
        result: String,
        attempts: u32,
    },
    ExhaustedRetries {
        last_sql: String,
        last_error: String,
        attempts: u32,
        error_kind: SqlErrorKind,
    },
}

enum LoopState {
    Executing { sql: String },
    Correcting { sql: String, error: String },
    Succeeded { sql: String, result: String },
    Exhausted { sql: String, error: String },
}

/// Bounded execution loop.
pub struct ExecutionLoop {
    max_retries: u32,
    classifier: ErrorClassifier,
}

impl ExecutionLoop {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries: max_retries.max(1),
            classifier: ErrorClassifier::new(),
        }
    }

    /// Drive the state machine to a terminal state.
    ///
    /// At most `max_retries` calls to `runner` and fewer than `max_retries`
    /// calls to `corrector`, for any inputs. An empty `initial_sql` is
    /// terminal before the first execution.
    pub async fn execute_with_correction<R, C>(
        &self,
        initial_sql: &str,
        question: &str,
        runner: &R,
        corrector: &C,
    ) -> QueryOutcome
    where
        R: QueryRunner + ?Sized,
        C: SqlCorrector + ?Sized,
    {
        let mut attempt: u32 = 0;
        let mut state = if initial_sql.trim().is_empty() {
            LoopState::Exhausted {
                sql: String::new(),
                error: "Error: empty SQL produced".to_string(),
            }
        } else {
            LoopState::Executing {
                sql: initial_sql.trim().to_string(),
            }
        };

        loop {
            state = match state {
                LoopState::Executing { sql } => {
                    let result = runner.run_query(&sql).await;
                    if !is_db_error(&result) {
                        LoopState::Succeeded { sql, result }
                    } else {
                        attempt += 1;
                        warn!(attempt, max_retries = self.max_retries, error = %result, "query attempt failed");
                        if attempt >= self.max_retries {
                            LoopState::Exhausted { sql, error: result }
                        } else {
                            LoopState::Correcting { sql, error: result }
                        }
                    }
                }
                LoopState::Correcting { sql, error } => {
                    match corrector.correct_sql(&sql, &error, question).await {
                        Ok(corrected) => {
                            let corrected = corrected.trim().to_string();
                            if corrected.is_empty() {
                                // Correction failure is terminal, not retried.
                                warn!("correction returned empty SQL, stopping");
                                LoopState::Exhausted { sql, error }
                            } else {
                                LoopState::Executing { sql: corrected }
                            }
                        }
                        Err(e) => LoopState::Exhausted {
                            sql,
                            error: format!("{} (correction failed: {})", error, e),
                        },
                    }
                }
                LoopState::Succeeded { sql, result } => {
                    info!(attempts = attempt + 1, "query succeeded");
                    return QueryOutcome::Succeeded {
                        sql,
                        result,
                        attempts: attempt + 1,
                    };
                }
                LoopState::Exhausted { sql, error } => {
                    let error_kind = self.classifier.classify(&error);
                    warn!(attempts = attempt, kind = %error_kind, "retries exhausted");
                    return QueryOutcome::ExhaustedRetries {
                        last_sql: sql,
                        last_error: error,
                        attempts: attempt,
                        error_kind,
                    };
                }
            };
        }
    }
}
