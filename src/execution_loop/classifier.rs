//! Classifies database error text into a taxonomy for logging and reporting.
//!
//! Classification is diagnostic only; whether a payload counts as an error
//! at all is decided by the textual rule in `retry`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse taxonomy of SQL execution failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlErrorKind {
    TableNotFound,
    ColumnNotFound,
    SyntaxError,
    PermissionDenied,
    ConnectionFailure,
    StatementRejected,
    EmptySql,
    Other,
}

impl fmt::Display for SqlErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlErrorKind::TableNotFound => write!(f, "TableNotFound"),
            SqlErrorKind::ColumnNotFound => write!(f, "ColumnNotFound"),
            SqlErrorKind::SyntaxError => write!(f, "SyntaxError"),
            SqlErrorKind::PermissionDenied => write!(f, "PermissionDenied"),
            SqlErrorKind::ConnectionFailure => write!(f, "ConnectionFailure"),
            SqlErrorKind::StatementRejected => write!(f, "StatementRejected"),
            SqlErrorKind::EmptySql => write!(f, "EmptySql"),
            SqlErrorKind::Other => write!(f, "Other"),
        }
    }
}

pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a database error payload by message patterns.
    pub fn classify(&self, error_text: &str) -> SqlErrorKind {
        let msg = error_text.to_lowercase();

        if msg.contains("empty sql") {
            return SqlErrorKind::EmptySql;
        }
        if msg.contains("only select statements") || msg.contains("statement rejected") {
            return SqlErrorKind::StatementRejected;
        }
        if msg.contains("column") && msg.contains("does not exist") {
            return SqlErrorKind::ColumnNotFound;
        }
        if (msg.contains("relation") || msg.contains("table")) && msg.contains("does not exist") {
            return SqlErrorKind::TableNotFound;
        }
        if msg.contains("syntax error") {
            return SqlErrorKind::SyntaxError;
        }
        if msg.contains("permission denied") {
            return SqlErrorKind::PermissionDenied;
        }
        if msg.contains("connection") || msg.contains("could not connect") || msg.contains("timed out") {
            return SqlErrorKind::ConnectionFailure;
        }

        SqlErrorKind::Other
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_missing_column() {
        let classifier = ErrorClassifier::new();
        assert_eq!(
            classifier.classify("Error: column \"emial\" does not exist"),
            SqlErrorKind::ColumnNotFound
        );
    }

    #[test]
    fn test_classify_missing_relation() {
        let classifier = ErrorClassifier::new();
        assert_eq!(
            classifier.classify("Error: relation \"info.custmers\" does not exist"),
            SqlErrorKind::TableNotFound
        );
    }

    #[test]
    fn test_classify_syntax_error() {
        let classifier = ErrorClassifier::new();
        assert_eq!(
            classifier.classify("Error: syntax error at or near \"FORM\""),
            SqlErrorKind::SyntaxError
        );
    }

    #[test]
    fn test_classify_rejected_statement() {
        let classifier = ErrorClassifier::new();
        assert_eq!(
            classifier.classify("Error: only SELECT statements are permitted"),
            SqlErrorKind::StatementRejected
        );
    }

    #[test]
    fn test_classify_unknown_defaults_to_other() {
        let classifier = ErrorClassifier::new();
        assert_eq!(
            classifier.classify("Error: something unexpected"),
            SqlErrorKind::Other
        );
    }
}
