pub mod classifier;
pub mod retry;

pub use classifier::{ErrorClassifier, SqlErrorKind};
pub use retry::{ExecutionLoop, QueryOutcome, QueryRunner, SqlCorrector};
