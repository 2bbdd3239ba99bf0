pub mod assistant;
pub mod catalog;
pub mod config;
pub mod error;
pub mod execution_loop;
pub mod keywords;
pub mod llm;
pub mod matcher;
pub mod prompts;

// Database module for PostgreSQL
pub mod db;
