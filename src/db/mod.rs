//! Database collaborators for PostgreSQL: the never-throwing query executor
//! and information_schema introspection.

pub mod executor;
pub mod introspect;

pub use executor::PgQueryRunner;
pub use introspect::{fetch_schema_columns, introspect_catalog};
