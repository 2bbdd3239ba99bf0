//! Never-throwing SQL execution against PostgreSQL.
//!
//! The executor owns the read-only safety boundary: the generator is
//! instructed to only emit SELECT statements, and this layer rejects
//! anything else before it reaches the database.

use crate::error::Result;
use crate::execution_loop::QueryRunner;
use async_trait::async_trait;
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser as SqlParser;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::BigDecimal;
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{Column, Row, TypeInfo};
use tracing::debug;

pub struct PgQueryRunner {
    pool: PgPool,
}

impl PgQueryRunner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_rendered(&self, sql: &str) -> Result<String> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        if rows.is_empty() {
            return Ok(String::new());
        }
        let mut tuples = Vec::with_capacity(rows.len());
        for row in &rows {
            let values: Vec<String> = (0..row.len()).map(|i| render_value(row, i)).collect();
            tuples.push(format!("({})", values.join(", ")));
        }
        Ok(format!("[{}]", tuples.join(", ")))
    }
}

#[async_trait]
impl QueryRunner for PgQueryRunner {
    async fn run_query(&self, sql: &str) -> String {
        if let Err(reason) = ensure_read_only(sql) {
            return format!("Error: {}", reason);
        }
        debug!(sql, "executing query");
        match self.fetch_rendered(sql).await {
            Ok(rendered) if rendered.is_empty() => {
                "Error: Query returned no rows. Please rewrite your query and try again."
                    .to_string()
            }
            Ok(rendered) => rendered,
            Err(e) => format!("Error: {}", e),
        }
    }
}

/// Reject anything that is not a single SELECT statement.
///
/// When the statement parses, the AST decides. sqlparser does not cover
/// every PostgreSQL construct, so on a parse failure the leading keyword
/// decides and the database has the final say.
pub fn ensure_read_only(sql: &str) -> std::result::Result<(), String> {
    match SqlParser::parse_sql(&PostgreSqlDialect {}, sql) {
        Ok(statements) => {
            if statements.len() != 1 {
                return Err("exactly one statement is permitted".to_string());
            }
            match statements[0] {
                Statement::Query(_) => Ok(()),
                _ => Err("only SELECT statements are permitted".to_string()),
            }
        }
        Err(_) => {
            let head = sql.trim_start().to_lowercase();
            if head.starts_with("select") || head.starts_with("with") {
                Ok(())
            } else {
                Err("only SELECT statements are permitted".to_string())
            }
        }
    }
}

macro_rules! render_as {
    ($row:expr, $idx:expr, $t:ty) => {
        match $row.try_get::<Option<$t>, _>($idx) {
            Ok(Some(v)) => v.to_string(),
            Ok(None) => "NULL".to_string(),
            Err(_) => "?".to_string(),
        }
    };
}

/// Render one column value as text, keyed on the Postgres type name.
fn render_value(row: &PgRow, idx: usize) -> String {
    let type_name = row.columns()[idx].type_info().name();
    match type_name {
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => {
            match row.try_get::<Option<String>, _>(idx) {
                Ok(Some(v)) => format!("'{}'", v),
                Ok(None) => "NULL".to_string(),
                Err(_) => "?".to_string(),
            }
        }
        "INT2" => render_as!(row, idx, i16),
        "INT4" => render_as!(row, idx, i32),
        "INT8" => render_as!(row, idx, i64),
        "FLOAT4" => render_as!(row, idx, f32),
        "FLOAT8" => render_as!(row, idx, f64),
        "NUMERIC" => render_as!(row, idx, BigDecimal),
        "BOOL" => render_as!(row, idx, bool),
        "DATE" => render_as!(row, idx, NaiveDate),
        "TIMESTAMP" => render_as!(row, idx, NaiveDateTime),
        "TIMESTAMPTZ" => render_as!(row, idx, DateTime<Utc>),
        other => format!("<{}>", other),
    }
}
