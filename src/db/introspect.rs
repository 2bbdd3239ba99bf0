//! Builds a `SchemaCatalog` from a live database's information schema.

use crate::catalog::{Column, SchemaCatalog};
use crate::error::Result;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Fetch (table, column, declared type) triples for a schema, in table and
/// ordinal position order.
pub async fn fetch_schema_columns(
    pool: &PgPool,
    schema: &str,
) -> Result<Vec<(String, String, String)>> {
    let rows = sqlx::query_as::<_, (String, String, String)>(
        "SELECT table_name::text, column_name::text, data_type::text \
         FROM information_schema.columns \
         WHERE table_schema = $1 \
         ORDER BY table_name, ordinal_position",
    )
    .bind(schema)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Introspect a schema and build a catalog around it.
///
/// `relationships` and `aliases` come from static configuration; entries
/// referencing tables absent from the live schema are dropped so the
/// catalog invariants hold. `only_tables` optionally restricts the result.
pub async fn introspect_catalog(
    pool: &PgPool,
    schema: &str,
    only_tables: Option<&HashSet<String>>,
    relationships: HashMap<String, HashMap<String, String>>,
    aliases: HashMap<String, String>,
) -> Result<SchemaCatalog> {
    let triples = fetch_schema_columns(pool, schema).await?;

    let mut tables: Vec<String> = Vec::new();
    let mut columns: HashMap<String, Vec<Column>> = HashMap::new();
    for (table, column, data_type) in triples {
        if let Some(filter) = only_tables {
            if !filter.contains(&table) {
                continue;
            }
        }
        columns
            .entry(table.clone())
            .or_insert_with(|| {
                tables.push(table.clone());
                Vec::new()
            })
            .push(Column::new(&column, &data_type));
    }

    let known: HashSet<String> = tables.iter().cloned().collect();

    let relationships: HashMap<String, HashMap<String, String>> = relationships
        .into_iter()
        .filter(|(from, _)| {
            let keep = known.contains(from);
            if !keep {
                warn!(table = %from, "dropping relationships for table absent from live schema");
            }
            keep
        })
        .map(|(from, neighbors)| {
            let neighbors: HashMap<String, String> = neighbors
                .into_iter()
                .filter(|(to, _)| known.contains(to))
                .collect();
            (from, neighbors)
        })
        .collect();

    let aliases: HashMap<String, String> = aliases
        .into_iter()
        .filter(|(phrase, target)| {
            let keep = known.contains(target);
            if !keep {
                warn!(alias = %phrase, table = %target, "dropping alias for table absent from live schema");
            }
            keep
        })
        .collect();

    SchemaCatalog::new(schema, tables, columns, relationships, aliases)
}
