//! Schema catalog: tables, columns, join relationships, and aliases.
//!
//! Loaded once at process start (from the static definition below or from a
//! live database via `db::introspect`) and treated as read-only afterwards.

use crate::error::{Result, ZaxError};
use crate::keywords;
use std::collections::{BTreeSet, HashMap, HashSet};

/// A column and its declared SQL type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
}

impl Column {
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
        }
    }
}

/// Static description of a database schema.
///
/// `relationships` is a directed adjacency map `{table -> {neighbor -> join
/// key}}`; path-finding treats it as undirected since SQL joins are not
/// directional.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    schema: String,
    tables: Vec<String>,
    columns: HashMap<String, Vec<Column>>,
    relationships: HashMap<String, HashMap<String, String>>,
    aliases: HashMap<String, String>,
    stopwords: HashSet<String>,
}

impl SchemaCatalog {
    /// Build a catalog, validating the referential invariants: every table
    /// named by a relationship or alias must exist in `tables`, and every
    /// table must have a column list.
    pub fn new(
        schema: &str,
        tables: Vec<String>,
        columns: HashMap<String, Vec<Column>>,
        relationships: HashMap<String, HashMap<String, String>>,
        aliases: HashMap<String, String>,
    ) -> Result<Self> {
        let known: HashSet<&str> = tables.iter().map(|t| t.as_str()).collect();

        for table in &tables {
            if !columns.contains_key(table) {
                return Err(ZaxError::Catalog(format!(
                    "table '{}' has no column list",
                    table
                )));
            }
        }
        for (from, neighbors) in &relationships {
            if !known.contains(from.as_str()) {
                return Err(ZaxError::Catalog(format!(
                    "relationship source '{}' is not a known table",
                    from
                )));
            }
            for to in neighbors.keys() {
                if !known.contains(to.as_str()) {
                    return Err(ZaxError::Catalog(format!(
                        "relationship target '{}' is not a known table",
                        to
                    )));
                }
            }
        }
        for (phrase, target) in &aliases {
            if !known.contains(target.as_str()) {
                return Err(ZaxError::Catalog(format!(
                    "alias '{}' points to unknown table '{}'",
                    phrase, target
                )));
            }
        }

        Ok(Self {
            schema: schema.to_string(),
            tables,
            columns,
            relationships,
            aliases,
            stopwords: keywords::default_stopwords(),
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn columns_of(&self, table: &str) -> &[Column] {
        self.columns.get(table).map(|c| c.as_slice()).unwrap_or(&[])
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.iter().any(|t| t == table)
    }

    /// Join key for the edge between two tables, looked up in either
    /// direction.
    pub fn join_key(&self, a: &str, b: &str) -> Option<&str> {
        self.relationships
            .get(a)
            .and_then(|n| n.get(b))
            .or_else(|| self.relationships.get(b).and_then(|n| n.get(a)))
            .map(|k| k.as_str())
    }

    /// Tables adjacent to `table`, treating the relationship graph as
    /// undirected.
    pub fn neighbors(&self, table: &str) -> BTreeSet<&str> {
        let mut out: BTreeSet<&str> = BTreeSet::new();
        if let Some(forward) = self.relationships.get(table) {
            out.extend(forward.keys().map(|t| t.as_str()));
        }
        for (from, neighbors) in &self.relationships {
            if neighbors.contains_key(table) {
                out.insert(from.as_str());
            }
        }
        out
    }

    /// Render the schema-context string handed to the SQL generator: one
    /// `CREATE TABLE` block per matched table, blank-line separated.
    ///
    /// The exact shape matters; the generation collaborator is prompted
    /// against this format.
    pub fn schema_context(&self, matched_tables: &BTreeSet<String>) -> String {
        let mut blocks = Vec::new();
        // Catalog order keeps the output deterministic.
        for table in &self.tables {
            if !matched_tables.contains(table) {
                continue;
            }
            let cols: Vec<String> = self
                .columns_of(table)
                .iter()
                .map(|c| format!("{} {}", c.name, c.data_type))
                .collect();
            blocks.push(format!(
                "CREATE TABLE {}.{} (\n  {}\n);",
                self.schema,
                table,
                cols.join(",\n  ")
            ));
        }
        blocks.join("\n\n")
    }
}

/// The built-in retail schema the assistant ships with.
pub fn default_catalog() -> SchemaCatalog {
    let tables: Vec<String> = [
        "customers",
        "order_details",
        "orders",
        "products",
        "sales_representative",
        "suppliers",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let mut columns = HashMap::new();
    columns.insert(
        "customers".to_string(),
        vec![
            Column::new("customer_id", "integer"),
            Column::new("first_name", "character varying"),
            Column::new("last_name", "character varying"),
            Column::new("email", "character varying"),
            Column::new("city", "character varying"),
            Column::new("country", "character varying"),
            Column::new("join_date", "date"),
        ],
    );
    columns.insert(
        "order_details".to_string(),
        vec![
            Column::new("order_detail_id", "integer"),
            Column::new("order_id", "integer"),
            Column::new("product_id", "integer"),
            Column::new("quantity", "integer"),
            Column::new("unit_price", "numeric"),
            Column::new("subtotal", "numeric"),
            Column::new("discount_percentage", "numeric"),
            Column::new("discount_amount", "numeric"),
            Column::new("final_amount", "numeric"),
            Column::new("tax_rate", "numeric"),
            Column::new("tax_amount", "numeric"),
        ],
    );
    columns.insert(
        "orders".to_string(),
        vec![
            Column::new("order_id", "integer"),
            Column::new("customer_id", "integer"),
            Column::new("sales_rep_id", "integer"),
            Column::new("order_date", "date"),
            Column::new("total_amount", "numeric"),
            Column::new("status", "character varying"),
            Column::new("payment_method", "character varying"),
            Column::new("shipping_method", "character varying"),
        ],
    );
    columns.insert(
        "products".to_string(),
        vec![
            Column::new("product_id", "integer"),
            Column::new("product_name", "character varying"),
            Column::new("category", "character varying"),
            Column::new("subcategory", "character varying"),
            Column::new("brand", "character varying"),
            Column::new("price", "numeric"),
            Column::new("stock_level", "integer"),
            Column::new("supplier_id", "integer"),
            Column::new("weight_kg", "numeric"),
            Column::new("length_cm", "numeric"),
            Column::new("width_cm", "numeric"),
            Column::new("height_cm", "numeric"),
            Column::new("launch_date", "date"),
        ],
    );
    columns.insert(
        "sales_representative".to_string(),
        vec![
            Column::new("sales_rep_id", "integer"),
            Column::new("first_name", "character varying"),
            Column::new("last_name", "character varying"),
            Column::new("email", "character varying"),
            Column::new("phone", "character varying"),
            Column::new("region", "character varying"),
            Column::new("territory", "character varying"),
            Column::new("hire_date", "date"),
            Column::new("commission_rate", "numeric"),
            Column::new("annual_target", "numeric"),
            Column::new("department", "character varying"),
            Column::new("status", "character varying"),
        ],
    );
    columns.insert(
        "suppliers".to_string(),
        vec![
            Column::new("supplier_id", "integer"),
            Column::new("company_name", "character varying"),
            Column::new("contact_person", "character varying"),
            Column::new("email", "character varying"),
            Column::new("phone", "character varying"),
            Column::new("website", "character varying"),
            Column::new("country", "character varying"),
            Column::new("city", "character varying"),
            Column::new("partnership_date", "date"),
            Column::new("payment_terms", "character varying"),
            Column::new("credit_limit", "numeric"),
            Column::new("rating", "numeric"),
            Column::new("status", "character varying"),
        ],
    );

    // The static definition satisfies the invariants by construction.
    SchemaCatalog::new(
        "info",
        tables,
        columns,
        default_relationships(),
        default_aliases(),
    )
    .expect("default catalog is valid")
}

/// Foreign-key-like adjacency of the built-in schema. Edges are listed one
/// way; traversal treats them as undirected.
pub fn default_relationships() -> HashMap<String, HashMap<String, String>> {
    let mut relationships: HashMap<String, HashMap<String, String>> = HashMap::new();
    relationships.insert(
        "orders".to_string(),
        HashMap::from([
            ("customers".to_string(), "customer_id".to_string()),
            ("sales_representative".to_string(), "sales_rep_id".to_string()),
        ]),
    );
    relationships.insert(
        "order_details".to_string(),
        HashMap::from([
            ("orders".to_string(), "order_id".to_string()),
            ("products".to_string(), "product_id".to_string()),
        ]),
    );
    relationships.insert(
        "products".to_string(),
        HashMap::from([("suppliers".to_string(), "supplier_id".to_string())]),
    );
    relationships
}

/// Free-text phrases that name tables without containing the table name.
pub fn default_aliases() -> HashMap<String, String> {
    [
        ("sales rep", "sales_representative"),
        ("sales reps", "sales_representative"),
        ("sales representative", "sales_representative"),
        ("sales representatives", "sales_representative"),
        ("rep", "sales_representative"),
        ("reps", "sales_representative"),
        ("client", "customers"),
        ("clients", "customers"),
        ("line item", "order_details"),
        ("line items", "order_details"),
        ("vendor", "suppliers"),
        ("vendors", "suppliers"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
