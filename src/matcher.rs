//! Table/column relevance matching with join-path expansion.
//!
//! Maps keyword tokens onto a covering subset of the schema catalog. Each
//! stage only ever adds to the running table/column sets, so the result is
//! monotonic across stages and deterministic for a fixed catalog.

use crate::catalog::SchemaCatalog;
use crate::keywords::singular;
use itertools::Itertools;
use lazy_static::lazy_static;
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::debug;

lazy_static! {
    /// Vocabulary that signals the question is about money spent on orders.
    static ref SPENDING_VOCAB: HashSet<&'static str> = [
        "spent", "amount", "total", "purchase", "order", "revenue", "sales", "buy", "bought",
    ]
    .into_iter()
    .collect();

    /// Vocabulary that signals per-line-item detail.
    static ref LINE_ITEM_VOCAB: HashSet<&'static str> =
        ["item", "quantity", "detail", "line"].into_iter().collect();

    /// Vocabulary that signals a sales-representative angle.
    static ref SALES_REP_VOCAB: HashSet<&'static str> =
        ["rep", "representative", "salesperson"].into_iter().collect();

    /// Vocabulary that signals an analytical/aggregation question.
    static ref ANALYTICAL_VOCAB: HashSet<&'static str> = [
        "revenue", "sales", "amount", "total", "spent", "purchase", "trend", "growth",
        "increase", "decrease", "change", "month", "year", "quarter",
    ]
    .into_iter()
    .collect();
}

/// Column name substrings promoted by the analytical boost.
const ANALYTICAL_COLUMN_HINTS: &[&str] =
    &["amount", "total", "subtotal", "final_amount", "order_date", "date"];

/// Schema elements judged relevant to one question.
///
/// Sets are unordered; after join-path expansion `tables` may contain bridge
/// tables with no directly matched column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub tables: BTreeSet<String>,
    pub columns: BTreeSet<(String, String)>,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.columns.is_empty()
    }
}

/// Identifier columns are never matched by free-text lookup; they are only
/// pulled in by the join-path and analytical-boost stages.
fn is_identifier(column: &str) -> bool {
    column.ends_with("_id") || column == "id"
}

/// Map keywords onto relevant tables and columns.
///
/// Pure and infallible: an empty result means "insufficient schema context",
/// not an error.
pub fn match_keywords(keywords: &[String], catalog: &SchemaCatalog) -> MatchResult {
    let raw: HashSet<String> = keywords.iter().cloned().collect();
    let singulars: HashSet<String> = keywords.iter().map(|k| singular(k)).collect();
    // Raw and singularized forms are interchangeable in every lookup below.
    let expanded: HashSet<String> = raw.union(&singulars).cloned().collect();

    let mut result = MatchResult::default();

    match_tables_directly(catalog, &expanded, &mut result);
    match_aliases(catalog, keywords, &mut result);
    reinforce_entity_mentions(catalog, &expanded, &mut result);
    if result.tables.is_empty() {
        match_columns_only(catalog, &expanded, &mut result);
    }
    apply_heuristics(catalog, &expanded, &mut result);
    close_join_paths(catalog, &mut result);
    boost_analytical_columns(catalog, &expanded, &mut result);

    debug!(
        tables = ?result.tables,
        column_count = result.columns.len(),
        "matched schema subset"
    );
    result
}

/// Stage: direct table matching. A table matches when its name or singular
/// appears among the keywords; its columns are then scanned for lexical hits.
/// The table itself is only kept when at least one column hit, which the
/// reinforcement stage later relaxes.
fn match_tables_directly(
    catalog: &SchemaCatalog,
    expanded: &HashSet<String>,
    result: &mut MatchResult,
) {
    for table in catalog.tables() {
        let table_singular = singular(table);
        if !expanded.contains(table) && !expanded.contains(&table_singular) {
            continue;
        }
        let mut hit = false;
        for column in catalog.columns_of(table) {
            if is_identifier(&column.name) {
                continue;
            }
            if expanded
                .iter()
                .any(|k| column.name.contains(k.as_str()) || column.name == *k)
            {
                result
                    .columns
                    .insert((table.clone(), column.name.clone()));
                hit = true;
            }
        }
        if hit {
            result.tables.insert(table.clone());
        }
    }
}

/// Stage: alias matching. Multi-word alias phrases are searched in the joined
/// keyword text.
fn match_aliases(catalog: &SchemaCatalog, keywords: &[String], result: &mut MatchResult) {
    let joined = keywords.join(" ");
    for (phrase, table) in catalog.aliases() {
        // Single-word aliases are handled by exact keyword match in the
        // reinforcement stage; substring search would overmatch them.
        if !phrase.contains(' ') {
            continue;
        }
        if joined.contains(phrase.as_str()) {
            result.tables.insert(table.clone());
        }
    }
}

/// Stage: multi-entity reinforcement. Recompute table mentions from bare
/// keywords (name, singular, or single-word alias) and merge them in, so a
/// table-only mention survives even when none of its columns matched.
fn reinforce_entity_mentions(
    catalog: &SchemaCatalog,
    expanded: &HashSet<String>,
    result: &mut MatchResult,
) {
    for keyword in expanded {
        for table in catalog.tables() {
            if keyword == table || *keyword == singular(table) {
                result.tables.insert(table.clone());
            }
        }
        if let Some(table) = catalog.aliases().get(keyword) {
            result.tables.insert(table.clone());
        }
    }
}

/// Stage: column-only fallback, for questions phrased entirely in column
/// vocabulary ("show ratings"). Runs only when no table matched at all.
fn match_columns_only(
    catalog: &SchemaCatalog,
    expanded: &HashSet<String>,
    result: &mut MatchResult,
) {
    for table in catalog.tables() {
        for column in catalog.columns_of(table) {
            if is_identifier(&column.name) {
                continue;
            }
            if expanded
                .iter()
                .any(|k| column.name.contains(k.as_str()) || column.name == *k)
            {
                result
                    .columns
                    .insert((table.clone(), column.name.clone()));
                result.tables.insert(table.clone());
            }
        }
    }
}

/// Stage: fixed domain heuristics. Each rule only adds tables, so evaluation
/// order does not matter. Rules are skipped when the catalog lacks the table
/// they name.
fn apply_heuristics(
    catalog: &SchemaCatalog,
    expanded: &HashSet<String>,
    result: &mut MatchResult,
) {
    let mentions = |word: &str| expanded.contains(word);
    let mentions_any =
        |vocab: &HashSet<&'static str>| expanded.iter().any(|k| vocab.contains(k.as_str()));
    let force = |table: &str, result: &mut MatchResult| {
        if catalog.has_table(table) {
            result.tables.insert(table.to_string());
        }
    };

    if mentions_any(&SPENDING_VOCAB) {
        force("orders", result);
    }
    if mentions_any(&LINE_ITEM_VOCAB) {
        force("order_details", result);
    }
    if mentions("supplier") && mentions("product") {
        force("suppliers", result);
        force("products", result);
    }
    if mentions("product") && (mentions("order") || mentions("ordered")) {
        force("order_details", result);
    }
    if mentions("customer") && mentions("order") {
        force("customers", result);
        force("orders", result);
    }
    if mentions_any(&SALES_REP_VOCAB) && mentions("order") {
        force("sales_representative", result);
        force("orders", result);
    }
}

/// Stage: join-path closure. Every pair of matched tables is connected by
/// its shortest relationship path; bridge tables and the join-key columns of
/// traversed edges are added. Disconnected pairs contribute nothing.
fn close_join_paths(catalog: &SchemaCatalog, result: &mut MatchResult) {
    let snapshot: Vec<String> = result.tables.iter().cloned().collect();
    for (a, b) in snapshot.iter().tuple_combinations() {
        let Some(path) = shortest_path(catalog, a, b) else {
            continue;
        };
        for window in path.windows(2) {
            let (from, to) = (&window[0], &window[1]);
            result.tables.insert(from.clone());
            result.tables.insert(to.clone());
            if let Some(key) = catalog.join_key(from, to) {
                for endpoint in [from, to] {
                    if catalog.columns_of(endpoint).iter().any(|c| c.name == key) {
                        result.columns.insert((endpoint.clone(), key.to_string()));
                    }
                }
            }
        }
    }
}

/// Shortest path between two tables over the undirected relationship graph,
/// endpoints included. A table is reachable from itself with an empty hop
/// list.
fn shortest_path(catalog: &SchemaCatalog, from: &str, to: &str) -> Option<Vec<String>> {
    if from == to {
        return Some(vec![from.to_string()]);
    }
    let mut queue: VecDeque<Vec<String>> = VecDeque::new();
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(from.to_string());
    queue.push_back(vec![from.to_string()]);

    while let Some(path) = queue.pop_front() {
        let current = path.last().expect("paths are never empty");
        for neighbor in catalog.neighbors(current) {
            if visited.contains(neighbor) {
                continue;
            }
            let mut next = path.clone();
            next.push(neighbor.to_string());
            if neighbor == to {
                return Some(next);
            }
            visited.insert(neighbor.to_string());
            queue.push_back(next);
        }
    }
    None
}

/// Stage: analytical column boost. Analytical vocabulary pulls amount/date
/// columns of every matched table into the result, plus the canonical
/// aggregation columns of the orders tables.
fn boost_analytical_columns(
    catalog: &SchemaCatalog,
    expanded: &HashSet<String>,
    result: &mut MatchResult,
) {
    if !expanded.iter().any(|k| ANALYTICAL_VOCAB.contains(k.as_str())) {
        return;
    }

    let snapshot: Vec<String> = result.tables.iter().cloned().collect();
    for table in &snapshot {
        for column in catalog.columns_of(table) {
            if ANALYTICAL_COLUMN_HINTS
                .iter()
                .any(|hint| column.name.contains(hint))
            {
                result.columns.insert((table.clone(), column.name.clone()));
            }
        }
    }

    let force = |table: &str, column: &str, result: &mut MatchResult| {
        if result.tables.contains(table)
            && catalog.columns_of(table).iter().any(|c| c.name == column)
        {
            result.columns.insert((table.to_string(), column.to_string()));
        }
    };
    force("orders", "total_amount", result);
    force("orders", "order_date", result);
    force("order_details", "final_amount", result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_customer_email_matches_without_identifier() {
        let catalog = default_catalog();
        let result = match_keywords(&kw(&["customer", "email"]), &catalog);
        assert_eq!(
            result.tables,
            ["customers".to_string()].into_iter().collect()
        );
        assert!(result
            .columns
            .contains(&("customers".to_string(), "email".to_string())));
        assert!(!result
            .columns
            .contains(&("customers".to_string(), "customer_id".to_string())));
    }

    #[test]
    fn test_supplier_rating_matches_suppliers_only() {
        let catalog = default_catalog();
        let result = match_keywords(&kw(&["supplier", "rating"]), &catalog);
        assert_eq!(
            result.tables,
            ["suppliers".to_string()].into_iter().collect()
        );
        assert!(result
            .columns
            .contains(&("suppliers".to_string(), "rating".to_string())));
    }

    #[test]
    fn test_empty_keywords_yield_empty_result() {
        let catalog = default_catalog();
        let result = match_keywords(&[], &catalog);
        assert!(result.is_empty());
    }

    #[test]
    fn test_deterministic_and_idempotent() {
        let catalog = default_catalog();
        let keywords = kw(&["customer", "order", "total"]);
        let first = match_keywords(&keywords, &catalog);
        let second = match_keywords(&keywords, &catalog);
        assert_eq!(first, second);
    }

    #[test]
    fn test_column_only_fallback() {
        let catalog = default_catalog();
        // "ratings" names no table; fallback finds suppliers.rating.
        let result = match_keywords(&kw(&["ratings"]), &catalog);
        assert!(result.tables.contains("suppliers"));
        assert!(result
            .columns
            .contains(&("suppliers".to_string(), "rating".to_string())));
    }

    #[test]
    fn test_fallback_never_matches_identifier_columns() {
        let catalog = default_catalog();
        let result = match_keywords(&kw(&["id"]), &catalog);
        assert!(result
            .columns
            .iter()
            .all(|(_, column)| !is_identifier(column)));
    }

    #[test]
    fn test_customer_order_heuristic_directly_connected() {
        let catalog = default_catalog();
        let result = match_keywords(&kw(&["customer", "order"]), &catalog);
        assert!(result.tables.contains("customers"));
        assert!(result.tables.contains("orders"));
    }

    #[test]
    fn test_join_closure_adds_bridge_tables() {
        let catalog = default_catalog();
        // customers and suppliers are connected only through
        // orders -> order_details -> products.
        let result = match_keywords(&kw(&["customers", "email", "suppliers", "rating"]), &catalog);
        assert!(result.tables.contains("customers"));
        assert!(result.tables.contains("suppliers"));
        assert!(result.tables.contains("orders"));
        assert!(result.tables.contains("order_details"));
        assert!(result.tables.contains("products"));
    }

    #[test]
    fn test_join_closure_pulls_in_join_keys() {
        let catalog = default_catalog();
        let result = match_keywords(&kw(&["customer", "email", "order", "status"]), &catalog);
        assert!(result
            .columns
            .contains(&("orders".to_string(), "customer_id".to_string())));
        assert!(result
            .columns
            .contains(&("customers".to_string(), "customer_id".to_string())));
    }

    #[test]
    fn test_spending_vocabulary_forces_orders() {
        let catalog = default_catalog();
        let result = match_keywords(&kw(&["customers", "email", "spent"]), &catalog);
        assert!(result.tables.contains("orders"));
    }

    #[test]
    fn test_analytical_boost_adds_amount_and_date_columns() {
        let catalog = default_catalog();
        let result = match_keywords(&kw(&["customer", "revenue", "month"]), &catalog);
        assert!(result
            .columns
            .contains(&("orders".to_string(), "total_amount".to_string())));
        assert!(result
            .columns
            .contains(&("orders".to_string(), "order_date".to_string())));
    }

    #[test]
    fn test_sales_rep_alias_phrase() {
        let catalog = default_catalog();
        let result = match_keywords(&kw(&["sales", "reps", "by", "region"]), &catalog);
        assert!(result.tables.contains("sales_representative"));
    }

    #[test]
    fn test_monotonic_over_direct_stage() {
        let catalog = default_catalog();
        let keywords = kw(&["customer", "order", "total", "amount"]);
        let raw: HashSet<String> = keywords.iter().cloned().collect();
        let singulars: HashSet<String> = keywords.iter().map(|k| singular(k)).collect();
        let expanded: HashSet<String> = raw.union(&singulars).cloned().collect();

        let mut direct_only = MatchResult::default();
        match_tables_directly(&catalog, &expanded, &mut direct_only);

        let full = match_keywords(&keywords, &catalog);
        assert!(direct_only.tables.is_subset(&full.tables));
        assert!(direct_only.columns.is_subset(&full.columns));
    }

    #[test]
    fn test_every_column_table_is_matched() {
        let catalog = default_catalog();
        for question in [
            vec!["customer", "order", "revenue"],
            vec!["product", "supplier", "rating"],
            vec!["ratings"],
            vec!["line", "items", "quantity"],
        ] {
            let result = match_keywords(&kw(&question), &catalog);
            for (table, _) in &result.columns {
                assert!(result.tables.contains(table), "dangling column table {}", table);
            }
        }
    }
}
