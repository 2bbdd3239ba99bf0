use std::collections::BTreeSet;
use zax_engine::catalog::default_catalog;
use zax_engine::keywords;
use zax_engine::matcher::match_keywords;

fn pipeline(question: &str) -> zax_engine::matcher::MatchResult {
    let catalog = default_catalog();
    let extracted = keywords::extract(question, catalog.stopwords());
    match_keywords(&extracted, &catalog)
}

#[test]
fn customers_with_email() {
    let result = pipeline("Show me all customers with their email");
    assert_eq!(
        result.tables,
        ["customers".to_string()].into_iter().collect::<BTreeSet<_>>()
    );
    assert!(result
        .columns
        .contains(&("customers".to_string(), "email".to_string())));
    assert!(!result
        .columns
        .contains(&("customers".to_string(), "customer_id".to_string())));
}

#[test]
fn supplier_ratings_by_country() {
    let result = pipeline("Show the average rating of suppliers by country");
    assert!(result.tables.contains("suppliers"));
    assert!(result
        .columns
        .contains(&("suppliers".to_string(), "rating".to_string())));
    assert!(result
        .columns
        .contains(&("suppliers".to_string(), "country".to_string())));
}

#[test]
fn customer_orders_are_directly_connected() {
    let result = pipeline("How many orders did each customer place?");
    assert!(result.tables.contains("customers"));
    assert!(result.tables.contains("orders"));
    // Direct edge: closure adds no bridge tables beyond the pair.
    assert!(!result.tables.contains("products"));
    assert!(!result.tables.contains("suppliers"));
}

#[test]
fn bridge_tables_appear_between_distant_matches() {
    let result = pipeline("Which suppliers provide products bought by customers in Berlin?");
    assert!(result.tables.contains("customers"));
    assert!(result.tables.contains("suppliers"));
    assert!(result.tables.contains("products"));
    // orders and order_details bridge the path from customers to products.
    assert!(result.tables.contains("orders"));
    assert!(result.tables.contains("order_details"));
}

#[test]
fn spending_question_pulls_in_orders_with_amount_columns() {
    let result = pipeline("How much has each customer spent in total?");
    assert!(result.tables.contains("customers"));
    assert!(result.tables.contains("orders"));
    assert!(result
        .columns
        .contains(&("orders".to_string(), "total_amount".to_string())));
    assert!(result
        .columns
        .contains(&("orders".to_string(), "order_date".to_string())));
}

#[test]
fn schema_vocabulary_only_question_uses_fallback() {
    let result = pipeline("show ratings");
    assert!(result.tables.contains("suppliers"));
    assert!(result
        .columns
        .contains(&("suppliers".to_string(), "rating".to_string())));
}

#[test]
fn all_stopword_question_matches_nothing() {
    let result = pipeline("show me all of the");
    assert!(result.tables.is_empty());
    assert!(result.columns.is_empty());
}

#[test]
fn matching_is_deterministic() {
    let first = pipeline("monthly revenue trend for products ordered by customers");
    let second = pipeline("monthly revenue trend for products ordered by customers");
    assert_eq!(first, second);
}

#[test]
fn schema_context_covers_every_matched_table() {
    let catalog = default_catalog();
    let extracted = keywords::extract(
        "total revenue from products supplied by each supplier",
        catalog.stopwords(),
    );
    let result = match_keywords(&extracted, &catalog);
    let context = catalog.schema_context(&result.tables);

    for table in &result.tables {
        assert!(
            context.contains(&format!("CREATE TABLE info.{} (", table)),
            "missing block for {}",
            table
        );
    }
}
