use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use zax_engine::assistant::SqlAssistant;
use zax_engine::catalog;
use zax_engine::config::Config;
use zax_engine::db::{introspect_catalog, PgQueryRunner};
use zax_engine::llm::{LanguageModel, LlmClient};

#[derive(Parser)]
#[command(name = "zax")]
#[command(about = "Natural-language-to-SQL assistant")]
struct Args {
    /// The question to answer, in plain language
    question: String,

    /// Introspect the live database instead of using the built-in catalog
    #[arg(long)]
    introspect: bool,

    /// Database schema to answer questions about
    #[arg(long)]
    db_schema: Option<String>,

    /// Bound on execution attempts in the correction loop
    #[arg(long)]
    max_retries: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(schema) = args.db_schema {
        config.db_schema = schema;
    }
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries.max(1);
    }

    info!("Question: {}", args.question);

    let runner = PgQueryRunner::connect(&config.database_url).await?;

    let schema_catalog = if args.introspect {
        introspect_catalog(
            runner.pool(),
            &config.db_schema,
            None,
            catalog::default_relationships(),
            catalog::default_aliases(),
        )
        .await?
    } else {
        catalog::default_catalog()
    };
    info!("Catalog ready with {} tables", schema_catalog.tables().len());

    let llm: Arc<dyn LanguageModel> = Arc::new(LlmClient::from_config(&config));
    let assistant = SqlAssistant::new(Arc::new(schema_catalog), llm, Arc::new(runner), &config);

    let response = assistant.answer(&args.question).await?;

    println!("{}", response.answer);
    if let Some(sql) = &response.sql {
        println!("\nSQL: {}", sql);
    }

    Ok(())
}
