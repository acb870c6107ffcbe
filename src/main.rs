use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use clap::Parser;
use dotenvy::dotenv;
use reqwest::Client;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use newswire::config::Configuration;
use newswire::observability;
use newswire::pipeline;
use newswire::sources::guardian::GuardianClient;
use newswire::sources::Source;

/// Ingest one day of news from a content provider.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Name of the source pipeline to execute
    #[arg(short, long, value_enum)]
    source: Source,

    /// Target day (YYYY-MM-DD), defaults to yesterday
    #[arg(short, long)]
    date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let subscriber = observability::get_subscriber("info");
    observability::init_subscriber(subscriber);

    let args = Args::parse();
    let configuration = Configuration::from_env()?;

    let client = build_client().expect("Could not build client");
    let pool = build_pool(&configuration).await;

    let date = args.date.unwrap_or_else(yesterday);
    let guardian = GuardianClient::new(
        client,
        args.source.base_url(),
        configuration.api_key.clone(),
    );

    if let Err(error) = pipeline::run(&pool, &guardian, args.source, date).await {
        tracing::error!("Run failed: {error}");
        std::process::exit(1);
    }

    Ok(())
}

fn yesterday() -> NaiveDate {
    Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .expect("Yesterday should exist")
}

fn build_client() -> reqwest::Result<Client> {
    reqwest::ClientBuilder::new()
        .timeout(Duration::from_secs(10))
        .user_agent("newswire fetcher (+https://github.com/newswire/newswire)")
        .build()
}

async fn build_pool(configuration: &Configuration) -> PgPool {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(&configuration.database_url)
        .await
        .expect("Could not connect to postgres")
}
