//! Manual one-shot run: scrape, filter, persist, print. Unlike the scheduled
//! path this surfaces errors instead of swallowing them, so a broken store
//! shows up in the exit code.

use std::time::Duration;

use jobradar::aggregate::Aggregator;
use jobradar::config::AppConfig;
use jobradar::filter::EligibilityFilter;
use jobradar::governor::RateGovernor;
use jobradar::pipeline::Pipeline;
use jobradar::sources::{catalog, http_client};
use jobradar::store::JobStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load()?;
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| config.database_url.clone());
    let store = JobStore::connect(&database_url).await?;

    let fetch_timeout = Duration::from_secs(config.fetch_timeout_secs);
    let client = http_client(fetch_timeout);
    let aggregator = Aggregator::new(
        catalog::default_adapters(&config, &client),
        RateGovernor::new(Duration::from_secs(config.rate_interval_secs)),
        fetch_timeout,
    );

    let pipeline = Pipeline::new(
        aggregator,
        EligibilityFilter::from_config(&config),
        store,
        None,
    );

    let postings = pipeline.run().await?;
    println!("{} eligible postings this run", postings.len());
    for p in &postings {
        println!("{} — {} [{}] {}", p.title, p.company, p.source, p.url);
    }

    Ok(())
}
