//! Job Radar — Binary Entrypoint
//! Boots the Axum HTTP server, wires the store and the scrape pipeline, and
//! spawns the background scheduler.

use std::sync::Arc;
use std::time::Duration;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jobradar::aggregate::Aggregator;
use jobradar::api::{self, AppState};
use jobradar::config::AppConfig;
use jobradar::filter::EligibilityFilter;
use jobradar::governor::RateGovernor;
use jobradar::metrics::Metrics;
use jobradar::notify::{EmailSender, PostingNotifier};
use jobradar::pipeline::Pipeline;
use jobradar::scheduler::spawn_scrape_scheduler;
use jobradar::sources::{catalog, http_client};
use jobradar::store::JobStore;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - JOBRADAR_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("JOBRADAR_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobradar=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments. This enables
    // JOBRADAR_CONFIG_PATH / DATABASE_URL / SMTP_* from .env.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let config = AppConfig::load().expect("failed to load configuration");

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| config.database_url.clone());
    let store = JobStore::connect(&database_url)
        .await
        .expect("failed to open job store");

    let fetch_timeout = Duration::from_secs(config.fetch_timeout_secs);
    let client = http_client(fetch_timeout);
    let adapters = catalog::default_adapters(&config, &client);
    tracing::info!(sources = adapters.len(), "adapter catalog ready");

    let aggregator = Aggregator::new(
        adapters,
        RateGovernor::new(Duration::from_secs(config.rate_interval_secs)),
        fetch_timeout,
    );
    let filter = EligibilityFilter::from_config(&config);

    let notifier: Option<Arc<dyn PostingNotifier>> = match EmailSender::from_env() {
        Ok(sender) => Some(Arc::new(sender)),
        Err(e) => {
            tracing::info!(reason = %e, "email notifications disabled");
            None
        }
    };

    let pipeline = Arc::new(Pipeline::new(aggregator, filter, store.clone(), notifier));

    let metrics = Metrics::init(config.scrape_interval_secs);
    spawn_scrape_scheduler(
        pipeline.clone(),
        Duration::from_secs(config.scrape_interval_secs),
    );

    let router = api::create_router(AppState { store, pipeline }).merge(metrics.router());

    Ok(router.into())
}
