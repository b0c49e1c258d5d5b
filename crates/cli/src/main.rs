//! Hashtag backfill tool.
//!
//! Re-extracts hashtags for every stored meep and rebuilds the link
//! table. Run after changing extraction rules or importing meeps that
//! were written without indexing.
//!
//! Usage: `squeaker-backfill [--replace-all]`
//!
//! With `--replace-all` the entire link table is cleared first, so tags
//! no longer referenced by any body lose their stale links too.

use std::sync::Arc;

use squeaker_common::Config;
use squeaker_core::HashtagService;
use squeaker_db::repositories::{HashtagRepository, MeepHashtagRepository, MeepRepository};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PAGE_SIZE: u64 = 100;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "squeaker=info".into()),
        )
        .init();

    let replace_all = std::env::args().any(|arg| arg == "--replace-all");

    let config = Config::load()?;

    info!("Connecting to database...");
    let db = Arc::new(squeaker_db::init(&config).await?);

    info!("Running database migrations...");
    squeaker_db::migrate(&db).await?;

    let meep_repo = MeepRepository::new(Arc::clone(&db));
    let link_repo = MeepHashtagRepository::new(Arc::clone(&db));
    let hashtag_service = HashtagService::new(
        HashtagRepository::new(Arc::clone(&db)),
        MeepHashtagRepository::new(Arc::clone(&db)),
    );

    if replace_all {
        let removed = link_repo.delete_all().await?;
        info!(removed, "Cleared existing hashtag links");
    }

    let total = meep_repo.count().await?;
    info!(total, "Starting hashtag backfill");

    let mut processed: u64 = 0;
    let mut failed: u64 = 0;
    let mut page: u64 = 0;

    loop {
        let meeps = meep_repo.find_page(page, PAGE_SIZE).await?;
        if meeps.is_empty() {
            break;
        }

        for meep in meeps {
            if let Err(e) = hashtag_service.index_meep(&meep.id, &meep.body).await {
                warn!(meep_id = %meep.id, error = %e, "Failed to index meep");
                failed += 1;
            }

            processed += 1;
            if processed % 100 == 0 {
                info!(processed, total, "Backfill progress");
            }
        }

        page += 1;
    }

    info!(processed, failed, "Hashtag backfill complete");

    Ok(())
}
