/// Kouki Gallery - password-gated photo gallery service
///
/// Visitors enter with a shared passphrase to view the gallery; the
/// administrator enters with a separate passphrase to upload and delete
/// photos. Persistence is swappable between a local single-document store
/// and a document-plus-blob store with real-time snapshot updates.

mod api;
mod auth;
mod blob_store;
mod compress;
mod config;
mod context;
mod db;
mod error;
mod i18n;
mod jobs;
mod metrics;
mod server;
mod store;
mod sync;

use config::GalleryConfig;
use context::AppContext;
use error::GalleryResult;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> GalleryResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kouki_gallery=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    // Load configuration
    let config = GalleryConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;
    let ctx = Arc::new(ctx);

    // Start background jobs
    let scheduler = Arc::new(jobs::JobScheduler::new(Arc::clone(&ctx)));
    scheduler.start();

    // Start server
    server::serve((*ctx).clone()).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    __ __              __    _    ______        __ __
   / //_/____  __  __ / /__ (_)  / ____/____ _ / // /___  _____ __  __
  / ,<  / __ \/ / / // //_// /  / / __ / __ `// // // _ \/ ___// / / /
 / /| |/ /_/ / /_/ // ,<  / /  / /_/ // /_/ // // //  __/ /   / /_/ /
/_/ |_|\____/\__,_//_/|_|/_/   \____/ \__,_//_//_/ \___/_/    \__, /
                                                             /____/
        Password-gated photo gallery v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
