use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::BufReader;

use course_advisor::advising::{AdvisingManager, InMemoryRetryStore, RetryStore, spawn_eviction_task};
use course_advisor::catalog::{CatalogProvider, JsonFileCatalog};
use course_advisor::cli::{InteractiveSession, run_json};
use course_advisor::config::{AdvisorConfig, CatalogConfig, llm_config_from_env};
use course_advisor::llm::create_provider;

/// How often idle retry state is swept.
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let json_mode = std::env::args().skip(1).any(|arg| arg == "--json");

    let (manager, model, catalog_path) = build_manager()
        .await
        .context("failed to start the advisor")?;

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    if json_mode {
        run_json(&manager, stdin, stdout).await?;
    } else {
        eprintln!("Course Advisor v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("   Model: {}", model);
        eprintln!("   Catalog: {}", catalog_path.display());
        eprintln!("   Type your answers and press Enter. /reset starts over, /quit exits.\n");

        let mut session = InteractiveSession::new(manager);
        session.run(stdin, stdout).await?;
    }

    Ok(())
}

/// Wire the advisor from environment configuration.
async fn build_manager() -> course_advisor::error::Result<(Arc<AdvisingManager>, String, PathBuf)> {
    let advisor_config = AdvisorConfig::from_env()?;
    let catalog_config = CatalogConfig::from_env()?;
    let llm_config = llm_config_from_env()?;

    let llm = create_provider(&llm_config)?;

    let catalog = Arc::new(JsonFileCatalog::open(&catalog_config.path, catalog_config.limit).await);
    if !catalog.is_loaded().await {
        eprintln!(
            "Warning: no course data loaded from {}; turns will be refused until it is available.",
            catalog_config.path.display()
        );
    }

    let retries: Arc<dyn RetryStore> = Arc::new(InMemoryRetryStore::new());
    let _eviction_handle = spawn_eviction_task(
        Arc::clone(&retries),
        EVICTION_INTERVAL,
        advisor_config.session_idle_timeout,
    );

    let manager = Arc::new(AdvisingManager::new(llm, catalog, retries, advisor_config));
    Ok((manager, llm_config.model, catalog_config.path))
}
