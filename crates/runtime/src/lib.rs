use std::sync::Arc;

use anyhow::{Context, Result};
use gymdesk_config::{AppConfig, BackendKind};
use gymdesk_dashboard::{CheckInRecorder, GymStores};
use gymdesk_database::{
    initialize_database, Fixtures, MemoryBackend, RecordBackend, SeedReport, SqliteBackend,
    SqlitePool,
};
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

pub struct GymServices {
    pub backend: Arc<dyn RecordBackend>,
    pub db_pool: Option<SqlitePool>,
    pub stores: GymStores,
    pub recorder: CheckInRecorder,
}

impl GymServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let (backend, db_pool): (Arc<dyn RecordBackend>, Option<SqlitePool>) =
            match config.store.backend {
                BackendKind::Memory => {
                    let (min, max) = config.store.latency_range();
                    (Arc::new(MemoryBackend::new().with_latency(min, max)), None)
                }
                BackendKind::Sqlite => {
                    let pool = initialize_database(&config.database).await?;
                    (Arc::new(SqliteBackend::new(pool.clone())), Some(pool))
                }
            };

        let stores = GymStores::new(Arc::clone(&backend), config.store.timeout());
        let recorder = CheckInRecorder::new(stores.check_ins.clone())
            .with_scan_delay(config.check_in.scan_delay());

        let services = Self {
            backend,
            db_pool,
            stores,
            recorder,
        };

        if config.store.seed_fixtures {
            if services.stores.is_empty().await? {
                let report = services.seed_fixtures().await?;
                info!(?report, "record store seeded");
            } else {
                info!("record store already holds data, skipping fixtures");
            }
        }

        info!(backend = services.backend.name(), "gym services ready");
        Ok(services)
    }

    /// Write the bundled fixtures, regardless of what is already stored.
    pub async fn seed_fixtures(&self) -> Result<SeedReport> {
        let fixtures = Fixtures::bundled().context("failed to load bundled fixtures")?;
        fixtures
            .seed(Arc::clone(&self.backend))
            .await
            .context("failed to seed fixtures")
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
