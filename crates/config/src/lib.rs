use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "gymdesk.toml",
    "config/gymdesk.toml",
    "crates/config/gymdesk.toml",
    "../gymdesk.toml",
    "../config/gymdesk.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub store: StoreConfig,
    pub check_in: CheckInConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://gymdesk.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Which record backend the entity stores talk to.
///
/// Every CLI invocation is a new process, so the default keeps records (and
/// their ids) in SQLite between runs. The memory backend suits tests and
/// embedding in a long-lived process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-memory collections seeded from fixtures.
    Memory,
    /// Persistent record store in SQLite.
    #[default]
    Sqlite,
}

/// Entity store settings.
///
/// ```
/// use gymdesk_config::StoreConfig;
///
/// let store = StoreConfig::default();
/// assert_eq!(store.backend, gymdesk_config::BackendKind::Sqlite);
/// assert_eq!(store.latency_min_ms, 150);
/// assert_eq!(store.latency_max_ms, 450);
/// assert_eq!(store.timeout(), Some(std::time::Duration::from_secs(10)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Lower bound of the simulated latency of the memory backend.
    #[serde(default = "StoreConfig::default_latency_min")]
    pub latency_min_ms: u64,
    #[serde(default = "StoreConfig::default_latency_max")]
    pub latency_max_ms: u64,
    /// Per-operation timeout. Zero disables it.
    #[serde(default = "StoreConfig::default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "StoreConfig::default_seed_fixtures")]
    pub seed_fixtures: bool,
}

impl StoreConfig {
    const fn default_latency_min() -> u64 {
        150
    }

    const fn default_latency_max() -> u64 {
        450
    }

    const fn default_timeout() -> u64 {
        10
    }

    const fn default_seed_fixtures() -> bool {
        true
    }

    pub fn latency_range(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.latency_min_ms),
            Duration::from_millis(self.latency_max_ms),
        )
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            latency_min_ms: Self::default_latency_min(),
            latency_max_ms: Self::default_latency_max(),
            timeout_seconds: Self::default_timeout(),
            seed_fixtures: Self::default_seed_fixtures(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInConfig {
    /// How long a simulated QR scan stays in the scanning state.
    #[serde(default = "CheckInConfig::default_scan_delay")]
    pub scan_delay_ms: u64,
}

impl CheckInConfig {
    const fn default_scan_delay() -> u64 {
        2_000
    }

    pub fn scan_delay(&self) -> Duration {
        Duration::from_millis(self.scan_delay_ms)
    }
}

impl Default for CheckInConfig {
    fn default() -> Self {
        Self {
            scan_delay_ms: Self::default_scan_delay(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use gymdesk_config::load;
///
/// std::env::remove_var("GYMDESK_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.database.url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("store.backend", "sqlite")?
        .set_default(
            "store.latency_min_ms",
            i64::try_from(defaults.store.latency_min_ms).unwrap_or(i64::MAX),
        )?
        .set_default(
            "store.latency_max_ms",
            i64::try_from(defaults.store.latency_max_ms).unwrap_or(i64::MAX),
        )?
        .set_default(
            "store.timeout_seconds",
            i64::try_from(defaults.store.timeout_seconds).unwrap_or(i64::MAX),
        )?
        .set_default("store.seed_fixtures", defaults.store.seed_fixtures)?
        .set_default(
            "check_in.scan_delay_ms",
            i64::try_from(defaults.check_in.scan_delay_ms).unwrap_or(i64::MAX),
        )?;

    let environment_overrides = config::Environment::with_prefix("GYMDESK").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("GYMDESK_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via GYMDESK_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.store.latency_min_ms > config.store.latency_max_ms {
        bail!(
            "invalid configuration: store.latency_min_ms ({}) exceeds store.latency_max_ms ({})",
            config.store.latency_min_ms,
            config.store.latency_max_ms
        );
    }

    debug!(?config, "loaded gymdesk configuration");
    Ok(config)
}
