use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::simulator::SimulatorSettings;
use crate::watchlist::{MarketCatalog, DEFAULT_CAPACITY};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub session: SessionConfig,
    pub simulator: SimulatorConfig,
    pub watchlist: WatchlistConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_user")]
    pub user: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    pub tick_interval: String,
    pub volatility: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchlistConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub available_markets: Vec<String>,
    pub store_path: PathBuf,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_user() -> String {
    "local".to_string()
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_poll_interval() -> String {
    "1s".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("tickerboard.log")
}

/// Parse an interval string (e.g. "500ms", "1s", "2m", "1h") into milliseconds.
pub fn parse_interval_ms(s: &str) -> Result<u64> {
    let s = s.trim();
    let (num_str, unit_ms) = if let Some(num) = s.strip_suffix("ms") {
        (num, 1)
    } else if let Some(num) = s.strip_suffix('s') {
        (num, 1_000)
    } else if let Some(num) = s.strip_suffix('m') {
        (num, 60_000)
    } else if let Some(num) = s.strip_suffix('h') {
        (num, 3_600_000)
    } else {
        bail!(
            "invalid interval '{}': unsupported unit, expected one of ms/s/m/h",
            s
        );
    };

    let n: u64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n == 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    n.checked_mul(unit_ms)
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

impl SimulatorConfig {
    pub fn settings(&self) -> Result<SimulatorSettings> {
        let interval_ms = parse_interval_ms(&self.tick_interval)?;
        if !(self.volatility > 0.0 && self.volatility < 1.0) {
            bail!(
                "invalid volatility {}: expected a fraction in (0, 1)",
                self.volatility
            );
        }
        Ok(SimulatorSettings {
            tick_interval: Duration::from_millis(interval_ms),
            volatility: self.volatility,
        })
    }
}

impl WatchlistConfig {
    /// How often the store is re-read for changes made by other sessions.
    pub fn poll_interval(&self) -> Result<Duration> {
        Ok(Duration::from_millis(parse_interval_ms(&self.poll_interval)?))
    }

    /// Configured markets, uppercased and de-duplicated; falls back to the
    /// built-in list when none are configured.
    pub fn catalog(&self) -> MarketCatalog {
        let mut out: Vec<String> = Vec::new();
        for sym in &self.available_markets {
            let s = sym.trim().to_ascii_uppercase();
            if !s.is_empty() && !out.iter().any(|v| v == &s) {
                out.push(s);
            }
        }
        if out.is_empty() {
            MarketCatalog::default()
        } else {
            MarketCatalog::new(out)
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config/default.toml"))
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        if let Ok(user) = std::env::var("TICKERBOARD_USER") {
            if !user.trim().is_empty() {
                config.session.user = user.trim().to_string();
            }
        }
        if let Ok(path) = std::env::var("TICKERBOARD_STORE_PATH") {
            if !path.trim().is_empty() {
                config.watchlist.store_path = PathBuf::from(path.trim());
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.simulator
            .settings()
            .context("simulator section is invalid")?;
        self.watchlist
            .poll_interval()
            .context("watchlist.poll_interval is invalid")?;
        if self.watchlist.capacity == 0 {
            bail!("watchlist.capacity must be > 0");
        }
        if self.ui.refresh_rate_ms == 0 {
            bail!("ui.refresh_rate_ms must be > 0");
        }
        if self.session.user.trim().is_empty() {
            bail!("session.user must not be empty");
        }
        Ok(())
    }
}
