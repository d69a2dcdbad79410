// =============================================================================
// Scanner Configuration — serde-defaulted settings with env overrides
// =============================================================================
//
// Every tunable parameter of the scan pipeline lives here. All fields carry
// `#[serde(default)]` so that adding new fields never breaks loading an older
// config file, and a missing file simply yields the defaults.
//
// The market-data access token deliberately does NOT live in this struct: it
// is read from the environment at startup and handed to the client
// explicitly, so it can never end up serialized to disk.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::buckets::ClassifierStrategy;

/// Environment variable holding the Dhan API access token.
pub const ACCESS_TOKEN_ENV: &str = "DHAN_ACCESS_TOKEN";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbols_csv() -> String {
    "stocks.csv".to_string()
}

fn default_holidays_csv() -> String {
    "nse_holidays.csv".to_string()
}

fn default_base_url() -> String {
    "https://api.dhan.co/v2".to_string()
}

fn default_interval_minutes() -> u32 {
    5
}

fn default_lookback_days() -> i64 {
    7
}

fn default_min_bars() -> usize {
    30
}

fn default_workers() -> usize {
    10
}

fn default_price_min() -> f64 {
    0.0
}

fn default_price_max() -> f64 {
    5000.0
}

fn default_min_volume() -> f64 {
    10_000.0
}

fn default_refresh_secs() -> u64 {
    90
}

fn default_top_n() -> usize {
    5
}

fn default_index_security_id() -> String {
    // NIFTY 50 on the NSE segment; used only for the direction gauge.
    "26000".to_string()
}

// =============================================================================
// ScannerConfig
// =============================================================================

/// Full configuration for one scanner process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Symbol-master CSV (SYMBOL, NAME_OF_COMPANY, SECURITY_ID, LTP).
    #[serde(default = "default_symbols_csv")]
    pub symbols_csv: String,

    /// Optional holiday-list CSV with a `date` column. Missing file = no
    /// holidays, not an error.
    #[serde(default = "default_holidays_csv")]
    pub holidays_csv: String,

    /// Base URL of the intraday charts API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bar interval in minutes requested from the feed.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,

    /// Rolling fetch window in days ending at the last trading day.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    /// Minimum bars required before any indicator output is trusted.
    #[serde(default = "default_min_bars")]
    pub min_bars: usize,

    /// Upper bound on concurrently in-flight fetch+compute tasks.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Price-range filter applied both at the CSV prefilter and per scan.
    #[serde(default = "default_price_min")]
    pub price_min: f64,
    #[serde(default = "default_price_max")]
    pub price_max: f64,

    /// Minimum last-bar volume for a record to survive the scan.
    #[serde(default = "default_min_volume")]
    pub min_volume: f64,

    /// Drop records without a detected volume spike.
    #[serde(default)]
    pub require_volume_spike: bool,

    /// Which classification strategy to run.
    #[serde(default)]
    pub strategy: ClassifierStrategy,

    /// Seconds between refresh cycles.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    /// Per-bucket truncation when logging scan results.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Security id of the broad-market index used for the direction gauge.
    #[serde(default = "default_index_security_id")]
    pub index_security_id: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            symbols_csv: default_symbols_csv(),
            holidays_csv: default_holidays_csv(),
            base_url: default_base_url(),
            interval_minutes: default_interval_minutes(),
            lookback_days: default_lookback_days(),
            min_bars: default_min_bars(),
            workers: default_workers(),
            price_min: default_price_min(),
            price_max: default_price_max(),
            min_volume: default_min_volume(),
            require_volume_spike: false,
            strategy: ClassifierStrategy::default(),
            refresh_secs: default_refresh_secs(),
            top_n: default_top_n(),
            index_security_id: default_index_security_id(),
        }
    }
}

impl ScannerConfig {
    /// Load configuration from `path`.
    ///
    /// A missing file is not an error: the defaults are returned (with a
    /// warning) so a fresh checkout runs out of the box. Malformed JSON is
    /// still an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        info!(path = %path.display(), "Loaded scanner configuration");
        Ok(config)
    }

    /// Fetch the API access token from the environment.
    ///
    /// Absence is a configuration fault and therefore fatal at startup; the
    /// scan loop never starts without a token.
    pub fn access_token_from_env() -> Result<String> {
        match std::env::var(ACCESS_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => anyhow::bail!("{ACCESS_TOKEN_ENV} is not set; cannot reach the market-data API"),
        }
    }
}
