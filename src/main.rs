// =============================================================================
// Meridian Market Scanner — Main Entry Point
// =============================================================================
//
// Loads the symbol universe once, then runs the scan pipeline on a fixed
// refresh interval, logging the bucketed results each cycle. The process only
// refuses to start on configuration faults (missing access token, unreadable
// universe); everything that happens per refresh is non-fatal.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod buckets;
mod config;
mod dhan;
mod indicators;
mod market_calendar;
mod scanner;
mod types;
mod universe;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::buckets::market_direction;
use crate::config::ScannerConfig;
use crate::dhan::{DhanClient, MarketDataSource};
use crate::indicators::rsi::last_rsi;
use crate::scanner::{group_by_bucket, run_scan, ScanSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Meridian Market Scanner — Starting Up            ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config = ScannerConfig::load("scanner_config.json")?;

    // Configuration faults are fatal at startup; nothing else is.
    let access_token = ScannerConfig::access_token_from_env()?;

    info!(
        interval_minutes = config.interval_minutes,
        workers = config.workers,
        strategy = ?config.strategy,
        refresh_secs = config.refresh_secs,
        "Scanner configured"
    );

    // ── 2. Collaborators ─────────────────────────────────────────────────
    let holidays = market_calendar::load_holidays(&config.holidays_csv);
    if !holidays.is_empty() {
        info!(holidays = holidays.len(), "Loaded exchange holiday list");
    }

    let client = DhanClient::new(
        access_token,
        config.base_url.clone(),
        config.interval_minutes,
        config.lookback_days,
        holidays,
    );

    let universe = universe::load_universe(
        &config.symbols_csv,
        config.price_min,
        config.price_max,
    )?;
    if universe.is_empty() {
        warn!(
            price_min = config.price_min,
            price_max = config.price_max,
            "No symbols in the configured price range; scans will be empty"
        );
    }

    let settings = ScanSettings::from(&config);

    // ── 3. Refresh loop ──────────────────────────────────────────────────
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(config.refresh_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        // Broad-market gauge first: the index RSI sets the session context.
        let index_bars = client.fetch_ohlcv(&config.index_security_id).await;
        let index_closes: Vec<f64> = index_bars.iter().map(|b| b.close).collect();
        match last_rsi(&index_closes, 14) {
            Some(rsi) => {
                info!(direction = %market_direction(rsi), "Index gauge: RSI {rsi:.1}")
            }
            None => info!("Index gauge unavailable"),
        }

        let started = std::time::Instant::now();
        let records = run_scan(&client, &universe, &settings).await;
        let elapsed = started.elapsed();

        if records.is_empty() {
            // An empty cycle is "no data", not an error.
            info!(
                scanned = universe.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Scan complete — no data"
            );
            continue;
        }

        info!(
            scanned = universe.len(),
            survivors = records.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Scan complete"
        );

        for (bucket, group) in group_by_bucket(records, Some(config.top_n)) {
            if group.is_empty() {
                continue;
            }
            info!("── {} ({}) ──", bucket, group.len());
            for record in &group {
                let snap = &record.snapshot;
                info!(
                    symbol = %snap.symbol,
                    volume = snap.last_volume as u64,
                    bias = %record.bias,
                    grade = %record.confidence,
                    spike = snap.volume_spike,
                    supertrend = %snap.supertrend_direction,
                    "  {} | price {:.2} | RSI {:.1} | ADX {:.1} | VWAP {:.2}{}",
                    snap.company_name,
                    snap.last_price,
                    snap.rsi,
                    snap.adx,
                    snap.vwap,
                    record
                        .rsi_cross
                        .map(|c| format!(" | RSI {c}"))
                        .unwrap_or_default()
                );
            }
        }
    }
}
