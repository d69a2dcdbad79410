// =============================================================================
// Scan Pipeline — per-symbol scanner + bounded parallel orchestrator
// =============================================================================
//
// One refresh cycle is a pure fan-out/fan-in:
//
//   universe -> fetch OHLCV -> validate history -> indicators -> classify
//            -> filter -> Vec<ScanRecord>
//
// Each symbol's fetch+compute runs end-to-end inside its own future, at most
// `workers` in flight at once. Results arrive in completion order; nothing
// downstream may assume submission order. Every per-symbol problem (no data,
// short history, broken numbers) is contained to that symbol and logged, so
// one bad symbol can never fail the cycle.
// =============================================================================

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::buckets::{classify, rsi_cross, Bucket, ClassifierStrategy, RsiCross};
use crate::config::ScannerConfig;
use crate::dhan::MarketDataSource;
use crate::indicators::ema::last_ema;
use crate::indicators::macd::last_macd;
use crate::indicators::pivots::pivot_levels;
use crate::indicators::rsi::rsi;
use crate::indicators::supertrend::last_supertrend;
use crate::indicators::volume::volume_spike;
use crate::indicators::{adx::last_adx, vwap::last_vwap};
use crate::types::{Bar, Bias, Confidence, IndicatorSnapshot, SymbolInfo};

// Indicator parameters. These mirror the dashboard the scanner feeds; they
// are not user-tunable.
const RSI_PERIOD: usize = 14;
const EMA_FAST: usize = 9;
const EMA_MID: usize = 26;
const EMA_SLOW: usize = 50;
const ADX_PERIOD: usize = 14;
const SUPERTREND_PERIOD: usize = 10;
const SUPERTREND_MULTIPLIER: f64 = 3.0;
const SPIKE_LOOKBACK: usize = 5;
const SPIKE_BASELINE: usize = 5;
const SPIKE_MULTIPLIER: f64 = 1.2;

/// Everything the scan pipeline needs to know for one cycle.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub min_bars: usize,
    pub price_min: f64,
    pub price_max: f64,
    pub min_volume: f64,
    pub require_volume_spike: bool,
    pub strategy: ClassifierStrategy,
    pub workers: usize,
}

impl From<&ScannerConfig> for ScanSettings {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            min_bars: config.min_bars,
            price_min: config.price_min,
            price_max: config.price_max,
            min_volume: config.min_volume,
            require_volume_spike: config.require_volume_spike,
            strategy: config.strategy,
            workers: config.workers,
        }
    }
}

/// One surviving scan result: the snapshot, its bucket, and the derived
/// signal annotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub snapshot: IndicatorSnapshot,
    pub bucket: Bucket,
    pub bias: Bias,
    pub confidence: Confidence,
    pub rsi_cross: Option<RsiCross>,
}

// =============================================================================
// Per-symbol scanner
// =============================================================================

/// Scan a single symbol: fetch, validate, compute, filter, classify.
///
/// Returns `None` for every legitimate skip — empty fetch, short history,
/// a computation fault, or a failed filter. Skips are logged (debug for
/// missing data, warn for broken numbers) and never propagate.
pub async fn scan_symbol(
    source: &dyn MarketDataSource,
    symbol: &SymbolInfo,
    settings: &ScanSettings,
) -> Option<ScanRecord> {
    let bars = source.fetch_ohlcv(&symbol.security_id).await;

    if bars.len() < settings.min_bars {
        debug!(
            symbol = %symbol.symbol,
            bars = bars.len(),
            min_bars = settings.min_bars,
            "Insufficient history, skipping"
        );
        return None;
    }

    let (snapshot, prev_rsi) = match compute_snapshot(symbol, &bars) {
        Some(computed) => computed,
        None => {
            // Well-sized input that still failed the math is a computation
            // fault: contained here, logged with the symbol identity.
            warn!(
                symbol = %symbol.symbol,
                security_id = %symbol.security_id,
                bars = bars.len(),
                "Indicator computation failed, skipping"
            );
            return None;
        }
    };

    if snapshot.last_price < settings.price_min || snapshot.last_price > settings.price_max {
        return None;
    }
    if snapshot.last_volume < settings.min_volume {
        return None;
    }
    if settings.require_volume_spike && !snapshot.volume_spike {
        return None;
    }

    let bucket = classify(&snapshot, settings.strategy);
    let bias = if snapshot.last_price > snapshot.vwap {
        Bias::Buy
    } else {
        Bias::Sell
    };
    let confidence = if snapshot.volume_spike && (snapshot.rsi - 50.0).abs() > 20.0 {
        Confidence::A
    } else {
        Confidence::B
    };
    let cross = prev_rsi.and_then(|prev| rsi_cross(prev, snapshot.rsi));

    Some(ScanRecord {
        snapshot,
        bucket,
        bias,
        confidence,
        rsi_cross: cross,
    })
}

/// Compute the full indicator snapshot for a validated bar series.
///
/// Returns the snapshot together with the previous bar's RSI (for level-cross
/// detection), or `None` when any indicator comes back undefined.
fn compute_snapshot(
    symbol: &SymbolInfo,
    bars: &[Bar],
) -> Option<(IndicatorSnapshot, Option<f64>)> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    let rsi_series = rsi(&closes, RSI_PERIOD);
    let rsi_now = *rsi_series.last()?;
    let prev_rsi = rsi_series
        .len()
        .checked_sub(2)
        .map(|i| rsi_series[i]);

    let (macd_line, macd_signal) = last_macd(&closes)?;
    let st = last_supertrend(bars, SUPERTREND_PERIOD, SUPERTREND_MULTIPLIER)?;

    let window_high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let window_low = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let last = bars.last()?;

    let snapshot = IndicatorSnapshot {
        symbol: symbol.symbol.clone(),
        company_name: symbol.company_name.clone(),
        security_id: symbol.security_id.clone(),
        last_price: last.close,
        last_volume: last.volume,
        rsi: rsi_now,
        ema9: last_ema(&closes, EMA_FAST)?,
        ema26: last_ema(&closes, EMA_MID)?,
        ema50: last_ema(&closes, EMA_SLOW)?,
        vwap: last_vwap(bars)?,
        macd: macd_line,
        macd_signal,
        adx: last_adx(bars, ADX_PERIOD)?,
        supertrend: st.value,
        supertrend_direction: st.direction,
        volume_spike: volume_spike(&volumes, SPIKE_LOOKBACK, SPIKE_BASELINE, SPIKE_MULTIPLIER),
        pivots: pivot_levels(window_high, window_low, last.close),
    };

    Some((snapshot, prev_rsi))
}

// =============================================================================
// Parallel orchestrator
// =============================================================================

/// Scan the whole universe with at most `settings.workers` fetch+compute
/// pipelines in flight.
///
/// The returned records are in completion order, not universe order. A new
/// refresh is simply a new call; nothing is shared between cycles.
pub async fn run_scan(
    source: &dyn MarketDataSource,
    universe: &[SymbolInfo],
    settings: &ScanSettings,
) -> Vec<ScanRecord> {
    let workers = settings.workers.max(1);

    stream::iter(universe)
        .map(|symbol| scan_symbol(source, symbol, settings))
        .buffer_unordered(workers)
        .filter_map(|record| async move { record })
        .collect()
        .await
}

/// Group records by bucket in the fixed display order, each bucket sorted by
/// last-bar volume (highest first) and truncated to `top_n` when given.
pub fn group_by_bucket(
    records: Vec<ScanRecord>,
    top_n: Option<usize>,
) -> Vec<(Bucket, Vec<ScanRecord>)> {
    let mut groups: Vec<(Bucket, Vec<ScanRecord>)> = Bucket::DISPLAY_ORDER
        .iter()
        .map(|&bucket| (bucket, Vec::new()))
        .collect();

    for record in records {
        if let Some((_, group)) = groups.iter_mut().find(|(b, _)| *b == record.bucket) {
            group.push(record);
        }
    }

    for (_, group) in &mut groups {
        group.sort_by(|a, b| {
            b.snapshot
                .last_volume
                .partial_cmp(&a.snapshot.last_volume)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(n) = top_n {
            group.truncate(n);
        }
    }

    groups
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// In-memory source: canned bars per security id, empty for the rest.
    struct FakeSource {
        series: HashMap<String, Vec<Bar>>,
    }

    #[async_trait]
    impl MarketDataSource for FakeSource {
        async fn fetch_ohlcv(&self, security_id: &str) -> Vec<Bar> {
            self.series.get(security_id).cloned().unwrap_or_default()
        }
    }

    fn bar(close: f64, volume: f64) -> Bar {
        Bar {
            timestamp: 0,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume,
        }
    }

    /// A gently rising 40-bar series: enough history for every indicator.
    fn trending_bars() -> Vec<Bar> {
        (0..40).map(|i| bar(100.0 + i as f64, 50_000.0)).collect()
    }

    fn symbol(id: &str) -> SymbolInfo {
        SymbolInfo {
            symbol: format!("SYM{id}"),
            company_name: format!("Company {id}"),
            security_id: id.to_string(),
            ltp: 100.0,
        }
    }

    fn settings() -> ScanSettings {
        ScanSettings {
            min_bars: 30,
            price_min: 0.0,
            price_max: 10_000.0,
            min_volume: 0.0,
            require_volume_spike: false,
            strategy: ClassifierStrategy::MultiIndicator,
            workers: 10,
        }
    }

    fn source_with(series: Vec<(&str, Vec<Bar>)>) -> FakeSource {
        FakeSource {
            series: series
                .into_iter()
                .map(|(id, bars)| (id.to_string(), bars))
                .collect(),
        }
    }

    // ---- per-symbol ---------------------------------------------------------

    #[tokio::test]
    async fn short_series_never_produces_a_record() {
        for n in [0, 1, 29] {
            let bars: Vec<Bar> = (0..n).map(|i| bar(100.0 + i as f64, 1000.0)).collect();
            let source = source_with(vec![("1", bars)]);
            let result = scan_symbol(&source, &symbol("1"), &settings()).await;
            assert!(result.is_none(), "series of {n} bars must be skipped");
        }
    }

    #[tokio::test]
    async fn well_formed_series_produces_a_record() {
        let source = source_with(vec![("1", trending_bars())]);
        let record = scan_symbol(&source, &symbol("1"), &settings())
            .await
            .expect("40 rising bars must scan");

        assert_eq!(record.snapshot.symbol, "SYM1");
        // Steady rise: RSI pegged at 100, price above VWAP, Buy bias.
        assert!((record.snapshot.rsi - 100.0).abs() < 1e-9);
        assert_eq!(record.bias, Bias::Buy);
        assert!(record.snapshot.last_price > record.snapshot.vwap);
        assert_eq!(record.snapshot.last_volume, 50_000.0);
    }

    #[tokio::test]
    async fn computation_fault_is_contained_to_a_skip() {
        // Enough bars to pass validation, but every close is NaN: the math
        // fails and the symbol is skipped without panicking.
        let broken: Vec<Bar> = (0..40).map(|_| bar(f64::NAN, 1000.0)).collect();
        let source = source_with(vec![("1", broken)]);
        assert!(scan_symbol(&source, &symbol("1"), &settings()).await.is_none());
    }

    #[tokio::test]
    async fn price_filter_applies_to_last_close() {
        let source = source_with(vec![("1", trending_bars())]); // last close 139
        let mut s = settings();
        s.price_max = 120.0;
        assert!(scan_symbol(&source, &symbol("1"), &s).await.is_none());
    }

    #[tokio::test]
    async fn volume_filter_applies_to_last_bar() {
        let source = source_with(vec![("1", trending_bars())]); // volume 50k
        let mut s = settings();
        s.min_volume = 60_000.0;
        assert!(scan_symbol(&source, &symbol("1"), &s).await.is_none());
    }

    #[tokio::test]
    async fn spike_requirement_drops_flat_volume() {
        let source = source_with(vec![("1", trending_bars())]); // flat volume
        let mut s = settings();
        s.require_volume_spike = true;
        assert!(scan_symbol(&source, &symbol("1"), &s).await.is_none());

        // The same series with a recent burst survives.
        let mut bars = trending_bars();
        let n = bars.len();
        bars[n - 2].volume = 90_000.0;
        let source = source_with(vec![("1", bars)]);
        let record = scan_symbol(&source, &symbol("1"), &s).await;
        assert!(record.is_some());
        assert!(record.unwrap().snapshot.volume_spike);
    }

    // ---- orchestrator -------------------------------------------------------

    #[tokio::test]
    async fn one_faulty_symbol_does_not_poison_the_scan() {
        // 49 healthy symbols, one returning garbage: the other 49 survive.
        let mut series: Vec<(String, Vec<Bar>)> = (0..49)
            .map(|i| (format!("{i}"), trending_bars()))
            .collect();
        series.push((
            "faulty".to_string(),
            (0..40).map(|_| bar(f64::NAN, 1000.0)).collect(),
        ));
        let source = FakeSource {
            series: series.into_iter().collect(),
        };

        let mut universe: Vec<SymbolInfo> = (0..49).map(|i| symbol(&i.to_string())).collect();
        universe.push(symbol("faulty"));

        let records = run_scan(&source, &universe, &settings()).await;
        assert_eq!(records.len(), 49);
        assert!(records.iter().all(|r| r.snapshot.security_id != "faulty"));
    }

    #[tokio::test]
    async fn unknown_symbols_yield_empty_fetches_and_skips() {
        let source = source_with(vec![("1", trending_bars())]);
        let universe = vec![symbol("1"), symbol("2"), symbol("3")];
        let records = run_scan(&source, &universe, &settings()).await;
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn filters_compose_across_the_result_set() {
        let mut series = Vec::new();
        for i in 0..10 {
            // Closes end between 130 and 625; volumes between 5k and 50k.
            let base = 100.0 + i as f64 * 50.0;
            let volume = 5_000.0 + i as f64 * 5_000.0;
            let bars: Vec<Bar> = (0..40).map(|j| bar(base + j as f64, volume)).collect();
            series.push((format!("{i}"), bars));
        }
        let source = FakeSource {
            series: series.into_iter().collect(),
        };
        let universe: Vec<SymbolInfo> = (0..10).map(|i| symbol(&i.to_string())).collect();

        let mut s = settings();
        s.price_min = 100.0;
        s.price_max = 500.0;
        s.min_volume = 10_000.0;

        let records = run_scan(&source, &universe, &s).await;
        assert!(!records.is_empty());
        for record in &records {
            assert!(record.snapshot.last_price >= 100.0);
            assert!(record.snapshot.last_price <= 500.0);
            assert!(record.snapshot.last_volume >= 10_000.0);
        }
    }

    #[tokio::test]
    async fn worker_bound_of_one_still_scans_everything() {
        let source = source_with(vec![
            ("1", trending_bars()),
            ("2", trending_bars()),
            ("3", trending_bars()),
        ]);
        let universe = vec![symbol("1"), symbol("2"), symbol("3")];
        let mut s = settings();
        s.workers = 1;
        assert_eq!(run_scan(&source, &universe, &s).await.len(), 3);
    }

    // ---- grouping -----------------------------------------------------------

    #[tokio::test]
    async fn grouping_orders_buckets_and_truncates_by_volume() {
        let mut series = Vec::new();
        for i in 0..5 {
            let volume = 10_000.0 * (i + 1) as f64;
            let bars: Vec<Bar> = (0..40).map(|j| bar(100.0 + j as f64, volume)).collect();
            series.push((format!("{i}"), bars));
        }
        let source = FakeSource {
            series: series.into_iter().collect(),
        };
        let universe: Vec<SymbolInfo> = (0..5).map(|i| symbol(&i.to_string())).collect();
        let records = run_scan(&source, &universe, &settings()).await;
        assert_eq!(records.len(), 5);

        let groups = group_by_bucket(records, Some(3));
        assert_eq!(groups.len(), 7);
        // Groups follow the fixed display order.
        for (expected, (bucket, _)) in Bucket::DISPLAY_ORDER.iter().zip(groups.iter()) {
            assert_eq!(expected, bucket);
        }

        // All five identical-shape records share one bucket; the top three by
        // volume survive, sorted descending.
        let (_, crowded) = groups
            .iter()
            .find(|(_, group)| !group.is_empty())
            .expect("one bucket must be populated");
        assert_eq!(crowded.len(), 3);
        assert!(crowded
            .windows(2)
            .all(|w| w[0].snapshot.last_volume >= w[1].snapshot.last_volume));
        assert_eq!(crowded[0].snapshot.last_volume, 50_000.0);
    }
}
