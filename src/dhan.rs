// =============================================================================
// Dhan Intraday Charts Client — empty-on-failure OHLCV fetches
// =============================================================================
//
// The scan pipeline treats every fetch failure the same way: an empty bar
// series. Non-200 responses, malformed bodies, timeouts, and transport errors
// all collapse to `Vec::new()` here, logged with the symbol identity, so a
// single slow or broken symbol can never abort a scan cycle.
//
// SECURITY: the access token travels as the `access-token` header on every
// request and is never logged or serialized.
// =============================================================================

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::market_calendar::last_trading_day_local;
use crate::types::Bar;

/// Per-request timeout. A timed-out fetch is indistinguishable from an empty
/// response downstream.
const FETCH_TIMEOUT_SECS: u64 = 10;

/// Anything that can produce an OHLCV series for a security id.
///
/// The contract is empty-on-failure: implementations must never error, and
/// callers must treat an empty series identically regardless of cause.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_ohlcv(&self, security_id: &str) -> Vec<Bar>;
}

/// Request payload for the intraday charts endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IntradayRequest<'a> {
    security_id: &'a str,
    exchange_segment: &'a str,
    instrument: &'a str,
    interval: u32,
    from_date: String,
    to_date: String,
}

/// Column-oriented response body: parallel arrays, one entry per bar.
#[derive(Debug, Default, Deserialize)]
struct IntradayResponse {
    #[serde(default)]
    open: Vec<f64>,
    #[serde(default)]
    high: Vec<f64>,
    #[serde(default)]
    low: Vec<f64>,
    #[serde(default)]
    close: Vec<f64>,
    #[serde(default)]
    volume: Vec<f64>,
    #[serde(default)]
    timestamp: Vec<i64>,
}

/// Dhan REST client scoped to the NSE equity segment.
///
/// The access token lives only inside the default-header map of the inner
/// `reqwest::Client`; nothing here exposes it again.
#[derive(Clone)]
pub struct DhanClient {
    base_url: String,
    interval_minutes: u32,
    lookback_days: i64,
    holidays: Vec<NaiveDate>,
    client: reqwest::Client,
}

impl DhanClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `access_token` — API token, passed in explicitly (never read from
    ///   ambient globals) and sent as a header on every request.
    /// * `base_url` — API root, e.g. `https://api.dhan.co/v2`.
    /// * `interval_minutes` / `lookback_days` — the bar interval and rolling
    ///   date window every fetch uses.
    /// * `holidays` — exchange holidays for the trading-day rollback.
    pub fn new(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
        interval_minutes: u32,
        lookback_days: i64,
        holidays: Vec<NaiveDate>,
    ) -> Self {
        let access_token = access_token.into();

        let mut default_headers = HeaderMap::new();
        if let Ok(val) = HeaderValue::from_str(&access_token) {
            default_headers.insert("access-token", val);
        }

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .expect("failed to build reqwest client");

        Self {
            base_url: base_url.into(),
            interval_minutes,
            lookback_days,
            holidays,
            client,
        }
    }

    /// Fetch intraday bars for `security_id` over an explicit date range.
    ///
    /// Returns an empty vec on any failure. Rows with non-finite price or
    /// volume fields are dropped.
    pub async fn fetch_intraday(
        &self,
        security_id: &str,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Vec<Bar> {
        let url = format!("{}/charts/intraday", self.base_url);
        let payload = IntradayRequest {
            security_id,
            exchange_segment: "NSE_EQ",
            instrument: "EQUITY",
            interval: self.interval_minutes,
            from_date: from_date.format("%Y-%m-%d").to_string(),
            to_date: to_date.format("%Y-%m-%d").to_string(),
        };

        let resp = match self.client.post(&url).json(&payload).send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!(security_id, error = %e, "Intraday fetch failed");
                return Vec::new();
            }
        };

        let status = resp.status();
        if !status.is_success() {
            debug!(security_id, %status, "Intraday fetch returned non-success");
            return Vec::new();
        }

        match resp.json::<IntradayResponse>().await {
            Ok(body) => bars_from_response(body),
            Err(e) => {
                warn!(security_id, error = %e, "Malformed intraday response body");
                Vec::new()
            }
        }
    }

}

#[async_trait]
impl MarketDataSource for DhanClient {
    async fn fetch_ohlcv(&self, security_id: &str) -> Vec<Bar> {
        let to_date = last_trading_day_local(&self.holidays);
        let from_date = to_date - Duration::days(self.lookback_days);
        self.fetch_intraday(security_id, from_date, to_date).await
    }
}

/// Zip the column arrays into row-oriented bars.
///
/// The bar count is the shortest column (a ragged response loses its tail),
/// and any row containing a non-finite value is dropped. Missing timestamps
/// default to zero.
fn bars_from_response(resp: IntradayResponse) -> Vec<Bar> {
    let n = resp
        .open
        .len()
        .min(resp.high.len())
        .min(resp.low.len())
        .min(resp.close.len())
        .min(resp.volume.len());

    let mut bars = Vec::with_capacity(n);
    for i in 0..n {
        let bar = Bar {
            timestamp: resp.timestamp.get(i).copied().unwrap_or(0),
            open: resp.open[i],
            high: resp.high[i],
            low: resp.low[i],
            close: resp.close[i],
            volume: resp.volume[i],
        };

        let finite = bar.open.is_finite()
            && bar.high.is_finite()
            && bar.low.is_finite()
            && bar.close.is_finite()
            && bar.volume.is_finite();
        if finite {
            bars.push(bar);
        }
    }

    bars
}
