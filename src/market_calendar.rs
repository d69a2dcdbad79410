// =============================================================================
// Trading Calendar — last NSE trading day
// =============================================================================
//
// NSE trades Monday through Friday, minus exchange holidays. The holiday list
// is an optional CSV with a `date` column (YYYY-MM-DD); a missing file simply
// means no holidays are known.
// =============================================================================

use std::path::Path;

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde::Deserialize;
use tracing::warn;

/// Most recent trading day on or before `today`.
///
/// Rolls back across weekends and any dates present in `holidays` until a
/// working day is found.
pub fn last_trading_day(today: NaiveDate, holidays: &[NaiveDate]) -> NaiveDate {
    let mut day = today;
    loop {
        match day.weekday() {
            Weekday::Sat => day -= Duration::days(1),
            Weekday::Sun => day -= Duration::days(2),
            _ if holidays.contains(&day) => day -= Duration::days(1),
            _ => return day,
        }
    }
}

/// Today's last trading day using the local clock.
pub fn last_trading_day_local(holidays: &[NaiveDate]) -> NaiveDate {
    last_trading_day(Local::now().date_naive(), holidays)
}

#[derive(Debug, Deserialize)]
struct HolidayRow {
    date: String,
}

/// Load the holiday list from a CSV file with a `date` column.
///
/// A missing file yields an empty list (holidays are optional); rows that do
/// not parse as dates are skipped with a warning.
pub fn load_holidays(path: impl AsRef<Path>) -> Vec<NaiveDate> {
    let path = path.as_ref();
    if !path.exists() {
        return Vec::new();
    }

    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to open holiday list");
            return Vec::new();
        }
    };

    let mut holidays = Vec::new();
    for row in reader.deserialize::<HolidayRow>() {
        match row {
            Ok(row) => match NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d") {
                Ok(date) => holidays.push(date),
                Err(e) => warn!(date = %row.date, error = %e, "Skipping unparseable holiday"),
            },
            Err(e) => warn!(error = %e, "Skipping malformed holiday row"),
        }
    }

    holidays
}
