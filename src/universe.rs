// =============================================================================
// Symbol Universe — CSV symbol master with LTP prefilter
// =============================================================================
//
// The symbol master is a CSV export with at least these columns (header names
// are normalized: trimmed, uppercased, spaces to underscores):
//
//   SYMBOL, NAME_OF_COMPANY, SECURITY_ID, LTP
//
// The LTP prefilter runs here, before any network call, so the scan never
// fetches bars for symbols outside the configured price range.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::types::SymbolInfo;

/// Load the symbol universe from `path`, keeping only rows whose LTP falls in
/// `[price_min, price_max]`.
///
/// An unreadable file is an error (the process cannot scan without a
/// universe); a malformed row is skipped with a warning.
pub fn load_universe(
    path: impl AsRef<Path>,
    price_min: f64,
    price_max: f64,
) -> Result<Vec<SymbolInfo>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open symbol master {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("failed to read symbol master headers")?
        .iter()
        .map(normalize_header)
        .collect();

    let col = |name: &str| headers.iter().position(|h| h == name);
    let (symbol_col, company_col, id_col, ltp_col) = match (
        col("SYMBOL"),
        col("NAME_OF_COMPANY"),
        col("SECURITY_ID"),
        col("LTP"),
    ) {
        (Some(s), Some(c), Some(i), Some(l)) => (s, c, i, l),
        _ => anyhow::bail!(
            "symbol master {} is missing one of SYMBOL / NAME_OF_COMPANY / SECURITY_ID / LTP",
            path.display()
        ),
    };

    let mut universe = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(line, error = %e, "Skipping malformed symbol row");
                continue;
            }
        };

        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
        let ltp: f64 = match field(ltp_col).parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(line, symbol = %field(symbol_col), "Skipping row with non-numeric LTP");
                continue;
            }
        };

        if ltp < price_min || ltp > price_max {
            continue;
        }

        universe.push(SymbolInfo {
            symbol: field(symbol_col),
            company_name: field(company_col),
            security_id: field(id_col),
            ltp,
        });
    }

    info!(
        path = %path.display(),
        symbols = universe.len(),
        price_min,
        price_max,
        "Loaded symbol universe"
    );
    Ok(universe)
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_uppercase().replace(' ', "_")
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("meridian-{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_and_prefilters_by_ltp() {
        let path = write_csv(
            "universe.csv",
            "SYMBOL,NAME OF COMPANY,SECURITY ID,LTP\n\
             ALPHA,Alpha Industries,101,250.5\n\
             BETA,Beta Corp,102,950.0\n\
             GAMMA,Gamma Ltd,103,12.0\n",
        );

        let universe = load_universe(&path, 100.0, 500.0).unwrap();
        assert_eq!(universe.len(), 1);
        assert_eq!(universe[0].symbol, "ALPHA");
        assert_eq!(universe[0].security_id, "101");
        assert!((universe[0].ltp - 250.5).abs() < 1e-10);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn header_normalization_accepts_spaced_names() {
        let path = write_csv(
            "headers.csv",
            " symbol , name of company , security id , ltp \nX,Y Co,7,42.0\n",
        );
        let universe = load_universe(&path, 0.0, 100.0).unwrap();
        assert_eq!(universe.len(), 1);
        assert_eq!(universe[0].company_name, "Y Co");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn malformed_ltp_rows_are_skipped() {
        let path = write_csv(
            "badltp.csv",
            "SYMBOL,NAME_OF_COMPANY,SECURITY_ID,LTP\nGOOD,Good Co,1,50.0\nBAD,Bad Co,2,n/a\n",
        );
        let universe = load_universe(&path, 0.0, 100.0).unwrap();
        assert_eq!(universe.len(), 1);
        assert_eq!(universe[0].symbol, "GOOD");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_columns_is_an_error() {
        let path = write_csv("nocols.csv", "TICKER,PRICE\nX,1.0\n");
        assert!(load_universe(&path, 0.0, 100.0).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_universe("/definitely/not/here.csv", 0.0, 100.0).is_err());
    }

    #[test]
    fn universe_preserves_csv_order() {
        let path = write_csv(
            "order.csv",
            "SYMBOL,NAME_OF_COMPANY,SECURITY_ID,LTP\nC,C,3,10.0\nA,A,1,20.0\nB,B,2,30.0\n",
        );
        let universe = load_universe(&path, 0.0, 100.0).unwrap();
        let symbols: Vec<&str> = universe.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["C", "A", "B"]);
        std::fs::remove_file(path).ok();
    }
}
