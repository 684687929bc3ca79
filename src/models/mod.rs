use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ScreenError;

/// Market region enumeration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Region {
    Us,
    Uk,
    Eu,
    Asia,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Us, Region::Uk, Region::Eu, Region::Asia];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Uk => "UK",
            Region::Eu => "EU",
            Region::Asia => "Asia",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "US" => Ok(Region::Us),
            "UK" => Ok(Region::Uk),
            "EU" => Ok(Region::Eu),
            "ASIA" => Ok(Region::Asia),
            other => Err(format!("unknown region: {}", other)),
        }
    }
}

/// A tracked ticker with static descriptive metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub region: Region,
    pub sector: String,
}

/// Lookback window over which percentage change is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    OneWeek,
    OneMonth,
}

impl Window {
    pub const ALL: [Window; 2] = [Window::OneWeek, Window::OneMonth];

    pub fn days(&self) -> i64 {
        match self {
            Window::OneWeek => 7,
            Window::OneMonth => 30,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Window::OneWeek => "1 Week",
            Window::OneMonth => "1 Month",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1w" | "1week" | "week" | "1 week" => Ok(Window::OneWeek),
            "1m" | "1month" | "month" | "1 month" => Ok(Window::OneMonth),
            other => Err(format!("unknown window: {} (expected 1w or 1m)", other)),
        }
    }
}

/// Filters supplied with a single screening request
#[derive(Debug, Clone)]
pub struct FilterSelection {
    /// Regions to include. An empty set matches nothing.
    pub regions: BTreeSet<Region>,
    /// Sectors to include. An empty set means no sector restriction.
    pub sectors: BTreeSet<String>,
    pub window: Window,
}

impl FilterSelection {
    /// Selection matching every region with no sector restriction.
    pub fn all_regions(window: Window) -> Self {
        Self {
            regions: Region::ALL.iter().copied().collect(),
            sectors: BTreeSet::new(),
            window,
        }
    }

    pub fn matches(&self, instrument: &Instrument) -> bool {
        self.regions.contains(&instrument.region)
            && (self.sectors.is_empty() || self.sectors.contains(&instrument.sector))
    }
}

/// One daily close from the provider. `close` is `None` when the provider
/// reported the trading day but could not price it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

/// One ranked screening result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenRow {
    pub symbol: String,
    pub name: String,
    pub region: Region,
    pub sector: String,
    pub start_price: f64,
    pub end_price: f64,
    pub percent_change: f64,
}

/// A non-fatal, per-instrument diagnostic explaining why no row was produced
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenFailure {
    pub symbol: String,
    pub error: ScreenError,
}

impl fmt::Display for ScreenFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.symbol, self.error)
    }
}

/// Batch-level outcome of a screening pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenOutcome {
    /// At least one row was produced.
    Ranked,
    /// No instrument passed the filters; nothing was fetched.
    NoCriteriaMatched,
    /// Instruments matched the filters but every fetch or validation failed.
    NoUsableData,
}

/// Summary statistics over the ranked rows
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenSummary {
    pub top: ScreenRow,
    pub mean_change: f64,
    pub positive: usize,
    pub positive_share: f64,
}

/// Full result of one screening pass
#[derive(Debug, Clone)]
pub struct ScreenReport {
    /// Rows sorted by percent change descending, registry order on ties.
    pub rows: Vec<ScreenRow>,
    /// Failures in registry order.
    pub failures: Vec<ScreenFailure>,
    pub window: Window,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ScreenReport {
    pub fn outcome(&self) -> ScreenOutcome {
        if !self.rows.is_empty() {
            ScreenOutcome::Ranked
        } else if self.failures.is_empty() {
            ScreenOutcome::NoCriteriaMatched
        } else {
            ScreenOutcome::NoUsableData
        }
    }

    /// Summary statistics, `None` when there are no rows.
    pub fn summary(&self) -> Option<ScreenSummary> {
        let top = self.rows.first()?.clone();
        let count = self.rows.len() as f64;
        let mean_change =
            self.rows.iter().map(|r| r.percent_change).sum::<f64>() / count;
        let positive = self
            .rows
            .iter()
            .filter(|r| r.percent_change > 0.0)
            .count();

        Some(ScreenSummary {
            top,
            mean_change,
            positive,
            positive_share: positive as f64 / count,
        })
    }

    /// Column header for the change column, labeled with the window.
    pub fn change_column_label(&self) -> String {
        format!("% Change ({})", self.window.label())
    }
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub provider_base_url: String,
    pub request_timeout_secs: u64,
    pub rate_limit_per_minute: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider_base_url: "https://query1.finance.yahoo.com".to_string(),
            request_timeout_secs: 30,
            rate_limit_per_minute: 120,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Config::default();
        Ok(Config {
            provider_base_url: std::env::var("PROVIDER_BASE_URL")
                .unwrap_or(defaults.provider_base_url),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.request_timeout_secs.to_string())
                .parse()
                .unwrap_or(defaults.request_timeout_secs),
            rate_limit_per_minute: std::env::var("RATE_LIMIT_PER_MINUTE")
                .unwrap_or_else(|_| defaults.rate_limit_per_minute.to_string())
                .parse()
                .unwrap_or(defaults.rate_limit_per_minute),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ScreenError;

    fn instrument(symbol: &str, region: Region, sector: &str) -> Instrument {
        Instrument {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            region,
            sector: sector.to_string(),
        }
    }

    fn row(symbol: &str, percent_change: f64) -> ScreenRow {
        ScreenRow {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            region: Region::Us,
            sector: "Technology".to_string(),
            start_price: 100.0,
            end_price: 100.0 + percent_change,
            percent_change,
        }
    }

    fn report(rows: Vec<ScreenRow>, failures: Vec<ScreenFailure>) -> ScreenReport {
        ScreenReport {
            rows,
            failures,
            window: Window::OneWeek,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        }
    }

    #[test]
    fn test_region_parse_round_trip() {
        for region in Region::ALL {
            assert_eq!(region.as_str().parse::<Region>().unwrap(), region);
        }
        assert_eq!("asia".parse::<Region>().unwrap(), Region::Asia);
        assert!("Mars".parse::<Region>().is_err());
    }

    #[test]
    fn test_window_parse_and_days() {
        assert_eq!("1w".parse::<Window>().unwrap(), Window::OneWeek);
        assert_eq!("1m".parse::<Window>().unwrap(), Window::OneMonth);
        assert_eq!(Window::OneWeek.days(), 7);
        assert_eq!(Window::OneMonth.days(), 30);
        assert_eq!(Window::OneMonth.label(), "1 Month");
        assert!("1y".parse::<Window>().is_err());
    }

    #[test]
    fn test_empty_region_set_matches_nothing() {
        let selection = FilterSelection {
            regions: BTreeSet::new(),
            sectors: BTreeSet::new(),
            window: Window::OneWeek,
        };
        assert!(!selection.matches(&instrument("NVDA", Region::Us, "Technology")));
    }

    #[test]
    fn test_empty_sector_set_means_no_restriction() {
        let selection = FilterSelection::all_regions(Window::OneWeek);
        assert!(selection.matches(&instrument("BP.L", Region::Uk, "Energy")));

        let mut restricted = selection.clone();
        restricted.sectors.insert("Technology".to_string());
        assert!(!restricted.matches(&instrument("BP.L", Region::Uk, "Energy")));
        assert!(restricted.matches(&instrument("NVDA", Region::Us, "Technology")));
    }

    #[test]
    fn test_failure_display_includes_symbol_prefix() {
        let failure = ScreenFailure {
            symbol: "NVDA".to_string(),
            error: ScreenError::NoData,
        };
        assert_eq!(failure.to_string(), "NVDA: No data available");
    }

    #[test]
    fn test_outcome_distinguishes_empty_reports() {
        assert_eq!(
            report(vec![row("NVDA", 10.0)], Vec::new()).outcome(),
            ScreenOutcome::Ranked
        );
        assert_eq!(
            report(Vec::new(), Vec::new()).outcome(),
            ScreenOutcome::NoCriteriaMatched
        );
        assert_eq!(
            report(
                Vec::new(),
                vec![ScreenFailure {
                    symbol: "NVDA".to_string(),
                    error: ScreenError::NoData,
                }]
            )
            .outcome(),
            ScreenOutcome::NoUsableData
        );
    }

    #[test]
    fn test_summary_statistics() {
        let ranked = report(
            vec![row("NVDA", 10.0), row("AAPL", 4.0), row("BP.L", -2.0)],
            Vec::new(),
        );
        let summary = ranked.summary().unwrap();
        assert_eq!(summary.top.symbol, "NVDA");
        assert!((summary.mean_change - 4.0).abs() < 1e-9);
        assert_eq!(summary.positive, 2);
        assert!((summary.positive_share - 2.0 / 3.0).abs() < 1e-9);

        assert!(report(Vec::new(), Vec::new()).summary().is_none());
    }

    #[test]
    fn test_change_column_label_carries_window() {
        let report = report(Vec::new(), Vec::new());
        assert_eq!(report.change_column_label(), "% Change (1 Week)");
    }
}
