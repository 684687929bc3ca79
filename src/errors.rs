use thiserror::Error;

/// Per-instrument reasons the screener produced no row.
///
/// Every variant is non-fatal to the batch: the failing instrument is
/// recorded and screening continues with the next one. The display strings
/// are exactly what the issues panel shows after the symbol prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenError {
    /// The provider returned an empty series for the requested window.
    #[error("No data available")]
    NoData,

    /// Fewer than 2 usable price points after removing missing values.
    #[error("Insufficient data points")]
    InsufficientData,

    /// Start or end price missing or not strictly positive.
    #[error("Invalid price data")]
    InvalidPrice,

    /// Any unexpected fault from the data provider, wrapped with its
    /// original message.
    #[error("Provider error: {0}")]
    Provider(String),
}
