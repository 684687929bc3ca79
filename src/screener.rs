use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::api::PriceDataProvider;
use crate::errors::ScreenError;
use crate::models::{FilterSelection, Instrument, ScreenFailure, ScreenReport, ScreenRow};

/// Screening engine: filters the universe, fetches daily closes through the
/// provider, and ranks percentage changes over the selected window.
///
/// Instruments are processed sequentially and independently; one failure
/// never aborts the batch.
pub struct ScreenerEngine<P> {
    provider: P,
}

impl<P: PriceDataProvider + Send + Sync> ScreenerEngine<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Run one screening pass over `universe` as of `today`.
    ///
    /// Never fails as a whole: per-instrument problems land in the report's
    /// failure list and an unknown-to-empty filter selection simply matches
    /// nothing.
    pub async fn screen(
        &self,
        universe: &[Instrument],
        selection: &FilterSelection,
        today: NaiveDate,
    ) -> ScreenReport {
        let start_date = today - Duration::days(selection.window.days());

        let mut rows = Vec::new();
        let mut failures = Vec::new();

        for instrument in universe {
            if !selection.matches(instrument) {
                continue;
            }

            match self.screen_instrument(instrument, start_date, today).await {
                Ok(row) => rows.push(row),
                Err(error) => failures.push(ScreenFailure {
                    symbol: instrument.symbol.clone(),
                    error,
                }),
            }
        }

        // Stable sort: ties keep registry order
        rows.sort_by(|a, b| b.percent_change.total_cmp(&a.percent_change));

        debug!(
            "screened {} instruments: {} rows, {} failures",
            universe.len(),
            rows.len(),
            failures.len()
        );

        ScreenReport {
            rows,
            failures,
            window: selection.window,
            start_date,
            end_date: today,
        }
    }

    async fn screen_instrument(
        &self,
        instrument: &Instrument,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ScreenRow, ScreenError> {
        let series = self
            .provider
            .fetch_daily_closes(&instrument.symbol, start, end)
            .await
            .map_err(|e| ScreenError::Provider(e.to_string()))?;

        if series.is_empty() {
            return Err(ScreenError::NoData);
        }

        // Missing closes are dropped before counting points or indexing
        // first/last
        let mut usable: Vec<(NaiveDate, f64)> = series
            .iter()
            .filter_map(|point| point.close.map(|close| (point.date, close)))
            .collect();
        usable.sort_by_key(|(date, _)| *date);

        if usable.len() < 2 {
            return Err(ScreenError::InsufficientData);
        }

        let (_, start_price) = usable[0];
        let (_, end_price) = usable[usable.len() - 1];

        if !start_price.is_finite()
            || !end_price.is_finite()
            || start_price <= 0.0
            || end_price <= 0.0
        {
            return Err(ScreenError::InvalidPrice);
        }

        let percent_change = round2(((end_price - start_price) / start_price) * 100.0);

        Ok(ScreenRow {
            symbol: instrument.symbol.clone(),
            name: instrument.name.clone(),
            region: instrument.region,
            sector: instrument.sector.clone(),
            start_price,
            end_price,
            percent_change,
        })
    }
}

/// Round to two decimal places, the precision every surface displays.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
