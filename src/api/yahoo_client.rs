use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::models::{Config, DailyClose};
use super::{ApiRateLimiter, PriceDataProvider};

/// Yahoo Finance chart API client.
///
/// The chart payload is not stable across listings: some carry a regular
/// quote close series, some only an adjusted close, and individual days can
/// be null. All of that tolerance lives here; callers only ever see
/// `DailyClose` values.
pub struct YahooClient {
    client: Client,
    base_url: Url,
    rate_limiter: ApiRateLimiter,
}

impl YahooClient {
    /// Create a new Yahoo client
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .user_agent("momentum-screener/0.1")
            .build()?;

        let base_url = Url::parse(&config.provider_base_url)?;
        let rate_limiter = ApiRateLimiter::new(config.rate_limit_per_minute);

        Ok(Self {
            client,
            base_url,
            rate_limiter,
        })
    }

    fn chart_url(&self, symbol: &str, from_date: NaiveDate, to_date: NaiveDate) -> Result<Url> {
        // Inclusive window: midnight on the first day through end of the last
        let from_timestamp = from_date
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp();
        let to_timestamp = to_date
            .and_hms_opt(23, 59, 59)
            .unwrap()
            .and_utc()
            .timestamp();

        let mut url = self
            .base_url
            .join(&format!("v8/finance/chart/{}", symbol))?;
        url.query_pairs_mut()
            .append_pair("period1", &from_timestamp.to_string())
            .append_pair("period2", &to_timestamp.to_string())
            .append_pair("interval", "1d")
            .append_pair("includePrePost", "false");

        Ok(url)
    }

    /// Make a request to the chart API
    async fn make_request(&self, url: Url) -> Result<Value> {
        self.rate_limiter.wait().await;

        debug!("Making request to: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let json: Value = response.json().await?;
        Ok(json)
    }
}

/// Decode a chart response into daily closes. Days the provider lists but
/// cannot price come back with `close: None`.
fn parse_chart_response(data: &Value) -> Result<Vec<DailyClose>> {
    let chart = data
        .get("chart")
        .ok_or_else(|| anyhow!("unexpected response shape: missing chart"))?;

    if let Some(error) = chart.get("error").filter(|e| !e.is_null()) {
        let description = error
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or("unknown provider error");
        return Err(anyhow!("{}", description));
    }

    let result = chart
        .get("result")
        .and_then(|r| r.as_array())
        .and_then(|r| r.first())
        .ok_or_else(|| anyhow!("unexpected response shape: missing chart result"))?;

    let empty = Vec::new();
    let timestamps = result
        .get("timestamp")
        .and_then(|t| t.as_array())
        .unwrap_or(&empty);

    let quote_closes = result
        .get("indicators")
        .and_then(|i| i.get("quote"))
        .and_then(|q| q.as_array())
        .and_then(|q| q.first())
        .and_then(|q| q.get("close"))
        .and_then(|c| c.as_array());
    let adjusted_closes = result
        .get("indicators")
        .and_then(|i| i.get("adjclose"))
        .and_then(|a| a.as_array())
        .and_then(|a| a.first())
        .and_then(|a| a.get("adjclose"))
        .and_then(|c| c.as_array());

    let mut closes = Vec::with_capacity(timestamps.len());
    for (index, timestamp) in timestamps.iter().enumerate() {
        let seconds = match timestamp.as_i64() {
            Some(seconds) => seconds,
            None => continue,
        };
        let date = match chrono::DateTime::from_timestamp(seconds, 0) {
            Some(datetime) => datetime.date_naive(),
            None => continue,
        };

        // Quote close first; adjusted close fills the gaps some listings leave
        let close = quote_closes
            .and_then(|c| c.get(index))
            .and_then(|v| v.as_f64())
            .or_else(|| {
                adjusted_closes
                    .and_then(|c| c.get(index))
                    .and_then(|v| v.as_f64())
            });

        closes.push(DailyClose { date, close });
    }

    Ok(closes)
}

#[async_trait::async_trait]
impl PriceDataProvider for YahooClient {
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>> {
        let url = self.chart_url(symbol, start, end)?;
        let data = self.make_request(url).await?;
        let closes = parse_chart_response(&data)?;

        debug!(
            "Retrieved {} closes for {} from {} to {}",
            closes.len(),
            symbol,
            start,
            end
        );
        Ok(closes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart_body(timestamps: Vec<i64>, closes: Vec<Value>) -> Value {
        json!({
            "chart": {
                "result": [{
                    "timestamp": timestamps,
                    "indicators": { "quote": [{ "close": closes }] }
                }],
                "error": null
            }
        })
    }

    fn ts(date: NaiveDate) -> i64 {
        date.and_hms_opt(12, 0, 0).unwrap().and_utc().timestamp()
    }

    #[test]
    fn test_parse_pairs_timestamps_with_closes() {
        let d0 = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        let body = chart_body(vec![ts(d0), ts(d1)], vec![json!(100.0), json!(110.5)]);

        let closes = parse_chart_response(&body).unwrap();
        assert_eq!(
            closes,
            vec![
                DailyClose { date: d0, close: Some(100.0) },
                DailyClose { date: d1, close: Some(110.5) },
            ]
        );
    }

    #[test]
    fn test_parse_keeps_null_closes_as_missing() {
        let d0 = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        let body = chart_body(vec![ts(d0), ts(d1)], vec![json!(null), json!(110.5)]);

        let closes = parse_chart_response(&body).unwrap();
        assert_eq!(closes[0].close, None);
        assert_eq!(closes[1].close, Some(110.5));
    }

    #[test]
    fn test_parse_falls_back_to_adjusted_close() {
        let d0 = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let body = json!({
            "chart": {
                "result": [{
                    "timestamp": [ts(d0)],
                    "indicators": {
                        "quote": [{ "close": [null] }],
                        "adjclose": [{ "adjclose": [99.25] }]
                    }
                }],
                "error": null
            }
        });

        let closes = parse_chart_response(&body).unwrap();
        assert_eq!(closes[0].close, Some(99.25));
    }

    #[test]
    fn test_parse_empty_timestamps_yields_empty_series() {
        let body = chart_body(Vec::new(), Vec::new());
        assert!(parse_chart_response(&body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_surfaces_provider_error_description() {
        let body = json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        });

        let err = parse_chart_response(&body).unwrap_err();
        assert_eq!(err.to_string(), "No data found, symbol may be delisted");
    }

    #[test]
    fn test_chart_url_contains_symbol_and_range() {
        let config = Config::default();
        let client = YahooClient::new(&config).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        let url = client.chart_url("BP.L", start, end).unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/BP.L");
        let query = url.query().unwrap();
        assert!(query.contains("interval=1d"));
        assert!(query.contains("period1="));
        assert!(query.contains("period2="));
    }
}
