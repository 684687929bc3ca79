use anyhow::Result;
use chrono::NaiveDate;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::models::DailyClose;

pub mod yahoo_client;
pub use yahoo_client::YahooClient;

/// Simple rate limiter for API requests. Spaces calls so that at most
/// `requests_per_minute` go out; the first call is never delayed.
pub struct ApiRateLimiter {
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl ApiRateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        let delay_ms = if requests_per_minute > 0 {
            60_000 / requests_per_minute as u64
        } else {
            1000 // Default 1 second delay
        };

        Self {
            delay: Duration::from_millis(delay_ms),
            last_request: Mutex::new(None),
        }
    }

    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Price-history source consumed by the screening engine. Implementations
/// own all transport and response-shape concerns; the engine treats every
/// error as opaque.
#[async_trait::async_trait]
pub trait PriceDataProvider {
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter() {
        let limiter = ApiRateLimiter::new(600); // 100ms between requests

        let start = std::time::Instant::now();

        // First request goes through immediately
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));

        // Second request is spaced out
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
