use std::future::Future;
use std::time::Duration;

use sentinel_logging::{sentinel_debug, sentinel_trace, sentinel_warn};

use crate::ExtractionResult;

/// Fixed-cadence retry bounds for reading an asynchronously rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_millis(1000),
        }
    }
}

/// Waits `interval`, then calls `attempt`, up to `max_attempts` times.
///
/// Returns the first `Found`; `NotFound` once every attempt came back empty.
/// `attempt` receives the 1-based attempt number.
pub async fn poll_until_found<F, Fut>(settings: &PollSettings, mut attempt: F) -> ExtractionResult
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ExtractionResult>,
{
    for n in 1..=settings.max_attempts {
        tokio::time::sleep(settings.interval).await;
        match attempt(n).await {
            ExtractionResult::Found(items) => {
                sentinel_debug!("Data found on attempt {} ({} items)", n, items.len());
                return ExtractionResult::Found(items);
            }
            ExtractionResult::NotFound => sentinel_trace!("Attempt {} found nothing", n),
        }
    }
    sentinel_warn!(
        "No data after {} attempts at {:?}",
        settings.max_attempts,
        settings.interval
    );
    ExtractionResult::NotFound
}
