use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use sentinel_engine::{poll_until_found, ExtractionResult, PollSettings};

fn fast(max_attempts: u32) -> PollSettings {
    PollSettings {
        max_attempts,
        interval: Duration::from_millis(2),
    }
}

#[test]
fn defaults_match_twenty_one_second_attempts() {
    let settings = PollSettings::default();
    assert_eq!(settings.max_attempts, 20);
    assert_eq!(settings.interval, Duration::from_millis(1000));
}

#[tokio::test]
async fn gives_up_after_exactly_max_attempts() {
    let calls = AtomicU32::new(0);

    let result = poll_until_found(&fast(7), |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { ExtractionResult::NotFound }
    })
    .await;

    assert_eq!(result, ExtractionResult::NotFound);
    assert_eq!(calls.load(Ordering::SeqCst), 7);
}

#[tokio::test]
async fn stops_on_first_found() {
    let calls = AtomicU32::new(0);

    let result = poll_until_found(&fast(20), |attempt| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt == 3 {
                ExtractionResult::Found(vec!["Optics".to_string()])
            } else {
                ExtractionResult::NotFound
            }
        }
    })
    .await;

    assert_eq!(result, ExtractionResult::Found(vec!["Optics".to_string()]));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn found_empty_list_ends_polling() {
    let calls = AtomicU32::new(0);

    let result = poll_until_found(&fast(5), |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { ExtractionResult::Found(Vec::new()) }
    })
    .await;

    assert_eq!(result, ExtractionResult::Found(Vec::new()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn waits_before_each_attempt() {
    let settings = PollSettings {
        max_attempts: 3,
        interval: Duration::from_millis(20),
    };
    let started = Instant::now();

    poll_until_found(&settings, |_| async { ExtractionResult::NotFound }).await;

    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn zero_attempts_never_calls_extractor() {
    let calls = AtomicU32::new(0);

    let result = poll_until_found(&fast(0), |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { ExtractionResult::NotFound }
    })
    .await;

    assert_eq!(result, ExtractionResult::NotFound);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
