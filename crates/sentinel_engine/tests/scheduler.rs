use std::sync::mpsc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use sentinel_engine::{Countdown, SchedulerEvent, SchedulerHandle, SchedulerState};

#[test]
fn five_ticks_then_one_expiry_per_window() {
    let mut countdown = Countdown::new();
    countdown.start(5);

    for _window in 0..3 {
        let mut events = Vec::new();
        for _ in 0..5 {
            events.extend(countdown.step());
        }
        assert_eq!(
            events,
            vec![
                SchedulerEvent::Tick { remaining: 4 },
                SchedulerEvent::Tick { remaining: 3 },
                SchedulerEvent::Tick { remaining: 2 },
                SchedulerEvent::Tick { remaining: 1 },
                SchedulerEvent::Tick { remaining: 0 },
                SchedulerEvent::Expired,
            ]
        );
    }
}

#[test]
fn remaining_stays_within_period() {
    let mut countdown = Countdown::new();
    countdown.start(3);
    for _ in 0..10 {
        countdown.step();
        match countdown.state() {
            SchedulerState::Running { remaining, period } => {
                assert!(remaining <= period);
                assert!(remaining > 0);
            }
            SchedulerState::Idle => panic!("countdown stopped on its own"),
        }
    }
}

#[test]
fn stop_halts_all_events() {
    let mut countdown = Countdown::new();
    countdown.start(2);
    countdown.step();
    countdown.stop();
    assert_eq!(countdown.state(), SchedulerState::Idle);
    assert!(countdown.step().is_empty());
}

fn collect_until_expiries(rx: &mpsc::Receiver<SchedulerEvent>, expiries: usize) -> Vec<SchedulerEvent> {
    let mut events = Vec::new();
    let mut seen = 0;
    while seen < expiries {
        let event = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("scheduler event");
        if event == SchedulerEvent::Expired {
            seen += 1;
        }
        events.push(event);
    }
    events
}

#[test]
fn thread_emits_ticks_and_expiries_until_stopped() {
    sentinel_logging::initialize_for_tests();
    let (tx, rx) = mpsc::channel();
    let scheduler = SchedulerHandle::spawn(Duration::from_millis(5), move |event| {
        let _ = tx.send(event);
    });

    scheduler.start(3);
    let events = collect_until_expiries(&rx, 2);
    assert_eq!(
        events,
        vec![
            SchedulerEvent::Tick { remaining: 2 },
            SchedulerEvent::Tick { remaining: 1 },
            SchedulerEvent::Tick { remaining: 0 },
            SchedulerEvent::Expired,
            SchedulerEvent::Tick { remaining: 2 },
            SchedulerEvent::Tick { remaining: 1 },
            SchedulerEvent::Tick { remaining: 0 },
            SchedulerEvent::Expired,
        ]
    );

    scheduler.stop();
    // Drain anything emitted between the last expiry and the stop command.
    std::thread::sleep(Duration::from_millis(20));
    while rx.try_recv().is_ok() {}
    std::thread::sleep(Duration::from_millis(50));
    assert!(rx.try_recv().is_err());
}

#[test]
fn restart_does_not_run_parallel_countdowns() {
    let (tx, rx) = mpsc::channel();
    let scheduler = SchedulerHandle::spawn(Duration::from_millis(5), move |event| {
        let _ = tx.send(event);
    });

    scheduler.start(50);
    scheduler.start(2);
    let events = collect_until_expiries(&rx, 1);
    assert_eq!(
        events,
        vec![
            SchedulerEvent::Tick { remaining: 1 },
            SchedulerEvent::Tick { remaining: 0 },
            SchedulerEvent::Expired,
        ]
    );
}

#[test]
fn dropping_handle_ends_thread() {
    let (tx, rx) = mpsc::channel::<SchedulerEvent>();
    let scheduler = SchedulerHandle::spawn(Duration::from_millis(5), move |event| {
        let _ = tx.send(event);
    });
    scheduler.start(1);
    drop(scheduler);

    // The callback (and its sender) is dropped with the thread.
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        match rx.recv_timeout(Duration::from_millis(50)) {
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
            _ if std::time::Instant::now() > deadline => panic!("scheduler thread still alive"),
            _ => {}
        }
    }
}

#[test]
fn stalled_thread_does_not_burst_expiries() {
    let (tx, rx) = mpsc::channel();
    let stalled = std::sync::atomic::AtomicBool::new(false);
    let scheduler = SchedulerHandle::spawn(Duration::from_millis(20), move |event| {
        if !stalled.swap(true, std::sync::atomic::Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(600));
        }
        if event == SchedulerEvent::Expired {
            let _ = tx.send(std::time::Instant::now());
        }
    });
    scheduler.start(5);

    let expiries: Vec<std::time::Instant> = (0..4)
        .map(|_| rx.recv_timeout(Duration::from_secs(5)).expect("expiry"))
        .collect();
    let gaps: Vec<Duration> = expiries.windows(2).map(|w| w[1] - w[0]).collect();

    // One window is 5 steps of 20ms; allow for timer slack below it.
    assert!(
        gaps.iter().all(|gap| *gap >= Duration::from_millis(80)),
        "expiries closer than one window: {gaps:?}"
    );
}
