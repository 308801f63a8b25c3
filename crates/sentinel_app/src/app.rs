use std::sync::{mpsc, Arc};

use anyhow::{bail, Context, Result};
use sentinel_core::{update, AppState, Msg};
use sentinel_engine::{
    BaselineStore, DesktopNotifier, FetchSettings, FileBaselineStore, HttpPage, LogNotifier,
    Monitor, Notifier, ReqwestFetcher,
};
use sentinel_logging::{sentinel_info, sentinel_warn};

use crate::config::{Config, NotificationMode};
use crate::effects::EffectRunner;
use crate::status::{StatusSink, TerminalStatus};

/// Monitors the configured page until the process is interrupted, or for a
/// single check when `once` is set.
pub fn run(config: &Config, once: bool) -> Result<()> {
    let monitor = build_monitor(config)?;
    let mut status = TerminalStatus::new();
    drive(monitor, config.period_secs(), once, &mut status)
}

/// Prints the stored baseline for the configured key.
pub fn print_baseline(config: &Config) -> Result<()> {
    let store = FileBaselineStore::new(config.state_dir.clone());
    let key = config.monitor_key();
    match store.get(&key) {
        Some(items) => {
            println!("{} ({} entries, {})", key, items.len(), store.path().display());
            for item in items {
                println!("  {item}");
            }
        }
        None => println!("{key}: no baseline stored yet"),
    }
    Ok(())
}

fn build_monitor(config: &Config) -> Result<Monitor> {
    let store: Arc<dyn BaselineStore> = Arc::new(FileBaselineStore::new(config.state_dir.clone()));
    let notifier: Arc<dyn Notifier> = match config.notifications {
        NotificationMode::Desktop => Arc::new(DesktopNotifier::default()),
        NotificationMode::Log => Arc::new(LogNotifier),
    };
    let fetcher = ReqwestFetcher::new(FetchSettings::default())
        .context("failed to build HTTP client")?;
    let page = Arc::new(HttpPage::new(config.http_page_settings(), Arc::new(fetcher)));
    Ok(Monitor::new(config.monitor_settings(), page, store, notifier))
}

/// Single consumer of the message channel: every engine and scheduler event
/// passes through `update` here, in arrival order.
fn drive(
    monitor: Monitor,
    period_secs: u64,
    once: bool,
    status: &mut dyn StatusSink,
) -> Result<()> {
    let selector = monitor.settings().control_selector.clone();
    let (msg_tx, msg_rx) = mpsc::channel();
    let runner = EffectRunner::new(monitor, msg_tx).context("failed to start engine")?;

    if !runner.probe() {
        bail!("query control {selector:?} not found; is the page reachable and logged in?");
    }
    sentinel_info!("Query control found, monitoring every {}s", period_secs);

    let mut state = AppState::new(period_secs);
    status.show(&state.view());

    let first = if once {
        Msg::CheckRequested
    } else {
        Msg::StartRequested
    };
    state = dispatch(state, first, &runner, status);

    while let Ok(msg) = msg_rx.recv() {
        let cycle_done = matches!(msg, Msg::CycleFinished { .. });
        state = dispatch(state, msg, &runner, status);
        if once && cycle_done {
            break;
        }
    }

    if !once {
        sentinel_warn!("Message channel closed, monitor exiting");
    }
    Ok(())
}

fn dispatch(
    state: AppState,
    msg: Msg,
    runner: &EffectRunner,
    status: &mut dyn StatusSink,
) -> AppState {
    let (mut state, effects) = update(state, msg);
    if state.consume_dirty() {
        status.show(&state.view());
    }
    runner.run(effects);
    state
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use sentinel_core::{AppViewModel, StatusLine, StatusTone};
    use sentinel_engine::{
        MemoryBaselineStore, MonitorKey, MonitorSettings, PollSettings, StaticPage,
        DEFAULT_CONTROL_SELECTOR, DEFAULT_FRAME_NAME,
    };

    use super::*;

    #[derive(Default)]
    struct RecordingStatus {
        lines: Vec<StatusLine>,
        last: Option<AppViewModel>,
    }

    impl StatusSink for RecordingStatus {
        fn show(&mut self, view: &AppViewModel) {
            self.lines.push(view.status.clone());
            self.last = Some(view.clone());
        }
    }

    fn monitor(page: StaticPage, store: Arc<MemoryBaselineStore>) -> Monitor {
        let mut settings = MonitorSettings::new(MonitorKey::new("grades"));
        settings.poll = PollSettings {
            max_attempts: 3,
            interval: Duration::from_millis(2),
        };
        Monitor::new(settings, Arc::new(page), store, Arc::new(LogNotifier))
    }

    #[test]
    fn single_check_settles_and_exits() {
        sentinel_logging::initialize_for_tests();
        let page = StaticPage::new().with_publishing_control(
            DEFAULT_CONTROL_SELECTOR,
            DEFAULT_FRAME_NAME,
            r#"<table id="dataList"><tr><td>1</td><td>t</td><td>c</td><td>Optics</td><td>80</td></tr></table>"#,
        );
        let store = Arc::new(MemoryBaselineStore::new());
        let mut status = RecordingStatus::default();

        drive(monitor(page, store.clone()), 60, true, &mut status).unwrap();

        assert_eq!(
            status.lines,
            vec![
                StatusLine::new("idle", StatusTone::Idle),
                StatusLine::new("querying", StatusTone::Busy),
                StatusLine::new("clicking query", StatusTone::Busy),
                StatusLine::new("monitoring | published: 1", StatusTone::Normal),
            ]
        );
        assert_eq!(
            store.get(&MonitorKey::new("grades")),
            Some(vec!["Optics".to_string()])
        );
        let last = status.last.unwrap();
        assert_eq!(last.cycles_completed, 1);
        assert_eq!(last.last_total, Some(1));
        assert_eq!(last.in_flight, 0);
    }

    #[test]
    fn missing_control_at_startup_is_fatal() {
        sentinel_logging::initialize_for_tests();
        let store = Arc::new(MemoryBaselineStore::new());
        let mut status = RecordingStatus::default();

        let err = drive(monitor(StaticPage::new(), store), 60, true, &mut status).unwrap_err();

        assert!(err.to_string().contains("not found"));
        assert!(status.lines.is_empty());
    }

    #[test]
    fn frame_that_never_renders_reports_timeout() {
        sentinel_logging::initialize_for_tests();
        let page = StaticPage::new().with_control(DEFAULT_CONTROL_SELECTOR);
        let store = Arc::new(MemoryBaselineStore::new());
        let mut status = RecordingStatus::default();

        drive(monitor(page, store.clone()), 60, true, &mut status).unwrap();

        assert_eq!(
            status.lines.last(),
            Some(&StatusLine::new("timeout: no data read", StatusTone::Warning))
        );
        assert_eq!(store.write_count(), 0);
    }
}
