use crate::view_model::format_countdown;
use crate::{AppState, CycleOutcome, Effect, MonitorState, Msg, StatusTone};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested => {
            if state.monitor() == MonitorState::Idle {
                state.set_monitor(MonitorState::Running);
                state.set_status("querying", StatusTone::Busy);
                let cycle_id = state.allocate_cycle_id();
                vec![
                    Effect::RunCycle { cycle_id },
                    Effect::StartScheduler {
                        period_secs: state.period_secs(),
                    },
                ]
            } else {
                Vec::new()
            }
        }
        Msg::StopRequested => {
            if state.monitor() == MonitorState::Running {
                state.set_monitor(MonitorState::Idle);
                state.set_status("stopped", StatusTone::Idle);
                vec![Effect::StopScheduler]
            } else {
                Vec::new()
            }
        }
        Msg::CheckRequested => {
            state.set_status("querying", StatusTone::Busy);
            vec![Effect::RunCycle {
                cycle_id: state.allocate_cycle_id(),
            }]
        }
        Msg::SchedulerExpired => {
            if state.monitor() == MonitorState::Running {
                vec![Effect::RunCycle {
                    cycle_id: state.allocate_cycle_id(),
                }]
            } else {
                Vec::new()
            }
        }
        Msg::SchedulerTick { remaining } => {
            // Coarse cadence above ten seconds, every second below.
            let show = remaining % 10 == 0 || remaining < 10;
            if state.monitor() == MonitorState::Running && !state.has_cycle_in_flight() && show {
                state.set_status(format_countdown(remaining), StatusTone::Normal);
            }
            Vec::new()
        }
        Msg::CycleStarted { cycle_id } => {
            state.begin_cycle(cycle_id);
            state.set_status("clicking query", StatusTone::Busy);
            Vec::new()
        }
        Msg::CycleFinished { cycle_id, outcome } => {
            state.finish_cycle(cycle_id, &outcome);
            let (text, tone) = outcome_status(&outcome);
            state.set_status(text, tone);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn outcome_status(outcome: &CycleOutcome) -> (String, StatusTone) {
    match outcome {
        CycleOutcome::ControlMissing => ("query control missing".to_string(), StatusTone::Error),
        CycleOutcome::TimedOut { .. } => ("timeout: no data read".to_string(), StatusTone::Warning),
        CycleOutcome::Settled {
            is_first_run: false,
            new_items,
            ..
        } if !new_items.is_empty() => (
            format!("just published: {}", new_items[0]),
            StatusTone::Alert,
        ),
        CycleOutcome::Settled { total, .. } => {
            (format!("monitoring | published: {total}"), StatusTone::Normal)
        }
    }
}
