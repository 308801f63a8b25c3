use std::sync::{mpsc, Mutex};

use sentinel_core::{CycleOutcome, Effect, Msg};
use sentinel_engine::{
    CycleReport, EngineEvent, EngineHandle, Monitor, SchedulerEvent, SchedulerHandle,
    DEFAULT_STEP,
};
use sentinel_logging::sentinel_debug;

/// Carries core effects out to the engine and the scheduler, and feeds their
/// events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    scheduler: SchedulerHandle,
}

impl EffectRunner {
    pub fn new(monitor: Monitor, msg_tx: mpsc::Sender<Msg>) -> std::io::Result<Self> {
        let engine_tx = Mutex::new(msg_tx.clone());
        let engine = EngineHandle::new(monitor, move |event| {
            if let Ok(tx) = engine_tx.lock() {
                let _ = tx.send(map_engine_event(event));
            }
        })?;

        let scheduler = SchedulerHandle::spawn(DEFAULT_STEP, move |event| {
            let _ = msg_tx.send(map_scheduler_event(event));
        });

        Ok(Self { engine, scheduler })
    }

    /// Whether the query control is reachable right now.
    pub fn probe(&self) -> bool {
        self.engine.probe()
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RunCycle { cycle_id } => {
                    sentinel_debug!("RunCycle cycle_id={}", cycle_id);
                    self.engine.run_cycle(cycle_id);
                }
                Effect::StartScheduler { period_secs } => {
                    sentinel_debug!("StartScheduler period_secs={}", period_secs);
                    self.scheduler.start(period_secs);
                }
                Effect::StopScheduler => {
                    sentinel_debug!("StopScheduler");
                    self.scheduler.stop();
                }
            }
        }
    }
}

fn map_engine_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::CycleStarted { cycle_id } => Msg::CycleStarted { cycle_id },
        EngineEvent::CycleFinished { cycle_id, report } => Msg::CycleFinished {
            cycle_id,
            outcome: map_report(report),
        },
    }
}

fn map_report(report: CycleReport) -> CycleOutcome {
    match report {
        CycleReport::ControlMissing => CycleOutcome::ControlMissing,
        CycleReport::TimedOut { attempts } => CycleOutcome::TimedOut { attempts },
        CycleReport::Settled { settlement, total } => CycleOutcome::Settled {
            is_first_run: settlement.is_first_run,
            new_items: settlement.new_items,
            total,
        },
    }
}

fn map_scheduler_event(event: SchedulerEvent) -> Msg {
    match event {
        SchedulerEvent::Tick { remaining } => Msg::SchedulerTick { remaining },
        SchedulerEvent::Expired => Msg::SchedulerExpired,
    }
}
