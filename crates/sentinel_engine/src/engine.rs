use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use sentinel_logging::sentinel_debug;

use crate::cycle::Monitor;
use crate::{CycleId, EngineEvent};

enum EngineCommand {
    RunCycle { cycle_id: CycleId },
    Probe { reply: mpsc::Sender<bool> },
}

type EventCallback = Arc<dyn Fn(EngineEvent) + Send + Sync>;

/// Runs monitor cycles on a dedicated thread that owns a tokio runtime.
///
/// Each cycle is its own task, so a slow cycle never blocks the next request.
/// Dropping the handle shuts the runtime down and abandons in-flight cycles.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new<F>(monitor: Monitor, on_event: F) -> io::Result<Self>
    where
        F: Fn(EngineEvent) + Send + Sync + 'static,
    {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let monitor = Arc::new(monitor);
        let on_event: EventCallback = Arc::new(on_event);

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let monitor = monitor.clone();
                let on_event = on_event.clone();
                runtime.spawn(async move {
                    handle_command(monitor.as_ref(), command, on_event.as_ref()).await;
                });
            }
            sentinel_debug!("Engine command channel closed");
        });

        Ok(Self { cmd_tx })
    }

    pub fn run_cycle(&self, cycle_id: CycleId) {
        let _ = self.cmd_tx.send(EngineCommand::RunCycle { cycle_id });
    }

    /// Blocks until the engine reports whether the query control exists.
    pub fn probe(&self) -> bool {
        let (reply, rx) = mpsc::channel();
        if self.cmd_tx.send(EngineCommand::Probe { reply }).is_err() {
            return false;
        }
        rx.recv().unwrap_or(false)
    }
}

async fn handle_command(
    monitor: &Monitor,
    command: EngineCommand,
    on_event: &(dyn Fn(EngineEvent) + Send + Sync),
) {
    match command {
        EngineCommand::RunCycle { cycle_id } => {
            on_event(EngineEvent::CycleStarted { cycle_id });
            let report = monitor.run_cycle().await;
            on_event(EngineEvent::CycleFinished { cycle_id, report });
        }
        EngineCommand::Probe { reply } => {
            let _ = reply.send(monitor.probe().await);
        }
    }
}
