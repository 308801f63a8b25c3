#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin periodic monitoring: one immediate check, then the cadence.
    StartRequested,
    /// Halt the cadence. Cycles already running finish on their own.
    StopRequested,
    /// Run a single check without touching the scheduler.
    CheckRequested,
    /// Scheduler countdown step.
    SchedulerTick { remaining: u64 },
    /// Scheduler window elapsed.
    SchedulerExpired,
    /// Engine began a cycle.
    CycleStarted { cycle_id: crate::CycleId },
    /// Engine completed a cycle.
    CycleFinished {
        cycle_id: crate::CycleId,
        outcome: crate::CycleOutcome,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}
