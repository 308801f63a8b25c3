#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RunCycle { cycle_id: crate::CycleId },
    StartScheduler { period_secs: u64 },
    StopScheduler,
}
