use std::collections::BTreeSet;

use crate::view_model::{AppViewModel, StatusLine, StatusTone};

pub type CycleId = u64;

/// Five minutes between checks unless configured otherwise.
pub const DEFAULT_PERIOD_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    #[default]
    Idle,
    Running,
}

/// How a cycle ended, as far as the orchestrator cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    ControlMissing,
    TimedOut {
        attempts: u32,
    },
    Settled {
        is_first_run: bool,
        new_items: Vec<String>,
        total: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    monitor: MonitorState,
    period_secs: u64,
    next_cycle_id: CycleId,
    in_flight: BTreeSet<CycleId>,
    status: StatusLine,
    last_total: Option<usize>,
    last_new_items: Vec<String>,
    cycles_completed: u64,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD_SECS)
    }
}

impl AppState {
    /// A period of zero is treated as one second.
    pub fn new(period_secs: u64) -> Self {
        Self {
            monitor: MonitorState::Idle,
            period_secs: period_secs.max(1),
            next_cycle_id: 1,
            in_flight: BTreeSet::new(),
            status: StatusLine::new("idle", StatusTone::Idle),
            last_total: None,
            last_new_items: Vec::new(),
            cycles_completed: 0,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            monitor: self.monitor,
            period_secs: self.period_secs,
            in_flight: self.in_flight.len(),
            cycles_completed: self.cycles_completed,
            last_total: self.last_total,
            last_new_items: self.last_new_items.clone(),
            status: self.status.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether the status changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn monitor(&self) -> MonitorState {
        self.monitor
    }

    pub fn period_secs(&self) -> u64 {
        self.period_secs
    }

    pub(crate) fn has_cycle_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub(crate) fn set_monitor(&mut self, monitor: MonitorState) {
        self.monitor = monitor;
    }

    pub(crate) fn allocate_cycle_id(&mut self) -> CycleId {
        let id = self.next_cycle_id;
        self.next_cycle_id += 1;
        id
    }

    pub(crate) fn begin_cycle(&mut self, cycle_id: CycleId) {
        self.in_flight.insert(cycle_id);
    }

    pub(crate) fn finish_cycle(&mut self, cycle_id: CycleId, outcome: &CycleOutcome) {
        self.in_flight.remove(&cycle_id);
        self.cycles_completed += 1;
        if let CycleOutcome::Settled {
            new_items, total, ..
        } = outcome
        {
            self.last_total = Some(*total);
            if !new_items.is_empty() {
                self.last_new_items = new_items.clone();
            }
        }
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        let status = StatusLine::new(text, tone);
        if self.status != status {
            self.status = status;
            self.dirty = true;
        }
    }
}
