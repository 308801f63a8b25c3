//! Sentinel core: pure monitor state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, CycleId, CycleOutcome, MonitorState, DEFAULT_PERIOD_SECS};
pub use update::update;
pub use view_model::{format_countdown, AppViewModel, StatusLine, StatusTone};
