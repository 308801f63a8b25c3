use crate::MonitorState;

/// Severity of the status line, used for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTone {
    #[default]
    Idle,
    Busy,
    Normal,
    Alert,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusLine {
    pub fn new(text: impl Into<String>, tone: StatusTone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub monitor: MonitorState,
    pub period_secs: u64,
    pub in_flight: usize,
    pub cycles_completed: u64,
    pub last_total: Option<usize>,
    pub last_new_items: Vec<String>,
    pub status: StatusLine,
    pub dirty: bool,
}

pub fn format_countdown(remaining_secs: u64) -> String {
    format!(
        "monitoring | refresh in {}m {}s",
        remaining_secs / 60,
        remaining_secs % 60
    )
}
