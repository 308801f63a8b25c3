use std::sync::Arc;

use sentinel_logging::sentinel_warn;

use crate::baseline::BaselineStore;
use crate::extract::TableExtractor;
use crate::notify::Notifier;
use crate::page::Page;
use crate::poll::{poll_until_found, PollSettings};
use crate::settle::Settler;
use crate::trigger::fire;
use crate::{CycleReport, ExtractionResult, MonitorKey};

pub const DEFAULT_CONTROL_SELECTOR: &str = r#"button.opt-b-btn[onclick*="queryKscj"]"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    pub key: MonitorKey,
    pub control_selector: String,
    pub extractor: TableExtractor,
    pub poll: PollSettings,
}

impl MonitorSettings {
    pub fn new(key: MonitorKey) -> Self {
        Self {
            key,
            control_selector: DEFAULT_CONTROL_SELECTOR.to_string(),
            extractor: TableExtractor::default(),
            poll: PollSettings::default(),
        }
    }
}

/// One monitored target: trigger, poll, settle.
pub struct Monitor {
    settings: MonitorSettings,
    page: Arc<dyn Page>,
    settler: Settler,
}

impl Monitor {
    pub fn new(
        settings: MonitorSettings,
        page: Arc<dyn Page>,
        store: Arc<dyn BaselineStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            page,
            settler: Settler::new(store, notifier),
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Whether the query control can be found at all.
    pub async fn probe(&self) -> bool {
        self.page.has_control(&self.settings.control_selector).await
    }

    pub async fn run_cycle(&self) -> CycleReport {
        if let Err(err) = fire(self.page.as_ref(), &self.settings.control_selector).await {
            sentinel_warn!("Cycle aborted: {}", err);
            return CycleReport::ControlMissing;
        }

        let page = self.page.as_ref();
        let extractor = &self.settings.extractor;
        match poll_until_found(&self.settings.poll, |_| extractor.extract(page)).await {
            ExtractionResult::Found(items) => {
                let total = items.len();
                let settler = self.settler.clone();
                let key = self.settings.key.clone();
                // Store writes and notifier launches block.
                let settlement =
                    match tokio::task::spawn_blocking(move || settler.settle(&key, items)).await {
                        Ok(settlement) => settlement,
                        Err(err) => std::panic::resume_unwind(err.into_panic()),
                    };
                CycleReport::Settled { settlement, total }
            }
            ExtractionResult::NotFound => CycleReport::TimedOut {
                attempts: self.settings.poll.max_attempts,
            },
        }
    }
}
