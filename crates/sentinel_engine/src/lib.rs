//! Sentinel engine: page access, extraction, polling, scheduling and baseline IO.
mod baseline;
mod cycle;
mod decode;
mod engine;
mod extract;
mod fetch;
mod notify;
mod page;
mod persist;
mod poll;
mod scheduler;
mod settle;
mod trigger;
mod types;

pub use baseline::{BaselineStore, FileBaselineStore, MemoryBaselineStore, BASELINE_FILENAME};
pub use cycle::{Monitor, MonitorSettings, DEFAULT_CONTROL_SELECTOR};
pub use decode::{decode_html, DecodedHtml};
pub use engine::EngineHandle;
pub use extract::{
    item_name, TableExtractor, DEFAULT_CONTAINER_ID, DEFAULT_FRAME_NAME, MIN_ITEM_NAME_CHARS,
};
pub use fetch::{FetchSettings, Fetcher, PageDocument, ReqwestFetcher};
pub use notify::{DesktopNotifier, LogNotifier, Notification, Notifier};
pub use page::{HttpPage, HttpPageSettings, Page, StaticPage};
pub use persist::{ensure_state_dir, AtomicFileWriter, PersistError};
pub use poll::{poll_until_found, PollSettings};
pub use scheduler::{Countdown, SchedulerEvent, SchedulerHandle, SchedulerState, DEFAULT_STEP};
pub use settle::{
    first_run_notification, new_items, new_items_notification, Settlement, Settler,
};
pub use trigger::{fire, TriggerError};
pub use types::{
    CycleId, CycleReport, EngineEvent, ExtractionResult, FailureKind, FetchError, ItemList,
    MonitorKey,
};
