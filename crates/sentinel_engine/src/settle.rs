//! Diff the freshly extracted list against the stored baseline, persist it
//! and request at most one notification.

use std::collections::HashSet;
use std::sync::Arc;

use sentinel_logging::{sentinel_debug, sentinel_info};

use crate::baseline::BaselineStore;
use crate::notify::{Notification, Notifier};
use crate::{ItemList, MonitorKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub is_first_run: bool,
    pub new_items: ItemList,
}

/// Every element of `current` whose name is not in `baseline`, in order,
/// duplicates preserved.
pub fn new_items(current: &[String], baseline: &[String]) -> ItemList {
    let known: HashSet<&str> = baseline.iter().map(String::as_str).collect();
    current
        .iter()
        .filter(|item| !known.contains(item.as_str()))
        .cloned()
        .collect()
}

pub fn first_run_notification(items: &[String]) -> Notification {
    Notification {
        title: "Sentinel armed".to_string(),
        body: format!("Monitoring started. Currently listed:\n{}", items.join(", ")),
        sticky: false,
    }
}

pub fn new_items_notification(items: &[String]) -> Notification {
    let lines = items
        .iter()
        .map(|item| format!("-> {item}"))
        .collect::<Vec<_>>()
        .join("\n");
    Notification {
        title: "New results published".to_string(),
        body: format!("{} new:\n{lines}", items.len()),
        sticky: true,
    }
}

#[derive(Clone)]
pub struct Settler {
    store: Arc<dyn BaselineStore>,
    notifier: Arc<dyn Notifier>,
}

impl Settler {
    pub fn new(store: Arc<dyn BaselineStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub fn settle(&self, key: &MonitorKey, current: ItemList) -> Settlement {
        let Some(baseline) = self.store.get(key) else {
            sentinel_info!("First observation for {}: {} items", key, current.len());
            self.store.set(key, &current);
            self.notifier.notify(&first_run_notification(&current));
            return Settlement {
                is_first_run: true,
                new_items: current,
            };
        };

        let fresh = new_items(&current, &baseline);
        if fresh.is_empty() {
            sentinel_debug!("No new items for {} ({} listed)", key, current.len());
        } else {
            sentinel_info!("{} new items for {}: {:?}", fresh.len(), key, fresh);
            self.store.set(key, &current);
            self.notifier.notify(&new_items_notification(&fresh));
        }
        Settlement {
            is_first_run: false,
            new_items: fresh,
        }
    }
}
