use sentinel_logging::sentinel_info;
use thiserror::Error;

use crate::page::Page;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("action control `{selector}` not found")]
    ActionControlMissing { selector: String },
}

/// Activates the query control once so the remote document starts re-rendering.
pub async fn fire(page: &dyn Page, selector: &str) -> Result<(), TriggerError> {
    if !page.click(selector).await {
        return Err(TriggerError::ActionControlMissing {
            selector: selector.to_string(),
        });
    }
    sentinel_info!("Clicked query control {}", selector);
    Ok(())
}
