//! The document substrate the monitor drives: one clickable query control and
//! a set of named frames whose HTML is re-rendered asynchronously.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use scraper::{Html, Selector};
use sentinel_logging::{sentinel_debug, sentinel_warn};

use crate::fetch::Fetcher;

#[async_trait::async_trait]
pub trait Page: Send + Sync {
    /// Whether an element matching `selector` exists right now.
    async fn has_control(&self, selector: &str) -> bool;
    /// Activates the control once. Returns `false` when it does not exist.
    async fn click(&self, selector: &str) -> bool;
    /// Current HTML of the named frame, or `None` while it is unreachable.
    async fn frame_html(&self, frame_name: &str) -> Option<String>;
}

type Frames = Arc<Mutex<HashMap<String, String>>>;

fn lock_frames(frames: &Frames) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
    frames.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory page. Controls may publish a frame document when clicked.
#[derive(Debug, Default)]
pub struct StaticPage {
    controls: Mutex<HashMap<String, Option<(String, String)>>>,
    frames: Frames,
    clicks: Mutex<usize>,
}

impl StaticPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a control that does nothing when clicked.
    pub fn with_control(self, selector: impl Into<String>) -> Self {
        self.lock_controls().insert(selector.into(), None);
        self
    }

    /// Adds a control that replaces `frame_name` with `html` when clicked.
    pub fn with_publishing_control(
        self,
        selector: impl Into<String>,
        frame_name: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        self.lock_controls()
            .insert(selector.into(), Some((frame_name.into(), html.into())));
        self
    }

    pub fn set_frame(&self, frame_name: impl Into<String>, html: impl Into<String>) {
        lock_frames(&self.frames).insert(frame_name.into(), html.into());
    }

    pub fn remove_frame(&self, frame_name: &str) {
        lock_frames(&self.frames).remove(frame_name);
    }

    pub fn remove_control(&self, selector: &str) {
        self.lock_controls().remove(selector);
    }

    pub fn click_count(&self) -> usize {
        *self.clicks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_controls(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<String, Option<(String, String)>>> {
        self.controls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl Page for StaticPage {
    async fn has_control(&self, selector: &str) -> bool {
        self.lock_controls().contains_key(selector)
    }

    async fn click(&self, selector: &str) -> bool {
        let publish = match self.lock_controls().get(selector) {
            Some(publish) => publish.clone(),
            None => return false,
        };
        *self.clicks.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        if let Some((frame_name, html)) = publish {
            self.set_frame(frame_name, html);
        }
        true
    }

    async fn frame_html(&self, frame_name: &str) -> Option<String> {
        lock_frames(&self.frames).get(frame_name).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpPageSettings {
    /// Page that hosts the query control.
    pub host_url: String,
    /// Request issued when the control is activated; its body becomes the frame.
    pub action_url: String,
    /// Frame that receives the action response.
    pub frame_name: String,
}

/// Page backed by HTTP. Clicking the control clears the target frame and
/// starts a background request whose decoded body becomes the frame document
/// once it arrives.
pub struct HttpPage {
    settings: HttpPageSettings,
    fetcher: Arc<dyn Fetcher>,
    frames: Frames,
}

impl HttpPage {
    pub fn new(settings: HttpPageSettings, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            settings,
            fetcher,
            frames: Frames::default(),
        }
    }
}

#[async_trait::async_trait]
impl Page for HttpPage {
    async fn has_control(&self, selector: &str) -> bool {
        match self.fetcher.fetch_document(&self.settings.host_url).await {
            Ok(document) => document_matches(&document.html, selector),
            Err(err) => {
                sentinel_warn!(
                    "Could not load host page {}: {}",
                    self.settings.host_url,
                    err
                );
                false
            }
        }
    }

    async fn click(&self, selector: &str) -> bool {
        if !self.has_control(selector).await {
            return false;
        }

        let frame_name = self.settings.frame_name.clone();
        lock_frames(&self.frames).remove(&frame_name);

        let fetcher = self.fetcher.clone();
        let frames = self.frames.clone();
        let action_url = self.settings.action_url.clone();
        tokio::spawn(async move {
            match fetcher.fetch_document(&action_url).await {
                Ok(document) => {
                    sentinel_debug!(
                        "Frame {} rendered from {} ({} bytes, {})",
                        frame_name,
                        document.url,
                        document.html.len(),
                        document.encoding
                    );
                    lock_frames(&frames).insert(frame_name, document.html);
                }
                Err(err) => sentinel_warn!("Query request {} failed: {}", action_url, err),
            }
        });
        true
    }

    async fn frame_html(&self, frame_name: &str) -> Option<String> {
        lock_frames(&self.frames).get(frame_name).cloned()
    }
}

fn document_matches(html: &str, selector: &str) -> bool {
    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(err) => {
            sentinel_warn!("Invalid control selector {:?}: {:?}", selector, err);
            return false;
        }
    };
    Html::parse_document(html).select(&selector).next().is_some()
}
