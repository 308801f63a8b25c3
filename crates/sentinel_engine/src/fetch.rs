//! HTTP access for the page adapter. Every response is size-capped and
//! decoded to UTF-8 here, so the page only ever sees document text.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use sentinel_logging::sentinel_info;

use crate::decode::decode_html;
use crate::{FailureKind, FetchError};

/// Media types a results page or frame may be served as.
const MARKUP_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            user_agent: concat!("sentinel/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// A fetched document, already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    /// Address after redirects.
    pub url: String,
    pub html: String,
    pub encoding: String,
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_document(&self, url: &str) -> Result<PageDocument, FetchError>;
}

/// One `reqwest` client shared by the host-page check and every query request.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            max_bytes: settings.max_bytes,
        })
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.max_bytes,
                actual: Some(actual),
            },
            "document too large",
        )
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        if let Some(declared) = response.content_length() {
            if declared > self.max_bytes {
                return Err(self.too_large(declared));
            }
        }
        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(classify)?;
            let len = (body.len() + chunk.len()) as u64;
            if len > self.max_bytes {
                return Err(self.too_large(len));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch_document(&self, url: &str) -> Result<PageDocument, FetchError> {
        let target = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let response = self.client.get(target).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{url} answered {status}"),
            ));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        if let Some(ct) = content_type.as_deref().filter(|ct| !is_markup(ct)) {
            return Err(FetchError::new(
                FailureKind::UnsupportedContentType {
                    content_type: ct.to_string(),
                },
                format!("{url} is not a document"),
            ));
        }

        let body = self.read_body(response).await?;
        let decoded = decode_html(&body, content_type.as_deref());
        if decoded.had_errors {
            sentinel_info!(
                "Document {} had malformed {} sequences",
                final_url,
                decoded.encoding_label
            );
        }
        Ok(PageDocument {
            url: final_url,
            html: decoded.html,
            encoding: decoded.encoding_label,
        })
    }
}

fn is_markup(content_type: &str) -> bool {
    let media = content_type.split(';').next().unwrap_or_default().trim();
    MARKUP_TYPES.iter().any(|t| t.eq_ignore_ascii_case(media))
}

fn classify(err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_redirect() {
        FailureKind::RedirectLimitExceeded
    } else {
        FailureKind::Network
    };
    FetchError::new(kind, err.to_string())
}
