use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER, USER_AGENT};
use std::time::Duration;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Origin of the listing page and the deliverable CSV. Also sent as `Referer`.
pub const SITE_ROOT: &str = "https://www.nseindia.com";

/// Reference list, warm-up and listing page calls.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(30);
/// Main CSV download.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// GET-only transport shared by every network stage of a run.
///
/// An `Err` means the request never produced a response (DNS, TLS, timeout,
/// body read). Status handling is left to the caller.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse>;
}

/// One cookie-carrying client per run, with the browser-like headers the
/// origin requires attached to every request.
#[derive(Debug, Clone)]
pub struct HttpSession {
    http: reqwest::Client,
}

impl HttpSession {
    pub fn new() -> Result<Self> {
        Self::with_referer(SITE_ROOT)
    }

    pub fn with_referer(referer: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(REFERER, HeaderValue::from_str(referer)?);

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .context("failed to build http session")?;

        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for HttpSession {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        let res = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .context("request failed")?;

        let status = res.status().as_u16();
        let body = res.text().await.context("failed to read response body")?;
        tracing::debug!(%url, status, body_len = body.len(), "http get");

        Ok(HttpResponse { status, body })
    }
}
