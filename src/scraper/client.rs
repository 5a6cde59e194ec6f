//! Blocking HTTP client with a fixed header set and request timeout.

use crate::scraper::error::ScraperError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Browser identity sent by default; the site rejects obvious bot user agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// Anything that can turn a URL into page markup.
///
/// `context` names the pipeline stage ("novel index", "chapter page", ...) and is
/// carried into errors so the user can tell which fetch failed.
pub trait PageSource {
    fn fetch(&mut self, url: &str, context: &str) -> Result<String, ScraperError>;
}

/// Blocking HTTP client. One GET per fetch, no retries.
#[derive(Debug)]
pub struct PageClient {
    inner: reqwest::blocking::Client,
}

impl PageClient {
    pub fn builder() -> PageClientBuilder {
        PageClientBuilder::default()
    }
}

impl PageSource for PageClient {
    fn fetch(&mut self, url: &str, context: &str) -> Result<String, ScraperError> {
        log::debug!("GET {} ({})", url, context);
        let response = self
            .inner
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network {
                url: url.to_string(),
                source: e,
            })?;
        check_response(response, url, context)
    }
}

/// Check response status and read body as text. Returns body or ScraperError.
fn check_response(
    response: reqwest::blocking::Response,
    url: &str,
    context: &str,
) -> Result<String, ScraperError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
            context: context.to_string(),
        });
    }
    let body = response.text().map_err(|e| ScraperError::BodyRead {
        url: url.to_string(),
        source: e,
    })?;
    log::debug!("{}: {} bytes", url, body.len());
    Ok(body)
}

/// Builder for PageClient with optional User-Agent, extra headers, and timeout.
#[derive(Debug)]
pub struct PageClientBuilder {
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
    timeout_secs: u64,
}

impl Default for PageClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            headers: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PageClientBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set request timeout in seconds (connect and read). Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn default_headers(&self) -> Result<HeaderMap, ScraperError> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ScraperError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| ScraperError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    pub fn build(self) -> Result<PageClient, ScraperError> {
        let headers = self.default_headers()?;
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let timeout = Duration::from_secs(self.timeout_secs);
        let inner = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .default_headers(headers)
            .connect_timeout(timeout)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ScraperError::ClientBuild { source: e })?;
        Ok(PageClient { inner })
    }
}
