//! Data extracted from the site: links on listing pages and the chapter text.

use crate::scraper::ScraperError;
use reqwest::Url;
use serde::Serialize;

/// One anchor from a listing container: display text and raw `href`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// Anchor text, whitespace-trimmed. Used for matching user input.
    pub text: String,
    /// Raw `href` attribute; `None` when the anchor has none.
    pub href: Option<String>,
}

impl LinkEntry {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
        }
    }

    /// Resolve the target against the URL of the page the link was found on.
    pub fn target(&self, page_url: &Url) -> Result<Url, ScraperError> {
        let href = self
            .href
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| ScraperError::MissingHref {
                text: self.text.clone(),
            })?;
        page_url
            .join(href.trim())
            .map_err(|e| ScraperError::InvalidUrl {
                input: href.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Title and paragraphs of one chapter page, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterDocument {
    pub title: String,
    pub paragraphs: Vec<String>,
    /// Page the chapter was extracted from.
    #[serde(rename = "sourceUrl", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}
