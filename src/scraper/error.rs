//! Shared error type for fetching, extraction, and selection.

use std::fmt;
use thiserror::Error;

/// Which list a user selection was matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Novel,
    Chapter,
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionKind::Novel => f.write_str("novel"),
            SelectionKind::Chapter => f.write_str("chapter"),
        }
    }
}

/// Scraper error for HTTP, page structure, and user selection.
#[derive(Debug, Error)]
pub enum ScraperError {
    // Transport
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Invalid request header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to create HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("Network error: could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} when fetching {context}: {url}")]
    HttpStatus {
        status: u16,
        url: String,
        /// Pipeline stage the fetch belonged to (e.g. "novel index", "chapter page").
        context: String,
    },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Page structure
    #[error("Could not find container '{container}' on {page}. The site layout may have changed.")]
    ContainerNotFound { container: String, page: String },

    #[error("Chapter page {page} has no title element matching '{selector}'.")]
    MissingTitle { selector: String, page: String },

    #[error("Link '{text}' has no target URL.")]
    MissingHref { text: String },

    #[error("Invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    // Selection
    #[error("No {kind} found matching '{key}'.")]
    SelectionNotFound { kind: SelectionKind, key: String },
}

impl ScraperError {
    /// True when the failure came from what the user typed rather than from the site.
    pub fn is_selection(&self) -> bool {
        matches!(self, ScraperError::SelectionNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_message_echoes_key() {
        let e = ScraperError::SelectionNotFound {
            kind: SelectionKind::Novel,
            key: "solo leveling".to_string(),
        };
        assert_eq!(e.to_string(), "No novel found matching 'solo leveling'.");
        assert!(e.is_selection());
    }

    #[test]
    fn container_message_names_container_and_page() {
        let e = ScraperError::ContainerNotFound {
            container: "div.container-general".to_string(),
            page: "novel index".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("div.container-general"));
        assert!(msg.contains("novel index"));
        assert!(!e.is_selection());
    }

    #[test]
    fn http_status_message_names_stage() {
        let e = ScraperError::HttpStatus {
            status: 404,
            url: "https://example.com/x".to_string(),
            context: "chapter page".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "HTTP 404 when fetching chapter page: https://example.com/x"
        );
    }
}
