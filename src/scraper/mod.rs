//! Fetching, parsing, and link resolution for the light-novel site.

mod client;
mod error;
mod extract;
mod select;

pub use client::{
    PageClient, PageClientBuilder, PageSource, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
pub use error::{ScraperError, SelectionKind};
pub use extract::{ChapterMatcher, Container, Page};
pub use select::{select_chapter, select_novel};

use reqwest::Url;

/// Fetch `url` through `source` and parse it.
pub fn fetch_page(
    source: &mut dyn PageSource,
    url: &Url,
    context: &str,
) -> Result<Page, ScraperError> {
    let markup = source.fetch(url.as_str(), context)?;
    Ok(Page::parse(url.clone(), context, &markup))
}

/// Parse a user- or config-supplied URL.
pub fn parse_url(input: &str) -> Result<Url, ScraperError> {
    Url::parse(input.trim()).map_err(|e| ScraperError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })
}
