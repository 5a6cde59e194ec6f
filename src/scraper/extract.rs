//! Parsed pages and extraction: listing containers, chapter filtering, chapter text.

use crate::model::{ChapterDocument, LinkEntry};
use crate::scraper::error::ScraperError;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::fmt;

/// Parse a CSS selector or return an error (avoids panics from Selector::parse).
fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::InvalidSelector {
        selector: sel.to_string(),
        reason: e.to_string(),
    })
}

/// Element collected text, as it appears in the markup.
fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// Link text used for matching user input.
fn link_text(el: ElementRef<'_>) -> String {
    element_text(el).trim().to_string()
}

/// A structural element identified by tag name and class attribute.
///
/// `class` may hold several space-separated classes; an element matches when it
/// carries all of them, in any order and alongside other classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub tag: String,
    pub class: String,
}

impl Container {
    pub fn new(tag: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            class: class.into(),
        }
    }

    /// A blank class identifier matches nothing.
    fn matches(&self, el: &ElementRef<'_>) -> bool {
        let value = el.value();
        let mut wanted = self.class.split_whitespace().peekable();
        wanted.peek().is_some() && wanted.all(|w| value.classes().any(|c| c == w))
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)?;
        for class in self.class.split_whitespace() {
            write!(f, ".{}", class)?;
        }
        Ok(())
    }
}

/// Keeps chapter links whose text contains a marker word ("Capítulo" on the
/// default site). With no marker every link is kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChapterMatcher {
    marker: Option<String>,
}

impl ChapterMatcher {
    pub fn marker(word: impl Into<String>) -> Self {
        Self {
            marker: Some(word.into()),
        }
    }

    pub fn any() -> Self {
        Self { marker: None }
    }

    pub fn matches(&self, text: &str) -> bool {
        match &self.marker {
            Some(word) => text.contains(word.as_str()),
            None => true,
        }
    }

    /// Retain matching links, preserving order.
    pub fn filter(&self, links: Vec<LinkEntry>) -> Vec<LinkEntry> {
        links.into_iter().filter(|l| self.matches(&l.text)).collect()
    }
}

/// A fetched page: where it came from and its parsed tree.
pub struct Page {
    pub url: Url,
    /// Pipeline stage label used in error messages.
    pub context: String,
    document: Html,
}

impl Page {
    /// Parse markup. Malformed HTML yields a best-effort tree, never an error.
    pub fn parse(url: Url, context: impl Into<String>, markup: &str) -> Self {
        Self {
            url,
            context: context.into(),
            document: Html::parse_document(markup),
        }
    }

    fn container_not_found(&self, container: &Container) -> ScraperError {
        ScraperError::ContainerNotFound {
            container: container.to_string(),
            page: format!("{} ({})", self.context, self.url),
        }
    }

    /// First element matching the container, in document order.
    fn find_container(&self, container: &Container) -> Result<ElementRef<'_>, ScraperError> {
        let tag_sel = parse_selector(&container.tag)?;
        self.document
            .select(&tag_sel)
            .find(|el| container.matches(el))
            .ok_or_else(|| self.container_not_found(container))
    }

    /// All anchors inside the first matching container, in document order.
    pub fn find_links(&self, container: &Container) -> Result<Vec<LinkEntry>, ScraperError> {
        let root = self.find_container(container)?;
        let a_sel = parse_selector("a")?;
        let links: Vec<LinkEntry> = root
            .select(&a_sel)
            .map(|a| LinkEntry {
                text: link_text(a),
                href: a.value().attr("href").map(String::from),
            })
            .collect();
        log::debug!(
            "{}: {} links in {}",
            self.context,
            links.len(),
            container
        );
        Ok(links)
    }

    /// Chapter links: anchors in the container that the matcher accepts.
    pub fn chapter_links(
        &self,
        container: &Container,
        matcher: &ChapterMatcher,
    ) -> Result<Vec<LinkEntry>, ScraperError> {
        let links = matcher.filter(self.find_links(container)?);
        log::debug!("{}: {} chapter links after filter", self.context, links.len());
        Ok(links)
    }

    /// Title from the first `title_selector` match anywhere on the page; paragraphs
    /// from every `p` inside the first content container.
    pub fn chapter_document(
        &self,
        title_selector: &str,
        content: &Container,
    ) -> Result<ChapterDocument, ScraperError> {
        let title_sel = parse_selector(title_selector)?;
        let title = self
            .document
            .select(&title_sel)
            .next()
            .map(element_text)
            .ok_or_else(|| ScraperError::MissingTitle {
                selector: title_selector.to_string(),
                page: format!("{} ({})", self.context, self.url),
            })?;

        let root = self.find_container(content)?;
        let p_sel = parse_selector("p")?;
        let paragraphs = root.select(&p_sel).map(element_text).collect();

        Ok(ChapterDocument {
            title,
            paragraphs,
            source_url: Some(self.url.to_string()),
        })
    }
}
