//! The interactive run: novel index -> novel -> chapter -> file.
//!
//! Every stage consumes the previous stage's output; any failure ends the run.

use crate::config::SiteConfig;
use crate::model::{ChapterDocument, LinkEntry};
use crate::scraper::{
    fetch_page, parse_url, select_chapter, select_novel, Page, PageSource, ScraperError,
};
use crate::writer::{output_file_name, write_chapter, OutputFormat, WriteError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub const NOVEL_PROMPT: &str = "Enter the novel name: ";
pub const CHAPTER_PROMPT: &str = "Enter the chapter number: ";

/// How the run talks to the user: show a listing, ask a question.
pub trait Interaction {
    fn show_choices(&mut self, heading: &str, entries: &[LinkEntry]);
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("Could not read {what}: {source}")]
    Input {
        what: &'static str,
        #[source]
        source: io::Error,
    },
}

/// Where and how the chapter file is written.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub dir: PathBuf,
    pub format: OutputFormat,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            format: OutputFormat::Text,
        }
    }
}

/// A listing page and the links extracted from it.
pub struct Listing {
    pub page: Page,
    pub links: Vec<LinkEntry>,
}

/// One scraping run against a configured site.
pub struct Session<'a> {
    source: &'a mut dyn PageSource,
    site: &'a SiteConfig,
}

impl<'a> Session<'a> {
    pub fn new(source: &'a mut dyn PageSource, site: &'a SiteConfig) -> Self {
        Self { source, site }
    }

    /// Fetch the base URL and extract the novel links.
    pub fn novel_index(&mut self) -> Result<Listing, ScraperError> {
        let url = parse_url(&self.site.base_url)?;
        let page = fetch_page(self.source, &url, "novel index")?;
        let links = page.find_links(&self.site.novel_container)?;
        Ok(Listing { page, links })
    }

    /// Follow a novel link and extract its chapter links.
    pub fn chapter_listing(
        &mut self,
        index: &Page,
        novel: &LinkEntry,
    ) -> Result<Listing, ScraperError> {
        let url = novel.target(&index.url)?;
        let page = fetch_page(self.source, &url, "novel page")?;
        let links = page.chapter_links(&self.site.chapter_container, &self.site.chapter_matcher)?;
        Ok(Listing { page, links })
    }

    /// Follow a chapter link and extract title and paragraphs.
    pub fn chapter(
        &mut self,
        listing: &Page,
        chapter: &LinkEntry,
    ) -> Result<ChapterDocument, ScraperError> {
        let url = chapter.target(&listing.url)?;
        let page = fetch_page(self.source, &url, "chapter page")?;
        page.chapter_document(&self.site.title_selector, &self.site.content_container)
    }

    /// Run the whole flow and return the path of the written file.
    pub fn run(
        &mut self,
        interaction: &mut dyn Interaction,
        output: &OutputOptions,
    ) -> Result<PathBuf, SessionError> {
        let index = self.novel_index()?;
        interaction.show_choices("Novels", &index.links);
        let novel_name = ask(interaction, NOVEL_PROMPT, "novel name")?;
        let novel = select_novel(&index.links, &novel_name)?;
        log::info!("novel: {}", novel.text);

        let listing = self.chapter_listing(&index.page, novel)?;
        interaction.show_choices("Chapters", &listing.links);
        let chapter_key = ask(interaction, CHAPTER_PROMPT, "chapter number")?;
        let chapter = select_chapter(&listing.links, &chapter_key)?;
        log::info!("chapter: {}", chapter.text);

        let doc = self.chapter(&listing.page, chapter)?;
        let path = output
            .dir
            .join(output_file_name(&novel_name, &chapter_key, output.format));
        write_chapter(&doc, &path, output.format)?;
        Ok(path)
    }
}

fn ask(
    interaction: &mut dyn Interaction,
    question: &str,
    what: &'static str,
) -> Result<String, SessionError> {
    let answer = interaction
        .ask(question)
        .map_err(|source| SessionError::Input { what, source })?;
    Ok(answer.trim().to_string())
}
