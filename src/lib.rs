//! lnscrape: interactive CLI scraper that saves one light-novel chapter as text.

pub mod cli;
pub mod config;
pub mod model;
pub mod scraper;
pub mod session;
pub mod writer;

// Re-exports for CLI and consumers.
pub use config::SiteConfig;
pub use model::{ChapterDocument, LinkEntry};
pub use crate::scraper::{
    ChapterMatcher, Container, Page, PageClient, PageClientBuilder, PageSource, ScraperError,
};
pub use session::{Interaction, OutputOptions, Session, SessionError};
pub use writer::{write_chapter, OutputFormat, WriteError};
