//! Resolve what the user typed to one of the extracted links.
//!
//! Novels match on the exact link text; chapters match when the key appears
//! anywhere in the link text ("12" finds "Capítulo 12: O Retorno"). The first
//! match wins in both cases; duplicate texts are not reported.

use crate::model::LinkEntry;
use crate::scraper::error::{ScraperError, SelectionKind};

fn not_found(kind: SelectionKind, key: &str) -> ScraperError {
    ScraperError::SelectionNotFound {
        kind,
        key: key.to_string(),
    }
}

/// Exact, case-sensitive match on the link text.
pub fn select_novel<'a>(links: &'a [LinkEntry], key: &str) -> Result<&'a LinkEntry, ScraperError> {
    if key.is_empty() {
        return Err(not_found(SelectionKind::Novel, key));
    }
    let found = links
        .iter()
        .find(|l| l.text == key)
        .ok_or_else(|| not_found(SelectionKind::Novel, key))?;
    log::debug!("novel '{}' -> {:?}", key, found.href);
    Ok(found)
}

/// Substring match on the link text.
pub fn select_chapter<'a>(
    links: &'a [LinkEntry],
    key: &str,
) -> Result<&'a LinkEntry, ScraperError> {
    // An empty key would match every link.
    if key.is_empty() {
        return Err(not_found(SelectionKind::Chapter, key));
    }
    let found = links
        .iter()
        .find(|l| l.text.contains(key))
        .ok_or_else(|| not_found(SelectionKind::Chapter, key))?;
    log::debug!("chapter '{}' -> '{}' {:?}", key, found.text, found.href);
    Ok(found)
}
