//! Site configuration and optional config file loading.
//!
//! File search order: `--config` path, then ./lnscrape.toml, then
//! $XDG_CONFIG_HOME/lnscrape/config.toml (or ~/.config/lnscrape/config.toml).

use crate::scraper::{ChapterMatcher, Container, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://animecenterbr.com/light-novels-2/";
pub const DEFAULT_CONTAINER_TAG: &str = "div";
pub const DEFAULT_NOVEL_CONTAINER_CLASS: &str = "container-general";
pub const DEFAULT_CHAPTER_CONTAINER_CLASS: &str = "post-text-content my-3";
pub const DEFAULT_CONTENT_CONTAINER_CLASS: &str = "post-text-content";
pub const DEFAULT_TITLE_SELECTOR: &str = "h3";
pub const DEFAULT_CHAPTER_MARKER: &str = "Capítulo";

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Novel index page.
    pub base_url: Option<String>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Directory for the chapter file. Paths are relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// Output format: text (default) or json.
    pub format: Option<String>,
    /// Word a link must contain to count as a chapter. Empty string disables filtering.
    pub chapter_marker: Option<String>,
    pub container_tag: Option<String>,
    pub novel_container_class: Option<String>,
    pub chapter_container_class: Option<String>,
    pub content_container_class: Option<String>,
    /// CSS selector for the chapter title; the first match on the page is used.
    pub title_selector: Option<String>,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
}

/// Everything the pipeline needs to know about the target site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub base_url: String,
    pub user_agent: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_secs: u64,
    pub novel_container: Container,
    pub chapter_container: Container,
    pub content_container: Container,
    pub title_selector: String,
    pub chapter_matcher: ChapterMatcher,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: BTreeMap::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            novel_container: Container::new(DEFAULT_CONTAINER_TAG, DEFAULT_NOVEL_CONTAINER_CLASS),
            chapter_container: Container::new(
                DEFAULT_CONTAINER_TAG,
                DEFAULT_CHAPTER_CONTAINER_CLASS,
            ),
            content_container: Container::new(
                DEFAULT_CONTAINER_TAG,
                DEFAULT_CONTENT_CONTAINER_CLASS,
            ),
            title_selector: DEFAULT_TITLE_SELECTOR.to_string(),
            chapter_matcher: ChapterMatcher::marker(DEFAULT_CHAPTER_MARKER),
        }
    }
}

/// An empty marker means "keep every link".
pub fn chapter_matcher_for(marker: &str) -> ChapterMatcher {
    if marker.is_empty() {
        ChapterMatcher::any()
    } else {
        ChapterMatcher::marker(marker)
    }
}

impl SiteConfig {
    /// Defaults overridden by whatever keys the file sets.
    pub fn from_file(config: Option<&Config>) -> Self {
        let mut site = Self::default();
        let Some(c) = config else {
            return site;
        };
        if let Some(ref url) = c.base_url {
            site.base_url = url.clone();
        }
        if let Some(ref ua) = c.user_agent {
            site.user_agent = ua.clone();
        }
        if let Some(secs) = c.timeout_secs {
            site.timeout_secs = secs;
        }
        if let Some(ref marker) = c.chapter_marker {
            site.chapter_matcher = chapter_matcher_for(marker);
        }
        if let Some(ref sel) = c.title_selector {
            site.title_selector = sel.clone();
        }
        let tag = c
            .container_tag
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTAINER_TAG.to_string());
        site.novel_container = Container::new(
            tag.clone(),
            c.novel_container_class
                .as_deref()
                .unwrap_or(DEFAULT_NOVEL_CONTAINER_CLASS),
        );
        site.chapter_container = Container::new(
            tag.clone(),
            c.chapter_container_class
                .as_deref()
                .unwrap_or(DEFAULT_CHAPTER_CONTAINER_CLASS),
        );
        site.content_container = Container::new(
            tag,
            c.content_container_class
                .as_deref()
                .unwrap_or(DEFAULT_CONTENT_CONTAINER_CLASS),
        );
        site.headers = c.headers.clone();
        site
    }
}

fn read_config(path: &Path) -> Result<Config, String> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
    toml::from_str(&s).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
}

/// An explicit path must exist. Otherwise search (1) ./lnscrape.toml,
/// (2) $XDG_CONFIG_HOME/lnscrape/config.toml; missing files return Ok(None).
/// Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config(explicit: Option<&Path>) -> Result<Option<Config>, String> {
    if let Some(path) = explicit {
        return read_config(path).map(Some);
    }
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("lnscrape.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("lnscrape").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            log::debug!("using config {}", path.display());
            return read_config(path).map(Some);
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let c: Config = toml::from_str("").unwrap();
        assert!(c.base_url.is_none());
        assert!(c.user_agent.is_none());
        assert!(c.timeout_secs.is_none());
        assert!(c.output_dir.is_none());
        assert!(c.format.is_none());
        assert!(c.chapter_marker.is_none());
        assert!(c.headers.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let s = r#"
            base_url = "https://mirror.example/novels/"
            user_agent = "Custom/1.0"
            timeout_secs = 10
            output_dir = "out"
            format = "json"
            chapter_marker = "Chapter"
            container_tag = "section"
            novel_container_class = "novel-list"
            chapter_container_class = "toc"
            content_container_class = "entry-content"
            title_selector = "h1.title"

            [headers]
            Accept-Language = "pt-BR"
        "#;
        let c: Config = toml::from_str(s).unwrap();
        assert_eq!(c.base_url.as_deref(), Some("https://mirror.example/novels/"));
        assert_eq!(c.timeout_secs, Some(10));
        assert_eq!(c.output_dir.as_deref(), Some(Path::new("out")));
        assert_eq!(c.format.as_deref(), Some("json"));
        assert_eq!(c.headers.get("Accept-Language").map(String::as_str), Some("pt-BR"));

        let site = SiteConfig::from_file(Some(&c));
        assert_eq!(site.base_url, "https://mirror.example/novels/");
        assert_eq!(site.user_agent, "Custom/1.0");
        assert_eq!(site.timeout_secs, 10);
        assert_eq!(site.novel_container, Container::new("section", "novel-list"));
        assert_eq!(site.chapter_container, Container::new("section", "toc"));
        assert_eq!(site.content_container, Container::new("section", "entry-content"));
        assert_eq!(site.title_selector, "h1.title");
        assert_eq!(site.chapter_matcher, ChapterMatcher::marker("Chapter"));
        assert_eq!(site.headers.len(), 1);
    }

    #[test]
    fn defaults_match_the_default_site() {
        let site = SiteConfig::from_file(None);
        assert_eq!(site, SiteConfig::default());
        assert_eq!(site.base_url, DEFAULT_BASE_URL);
        assert_eq!(site.novel_container.to_string(), "div.container-general");
        assert_eq!(site.chapter_container.to_string(), "div.post-text-content.my-3");
        assert_eq!(site.content_container.to_string(), "div.post-text-content");
        assert_eq!(site.title_selector, "h3");
        assert!(site.chapter_matcher.matches("Capítulo 3"));
        assert!(!site.chapter_matcher.matches("Discord"));
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let c: Config = toml::from_str("timeout_secs = 5").unwrap();
        let site = SiteConfig::from_file(Some(&c));
        assert_eq!(site.timeout_secs, 5);
        assert_eq!(site.base_url, DEFAULT_BASE_URL);
        assert_eq!(site.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(site.chapter_matcher, ChapterMatcher::marker(DEFAULT_CHAPTER_MARKER));
    }

    #[test]
    fn empty_marker_disables_filter() {
        let c: Config = toml::from_str(r#"chapter_marker = """#).unwrap();
        let site = SiteConfig::from_file(Some(&c));
        assert_eq!(site.chapter_matcher, ChapterMatcher::any());
    }

    #[test]
    fn invalid_toml_errors() {
        assert!(toml::from_str::<Config>("base_url = [").is_err());
    }

    #[test]
    fn explicit_config_path() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("site.toml");
        std::fs::write(&path, "user_agent = \"Test/2.0\"\n")?;
        let loaded = load_config(Some(&path))?;
        assert_eq!(
            loaded.and_then(|c| c.user_agent).as_deref(),
            Some("Test/2.0")
        );
        Ok(())
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let path = PathBuf::from("/nonexistent_dir_lnscrape_xyz/config.toml");
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.contains("Cannot read config"));
    }

    #[test]
    fn explicit_config_path_invalid_toml() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"\n")?;
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.starts_with("Invalid config"));
        Ok(())
    }
}
