//! CLI parsing and orchestration. Parses args, builds the site config and client,
//! runs the interactive session, maps errors to exit codes.

use crate::config::{self, chapter_matcher_for, SiteConfig};
use crate::model::LinkEntry;
use crate::scraper::{ChapterMatcher, PageClient, PageSource, ScraperError};
use crate::session::{
    Interaction, OutputOptions, Session, SessionError, CHAPTER_PROMPT, NOVEL_PROMPT,
};
use crate::writer::OutputFormat;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Session(SessionError::Input { .. }) => 1,
            CliRunError::Session(SessionError::Scraper(e)) if e.is_selection() => 1,
            CliRunError::Session(SessionError::Scraper(_)) => 2,
            CliRunError::Session(SessionError::Write(_)) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "lnscrape")]
#[command(about = "List light novels, pick a chapter, and save it as a text file")]
#[command(
    after_help = "Config file keys (base_url, user_agent, timeout_secs, output_dir, format, chapter_marker, container_tag, novel_container_class, chapter_container_class, content_container_class, title_selector, [headers]) are read from ./lnscrape.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    /// Novel name to select instead of prompting (exact match).
    #[arg(long)]
    pub novel: Option<String>,

    /// Chapter number to select instead of prompting (matches any chapter containing it).
    #[arg(long)]
    pub chapter: Option<String>,

    /// Directory for the chapter file. Default: current directory.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output format: text or json.
    #[arg(long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    /// Novel index URL (overrides config).
    #[arg(long)]
    pub base_url: Option<String>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Word a link must contain to be listed as a chapter (default "Capítulo").
    #[arg(long, conflicts_with = "no_chapter_filter")]
    pub chapter_marker: Option<String>,

    /// List every link in the chapter container, not only those with the chapter marker.
    #[arg(long)]
    pub no_chapter_filter: bool,

    /// Read config from this file instead of searching the default locations.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Suppress listings and progress output (errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Print verbose error chain and debug logs.
    #[arg(long)]
    pub verbose: bool,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "text" | "txt" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!(
            "Invalid --format value: '{}'. Use text or json.",
            s
        )),
    }
}

/// Ensure the output directory exists.
fn validate_output_dir(dir: &Path) -> Result<(), CliRunError> {
    if !dir.as_os_str().is_empty() && !dir.is_dir() {
        return Err(CliRunError::InvalidInput(format!(
            "Cannot write output: {}: directory does not exist.",
            dir.display()
        )));
    }
    Ok(())
}

/// A zero timeout would fail every request immediately.
fn validate_timeout(secs: u64) -> Result<(), CliRunError> {
    if secs == 0 {
        return Err(CliRunError::InvalidInput(
            "Invalid timeout: must be at least 1 second.".to_string(),
        ));
    }
    Ok(())
}

/// Prints listings to stdout and reads answers from stdin. Answers given on
/// the command line are used instead of prompting.
pub struct ConsoleInteraction<R> {
    input: R,
    quiet: bool,
    novel: Option<String>,
    chapter: Option<String>,
}

impl<R: BufRead> ConsoleInteraction<R> {
    pub fn new(input: R, quiet: bool, novel: Option<String>, chapter: Option<String>) -> Self {
        Self {
            input,
            quiet,
            novel,
            chapter,
        }
    }

    fn preset(&mut self, question: &str) -> Option<String> {
        match question {
            NOVEL_PROMPT => self.novel.take(),
            CHAPTER_PROMPT => self.chapter.take(),
            _ => None,
        }
    }
}

impl<R: BufRead> Interaction for ConsoleInteraction<R> {
    fn show_choices(&mut self, _heading: &str, entries: &[LinkEntry]) {
        if self.quiet {
            return;
        }
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for entry in entries {
            let _ = writeln!(out, "{}", entry.text);
        }
    }

    fn ask(&mut self, question: &str) -> io::Result<String> {
        if let Some(answer) = self.preset(question) {
            return Ok(answer);
        }
        {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            out.write_all(question.as_bytes())?;
            out.flush()?;
        }
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before an answer was given",
            ));
        }
        Ok(line)
    }
}

/// Shows a spinner on stderr while each page is fetched.
struct SpinnerSource<S> {
    inner: S,
}

impl<S: PageSource> PageSource for SpinnerSource<S> {
    fn fetch(&mut self, url: &str, context: &str) -> Result<String, ScraperError> {
        let pb = indicatif::ProgressBar::new_spinner();
        if let Ok(style) =
            indicatif::ProgressStyle::default_spinner().template("{spinner} {msg} ({elapsed})")
        {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        pb.set_message(format!("Fetching {}", context));
        pb.enable_steady_tick(Duration::from_millis(80));
        let result = self.inner.fetch(url, context);
        pb.finish_and_clear();
        result
    }
}

/// Site config from file, then CLI overrides.
fn site_config(args: &Args, file: Option<&config::Config>) -> SiteConfig {
    let mut site = SiteConfig::from_file(file);
    if let Some(ref url) = args.base_url {
        site.base_url = url.clone();
    }
    if let Some(ref ua) = args.user_agent {
        site.user_agent = ua.clone();
    }
    if let Some(secs) = args.timeout {
        site.timeout_secs = secs;
    }
    if args.no_chapter_filter {
        site.chapter_matcher = ChapterMatcher::any();
    } else if let Some(ref marker) = args.chapter_marker {
        site.chapter_matcher = chapter_matcher_for(marker);
    }
    site
}

fn output_options(args: &Args, file: Option<&config::Config>) -> Result<OutputOptions, CliRunError> {
    let dir = args
        .output_dir
        .clone()
        .or_else(|| file.and_then(|c| c.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("."));
    let format = match (args.format, file.and_then(|c| c.format.as_deref())) {
        (Some(f), _) => f,
        (None, Some(s)) => parse_format(s).map_err(CliRunError::InvalidInput)?,
        (None, None) => OutputFormat::Text,
    };
    Ok(OutputOptions { dir, format })
}

fn build_client(site: &SiteConfig) -> Result<PageClient, CliRunError> {
    let mut builder = PageClient::builder()
        .user_agent(site.user_agent.clone())
        .timeout_secs(site.timeout_secs);
    for (name, value) in &site.headers {
        builder = builder.header(name.clone(), value.clone());
    }
    builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(e.to_string()))
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let file = config::load_config(args.config.as_deref()).map_err(CliRunError::InvalidInput)?;
    let site = site_config(args, file.as_ref());
    validate_timeout(site.timeout_secs)?;
    let output = output_options(args, file.as_ref())?;
    validate_output_dir(&output.dir)?;

    let client = build_client(&site)?;
    let mut plain;
    let mut spinning;
    let source: &mut dyn PageSource = if args.quiet {
        plain = client;
        &mut plain
    } else {
        spinning = SpinnerSource { inner: client };
        &mut spinning
    };

    let stdin = io::stdin();
    let mut interaction = ConsoleInteraction::new(
        stdin.lock(),
        args.quiet,
        args.novel.clone(),
        args.chapter.clone(),
    );

    let path = Session::new(source, &site).run(&mut interaction, &output)?;

    if !args.quiet {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["lnscrape"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn no_flags_is_valid() {
        let a = args(&[]);
        assert!(a.novel.is_none());
        assert!(a.chapter.is_none());
        assert!(!a.quiet);
        assert!(a.format.is_none());
    }

    #[test]
    fn parse_format_all() {
        assert_eq!(parse_format("text").unwrap(), OutputFormat::Text);
        assert_eq!(parse_format("txt").unwrap(), OutputFormat::Text);
        assert_eq!(parse_format("JSON").unwrap(), OutputFormat::Json);
        assert!(parse_format("epub").is_err());
    }

    #[test]
    fn chapter_marker_conflicts_with_no_filter() {
        let result = Args::try_parse_from([
            "lnscrape",
            "--chapter-marker",
            "Chapter",
            "--no-chapter-filter",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_overrides_file_config() {
        let file: config::Config = toml::from_str(
            r#"
            base_url = "https://file.example/"
            user_agent = "File/1.0"
            timeout_secs = 5
            chapter_marker = "Chapter"
            output_dir = "from-file"
            format = "json"
            "#,
        )
        .unwrap();
        let a = args(&[
            "--base-url",
            "https://cli.example/",
            "--timeout",
            "9",
            "--no-chapter-filter",
            "--format",
            "text",
        ]);
        let site = site_config(&a, Some(&file));
        assert_eq!(site.base_url, "https://cli.example/");
        assert_eq!(site.user_agent, "File/1.0");
        assert_eq!(site.timeout_secs, 9);
        assert_eq!(site.chapter_matcher, ChapterMatcher::any());

        let output = output_options(&a, Some(&file)).unwrap();
        assert_eq!(output.dir, PathBuf::from("from-file"));
        assert_eq!(output.format, OutputFormat::Text);
    }

    #[test]
    fn file_format_is_validated() {
        let file: config::Config = toml::from_str(r#"format = "pdf""#).unwrap();
        let result = output_options(&args(&[]), Some(&file));
        assert!(matches!(result, Err(CliRunError::InvalidInput(_))));
    }

    #[test]
    fn chapter_marker_flag_sets_matcher() {
        let site = site_config(&args(&["--chapter-marker", "Chapter"]), None);
        assert_eq!(site.chapter_matcher, ChapterMatcher::marker("Chapter"));
    }

    #[test]
    fn zero_timeout_is_rejected_from_flag_or_file() {
        let site = site_config(&args(&["--timeout", "0"]), None);
        assert!(matches!(
            validate_timeout(site.timeout_secs),
            Err(CliRunError::InvalidInput(msg)) if msg.contains("timeout")
        ));
        let file: config::Config = toml::from_str("timeout_secs = 0").unwrap();
        let site = site_config(&args(&[]), Some(&file));
        assert!(validate_timeout(site.timeout_secs).is_err());
        assert!(validate_timeout(1).is_ok());
        assert!(validate_timeout(SiteConfig::default().timeout_secs).is_ok());
    }

    #[test]
    fn session_errors_are_not_repeated_in_the_cause_chain() {
        use std::error::Error;
        let err = CliRunError::from(SessionError::from(ScraperError::SelectionNotFound {
            kind: crate::scraper::SelectionKind::Novel,
            key: "b".into(),
        }));
        assert_eq!(err.to_string(), "No novel found matching 'b'.");
        assert!(err.source().is_none());

        let err = CliRunError::from(SessionError::Input {
            what: "novel name",
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "eof"),
        });
        assert_eq!(err.to_string(), "Could not read novel name: eof");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("eof"));
    }

    #[test]
    fn validate_output_dir_exists() {
        assert!(validate_output_dir(&std::env::temp_dir()).is_ok());
        assert!(validate_output_dir(Path::new("")).is_ok());
    }

    #[test]
    fn validate_output_dir_missing() {
        let result = validate_output_dir(Path::new("/nonexistent_dir_lnscrape_xyz"));
        match result {
            Err(CliRunError::InvalidInput(msg)) => assert!(msg.contains("does not exist")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn console_reads_answers_from_input() {
        let input = io::Cursor::new("Solo Leveling\n12\n");
        let mut ui = ConsoleInteraction::new(input, true, None, None);
        assert_eq!(ui.ask(NOVEL_PROMPT).unwrap(), "Solo Leveling\n");
        assert_eq!(ui.ask(CHAPTER_PROMPT).unwrap(), "12\n");
        let err = ui.ask(NOVEL_PROMPT).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn console_uses_preset_answers_once() {
        let input = io::Cursor::new("typed\n");
        let mut ui = ConsoleInteraction::new(input, true, Some("B".to_string()), None);
        assert_eq!(ui.ask(NOVEL_PROMPT).unwrap(), "B");
        assert_eq!(ui.ask(CHAPTER_PROMPT).unwrap(), "typed\n");
    }

    #[test]
    fn cli_run_error_exit_codes() {
        assert_eq!(CliRunError::InvalidInput("x".into()).exit_code(), 1);
        let selection = ScraperError::SelectionNotFound {
            kind: crate::scraper::SelectionKind::Chapter,
            key: "9".into(),
        };
        assert_eq!(CliRunError::Session(selection.into()).exit_code(), 1);
        let structure = ScraperError::ContainerNotFound {
            container: "div.x".into(),
            page: "novel index".into(),
        };
        assert_eq!(CliRunError::Session(structure.into()).exit_code(), 2);
        let write = crate::writer::WriteError::Io {
            path: PathBuf::from("x.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(CliRunError::Session(write.into()).exit_code(), 3);
        let input = SessionError::Input {
            what: "novel name",
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "eof"),
        };
        assert_eq!(CliRunError::Session(input).exit_code(), 1);
    }
}
