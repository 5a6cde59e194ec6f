//! Chapter output: plain text (default) or JSON, written atomically.

use crate::model::ChapterDocument;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Output format selector for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}

/// Errors from writing the chapter file.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize chapter: {0}")]
    Json(#[from] serde_json::Error),
}

/// Title, blank line, then each paragraph followed by a blank line.
pub fn render_text(doc: &ChapterDocument) -> String {
    let mut out = String::with_capacity(
        doc.title.len() + 2 + doc.paragraphs.iter().map(|p| p.len() + 2).sum::<usize>(),
    );
    out.push_str(&doc.title);
    out.push_str("\n\n");
    for p in &doc.paragraphs {
        out.push_str(p);
        out.push_str("\n\n");
    }
    out
}

pub fn render(doc: &ChapterDocument, format: OutputFormat) -> Result<String, WriteError> {
    match format {
        OutputFormat::Text => Ok(render_text(doc)),
        OutputFormat::Json => {
            let mut s = serde_json::to_string_pretty(doc)?;
            s.push('\n');
            Ok(s)
        }
    }
}

/// Replace path separators and control characters so the name stays one file.
fn file_name_part(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// `<novel> - <chapter>.<ext>`, e.g. "B - 2.txt".
pub fn output_file_name(novel: &str, chapter: &str, format: OutputFormat) -> String {
    format!(
        "{} - {}.{}",
        file_name_part(novel),
        file_name_part(chapter),
        format.extension()
    )
}

/// Sibling path the content is staged in before the rename.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.part", name))
}

/// Write the whole file or nothing: stage next to the target, then rename over it.
/// An existing file at `path` is replaced.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), WriteError> {
    let staging = staging_path(path);
    let io_err = |p: &Path| {
        let p = p.to_path_buf();
        move |source: std::io::Error| WriteError::Io { path: p, source }
    };

    let result = File::create(&staging)
        .and_then(|mut f| {
            f.write_all(contents.as_bytes())?;
            f.sync_all()
        })
        .map_err(io_err(&staging))
        .and_then(|()| fs::rename(&staging, path).map_err(io_err(path)));

    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

/// Render the chapter in `format` and write it to `path`.
pub fn write_chapter(
    doc: &ChapterDocument,
    path: &Path,
    format: OutputFormat,
) -> Result<(), WriteError> {
    let contents = render(doc, format)?;
    write_atomic(path, &contents)?;
    log::debug!("wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
