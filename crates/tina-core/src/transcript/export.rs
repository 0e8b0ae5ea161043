//! Transcript export to a PDF file.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use chrono::{DateTime, Local};
use tracing::{info, warn};

use super::header::TranscriptHeader;
use super::layout::{Page, PageGeometry, Paginator, TranscriptStyle, render};
use super::metrics::HelveticaMetrics;
use super::pdf::PdfCanvas;
use crate::config::ExportConfig;
use crate::core::conversation::Turn;

/// Categories of export failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorKind {
    /// The drawing backend could not be set up
    CanvasUnavailable,
    /// Drawing or serialization failed
    Render,
    /// The file could not be written
    Io,
}

impl fmt::Display for ExportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportErrorKind::CanvasUnavailable => write!(f, "canvas_unavailable"),
            ExportErrorKind::Render => write!(f, "render"),
            ExportErrorKind::Io => write!(f, "io"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportError {
    pub kind: ExportErrorKind,
    pub message: String,
}

impl ExportError {
    pub fn new(kind: ExportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn canvas_unavailable(message: impl Into<String>) -> Self {
        Self::new(ExportErrorKind::CanvasUnavailable, message)
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::new(ExportErrorKind::Render, message)
    }

    pub fn io(path: &Path, err: &io::Error) -> Self {
        Self::new(
            ExportErrorKind::Io,
            format!("write {}: {err}", path.display()),
        )
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ExportError {}

/// Lays out and writes transcripts.
#[derive(Debug, Clone)]
pub struct TranscriptExporter {
    config: ExportConfig,
    geometry: PageGeometry,
    style: TranscriptStyle,
}

impl TranscriptExporter {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            config: config.clone(),
            geometry: PageGeometry::A4,
            style: TranscriptStyle::from_config(config),
        }
    }

    /// `<prefix>_<YYYY-MM-DD>.pdf`
    pub fn file_name(&self, now: &DateTime<Local>) -> String {
        format!("{}_{}.pdf", self.config.file_prefix, now.format("%Y-%m-%d"))
    }

    /// Header plus transcript pages, without drawing anything.
    pub fn layout(&self, session_id: &str, turns: &[Turn], now: &DateTime<Local>) -> Vec<Page> {
        let header = TranscriptHeader::build(&self.config, session_id, turns, now);
        Paginator::new(&HelveticaMetrics, self.geometry, &self.style).paginate(Some(&header), turns)
    }

    /// Writes the transcript into `dir` and returns the file path.
    ///
    /// # Errors
    /// Returns an [`ExportError`] when the canvas cannot be created, the
    /// document cannot be serialized or the file cannot be written.
    pub fn export(
        &self,
        session_id: &str,
        turns: &[Turn],
        dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        self.export_at(session_id, turns, dir, &Local::now())
    }

    /// Same as [`Self::export`] with an explicit clock.
    ///
    /// # Errors
    /// See [`Self::export`].
    pub fn export_at(
        &self,
        session_id: &str,
        turns: &[Turn],
        dir: &Path,
        now: &DateTime<Local>,
    ) -> Result<PathBuf, ExportError> {
        let mut canvas = PdfCanvas::new(&self.config.title, self.geometry).inspect_err(|e| {
            warn!(error = %e, "PDF canvas unavailable");
        })?;

        let pages = self.layout(session_id, turns, now);
        render(&pages, &mut canvas);
        let bytes = canvas.finish()?;

        fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, &e))?;
        let path = dir.join(self.file_name(now));
        fs::write(&path, bytes).map_err(|e| ExportError::io(&path, &e))?;

        info!(path = %path.display(), pages = pages.len(), turns = turns.len(), "transcript exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::tempdir;

    use super::*;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_file_name_uses_prefix_and_date() {
        let exporter = TranscriptExporter::new(&ExportConfig::default());
        assert_eq!(
            exporter.file_name(&fixed_now()),
            "Tina_Insurance_Chat_2026-10-16.pdf"
        );
    }

    #[test]
    fn test_layout_header_reflects_recommendation() {
        let exporter = TranscriptExporter::new(&ExportConfig::default());
        let turns = vec![
            Turn::user("I drive a lot"),
            Turn::assistant("I recommend **Comprehensive Car Insurance** for you."),
        ];
        let pages = exporter.layout("session_1_abc", &turns, &fixed_now());

        let texts: Vec<_> = pages[0].texts().collect();
        assert!(texts.contains(&"Recommended Policy: Comprehensive Car Insurance"));
        assert!(texts.contains(&"Consultant: Tina (AI Insurance Consultant)"));
    }

    #[test]
    fn test_export_writes_pdf() {
        let dir = tempdir().unwrap();
        let exporter = TranscriptExporter::new(&ExportConfig::default());
        let turns = vec![Turn::assistant("Kia ora!"), Turn::user("Hi Tina")];

        let path = exporter
            .export_at("session_1_abc", &turns, &dir.path().join("out"), &fixed_now())
            .unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Tina_Insurance_Chat_2026-10-16.pdf"
        );
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_export_reports_io_failure() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let exporter = TranscriptExporter::new(&ExportConfig::default());
        let err = exporter
            .export_at("session_1_abc", &[], &blocker, &fixed_now())
            .unwrap_err();

        assert_eq!(err.kind, ExportErrorKind::Io);
    }
}
