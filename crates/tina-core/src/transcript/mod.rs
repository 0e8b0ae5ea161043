//! Transcript layout and PDF export.
//!
//! - `canvas`: drawing capability traits and word wrapping
//! - `layout`: pagination into positioned draw operations
//! - `header`: first-page metadata
//! - `pdf`: printpdf-backed canvas
//! - `export`: layout + render + write to disk

pub mod canvas;
pub mod export;
pub mod header;
pub mod layout;
pub mod metrics;
pub mod pdf;

pub use canvas::{Canvas, Rect, Rgb, TextMetrics};
pub use export::{ExportError, ExportErrorKind, TranscriptExporter};
pub use header::{TranscriptHeader, recommended_policy};
pub use layout::{DrawOp, Page, PageGeometry, Paginator, TranscriptStyle, render};
