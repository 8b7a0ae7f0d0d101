//! Report generation module - page layout and output.
//!
//! This module handles:
//! - Laying out filtered rows into fixed-size pages
//! - Measuring and wrapping text for the page width
//! - Writing the laid-out pages as a PDF
//! - Exporting the display table as JSON
//!
//! Console rendering is handled by the console_format module.
//!
//! # Module Organization
//!
//! - `types` - Page model (Document, Page, DrawOp)
//! - `text` - Font metrics and word wrapping
//! - `layout` - Row-by-row placement with page breaks and footers
//! - `pdf` - printpdf rendering of a Document
//! - `export` - JSON export

mod export;
mod layout;
mod pdf;
mod text;
mod types;

// Re-export types
pub use types::Document;

// Re-export layout functions
pub use layout::layout_report;

// Re-export output functions
pub use export::export_json_table;
pub use pdf::write_pdf;
