/// Error types for sheet loading, filtering and report generation
///
/// Only failures with a wide blast radius live here: missing input, an
/// unreadable workbook, a header without the required columns, or a report
/// that cannot be written. Unparseable dates and failed images are absorbed
/// where they happen and never become an `AppError`.
use crate::ui::{Notice, Severity};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// No input file was given
    #[error("Please select a spreadsheet file.")]
    NoFile,

    /// Input path does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Filtering was requested before any sheet was loaded
    #[error("No data loaded to filter. Read a spreadsheet first.")]
    NoData,

    /// Report requested without any data rows to print
    #[error("No filtered data to generate the PDF. Read a file with content and adjust the filter if needed.")]
    NoReportData,

    /// First sheet decoded but holds no rows
    #[error("The spreadsheet is empty or could not be read.")]
    EmptySheet,

    /// Workbook could not be opened or decoded
    #[error("Error reading the file: {0}")]
    Decode(String),

    /// Header row lacks one or more required columns
    #[error("Column(s) {} not found in the spreadsheet. Check the column names.", quote_list(.0))]
    MissingColumns(Vec<String>),

    /// PDF could not be assembled
    #[error("Error generating PDF: {0}")]
    Pdf(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON export failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn quote_list(names: &[String]) -> String {
    names.iter().map(|n| format!("\"{}\"", n)).collect::<Vec<_>>().join(", ")
}

impl AppError {
    /// Severity used when the error is shown to the user
    pub fn severity(&self) -> Severity {
        match self {
            AppError::NoFile
            | AppError::FileNotFound(_)
            | AppError::NoData
            | AppError::NoReportData
            | AppError::EmptySheet => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn notice(&self) -> Notice {
        Notice::new(self.severity(), self.to_string())
    }
}
