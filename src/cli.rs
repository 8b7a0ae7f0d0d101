use crate::config::{DateStyle, ImageSizing};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Parse a calendar day as entered in a date picker
fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD ({})", e))
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "sheet-report")]
#[command(about = "Filter a form-response spreadsheet by date and render it as a PDF report with photos")]
#[command(version)]
pub struct CliArgs {
    /// Spreadsheet to read (xlsx, xlsm, xlsb, xls, ods); only the first sheet is used
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Keep rows timestamped on or after this day (inclusive)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_day)]
    pub start: Option<NaiveDate>,

    /// Keep rows timestamped on or before this day (inclusive, whole day)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_day)]
    pub end: Option<NaiveDate>,

    /// PDF output path (default: dados_personalizados.pdf, or text.output_file from the config)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// TOML config file
    /// Default: ~/.config/sheet-report/config.toml when it exists
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Image sizing policy for the report
    #[arg(long, value_enum)]
    pub image_size: Option<ImageSizing>,

    /// Date rendering in the table and the report
    #[arg(long, value_enum)]
    pub date_style: Option<DateStyle>,

    /// Width in pixels requested for Google Drive thumbnails
    #[arg(long, value_name = "PIXELS")]
    pub thumbnail_size: Option<u32>,

    /// Do not make images clickable in the PDF
    #[arg(long)]
    pub no_links: bool,

    /// Skip PDF generation
    #[arg(long)]
    pub no_pdf: bool,

    /// Do not print the filtered table
    #[arg(long)]
    pub no_table: bool,

    /// Also write the filtered table as JSON
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Override console width for testing (default: auto-detect)
    #[arg(long, value_name = "COLUMNS")]
    pub console_width: Option<usize>,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        CliArgs::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(format!("--start {} is after --end {}", start, end));
        }

        if self.no_pdf && self.no_table && self.json.is_none() {
            return Err("Nothing to do: --no-pdf and --no-table given without --json".to_string());
        }

        if self.thumbnail_size == Some(0) {
            return Err("--thumbnail-size must be at least 1".to_string());
        }

        Ok(())
    }

    /// True when either date bound was given
    pub fn has_date_filter(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}
