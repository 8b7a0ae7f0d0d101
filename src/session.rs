/// Session state and command handlers
///
/// This module handles:
/// - Holding the loaded grid and its filtered view
/// - Loading, filtering, table projection, report and JSON export commands
///
/// Every command returns a `Notice` for the user or an `AppError`.
use crate::columns::{ColumnRole, find_column};
use crate::config::ReportConfig;
use crate::dates::DateNormalizer;
use crate::error::AppError;
use crate::fetch::ImageSource;
use crate::filter::{DateRange, filter_rows};
use crate::report::{export_json_table, layout_report, write_pdf};
use crate::sheet::load_first_sheet;
use crate::table::{DisplayTable, render_table};
use crate::types::Grid;
use crate::ui::Notice;
use log::{debug, info};
use std::path::Path;

/// Grids for one loaded spreadsheet. `filtered` starts as a copy of
/// `original` and is replaced by every filter application; a new load
/// replaces both.
#[derive(Debug, Default)]
pub struct Session {
    original: Option<Grid>,
    filtered: Option<Grid>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn original(&self) -> Option<&Grid> {
        self.original.as_ref()
    }

    pub fn filtered(&self) -> Option<&Grid> {
        self.filtered.as_ref()
    }

    /// Read the first sheet of `path`
    pub fn load(&mut self, path: Option<&Path>) -> Result<Notice, AppError> {
        let path = path.ok_or(AppError::NoFile)?;
        let grid = match load_first_sheet(path) {
            Ok(grid) => grid,
            Err(e) => {
                self.clear();
                return Err(e);
            }
        };
        self.load_grid(grid)
    }

    /// Replace the session data with an already decoded grid
    pub fn load_grid(&mut self, grid: Grid) -> Result<Notice, AppError> {
        if grid.is_empty() {
            self.clear();
            return Err(AppError::EmptySheet);
        }

        let rows = grid.data_len();
        debug!("session loaded {} rows", grid.len());
        self.original = Some(grid.clone());
        self.filtered = Some(grid);
        Ok(Notice::success(format!("Spreadsheet loaded successfully! {} data rows.", rows)))
    }

    fn clear(&mut self) {
        self.original = None;
        self.filtered = None;
    }

    /// Narrow `filtered` to `range`, always starting from the original grid
    pub fn apply_filter(&mut self, range: &DateRange, config: &ReportConfig) -> Result<Notice, AppError> {
        let original = self.original.as_ref().ok_or(AppError::NoData)?;
        let pattern = config.columns.pattern(ColumnRole::Timestamp);
        let timestamp_col = original.header().and_then(|h| find_column(h, pattern));
        let dates = DateNormalizer::from_config(&config.dates);

        let filtered = filter_rows(original, range, timestamp_col, pattern, &dates)?;
        let notice = filtered.kind.notice();
        self.filtered = Some(filtered.grid);
        Ok(notice)
    }

    /// Display table of the filtered rows, `None` before anything is loaded
    pub fn table(&self, config: &ReportConfig) -> Option<DisplayTable> {
        let dates = DateNormalizer::from_config(&config.dates);
        self.filtered.as_ref().map(|grid| render_table(grid, &config.columns, &dates))
    }

    /// Lay out the filtered rows and write the PDF to `text.output_file`
    pub fn generate_report<S: ImageSource + ?Sized>(
        &mut self,
        source: &mut S,
        config: &ReportConfig,
    ) -> Result<Notice, AppError> {
        let grid = self.filtered.as_ref().ok_or(AppError::NoReportData)?;
        let doc = layout_report(grid, config, source)?;

        let output = &config.text.output_file;
        write_pdf(&doc, &config.text, output)?;
        info!("wrote {} pages to {:?}", doc.page_count(), output);

        let mut message = format!(
            "PDF generated successfully! {} entries on {} page(s) saved to {}.",
            doc.entries,
            doc.page_count(),
            output.display()
        );
        if doc.failed_images > 0 {
            message.push_str(&format!(" {} image(s) could not be loaded.", doc.failed_images));
        }
        Ok(Notice::success(message))
    }

    /// Write the filtered display table as JSON
    pub fn export_json(&self, path: &Path, config: &ReportConfig) -> Result<Notice, AppError> {
        let table = self.table(config).ok_or(AppError::NoData)?;
        export_json_table(&table, path)?;
        Ok(Notice::info(format!("Table exported to {}.", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::ImageLoadError;
    use crate::types::Cell;
    use crate::ui::Severity;
    use chrono::NaiveDate;
    use image::DynamicImage;

    struct Offline;

    impl ImageSource for Offline {
        fn load(&mut self, _url: &str) -> Result<DynamicImage, ImageLoadError> {
            Err(ImageLoadError::Transport("offline".to_string()))
        }
    }

    fn sample() -> Grid {
        Grid::new(vec![
            vec![Cell::from("Carimbo de data/hora"), Cell::from("Foto"), Cell::from("Descrição")],
            vec![Cell::text("2024-01-09 18:00:00"), Cell::from("https://x/1.jpg"), Cell::from("old")],
            vec![Cell::text("2024-01-10 09:30:00"), Cell::Empty, Cell::from("new")],
        ])
    }

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 1, d)
    }

    #[test]
    fn test_filter_before_load_is_input_absence() {
        let mut session = Session::new();
        let err = session.apply_filter(&DateRange::default(), &ReportConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::NoData));
        assert_eq!(err.severity(), Severity::Warning);
        assert!(session.table(&ReportConfig::default()).is_none());
    }

    #[test]
    fn test_load_without_file() {
        assert!(matches!(Session::new().load(None), Err(AppError::NoFile)));
    }

    #[test]
    fn test_empty_sheet_clears_state() {
        let mut session = Session::new();
        session.load_grid(sample()).unwrap();
        assert!(matches!(session.load_grid(Grid::default()), Err(AppError::EmptySheet)));
        assert!(session.original().is_none());
        assert!(session.filtered().is_none());
    }

    #[test]
    fn test_filter_replaces_view_and_table_follows() {
        let config = ReportConfig::default();
        let mut session = Session::new();
        let loaded = session.load_grid(sample()).unwrap();
        assert_eq!(loaded.severity, Severity::Success);
        assert_eq!(session.table(&config).unwrap().rows.len(), 2);

        let notice = session.apply_filter(&DateRange::new(day(10), day(10)), &config).unwrap();
        assert_eq!(notice.severity, Severity::Success);
        let table = session.table(&config).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][2], "new");
        assert_eq!(session.original(), Some(&sample()));

        // Filtering again starts from the original, not the previous result
        session.apply_filter(&DateRange::new(day(9), day(9)), &config).unwrap();
        assert_eq!(session.table(&config).unwrap().rows[0][2], "old");
    }

    #[test]
    fn test_report_needs_data_rows() {
        let config = ReportConfig::default();
        let mut session = Session::new();
        assert!(matches!(session.generate_report(&mut Offline, &config), Err(AppError::NoReportData)));

        session.load_grid(sample()).unwrap();
        let notice = session.apply_filter(&DateRange::new(day(20), None), &config).unwrap();
        assert_eq!(notice.severity, Severity::Info);
        assert!(matches!(session.generate_report(&mut Offline, &config), Err(AppError::NoReportData)));
    }

    #[test]
    fn test_generate_report_counts_failed_images() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut config = ReportConfig::default();
        config.text.output_file = dir.path().join("out.pdf");

        let mut session = Session::new();
        session.load_grid(sample()).unwrap();
        let notice = session.generate_report(&mut Offline, &config).expect("report written");

        assert_eq!(notice.severity, Severity::Success);
        assert!(notice.message.contains("2 entries"));
        assert!(notice.message.contains("1 image(s) could not be loaded"));
        let bytes = std::fs::read(&config.text.output_file).expect("pdf exists");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_export_json() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("rows.json");
        let mut session = Session::new();
        assert!(matches!(session.export_json(&path, &ReportConfig::default()), Err(AppError::NoData)));

        session.load_grid(sample()).unwrap();
        session.export_json(&path, &ReportConfig::default()).expect("export");
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("09/01/2024 18:00:00"));
    }
}
