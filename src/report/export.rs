//! JSON export of the display table.
//!
//! Writes the same strings the console table shows, so downstream tooling
//! sees formatted timestamps rather than raw serials.

use crate::error::AppError;
use crate::table::DisplayTable;
use log::debug;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Export a display table as `{ "headers": [...], "rows": [[...]] }`.
pub fn export_json_table(table: &DisplayTable, output_path: &Path) -> Result<(), AppError> {
    use serde_json::json;

    let report = json!({
        "headers": table.headers,
        "rows": table.rows,
    });

    let file = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(file, &report)?;

    debug!("exported {} rows to {:?}", table.rows.len(), output_path);
    Ok(())
}
