/// Console formatting module - Pure rendering concerns
///
/// This module handles all console output formatting including:
/// - Table layout and borders
/// - Color terminal output
/// - Text truncation and padding
///
/// It accepts a pre-projected `DisplayTable` and renders it to any
/// `std::io::Write` destination.
use crate::table::DisplayTable;
use std::io::{self, Write};
use std::sync::OnceLock;
use term::color::Color;
use terminal_size::{Width, terminal_size};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Narrowest a column is squeezed to before the table overflows
const MIN_COLUMN_WIDTH: usize = 3;
/// Widest a column grows even when the terminal has room
const MAX_COLUMN_WIDTH: usize = 48;

/// Writer for table output - configurable for color/plain text
pub struct TableWriter<W: Write> {
    writer: W,
    use_colors: bool,
    width: usize,
}

impl<W: Write> TableWriter<W> {
    /// Create a new table writer sized to the console
    pub fn new(writer: W, use_colors: bool) -> Self {
        Self::with_width(writer, use_colors, console_width())
    }

    pub fn with_width(writer: W, use_colors: bool, width: usize) -> Self {
        Self { writer, use_colors, width }
    }

    /// Write formatted text, optionally with color
    fn write_colored(&mut self, text: &str, color: Color) -> io::Result<()> {
        if self.use_colors {
            if let Some(ref mut t) = term::stdout() {
                let _ = t.fg(color);
                let _ = t.attr(term::Attr::Bold);
                let _ = t.write_all(text.as_bytes());
                let _ = t.reset();
                Ok(())
            } else {
                write!(self.writer, "{}", text)
            }
        } else {
            write!(self.writer, "{}", text)
        }
    }

    /// Write a newline
    fn writeln(&mut self) -> io::Result<()> {
        writeln!(self.writer)
    }

    /// Horizontal border using the given corner and junction glyphs
    fn write_border(&mut self, widths: &[usize], left: &str, mid: &str, right: &str) -> io::Result<()> {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        writeln!(self.writer, "{}{}{}", left, segments.join(mid), right)
    }

    fn format_row(cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> =
            widths.iter().enumerate().map(|(i, w)| truncate_with_padding(cells.get(i).map_or("", |s| s), *w)).collect();
        format!("│ {} │", padded.join(" │ "))
    }

    /// Write the whole table with borders, header first
    pub fn write_table(&mut self, table: &DisplayTable) -> io::Result<()> {
        if table.is_empty() {
            return writeln!(self.writer, "(no data)");
        }

        let widths = TableWidths::fit(table, self.width);
        self.write_border(&widths.columns, "┌", "┬", "┐")?;
        let header = Self::format_row(&table.headers, &widths.columns);
        self.write_colored(&header, term::color::BRIGHT_CYAN)?;
        self.writeln()?;
        self.write_border(&widths.columns, "├", "┼", "┤")?;
        for row in &table.rows {
            writeln!(self.writer, "{}", Self::format_row(row, &widths.columns))?;
        }
        self.write_border(&widths.columns, "└", "┴", "┘")?;
        writeln!(self.writer, "{} row(s)", table.rows.len())
    }
}

//
// Table Layout and Widths
//

/// Content width of each column, excluding borders and padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableWidths {
    pub columns: Vec<usize>,
    pub total: usize, // Total table width including borders
}

impl TableWidths {
    /// Natural column widths, shrunk widest-first until the table fits `terminal_width`
    pub fn fit(table: &DisplayTable, terminal_width: usize) -> Self {
        let mut columns: Vec<usize> = (0..table.column_count())
            .map(|i| {
                let header = table.headers.get(i).map_or(0, |h| display_width(h));
                let cells = table.rows.iter().filter_map(|r| r.get(i)).map(|c| display_width(c));
                cells.chain(std::iter::once(header)).max().unwrap_or(0).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
            })
            .collect();

        // "│ " before each column, " " after, and the closing "│"
        let borders = 3 * columns.len() + 1;
        let available = terminal_width.saturating_sub(borders);
        while columns.iter().sum::<usize>() > available {
            match columns.iter_mut().filter(|w| **w > MIN_COLUMN_WIDTH).max_by_key(|w| **w) {
                Some(widest) => *widest -= 1,
                None => break,
            }
        }

        let total = columns.iter().sum::<usize>() + borders;
        TableWidths { columns, total }
    }
}

/// Get terminal width or default to 120
pub fn get_terminal_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() { w as usize } else { 120 }
}

static CONSOLE_WIDTH: OnceLock<usize> = OnceLock::new();

/// Override the detected console width (first call wins)
pub fn set_console_width(width: usize) {
    let _ = CONSOLE_WIDTH.set(width);
}

/// Console width: the override if set, otherwise the terminal's
pub fn console_width() -> usize {
    *CONSOLE_WIDTH.get_or_init(get_terminal_width)
}

//
// Text Formatting Utilities
//

/// Count the display width of a string, accounting for wide Unicode characters
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate and pad string to exact width
pub fn truncate_with_padding(s: &str, width: usize) -> String {
    // Cells may hold multi-line answers; keep the table one line per row
    let flat;
    let s = if s.contains('\n') {
        flat = s.replace(['\r', '\n'], " ");
        flat.as_str()
    } else {
        s
    };
    let display_w = display_width(s);

    if display_w > width {
        let mut result = String::new();
        let mut current_width = 0;

        // Reserve space for "..."
        let target_width = if width >= 3 { width - 3 } else { width };

        for c in s.chars() {
            let c_width = UnicodeWidthChar::width(c).unwrap_or(1);
            if current_width + c_width > target_width {
                break;
            }
            result.push(c);
            current_width += c_width;
        }

        if width >= 3 {
            result.push_str("...");
            current_width += 3;
        }

        if current_width < width {
            result.push_str(&" ".repeat(width - current_width));
        }

        result
    } else {
        format!("{}{}", s, " ".repeat(width - display_w))
    }
}

/// Print a display table to stdout
pub fn print_table(table: &DisplayTable) {
    let mut writer = TableWriter::new(io::stdout(), true);
    let _ = writer.write_table(table);
}

#[cfg(test)]
#[path = "console_format_test.rs"]
mod console_format_test;
