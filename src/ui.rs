/// User interface and status output utilities
///
/// This module handles:
/// - Severity-coded notices (success, warning, error, info)
/// - Colored terminal text
/// - The status banner with auto-dismiss
use std::io::Write;
use std::time::{Duration, Instant};

/// How long a notice stays visible after it was shown
pub const DISMISS_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }

    fn color(&self) -> term::color::Color {
        match self {
            Severity::Success => term::color::BRIGHT_GREEN,
            Severity::Warning => term::color::BRIGHT_YELLOW,
            Severity::Error => term::color::BRIGHT_RED,
            Severity::Info => term::color::BRIGHT_BLUE,
        }
    }
}

/// A user-facing message tagged with its severity
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self { severity, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }
}

/// Holds the most recent notice until it times out
#[derive(Debug)]
pub struct StatusBanner {
    current: Option<(Notice, Instant)>,
    dismiss_after: Duration,
    worst: Option<Severity>,
}

impl Default for StatusBanner {
    fn default() -> Self {
        Self::with_timeout(DISMISS_AFTER)
    }
}

impl StatusBanner {
    pub fn with_timeout(dismiss_after: Duration) -> Self {
        Self { current: None, dismiss_after, worst: None }
    }

    /// Replace the current notice; the dismiss timer restarts at `now`
    pub fn show(&mut self, notice: Notice, now: Instant) {
        self.worst = self.worst.max(Some(notice.severity));
        self.current = Some((notice, now));
    }

    /// Notice still on screen at `now`, if any
    pub fn visible(&self, now: Instant) -> Option<&Notice> {
        match &self.current {
            Some((notice, shown)) if now.saturating_duration_since(*shown) < self.dismiss_after => Some(notice),
            _ => None,
        }
    }

    /// Highest severity shown during this session
    pub fn worst(&self) -> Option<Severity> {
        self.worst
    }

    /// Print a notice and put it on the banner
    pub fn notify(&mut self, notice: Notice) {
        print_notice(&notice);
        self.show(notice, Instant::now());
    }
}

/// Print the "sheet-report: " prefix for status messages
fn print_status_header() {
    print!("sheet-report: ");
}

/// Print colored text to terminal, with fallback to plain text
fn print_color(s: &str, fg: term::color::Color) {
    if !really_print_color(s, fg) {
        print!("{}", s);
    }

    fn really_print_color(s: &str, fg: term::color::Color) -> bool {
        if let Some(ref mut t) = term::stdout() {
            if t.fg(fg).is_err() {
                return false;
            }
            let _ = t.attr(term::Attr::Bold);
            if write!(t, "{}", s).is_err() {
                return false;
            }
            let _ = t.reset();
            return true;
        }

        false
    }
}

/// Print a notice with its colored severity tag
pub fn print_notice(notice: &Notice) {
    print_status_header();
    print_color(notice.severity.label(), notice.severity.color());
    println!(": {}", notice.message);
}

/// Print a plain status line with the "sheet-report: " prefix
pub fn status(s: &str) {
    print_status_header();
    println!("{}", s);
}

/// Print an error message with colored "error" prefix
pub fn print_error(msg: &str) {
    println!();
    print_color("error", term::color::BRIGHT_RED);
    println!(": {}", msg);
    println!();
}
