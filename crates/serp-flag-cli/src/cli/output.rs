//! Shared CLI output formatting with colors, symbols, and structured display.

use std::io::IsTerminal;

use serp_flag::{Outcome, RunReport};

/// Check if color output is enabled.
pub fn color_enabled() -> bool {
    // Respect NO_COLOR env (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    // Respect --no-color flag via our global flag
    if std::env::var("SERP_FLAG_NO_COLOR").is_ok() {
        return false;
    }
    // Summaries go to stderr, so that is the stream that matters.
    std::io::stderr().is_terminal()
}

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    /// Builder with color forced off (tests, piped output).
    pub fn plain() -> Self {
        Self { use_color: false }
    }

    /// Green checkmark symbol.
    pub fn ok_sym(&self) -> &str {
        if self.use_color {
            "\x1b[32m\u{2713}\x1b[0m"
        } else {
            "OK"
        }
    }

    /// Red X symbol.
    pub fn fail_sym(&self) -> &str {
        if self.use_color {
            "\x1b[31m\u{2717}\x1b[0m"
        } else {
            "!!"
        }
    }

    /// Yellow warning symbol.
    pub fn warn_sym(&self) -> &str {
        if self.use_color {
            "\x1b[33m\u{26a0}\x1b[0m"
        } else {
            "??"
        }
    }

    /// Blue circle (info/neutral) symbol.
    pub fn info_sym(&self) -> &str {
        if self.use_color {
            "\x1b[34m\u{25cb}\x1b[0m"
        } else {
            "--"
        }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    pub fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    pub fn yellow(&self, s: &str) -> String {
        self.paint(YELLOW, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }
}

/// Print a branded header for CLI output.
pub fn print_header(s: &Styled) {
    eprintln!(
        "  {} {}",
        s.bold("serp-flag"),
        s.dim(&format!("v{}", env!("CARGO_PKG_VERSION")))
    );
    eprintln!();
}

/// Print a section header (e.g., "Config", "Endpoint").
pub fn print_section(s: &Styled, title: &str) {
    eprintln!("  {}", s.bold(title));
}

/// Print a check result line with symbol and label/value.
pub fn print_check(symbol: &str, label: &str, value: &str) {
    eprintln!("    {symbol} {label:<16} {value}");
}

/// Print an indented detail/fix line under a check.
pub fn print_detail(msg: &str) {
    eprintln!("                        {msg}");
}

/// Print a status summary line at the bottom.
pub fn print_status(s: &Styled, status: &str, msg: &str) {
    eprintln!();
    eprintln!("  {}: {status} ({msg})", s.bold("Status"));
}

/// Format milliseconds for humans (e.g., "850ms", "2.4s", "1m 5s").
pub fn format_duration_ms(ms: u64) -> String {
    if ms < 1_000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1_000.0)
    } else {
        let secs = ms / 1_000;
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Shorten `text` to at most `max` characters, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}\u{2026}")
}

/// One line per candidate: symbol, index, outcome, text.
pub fn outcome_line(s: &Styled, index: usize, text: &str, outcome: &Outcome) -> String {
    let shown = if text.is_empty() {
        s.dim("(empty)")
    } else {
        truncate(text, 64)
    };
    match outcome {
        Outcome::Highlighted { class } => {
            format!("{} #{index:<3} {} {shown}", s.ok_sym(), s.red(&format!("class {class}")))
        }
        Outcome::NotMatched { class } => {
            format!("{} #{index:<3} {} {shown}", s.info_sym(), s.dim(&format!("class {class}")))
        }
        Outcome::Failed { message, .. } => {
            format!("{} #{index:<3} {} {shown} {}", s.fail_sym(), s.yellow("failed"), s.dim(message))
        }
        Outcome::Skipped => format!("{} #{index:<3} {} {shown}", s.warn_sym(), s.dim("skipped")),
    }
}

/// Print a run summary to stderr.
pub fn print_report(s: &Styled, report: &RunReport) {
    if is_verbose() {
        for entry in &report.outcomes {
            eprintln!("    {}", outcome_line(s, entry.index, &entry.text, &entry.outcome));
        }
        eprintln!();
    }

    let mut parts = vec![
        format!("{} candidates", report.candidates),
        s.red(&format!("{} highlighted", report.highlighted)),
        format!("{} not matched", report.not_matched),
    ];
    if report.failed > 0 {
        parts.push(s.yellow(&format!("{} failed", report.failed)));
    }
    if report.skipped > 0 {
        parts.push(format!("{} skipped", report.skipped));
    }

    let symbol = if report.cancelled || report.failed > 0 {
        s.warn_sym()
    } else {
        s.ok_sym()
    };
    eprintln!(
        "  {symbol} {} {}",
        parts.join(", "),
        s.dim(&format!("in {}", format_duration_ms(report.elapsed_ms)))
    );
    if report.cancelled {
        eprintln!("  Run cancelled before all candidates were classified.");
    }
}

/// Check if --quiet mode is active.
pub fn is_quiet() -> bool {
    std::env::var("SERP_FLAG_QUIET").is_ok()
}

/// Check if --verbose mode is active.
pub fn is_verbose() -> bool {
    std::env::var("SERP_FLAG_VERBOSE").is_ok()
}

/// Check if --json mode is active.
pub fn is_json() -> bool {
    std::env::var("SERP_FLAG_JSON").is_ok()
}

/// Print JSON output to stdout and return.
pub fn print_json(value: &serde_json::Value) {
    if let Ok(s) = serde_json::to_string_pretty(value) {
        println!("{s}");
    }
}
