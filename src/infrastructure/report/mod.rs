//! Report renderers - console text, HTML, JSON and JUnit XML

mod console;
mod html;
mod json;
mod junit;

use std::path::Path;
use tracing::info;

pub use console::{ConsoleReporter, TracebackStyle};
pub use html::to_html;
pub use json::{to_json, to_json_value};
pub use junit::to_junit;

use crate::domain::evaluation::EvaluationRun;
use crate::domain::DomainError;

/// File report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Json,
    JunitXml,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
            ReportFormat::JunitXml => "junit-xml",
        }
    }

    pub fn render(&self, run: &EvaluationRun) -> Result<String, DomainError> {
        match self {
            ReportFormat::Html => Ok(to_html(run)),
            ReportFormat::Json => to_json(run),
            ReportFormat::JunitXml => Ok(to_junit(run)),
        }
    }
}

/// Render a report and write it to `path`, creating parent directories
pub fn write_report(
    format: ReportFormat,
    run: &EvaluationRun,
    path: impl AsRef<Path>,
) -> Result<(), DomainError> {
    let path = path.as_ref();
    let content = format.render(run)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            DomainError::report(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    std::fs::write(path, content).map_err(|e| {
        DomainError::report(format!(
            "Failed to write {} report to {}: {}",
            format.as_str(),
            path.display(),
            e
        ))
    })?;

    info!(format = format.as_str(), path = %path.display(), "Report written");
    Ok(())
}

/// Escape text for XML and HTML attribute or element content. Characters
/// XML 1.0 cannot carry become U+FFFD.
fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < '\u{20}' || c == '\u{FFFE}' || c == '\u{FFFF}' => {
                out.push(char::REPLACEMENT_CHARACTER)
            }
            c => out.push(c),
        }
    }
    out
}
