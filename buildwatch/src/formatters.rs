//! Rendering of scan results for console and machine consumption.
//!
//! # Examples
//!
//! ```rust
//! use buildwatch::formatters::{HumanFormatter, ReportFormatter};
//!
//! let formatter = HumanFormatter::new();
//! let output = formatter.format(&[]).unwrap();
//! assert!(output.contains("0 anomalies"));
//! ```

use std::fmt::Write;

use crate::detector::{AnomalyReport, DetectorResult};

/// Trait for rendering scan results into an output string.
pub trait ReportFormatter {
    /// Formats the reports of one realtime scan.
    fn format(&self, reports: &[AnomalyReport]) -> DetectorResult<String>;
}

/// Console rendering: a count headline plus one line per flagged build.
///
/// ```text
/// 🚨 2 anomalies detected recently:
///   - Build 20240314.7 on builder-linux64-11
///   - Build 20240314.2 on builder-win64-04
/// ```
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter;

impl HumanFormatter {
    /// Creates a human-readable formatter.
    pub fn new() -> Self {
        Self
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, reports: &[AnomalyReport]) -> DetectorResult<String> {
        let mut output = String::new();

        writeln!(output, "🚨 {} anomalies detected recently:", reports.len()).unwrap();
        for report in reports {
            writeln!(output, "  - {}", report.headline()).unwrap();
        }

        Ok(output)
    }
}

/// JSON rendering of scan results.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a pretty-printing JSON formatter.
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Sets whether to pretty-print.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, reports: &[AnomalyReport]) -> DetectorResult<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(reports)?)
        } else {
            Ok(serde_json::to_string(reports)?)
        }
    }
}
