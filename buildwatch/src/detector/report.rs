use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::BuildRecord;

/// Fixed reason attached to every anomaly report.
pub const ANOMALY_REASON: &str = "Atypical build behavior detected";

/// A recent build flagged by a realtime scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Identifier of the flagged build, if the document carried one.
    pub build_id: Option<String>,

    /// Worker that executed the build.
    pub slave: Option<String>,

    /// Document timestamp of the build.
    pub timestamp: Option<String>,

    /// Decision-function output; lower means more anomalous.
    pub anomaly_score: f64,

    /// Human-readable reason for the flag.
    pub reason: String,

    /// When the scan flagged the build.
    pub detected_at: DateTime<Utc>,
}

impl AnomalyReport {
    pub(crate) fn from_record(record: &BuildRecord, anomaly_score: f64) -> Self {
        Self {
            build_id: record.build_id.clone(),
            slave: record.slave.clone(),
            timestamp: record.timestamp.clone(),
            anomaly_score,
            reason: ANOMALY_REASON.to_string(),
            detected_at: Utc::now(),
        }
    }

    /// One-line description of the flagged build, `Build <id> on <slave>`.
    ///
    /// Missing fields render as `unknown`.
    pub fn headline(&self) -> String {
        format!(
            "Build {} on {}",
            self.build_id.as_deref().unwrap_or("unknown"),
            self.slave.as_deref().unwrap_or("unknown"),
        )
    }
}

/// One training row scored against the freshly fitted model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredBuild {
    /// The flattened training row.
    pub record: BuildRecord,

    /// Decision-function output for the row.
    pub anomaly_score: f64,

    /// Whether the model flags the row.
    pub is_outlier: bool,
}

/// Outcome of a training run: every training row with its score and flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// All training rows, in store order.
    pub rows: Vec<ScoredBuild>,

    /// When the model was fitted.
    pub trained_at: DateTime<Utc>,
}

impl TrainingReport {
    /// Total number of training rows.
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    /// Number of rows the model flagged.
    pub fn outlier_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_outlier).count()
    }

    /// The flagged rows, in store order.
    pub fn outliers(&self) -> impl Iterator<Item = &ScoredBuild> {
        self.rows.iter().filter(|row| row.is_outlier)
    }
}
