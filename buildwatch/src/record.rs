//! Build records and the features extracted from them.
//!
//! A [`BuildDocument`] is the raw `_source` payload of one search hit. It is
//! flattened into a [`BuildRecord`], the tabular row every other component
//! works with, and each record exposes the fixed four-value
//! [`FeatureVector`] the model consumes.

use serde::{Deserialize, Deserializer, Serialize};

/// The ordered features the model sees per build:
/// `(elapsed_time, step_count, exit_code, has_failure)`.
pub type FeatureVector = [f64; 4];

/// Number of features per build.
pub const FEATURE_COUNT: usize = 4;

/// Feature names, in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["elapsed_time", "step_count", "exit_code", "has_failure"];

/// Statuses counted as failures when deriving `has_failure`.
const FAILURE_STATUSES: [&str; 2] = ["failure", "cancelled"];

/// Raw build document as stored in the search index.
///
/// Only the fields the detector consumes are modeled; everything else in the
/// document is ignored. Absent fields and explicit `null`s coerce to the
/// same defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildDocument {
    /// Build identifier; indices carry both string and numeric ids.
    #[serde(default, deserialize_with = "id_as_string")]
    pub build_id: Option<String>,

    /// Wall-clock duration of the build in seconds.
    #[serde(default, deserialize_with = "null_to_default")]
    pub elapsed_time: f64,

    /// Executed steps; only the length is consumed.
    #[serde(default, deserialize_with = "null_to_default")]
    pub steps: Vec<serde_json::Value>,

    /// Process exit code reported by the build.
    #[serde(default, deserialize_with = "null_to_default")]
    pub exit_code: i64,

    /// Final status string, e.g. `"success"` or `"failure"`.
    #[serde(default)]
    pub result_status: Option<String>,

    /// Document timestamp, ISO-8601.
    #[serde(default, rename = "@timestamp")]
    pub timestamp: Option<String>,

    /// Worker that executed the build.
    #[serde(default)]
    pub slave: Option<String>,
}

/// Folds an explicit JSON `null` into the field's default value.
fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Accepts a string or numeric id and normalizes it to a string.
fn id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.map(|id| match id {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    }))
}

/// One build flattened into the tabular shape the detector works with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Build identifier, if the document carried one.
    pub build_id: Option<String>,

    /// Wall-clock duration of the build in seconds.
    pub elapsed_time: f64,

    /// Number of executed steps.
    pub step_count: usize,

    /// Process exit code reported by the build.
    pub exit_code: i64,

    /// Whether the build ended in `"failure"` or `"cancelled"`.
    pub has_failure: bool,

    /// Document timestamp, ISO-8601.
    pub timestamp: Option<String>,

    /// Worker that executed the build.
    pub slave: Option<String>,
}

impl BuildRecord {
    /// Creates a record with the given id and zeroed features.
    pub fn new(build_id: impl Into<String>) -> Self {
        Self {
            build_id: Some(build_id.into()),
            elapsed_time: 0.0,
            step_count: 0,
            exit_code: 0,
            has_failure: false,
            timestamp: None,
            slave: None,
        }
    }

    /// Sets the elapsed time in seconds.
    pub fn with_elapsed_time(mut self, seconds: f64) -> Self {
        self.elapsed_time = seconds;
        self
    }

    /// Sets the step count.
    pub fn with_step_count(mut self, count: usize) -> Self {
        self.step_count = count;
        self
    }

    /// Sets the exit code.
    pub fn with_exit_code(mut self, code: i64) -> Self {
        self.exit_code = code;
        self
    }

    /// Sets the failure flag.
    pub fn with_failure(mut self, failed: bool) -> Self {
        self.has_failure = failed;
        self
    }

    /// Sets the document timestamp.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Sets the executing worker.
    pub fn with_slave(mut self, slave: impl Into<String>) -> Self {
        self.slave = Some(slave.into());
        self
    }

    /// The feature vector the model scores.
    pub fn features(&self) -> FeatureVector {
        [
            self.elapsed_time,
            self.step_count as f64,
            self.exit_code as f64,
            if self.has_failure { 1.0 } else { 0.0 },
        ]
    }
}

impl From<BuildDocument> for BuildRecord {
    fn from(doc: BuildDocument) -> Self {
        let has_failure = doc
            .result_status
            .as_deref()
            .is_some_and(|status| FAILURE_STATUSES.contains(&status));

        Self {
            build_id: doc.build_id,
            elapsed_time: doc.elapsed_time,
            step_count: doc.steps.len(),
            exit_code: doc.exit_code,
            has_failure,
            timestamp: doc.timestamp,
            slave: doc.slave,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_from(value: serde_json::Value) -> BuildRecord {
        let doc: BuildDocument = serde_json::from_value(value).unwrap();
        doc.into()
    }

    #[test]
    fn test_full_document_flattens() {
        let record = record_from(json!({
            "build_id": "build-4711",
            "elapsed_time": 312.5,
            "steps": [{"name": "clone"}, {"name": "compile"}, {"name": "test"}],
            "exit_code": 0,
            "result_status": "success",
            "@timestamp": "2024-03-14T08:30:00+00:00",
            "slave": "builder-linux64-07",
        }));

        assert_eq!(record.build_id.as_deref(), Some("build-4711"));
        assert_eq!(record.elapsed_time, 312.5);
        assert_eq!(record.step_count, 3);
        assert_eq!(record.exit_code, 0);
        assert!(!record.has_failure);
        assert_eq!(
            record.timestamp.as_deref(),
            Some("2024-03-14T08:30:00+00:00")
        );
        assert_eq!(record.slave.as_deref(), Some("builder-linux64-07"));
    }

    #[test]
    fn test_missing_fields_coerce_to_zero() {
        let record = record_from(json!({}));

        assert_eq!(record.build_id, None);
        assert_eq!(record.elapsed_time, 0.0);
        assert_eq!(record.step_count, 0);
        assert_eq!(record.exit_code, 0);
        assert!(!record.has_failure);
        assert_eq!(record.features(), [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_explicit_null_fields_coerce_to_zero() {
        let record = record_from(json!({
            "build_id": null,
            "elapsed_time": null,
            "steps": null,
            "exit_code": null,
            "result_status": null,
            "@timestamp": null,
            "slave": null,
        }));

        assert_eq!(record.build_id, None);
        assert_eq!(record.elapsed_time, 0.0);
        assert_eq!(record.step_count, 0);
        assert_eq!(record.exit_code, 0);
        assert!(!record.has_failure);
    }

    #[test]
    fn test_numeric_build_id_normalizes_to_string() {
        let record = record_from(json!({"build_id": 20240314}));
        assert_eq!(record.build_id.as_deref(), Some("20240314"));
    }

    #[test]
    fn test_has_failure_only_for_failure_and_cancelled() {
        for status in ["failure", "cancelled"] {
            let record = record_from(json!({"result_status": status}));
            assert!(record.has_failure, "{status} must count as a failure");
            assert_eq!(record.features()[3], 1.0);
        }

        for status in ["success", "warnings", "retry", "FAILURE", ""] {
            let record = record_from(json!({"result_status": status}));
            assert!(!record.has_failure, "{status} must not count as a failure");
            assert_eq!(record.features()[3], 0.0);
        }
    }

    #[test]
    fn test_step_count_is_list_length() {
        let record = record_from(json!({"steps": ["a", "b", "c", "d", "e"]}));
        assert_eq!(record.step_count, 5);
        assert_eq!(record.features()[1], 5.0);

        let record = record_from(json!({"steps": []}));
        assert_eq!(record.step_count, 0);
    }

    #[test]
    fn test_integer_elapsed_time_parses() {
        let record = record_from(json!({"elapsed_time": 300}));
        assert_eq!(record.elapsed_time, 300.0);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let record = record_from(json!({
            "build_id": "b-1",
            "branch": "mozilla-central",
            "revision": "abcdef012345",
        }));
        assert_eq!(record.build_id.as_deref(), Some("b-1"));
    }

    #[test]
    fn test_feature_vector_order_matches_names() {
        let record = BuildRecord::new("b-2")
            .with_elapsed_time(512.0)
            .with_step_count(12)
            .with_exit_code(137)
            .with_failure(true);

        assert_eq!(FEATURE_NAMES[0], "elapsed_time");
        assert_eq!(FEATURE_NAMES[3], "has_failure");
        assert_eq!(record.features(), [512.0, 12.0, 137.0, 1.0]);
    }
}
