//! Prelude for commonly used types and traits in buildwatch.

pub use crate::detector::{
    AnomalyReport, BuildAnomalyDetector, DetectorConfig, DetectorError, DetectorResult,
    ScoredBuild, TrainingReport,
};
pub use crate::formatters::{HumanFormatter, JsonFormatter, ReportFormatter};
pub use crate::logging::LoggingConfig;
pub use crate::model::{ForestConfig, IsolationForest, ModelError};
pub use crate::record::{BuildDocument, BuildRecord, FeatureVector, FEATURE_NAMES};
pub use crate::store::{
    BuildStore, ElasticStore, InMemoryStore, SearchWindow, StoreConfig, StoreError, StoreResult,
};
