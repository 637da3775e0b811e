//! Training and realtime scanning over a build store.
//!
//! [`BuildAnomalyDetector`] composes the three operations of the system:
//! fetching time-bounded windows from a [`BuildStore`], fitting the
//! isolation forest on the training window, and scoring the realtime window
//! with the fitted model. The trained/untrained distinction is a tagged
//! state, so a scan issued before training fails with
//! [`DetectorError::UnfittedModel`] instead of scoring garbage.
//!
//! # Example
//!
//! ```rust,no_run
//! use buildwatch::detector::BuildAnomalyDetector;
//! use buildwatch::store::{ElasticStore, StoreConfig};
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let store = ElasticStore::new(StoreConfig::new("http://elasticsearch:9200"))?;
//! let mut detector = BuildAnomalyDetector::new(Box::new(store));
//!
//! let training = detector.train().await?;
//! println!("{} training rows scored", training.total());
//!
//! let anomalies = detector.scan().await?;
//! println!("{} anomalous builds in the last day", anomalies.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod report;

pub use error::{DetectorError, DetectorResult};
pub use report::{AnomalyReport, ScoredBuild, TrainingReport, ANOMALY_REASON};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::model::{ForestConfig, IsolationForest};
use crate::record::FeatureVector;
use crate::store::{BuildStore, SearchWindow, REALTIME_FETCH_SIZE};

/// Windows and thresholds for training and scanning.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Training lookback in days.
    pub training_window_days: u32,
    /// Minimum training rows required to fit a model.
    pub min_training_rows: usize,
    /// Realtime lookback in hours.
    pub realtime_window_hours: u32,
    /// Maximum documents per realtime scan.
    pub realtime_max_docs: usize,
    /// Model hyperparameters.
    pub forest: ForestConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            training_window_days: 30,
            min_training_rows: 10,
            realtime_window_hours: 24,
            realtime_max_docs: REALTIME_FETCH_SIZE,
            forest: ForestConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// Sets the training lookback in days.
    pub fn with_training_window_days(mut self, days: u32) -> Self {
        self.training_window_days = days;
        self
    }

    /// Sets the minimum number of training rows.
    pub fn with_min_training_rows(mut self, rows: usize) -> Self {
        self.min_training_rows = rows;
        self
    }

    /// Sets the realtime lookback in hours.
    pub fn with_realtime_window_hours(mut self, hours: u32) -> Self {
        self.realtime_window_hours = hours;
        self
    }

    /// Sets the model hyperparameters.
    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }
}

/// Trained/untrained state of the detector.
enum DetectorState {
    Untrained,
    Trained {
        model: IsolationForest,
        trained_at: DateTime<Utc>,
    },
}

/// Anomaly detector over a build document store.
///
/// Holds the fitted model in memory only; a new process must train before
/// it can scan. Training is repeatable and replaces the previous model.
pub struct BuildAnomalyDetector {
    store: Box<dyn BuildStore>,
    config: DetectorConfig,
    state: DetectorState,
}

impl BuildAnomalyDetector {
    /// Creates an untrained detector with default windows.
    pub fn new(store: Box<dyn BuildStore>) -> Self {
        Self::with_config(store, DetectorConfig::default())
    }

    /// Creates an untrained detector with custom windows and hyperparameters.
    pub fn with_config(store: Box<dyn BuildStore>, config: DetectorConfig) -> Self {
        Self {
            store,
            config,
            state: DetectorState::Untrained,
        }
    }

    /// Whether a model has been fitted.
    pub fn is_trained(&self) -> bool {
        matches!(self.state, DetectorState::Trained { .. })
    }

    /// When the current model was fitted, if any.
    pub fn trained_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            DetectorState::Trained { trained_at, .. } => Some(*trained_at),
            DetectorState::Untrained => None,
        }
    }

    /// The configuration in effect.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Fetches the training window, fits the model, and scores every row.
    ///
    /// Fails with [`DetectorError::InsufficientData`] when the window holds
    /// fewer than the configured minimum of rows; the detector stays
    /// untrained in that case and scanning remains unavailable.
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub async fn train(&mut self) -> DetectorResult<TrainingReport> {
        info!(
            days = self.config.training_window_days,
            "Fetching training data"
        );
        let window = SearchWindow::training_days(self.config.training_window_days);
        let records = self.store.fetch_builds(&window).await?;

        if records.len() < self.config.min_training_rows {
            warn!(
                rows = records.len(),
                required = self.config.min_training_rows,
                "Not enough data to train"
            );
            return Err(DetectorError::InsufficientData {
                rows: records.len(),
                required: self.config.min_training_rows,
            });
        }

        info!(rows = records.len(), "Fitting model");
        let features: Vec<FeatureVector> = records.iter().map(|record| record.features()).collect();
        let model = IsolationForest::fit(&self.config.forest, &features)?;

        let rows: Vec<ScoredBuild> = records
            .into_iter()
            .map(|record| {
                let features = record.features();
                ScoredBuild {
                    anomaly_score: model.decision_function(&features),
                    is_outlier: model.is_outlier(&features),
                    record,
                }
            })
            .collect();

        let trained_at = Utc::now();
        self.state = DetectorState::Trained { model, trained_at };

        let report = TrainingReport { rows, trained_at };
        info!(
            outliers = report.outlier_count(),
            total = report.total(),
            "Training complete"
        );
        Ok(report)
    }

    /// Scores the most recent window against the fitted model.
    ///
    /// Returns one [`AnomalyReport`] per flagged build, in the order the
    /// store produced them (descending timestamp). Requires a prior
    /// successful [`train`](Self::train).
    #[instrument(skip(self), fields(store = self.store.name()))]
    pub async fn scan(&self) -> DetectorResult<Vec<AnomalyReport>> {
        let model = match &self.state {
            DetectorState::Trained { model, .. } => model,
            DetectorState::Untrained => return Err(DetectorError::UnfittedModel),
        };

        let window = SearchWindow::realtime_hours(self.config.realtime_window_hours)
            .with_size(self.config.realtime_max_docs);
        let records = self.store.fetch_builds(&window).await?;
        debug!(records = records.len(), "Scoring recent builds");

        let mut reports = Vec::new();
        for record in &records {
            let features = record.features();
            if model.is_outlier(&features) {
                reports.push(AnomalyReport::from_record(
                    record,
                    model.decision_function(&features),
                ));
            }
        }

        info!(
            anomalies = reports.len(),
            scanned = records.len(),
            "Realtime scan complete"
        );
        Ok(reports)
    }
}
