//! # Buildwatch - CI Build Anomaly Detection
//!
//! Buildwatch watches a build-pipeline document store for builds that behave
//! unlike the rest of the fleet. It trains an isolation forest on a month of
//! historical build records and re-scans the most recent window for builds
//! with abnormal duration, step count, exit code, or failure status.
//!
//! ## Overview
//!
//! Build infrastructure produces a steady stream of records: how long each
//! build ran, how many steps it executed, how it exited, whether it failed.
//! Buildwatch turns that stream into a lightweight early-warning signal. It
//! issues two read-only queries against the store (a 30-day training window
//! and a 24-hour realtime window), fits an unsupervised outlier model on the
//! training rows, and reports every recent build the model flags.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use buildwatch::prelude::*;
//! use buildwatch::store::StoreConfig;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! // Connect to the document store holding build records
//! let store = ElasticStore::new(StoreConfig::new("http://elasticsearch:9200"))?;
//!
//! // Train on the last 30 days of builds
//! let mut detector = BuildAnomalyDetector::new(Box::new(store));
//! let training = detector.train().await?;
//! println!(
//!     "{} of {} training builds look atypical",
//!     training.outlier_count(),
//!     training.total()
//! );
//!
//! // Scan the last 24 hours with the fitted model
//! for report in detector.scan().await? {
//!     println!("{}", report.headline());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Pieces
//!
//! - **Model**: an isolation forest with fixed hyperparameters (100 trees,
//!   contamination 0.1, seeded RNG), so two runs over the same data produce
//!   identical scores.
//! - **Features**: the four-value vector `(elapsed_time, step_count,
//!   exit_code, has_failure)` extracted per document, with absent or null
//!   fields coerced to zero.
//! - **Stores**: an HTTP client for Elasticsearch-style `_search` endpoints
//!   and an in-memory double with the same window semantics for tests and
//!   demos, both behind the [`store::BuildStore`] trait.
//! - **Reports**: training yields a per-row scored [`detector::TrainingReport`];
//!   scanning yields ordered [`detector::AnomalyReport`]s renderable through
//!   the [`formatters`] module.
//!
//! ## Architecture
//!
//! - **`record`**: wire documents, flattened build records, feature vectors
//! - **`store`**: document store trait, HTTP client, search windows, in-memory double
//! - **`model`**: the isolation forest and its hyperparameters
//! - **`detector`**: training and realtime scanning over a store
//! - **`formatters`**: human and JSON rendering of scan results
//! - **`logging`**: tracing subscriber setup
//!
//! ## Operational Shape
//!
//! The detector holds the fitted model in memory only. A new process must
//! retrain before it can scan, and a scan issued before training fails with
//! [`detector::DetectorError::UnfittedModel`] rather than scoring garbage.
//! Scheduling of periodic runs is left to an external scheduler.

pub mod detector;
pub mod formatters;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod record;
pub mod store;
