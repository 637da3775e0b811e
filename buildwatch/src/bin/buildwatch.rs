//! Buildwatch entry point.
//!
//! Trains an anomaly model on the last 30 days of CI builds, then scans
//! the last 24 hours and prints any builds that look atypical.

use std::error::Error;

use buildwatch::detector::{BuildAnomalyDetector, DetectorError};
use buildwatch::formatters::{HumanFormatter, ReportFormatter};
use buildwatch::logging::{init_logging, LoggingConfig};
use buildwatch::store::{ElasticStore, StoreConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging(LoggingConfig::default())?;

    let store = ElasticStore::new(StoreConfig::default())?;
    let mut detector = BuildAnomalyDetector::new(Box::new(store));

    println!("📊 Fetching training data...");
    let training = match detector.train().await {
        Ok(report) => report,
        Err(DetectorError::InsufficientData { rows, required }) => {
            println!("Not enough data to train ({rows} builds, {required} required)");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    println!("🤖 Trained on {} builds", training.total());
    println!(
        "🔍 {} anomalies detected across {} training builds",
        training.outlier_count(),
        training.total()
    );

    let anomalies = detector.scan().await?;
    print!("{}", HumanFormatter::new().format(&anomalies)?);

    Ok(())
}
