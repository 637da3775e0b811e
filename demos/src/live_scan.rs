//! Example running the detector against a live Elasticsearch instance.
//!
//! Points at `http://localhost:9200` unless `BUILDWATCH_ENDPOINT` is set.
//! The index pattern is the production default, so this expects an index
//! matching `mozilla-builds-*` with build documents in it.
//!
//! Run with:
//! ```bash
//! BUILDWATCH_ENDPOINT=http://localhost:9200 cargo run --example live_scan
//! ```

use buildwatch::detector::{BuildAnomalyDetector, DetectorError};
use buildwatch::formatters::{HumanFormatter, ReportFormatter};
use buildwatch::logging::{init_logging, LoggingConfig};
use buildwatch::store::{ElasticStore, StoreConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::development())?;

    let endpoint = std::env::var("BUILDWATCH_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:9200".to_string());
    println!("=== Live Scan Example ({endpoint}) ===\n");

    let store = ElasticStore::new(StoreConfig::new(endpoint.as_str()))?;
    if let Err(err) = store.ping().await {
        println!("Store is not reachable: {err}");
        println!("Start an Elasticsearch instance or set BUILDWATCH_ENDPOINT.");
        return Ok(());
    }

    let mut detector = BuildAnomalyDetector::new(Box::new(store));

    let report = match detector.train().await {
        Ok(report) => report,
        Err(DetectorError::InsufficientData { rows, required }) => {
            println!("Not enough data to train ({rows} builds, {required} required)");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    println!(
        "Trained on {} builds, {} flagged in the training window\n",
        report.total(),
        report.outlier_count()
    );

    let anomalies = detector.scan().await?;
    print!("{}", HumanFormatter::new().format(&anomalies)?);

    Ok(())
}
