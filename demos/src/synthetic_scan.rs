//! Example demonstrating the full train-then-scan pipeline on synthetic data.
//!
//! Seeds an in-memory store with a month of well-behaved builds plus a few
//! degenerate ones, trains the detector, and scans the most recent window.
//!
//! Run with:
//! ```bash
//! cargo run --example synthetic_scan
//! ```

use buildwatch::detector::BuildAnomalyDetector;
use buildwatch::formatters::{HumanFormatter, JsonFormatter, ReportFormatter};
use buildwatch::record::BuildRecord;
use buildwatch::store::InMemoryStore;
use chrono::{DateTime, Duration, Utc};

fn healthy_build(id: &str, elapsed: f64, steps: usize, at: DateTime<Utc>) -> BuildRecord {
    BuildRecord::new(id)
        .with_elapsed_time(elapsed)
        .with_step_count(steps)
        .with_timestamp(at.to_rfc3339())
        .with_slave("builder-linux64-03")
}

fn stuck_build(id: &str, at: DateTime<Utc>) -> BuildRecord {
    BuildRecord::new(id)
        .with_elapsed_time(48_600.0)
        .with_step_count(1)
        .with_exit_code(137)
        .with_failure(true)
        .with_timestamp(at.to_rfc3339())
        .with_slave("builder-win64-11")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Synthetic Scan Example ===\n");

    let now = Utc::now();
    let store = InMemoryStore::new();

    // A month of ordinary builds: ~5 minutes, ~10 steps, clean exits.
    for day in 2..26 {
        let id = format!("20240800.{day}");
        let elapsed = 290.0 + (day % 7) as f64 * 3.0;
        let steps = 9 + (day % 3) as usize;
        store
            .insert(healthy_build(&id, elapsed, steps, now - Duration::days(day)))
            .await;
    }

    // One historic incident: a build that hung for hours and was killed.
    store
        .insert(stuck_build("20240802.9", now - Duration::days(19)))
        .await;

    // The last hour: two ordinary builds and one that looks like the incident.
    store
        .insert(healthy_build(
            "20240828.1",
            297.0,
            10,
            now - Duration::minutes(40),
        ))
        .await;
    store
        .insert(healthy_build(
            "20240828.2",
            301.0,
            10,
            now - Duration::minutes(25),
        ))
        .await;
    store
        .insert(stuck_build("20240828.3", now - Duration::minutes(10)))
        .await;

    println!("Seeded {} builds into the in-memory store\n", store.len().await);

    let mut detector = BuildAnomalyDetector::new(Box::new(store));

    println!("=== Training ===\n");
    let report = detector.train().await?;
    println!(
        "Trained on {} builds, {} flagged in the training window:",
        report.total(),
        report.outlier_count()
    );
    for row in report.outliers() {
        println!(
            "  {} (score {:.4})",
            row.record.build_id.as_deref().unwrap_or("unknown"),
            row.anomaly_score
        );
    }
    println!();

    println!("=== Realtime Scan ===\n");
    let anomalies = detector.scan().await?;
    print!("{}", HumanFormatter::new().format(&anomalies)?);
    println!();

    println!("=== JSON Output ===\n");
    println!("{}", JsonFormatter::new().format(&anomalies)?);

    Ok(())
}
