//! Time-bounded search windows and their wire representation.
//!
//! A [`SearchWindow`] captures everything a fetch needs: the lookback, the
//! document cap, and whether newest documents come first. [`to_request`]
//! turns it into the store's query DSL, and [`cutoff_from`] gives the same
//! boundary as an absolute instant for stores that filter in memory.
//!
//! [`to_request`]: SearchWindow::to_request
//! [`cutoff_from`]: SearchWindow::cutoff_from

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::Serialize;

/// Default document cap for training fetches.
pub const TRAINING_FETCH_SIZE: usize = 1000;

/// Default document cap for realtime fetches.
pub const REALTIME_FETCH_SIZE: usize = 100;

/// Lookback horizon of a window.
///
/// Days round down to UTC midnight and hours truncate to the hour, matching
/// the store's date-math expressions `now-{n}d/d` and `now-{n}h/h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    /// Whole days back from now, rounded down to midnight.
    Days(u32),
    /// Whole hours back from now, truncated to the hour.
    Hours(u32),
}

/// A time-bounded query against the build index.
#[derive(Debug, Clone)]
pub struct SearchWindow {
    lookback: Lookback,
    size: usize,
    newest_first: bool,
}

impl SearchWindow {
    /// Training window: the last `days` days, up to
    /// [`TRAINING_FETCH_SIZE`] documents in index order.
    pub fn training_days(days: u32) -> Self {
        Self {
            lookback: Lookback::Days(days),
            size: TRAINING_FETCH_SIZE,
            newest_first: false,
        }
    }

    /// Realtime window: the last `hours` hours, up to
    /// [`REALTIME_FETCH_SIZE`] documents, newest first.
    pub fn realtime_hours(hours: u32) -> Self {
        Self {
            lookback: Lookback::Hours(hours),
            size: REALTIME_FETCH_SIZE,
            newest_first: true,
        }
    }

    /// Overrides the document cap.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// The lookback horizon.
    pub fn lookback(&self) -> Lookback {
        self.lookback
    }

    /// Maximum number of documents the fetch returns.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether documents are ordered by descending timestamp.
    pub fn newest_first(&self) -> bool {
        self.newest_first
    }

    /// The window's lower bound as a store date-math expression.
    pub fn gte_expression(&self) -> String {
        match self.lookback {
            Lookback::Days(days) => format!("now-{days}d/d"),
            Lookback::Hours(hours) => format!("now-{hours}h/h"),
        }
    }

    /// The window's lower bound as an absolute instant.
    ///
    /// Applies the same rounding the store applies to the date-math
    /// expression: `/d` truncates to UTC midnight, `/h` to the hour.
    pub fn cutoff_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.lookback {
            Lookback::Days(days) => {
                let shifted = now - Duration::days(i64::from(days));
                shifted.duration_trunc(Duration::days(1)).unwrap_or(shifted)
            }
            Lookback::Hours(hours) => {
                let shifted = now - Duration::hours(i64::from(hours));
                shifted
                    .duration_trunc(Duration::hours(1))
                    .unwrap_or(shifted)
            }
        }
    }

    /// The search request body for this window.
    pub(crate) fn to_request(&self) -> SearchRequest {
        SearchRequest {
            size: self.size,
            query: QueryClause {
                range: RangeClause {
                    timestamp: RangeBounds {
                        gte: self.gte_expression(),
                    },
                },
            },
            sort: self.newest_first.then(|| {
                vec![SortClause {
                    timestamp: SortDirection::Desc,
                }]
            }),
        }
    }
}

/// Body of a `_search` request.
#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest {
    pub size: usize,
    pub query: QueryClause,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortClause>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QueryClause {
    pub range: RangeClause,
}

#[derive(Debug, Serialize)]
pub(crate) struct RangeClause {
    #[serde(rename = "@timestamp")]
    pub timestamp: RangeBounds,
}

#[derive(Debug, Serialize)]
pub(crate) struct RangeBounds {
    pub gte: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SortClause {
    #[serde(rename = "@timestamp")]
    pub timestamp: SortDirection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SortDirection {
    Desc,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_training_request_body() {
        let request = SearchWindow::training_days(30).to_request();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "size": 1000,
                "query": {
                    "range": {
                        "@timestamp": {
                            "gte": "now-30d/d"
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_realtime_request_body() {
        let request = SearchWindow::realtime_hours(24).to_request();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "size": 100,
                "query": {
                    "range": {
                        "@timestamp": {
                            "gte": "now-24h/h"
                        }
                    }
                },
                "sort": [{"@timestamp": "desc"}]
            })
        );
    }

    #[test]
    fn test_with_size_overrides_cap() {
        let window = SearchWindow::realtime_hours(24).with_size(25);
        assert_eq!(window.size(), 25);
        assert_eq!(window.to_request().size, 25);
    }

    #[test]
    fn test_day_cutoff_rounds_to_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 14, 37, 21).unwrap();
        let cutoff = SearchWindow::training_days(30).cutoff_from(now);

        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 2, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_hour_cutoff_truncates_to_hour() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 14, 37, 21).unwrap();
        let cutoff = SearchWindow::realtime_hours(24).cutoff_from(now);

        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 3, 14, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_gte_expressions() {
        assert_eq!(SearchWindow::training_days(7).gte_expression(), "now-7d/d");
        assert_eq!(
            SearchWindow::realtime_hours(12).gte_expression(),
            "now-12h/h"
        );
    }
}
