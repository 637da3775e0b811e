//! Document store access for build records.
//!
//! The [`BuildStore`] trait is the seam between the detector and whatever
//! holds the build documents. [`ElasticStore`] talks to a real
//! Elasticsearch-style cluster over HTTP; [`InMemoryStore`] implements the
//! same window semantics in memory for tests and demos.

mod client;
mod error;
mod memory;
mod query;

pub use client::{ElasticStore, StoreConfig, DEFAULT_ENDPOINT, DEFAULT_INDEX_PATTERN};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use query::{Lookback, SearchWindow, REALTIME_FETCH_SIZE, TRAINING_FETCH_SIZE};

use async_trait::async_trait;

use crate::record::BuildRecord;

/// Read-only access to the build document store.
#[async_trait]
pub trait BuildStore: Send + Sync {
    /// Fetches the builds matching a window, flattened into records.
    ///
    /// Returns at most [`SearchWindow::size`] records, in the order the
    /// store produced them: descending timestamp for newest-first windows,
    /// index order otherwise.
    async fn fetch_builds(&self, window: &SearchWindow) -> StoreResult<Vec<BuildRecord>>;

    /// Short name of the backing store, for log fields.
    fn name(&self) -> &str;
}
