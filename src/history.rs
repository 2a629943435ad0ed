//! Append-only recency log for finished calls
//!
//! Terminated call legs are appended here (remote identity, outcome,
//! timestamp) by the side-effect executor. Entries are never mutated or
//! deleted by this core; consumers read snapshots.
//!
//! # Usage Examples
//!
//! ```rust
//! use tone_client_core::call::{CallOutcome, Remote};
//! use tone_client_core::capabilities::HistorySink;
//! use tone_client_core::history::RecencyLog;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let log = RecencyLog::new();
//! let remote = Remote::incoming("alice", "session-1").with_call_id("c1");
//! log.add_recent_call(remote, CallOutcome::Accepted).await.unwrap();
//!
//! let entries = log.entries().await;
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].remote.number, "alice");
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::call::{CallOutcome, Remote};
use crate::capabilities::HistorySink;
use crate::error::ClientResult;

/// A single finished call leg
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// The remote party of the finished leg
    pub remote: Remote,
    /// When the leg was recorded as finished
    pub timestamp: DateTime<Utc>,
    /// Outcome the leg ended with
    pub outcome: CallOutcome,
}

/// In-memory append-only log of finished calls
///
/// The default [`HistorySink`] implementation. Persistence and
/// rehydration are the embedding application's concern; this log only
/// guarantees append-only, ordered recording.
#[derive(Debug, Default)]
pub struct RecencyLog {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl RecencyLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded entries, oldest first
    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.clone()
    }

    /// Number of recorded entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl HistorySink for RecencyLog {
    async fn add_recent_call(&self, remote: Remote, outcome: CallOutcome) -> ClientResult<()> {
        let entry = HistoryEntry { remote, timestamp: Utc::now(), outcome };
        self.entries.write().await.push(entry);
        Ok(())
    }
}
