//! Storage trait definitions.

use crate::domain::{SignupRecord, SignupStatus, SolutionRecord, SolutionStatus};
use crate::error::Result;

/// A record that can live in a `RecordStore`.
pub trait Record: Clone {
    /// Lifecycle status the store can filter on
    type Status: Copy + PartialEq;

    /// Key the store indexes the record by.
    fn key(&self) -> &str;

    fn status(&self) -> Self::Status;
}

/// Keyed record storage. Mutations stay in memory until `flush`.
pub trait RecordStore<R: Record> {
    /// Get a record by key.
    fn get(&self, key: &str) -> Option<R>;

    /// Insert a record, or replace the one with the same key in place.
    fn upsert(&mut self, record: R);

    /// All records with the given status, in store order.
    fn list_by_status(&self, status: R::Status) -> Vec<R>;

    /// Number of records held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist every record.
    fn flush(&self) -> Result<()>;
}

impl Record for SignupRecord {
    type Status = SignupStatus;

    fn key(&self) -> &str {
        &self.id
    }

    fn status(&self) -> SignupStatus {
        self.status
    }
}

/// Solutions are keyed by the sign-up they belong to, so regenerating replaces.
impl Record for SolutionRecord {
    type Status = SolutionStatus;

    fn key(&self) -> &str {
        &self.signup_id
    }

    fn status(&self) -> SolutionStatus {
        self.status
    }
}
