use crate::models::Listing;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Snapshot of one selector's listings as persisted in local storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    pub data: Vec<Listing>,
    /// Capture time, epoch milliseconds
    pub timestamp: i64,
}

impl CacheEntry {
    pub fn new(data: Vec<Listing>, timestamp: i64) -> Self {
        Self { data, timestamp }
    }

    /// `None` when the stored timestamp lies in the future or is too far
    /// away to subtract
    pub fn age_millis(&self, now_millis: i64) -> Option<i64> {
        now_millis
            .checked_sub(self.timestamp)
            .filter(|age| *age >= 0)
    }

    /// Fresh while strictly younger than `ttl`; an entry without a valid age
    /// is never fresh
    pub fn is_fresh(&self, now_millis: i64, ttl: Duration) -> bool {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.age_millis(now_millis)
            .is_some_and(|age| age < ttl_millis)
    }
}
