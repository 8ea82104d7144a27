//! Alphabetical shard table for paged member listings.
//!
//! A long alphabetical listing is split into pages; the table holds the
//! first key of each page, in the same ordering the listing is sorted by,
//! so a lookup key routes to its page with one binary search and no page
//! ever needs to be resident.

use crate::errors::{IndexError, IndexResult};

/// Ordered shard boundaries (`NAVTREEINDEX`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShardTable {
    keys: Vec<String>,
}

impl ShardTable {
    /// Build a table, rejecting a key sequence that is not monotonically
    /// non-decreasing.
    pub fn new(keys: Vec<String>) -> IndexResult<Self> {
        for (i, pair) in keys.windows(2).enumerate() {
            if pair[0] > pair[1] {
                return Err(IndexError::UnsortedShardKey {
                    position: i + 1,
                    key: pair[1].clone(),
                });
            }
        }
        Ok(Self { keys })
    }

    /// The shard whose range contains `key`.
    ///
    /// Keys below the first boundary clamp to shard 0 and keys beyond the
    /// last boundary clamp to the final shard, so every key maps to some
    /// shard. Only an empty table fails.
    pub fn shard_for(&self, key: &str) -> IndexResult<usize> {
        if self.keys.is_empty() {
            return Err(IndexError::OutOfRange);
        }
        let upper = self.keys.partition_point(|boundary| boundary.as_str() <= key);
        Ok(upper.saturating_sub(1))
    }

    /// The boundary key opening the given shard.
    pub fn boundary(&self, shard: usize) -> Option<&str> {
        self.keys.get(shard).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
