//! Inert counters incremented by the FTL and hotness measurer.
//!
//! Aggregation and export (histograms, rates, reporting) is a caller
//! concern — these fields are only ever incremented.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub num_cache_hits: u64,
    pub num_cache_faults: u64,
    pub num_ftl_read: u64,
    pub num_ftl_write: u64,
    pub num_memory_read: u64,
}
