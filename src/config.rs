//! Simulator-wide configuration: geometry, timing, and policy constants.
//!
//! Geometry and timing constants are process-wide but not global statics —
//! they are held on a [`SimConfig`] and passed by reference into the
//! scheduler and FTL constructors.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Physical device geometry, in number of units per level of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub ssd_size: u64,
    pub package_size: u64,
    pub die_size: u64,
    pub plane_size: u64,
    pub block_size: u64,
    /// Page size in bytes.
    pub page_size: u64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            ssd_size: 2,
            package_size: 2,
            die_size: 2,
            plane_size: 2,
            block_size: 32,
            page_size: 8192,
        }
    }
}

impl Geometry {
    /// Total number of data pages addressable on the device.
    pub fn total_pages(&self) -> u64 {
        self.ssd_size * self.package_size * self.die_size * self.plane_size * self.block_size
    }

    /// Total number of dies (`ssd_size * package_size`), used by the hotness
    /// measurer's per-die aggregates.
    pub fn total_dies(&self) -> (u64, u64) {
        (self.ssd_size, self.package_size)
    }
}

/// Bus and media timing constants, in simulator time units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub bus_ctrl_delay: f64,
    pub bus_data_delay: f64,
    pub page_read_delay: f64,
    pub page_write_delay: f64,
    pub ram_read_delay: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            bus_ctrl_delay: 1.0,
            bus_data_delay: 10.0,
            page_read_delay: 20.0,
            page_write_delay: 200.0,
            ram_read_delay: 0.01,
        }
    }
}

/// Scheduling and cache policy constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Multiplier for `total_cmt_entries = cache_dftl_limit * address_per_page`.
    pub cache_dftl_limit: u64,
    /// Bound on the device's in-flight IO queue (`currently_executing_ios`).
    pub max_ssd_queue_size: usize,
    /// Bound on a single thread's outstanding pending events.
    pub max_outstanding_ios_per_thread: usize,
    /// Stop the run once this many writes have completed. `None` = run until
    /// all threads and pending events are drained.
    pub num_writes_to_stop_after: Option<u64>,
    /// Whether per-LBA locking is enforced (`is_LBA_locked` always returns
    /// `false` when this is `false`).
    pub os_lock: bool,
    /// Bit width of a translation-table address entry (used to derive
    /// `address_per_page`).
    pub address_size_bits: u64,
    /// Idle ticks the scheduler tolerates with no dispatchable event before
    /// declaring deadlock.
    pub idle_limit: u64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            cache_dftl_limit: 1,
            max_ssd_queue_size: 64,
            max_outstanding_ios_per_thread: 16,
            num_writes_to_stop_after: None,
            os_lock: true,
            address_size_bits: 32,
            idle_limit: 5_000_000,
        }
    }
}

/// Full simulator configuration, plus the fields derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub geometry: Geometry,
    pub timing: Timing,
    pub policy: Policy,
    /// `⌊page_size / ⌈address_size_bits / 8⌉⌋` — entries a translation page holds.
    address_per_page: u64,
    /// `cache_dftl_limit * address_per_page` — the CMT's entry bound.
    total_cmt_entries: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(Geometry::default(), Timing::default(), Policy::default())
    }
}

impl SimConfig {
    /// Builds a config and computes its derived fields.
    pub fn new(geometry: Geometry, timing: Timing, policy: Policy) -> Self {
        let mut cfg = Self {
            geometry,
            timing,
            policy,
            address_per_page: 0,
            total_cmt_entries: 0,
        };
        cfg.derive();
        cfg
    }

    fn derive(&mut self) {
        let address_bytes = (self.policy.address_size_bits + 7) / 8;
        self.address_per_page = self.geometry.page_size / address_bytes;
        self.total_cmt_entries = self.policy.cache_dftl_limit * self.address_per_page;
    }

    pub fn address_per_page(&self) -> u64 {
        self.address_per_page
    }

    pub fn total_cmt_entries(&self) -> u64 {
        self.total_cmt_entries
    }

    /// The minimal device-side completion delay for a dispatched event,
    /// per the event's type (see `OperatingSystem::dispatch_event`).
    pub fn minimal_completion_delay(&self, is_write: bool) -> f64 {
        let media_delay = if is_write {
            self.timing.page_write_delay
        } else {
            self.timing.page_read_delay
        };
        2.0 * self.timing.bus_ctrl_delay + self.timing.bus_data_delay + media_delay
    }

    /// Parses a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: SimConfig = toml::from_str(content).map_err(|e| SimError::Config(format!("TOML parse error: {e}")))?;
        Ok(Self::new(raw.geometry, raw.timing, raw.policy))
    }

    /// Parses a config from a TOML file on disk.
    pub fn from_toml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("cannot read {path}: {e}")))?;
        Self::from_toml(&content)
    }
}
