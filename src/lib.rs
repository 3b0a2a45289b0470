//! Discrete-event SSD simulator core: a host scheduler, a demand-based
//! flash translation layer, and a page hotness measurer.
//!
//! This crate implements the mechanics only — workload generation, the
//! bus/media model beneath [`ftl::FtlParent`], and the block allocator
//! behind [`ftl::allocator::BlockAllocator`] are external collaborators a
//! caller supplies.

pub mod address;
pub mod config;
pub mod error;
pub mod event;
pub mod ftl;
pub mod hotness;
pub mod os;
pub mod ssd;
pub mod stats;
pub mod thread;

pub use address::{Address, AddressRange, AddressValidity};
pub use config::{Geometry, Policy, SimConfig, Timing};
pub use error::{Result, SimError};
pub use event::{Event, EventType, LockClass};
pub use ftl::{Dftl, FtlParent};
pub use hotness::PageHotnessMeasurer;
pub use os::OperatingSystem;
pub use ssd::{SimulatedSsd, Ssd};
pub use stats::Stats;
pub use thread::Thread;
