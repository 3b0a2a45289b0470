//! Flash translation layer capability and its DFTL implementation.

pub mod allocator;
pub mod controller;
pub mod dftl;

pub use allocator::{BlockAllocator, BlockPool};
pub use controller::ControllerLike;
pub use dftl::Dftl;

use crate::error::Result;
use crate::event::Event;

/// The capability set an FTL exposes to the controller: resolve a logical
/// address and issue the resulting physical I/O.
///
/// Modeled as a trait rather than an inheritance hierarchy — `Dftl` is one
/// variant; other page-mapping policies could implement it too.
pub trait FtlParent {
    fn read(&mut self, event: &mut Event) -> Result<()>;
    fn write(&mut self, event: &mut Event) -> Result<()>;
}
