//! Hierarchical physical coordinates and their projection to a linear index.

use serde::{Deserialize, Serialize};

use crate::config::Geometry;

/// How many coordinate levels of an [`Address`] are meaningful.
///
/// Addresses are sometimes constructed partially (e.g. "the die at
/// package 1, die 0" with plane/block/page left at zero and unused) — this
/// tag records how far down the hierarchy the address actually identifies
/// something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressValidity {
    None,
    Package,
    Die,
    Plane,
    Block,
    Page,
}

/// A physical coordinate: `(package, die, plane, block, page)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub package: u64,
    pub die: u64,
    pub plane: u64,
    pub block: u64,
    pub page: u64,
    pub valid: AddressValidity,
}

impl Address {
    pub fn new(package: u64, die: u64, plane: u64, block: u64, page: u64, valid: AddressValidity) -> Self {
        Self { package, die, plane, block, page, valid }
    }

    /// Builds a fully-specified page address from a linear page index,
    /// decoding the mixed-radix hierarchy defined by `geometry`.
    pub fn from_linear(mut linear: u64, geometry: &Geometry) -> Self {
        let page = linear % geometry.block_size;
        linear /= geometry.block_size;
        let block = linear % geometry.plane_size;
        linear /= geometry.plane_size;
        let plane = linear % geometry.die_size;
        linear /= geometry.die_size;
        let die = linear % geometry.package_size;
        linear /= geometry.package_size;
        let package = linear;
        Self::new(package, die, plane, block, page, AddressValidity::Page)
    }

    /// Projects this address down to a linear page index (the fixed
    /// mixed-radix function of `SSD_SIZE, PACKAGE_SIZE, DIE_SIZE,
    /// PLANE_SIZE, BLOCK_SIZE`).
    pub fn linear_address(&self, geometry: &Geometry) -> u64 {
        let combined = self.package * geometry.package_size + self.die;
        let combined = combined * geometry.die_size + self.plane;
        let combined = combined * geometry.plane_size + self.block;
        combined * geometry.block_size + self.page
    }
}

/// An inclusive range of logical page addresses, as passed to
/// `OperatingSystem::create_flexible_reader`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRange {
    pub start: u64,
    pub end: u64,
}

impl AddressRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> {
        self.start..=self.end
    }
}
