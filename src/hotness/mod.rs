//! EWMA-based write/read hotness classification and per-die WCRH/WCRC
//! aggregates used by write placement heuristics.
//!
//! `current_interval` advances on every rollover, and the per-die
//! least-count scan picks the true minimum. See DESIGN.md for the full
//! rationale.

use serde::{Deserialize, Serialize};

use crate::address::{Address, AddressValidity};
use crate::config::Geometry;
use crate::error::{Result, SimError};
use crate::event::{Event, EventType};

const INTERVAL_LENGTH: f64 = 1000.0;
const WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteHotness {
    WriteHot,
    WriteCold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadHotness {
    ReadHot,
    ReadCold,
}

/// Exponentially-weighted hotness tracker over the device's physical pages.
#[derive(Debug, Clone)]
pub struct PageHotnessMeasurer {
    geometry: Geometry,

    write_current_count: Vec<u64>,
    write_moving_average: Vec<f64>,
    read_current_count: Vec<u64>,
    read_moving_average: Vec<f64>,

    current_interval: u64,
    average_write_hotness: f64,
    average_read_hotness: f64,

    /// Indexed `[package][die]`.
    num_wcrh_pages_per_die: Vec<Vec<u32>>,
    num_wcrc_pages_per_die: Vec<Vec<u32>>,
    current_reads_per_die: Vec<Vec<u32>>,
    average_reads_per_die: Vec<Vec<f64>>,
}

impl PageHotnessMeasurer {
    pub fn new(geometry: Geometry) -> Self {
        let total_pages = geometry.total_pages() as usize;
        let (ssd_size, package_size) = geometry.total_dies();
        let die_grid = || vec![vec![0; package_size as usize]; ssd_size as usize];
        let die_grid_f = || vec![vec![0.0; package_size as usize]; ssd_size as usize];
        Self {
            geometry,
            write_current_count: vec![0; total_pages],
            write_moving_average: vec![0.0; total_pages],
            read_current_count: vec![0; total_pages],
            read_moving_average: vec![0.0; total_pages],
            current_interval: 0,
            average_write_hotness: 0.0,
            average_read_hotness: 0.0,
            num_wcrh_pages_per_die: die_grid(),
            num_wcrc_pages_per_die: die_grid(),
            current_reads_per_die: die_grid(),
            average_reads_per_die: die_grid_f(),
        }
    }

    /// Records one WRITE or READ_COMMAND event. Fatal (`InvariantBreach`)
    /// for any other event type.
    pub fn register_event(&mut self, event: &Event) -> Result<()> {
        if !matches!(event.event_type, EventType::Write | EventType::ReadCommand) {
            return Err(SimError::InvariantBreach(format!(
                "PageHotnessMeasurer::register_event called with {:?}",
                event.event_type
            )));
        }
        let t = event.current_time();
        self.check_if_new_interval(t)?;

        let page_address = event.physical_address.linear_address(&self.geometry) as usize;
        match event.event_type {
            EventType::Write => {
                self.write_current_count[page_address] += 1;
            }
            EventType::ReadCommand => {
                self.current_reads_per_die[event.physical_address.package as usize]
                    [event.physical_address.die as usize] += 1;
                self.read_current_count[page_address] += 1;
            }
            _ => unreachable!(),
        }
        Ok(())
    }

    fn check_if_new_interval(&mut self, time: f64) -> Result<()> {
        let k = ((time - self.current_interval as f64 * INTERVAL_LENGTH) / INTERVAL_LENGTH).trunc();
        if k < 0.0 {
            return Err(SimError::InvariantBreach(format!(
                "hotness measurer rolled backwards: k={k}"
            )));
        }
        let k = k as u64;
        if k == 0 {
            return Ok(());
        }

        self.average_write_hotness = 0.0;
        self.average_read_hotness = 0.0;
        let p = WEIGHT.powi((k - 1) as i32);

        for addr in 0..self.write_moving_average.len() {
            let w_count = self.write_current_count[addr];
            self.write_moving_average[addr] =
                self.write_moving_average[addr] * WEIGHT + w_count as f64 * (1.0 - WEIGHT);
            self.write_moving_average[addr] *= p;
            self.write_current_count[addr] = 0;
            self.average_write_hotness += self.write_moving_average[addr];

            let r_count = self.read_current_count[addr];
            self.read_moving_average[addr] =
                self.read_moving_average[addr] * WEIGHT + r_count as f64 * (1.0 - WEIGHT);
            self.read_moving_average[addr] *= p;
            self.read_current_count[addr] = 0;
            self.average_read_hotness += self.read_moving_average[addr];
        }
        self.average_write_hotness /= self.write_moving_average.len() as f64;
        self.average_read_hotness /= self.read_moving_average.len() as f64;

        let (ssd_size, package_size) = self.geometry.total_dies();
        for i in 0..ssd_size as usize {
            for j in 0..package_size as usize {
                self.average_reads_per_die[i][j] =
                    self.average_reads_per_die[i][j] * WEIGHT + self.current_reads_per_die[i][j] as f64 * (1.0 - WEIGHT);
                self.current_reads_per_die[i][j] = 0;
                self.num_wcrc_pages_per_die[i][j] = 0;
                self.num_wcrh_pages_per_die[i][j] = 0;
            }
        }

        for addr in 0..self.write_moving_average.len() {
            if self.get_write_hotness(addr as u64) == WriteHotness::WriteCold {
                let a = Address::from_linear(addr as u64, &self.geometry);
                if self.get_read_hotness(addr as u64) == ReadHotness::ReadCold {
                    self.num_wcrc_pages_per_die[a.package as usize][a.die as usize] += 1;
                } else {
                    self.num_wcrh_pages_per_die[a.package as usize][a.die as usize] += 1;
                }
            }
        }

        self.current_interval += k;
        Ok(())
    }

    pub fn get_write_hotness(&self, page_address: u64) -> WriteHotness {
        if self.write_moving_average[page_address as usize] >= self.average_write_hotness {
            WriteHotness::WriteHot
        } else {
            WriteHotness::WriteCold
        }
    }

    pub fn get_read_hotness(&self, page_address: u64) -> ReadHotness {
        if self.read_moving_average[page_address as usize] >= self.average_read_hotness {
            ReadHotness::ReadHot
        } else {
            ReadHotness::ReadCold
        }
    }

    pub fn average_write_hotness(&self) -> f64 {
        self.average_write_hotness
    }

    pub fn average_read_hotness(&self) -> f64 {
        self.average_read_hotness
    }

    /// The die with the fewest write-cold/read-hot pages.
    pub fn get_die_with_least_wcrh(&self) -> Address {
        self.die_with_least(&self.num_wcrh_pages_per_die)
    }

    /// The die with the fewest write-cold/read-cold pages.
    pub fn get_die_with_least_wcrc(&self) -> Address {
        self.die_with_least(&self.num_wcrc_pages_per_die)
    }

    fn die_with_least(&self, counts: &[Vec<u32>]) -> Address {
        let mut package = 0;
        let mut die = 0;
        let mut min = u32::MAX;
        for (i, row) in counts.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                if value < min {
                    min = value;
                    package = i as u64;
                    die = j as u64;
                }
            }
        }
        Address::new(package, die, 0, 0, 0, AddressValidity::Die)
    }
}
