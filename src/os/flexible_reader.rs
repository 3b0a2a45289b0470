//! A read-only workload that scans a fixed set of logical address ranges,
//! bypassing per-LBA locking, as handed out by
//! `OperatingSystem::create_flexible_reader`. It emits one `Read` per
//! logical address across the ranges, marked `is_flexible_read`, and never
//! produces follow-ups.

use crate::address::AddressRange;
use crate::event::{Event, EventType};

/// Workload generator backing `OperatingSystem::create_flexible_reader`.
pub struct FlexibleReader {
    addresses: std::vec::IntoIter<u64>,
    application_io_id: u32,
    time: f64,
    finished: bool,
}

impl FlexibleReader {
    pub fn new(ranges: Vec<AddressRange>, application_io_id: u32) -> Self {
        let addresses: Vec<u64> = ranges.iter().flat_map(|r| r.iter()).collect();
        Self { addresses: addresses.into_iter(), application_io_id, time: 0.0, finished: false }
    }
}

impl crate::thread::Thread for FlexibleReader {
    fn init(&mut self, time: f64) {
        self.time = time;
    }

    fn next(&mut self) -> Option<Event> {
        let lba = self.addresses.next()?;
        let mut event = Event::new(EventType::Read, lba, self.time, self.application_io_id);
        event.is_flexible_read = true;
        Some(event)
    }

    fn register_event_completion(&mut self, _event: &Event) {}

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn set_finished(&mut self) {
        self.finished = true;
    }

    fn set_time(&mut self, t: f64) {
        self.time = t;
    }

    fn get_time(&self) -> f64 {
        self.time
    }

    fn take_follow_up_threads(&mut self) -> Vec<Box<dyn crate::thread::Thread>> {
        Vec::new()
    }
}
