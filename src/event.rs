//! The unit of work dispatched by the scheduler and resolved by the FTL.

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// The kind of I/O operation an [`Event`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Read,
    /// The data-transfer half of a split read (bypasses the command phase).
    ReadTransfer,
    /// The command half of a split read.
    ReadCommand,
    Write,
    Trim,
    /// Carries timing only; contributes no media work.
    Noop,
}

impl EventType {
    /// The lock-class group this event type belongs to: `{Read, ReadTransfer}`,
    /// `{Write}`, `{Trim}`. `Noop` and `ReadCommand` never acquire a lock.
    pub fn lock_class(&self) -> Option<LockClass> {
        match self {
            EventType::Read | EventType::ReadTransfer => Some(LockClass::Read),
            EventType::Write => Some(LockClass::Write),
            EventType::Trim => Some(LockClass::Trim),
            EventType::ReadCommand | EventType::Noop => None,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, EventType::Write)
    }
}

/// Which per-LBA lock map an event type participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockClass {
    Read,
    Write,
    Trim,
}

/// One I/O operation moving through the simulator.
///
/// Owned at any instant by exactly one of: a per-thread pending queue, the
/// SSD's in-flight set, or a local dispatch variable. Sub-events chained via
/// `next` (e.g. the translation-page fetch a cache miss injects) are owned
/// transitively and dropped with their parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub logical_address: u64,
    pub physical_address: Address,
    pub start_time: f64,
    pub time_taken: f64,
    pub os_wait_time: f64,
    pub application_io_id: u32,
    pub is_experiment_io: bool,
    pub noop: bool,
    /// A physical page the FTL wants the media layer to invalidate, because
    /// this event's mapping just replaced it (a prior data page on
    /// overwrite, or a dirty CMT victim's page on eviction).
    pub replace_address: Option<Address>,
    /// A chained sub-event (e.g. a translation-page read injected by a CMT
    /// miss), dispatched as its own unit of work by the scheduler.
    pub next: Option<Box<Event>>,
    /// Set on events produced by a [`crate::os::flexible_reader::FlexibleReader`].
    /// The scheduler neither locks their LBA nor treats it as locked.
    pub is_flexible_read: bool,
}

impl Event {
    pub fn new(event_type: EventType, logical_address: u64, start_time: f64, application_io_id: u32) -> Self {
        Self {
            event_type,
            logical_address,
            physical_address: Address::new(0, 0, 0, 0, 0, crate::address::AddressValidity::None),
            start_time,
            time_taken: 0.0,
            os_wait_time: 0.0,
            application_io_id,
            is_experiment_io: false,
            noop: false,
            replace_address: None,
            next: None,
            is_flexible_read: false,
        }
    }

    /// Marks this event as a timing-only placeholder.
    pub fn mark_noop(mut self) -> Self {
        self.noop = true;
        self
    }

    pub fn current_time(&self) -> f64 {
        self.start_time + self.time_taken
    }

    /// The time this event was actually accepted by the device, before any
    /// `os_wait_time` penalty is folded in.
    pub fn ssd_submission_time(&self) -> f64 {
        self.start_time
    }

    /// Appends `sub_event` to the end of this event's chain.
    pub fn chain(&mut self, sub_event: Event) {
        let mut tail = self;
        while tail.next.is_some() {
            tail = tail.next.as_mut().unwrap();
        }
        tail.next = Some(Box::new(sub_event));
    }

    /// Whether this event counts toward the scheduler's completed-writes
    /// counter.
    pub fn counts_as_committed_write(&self) -> bool {
        !self.noop && self.is_experiment_io && self.event_type != EventType::Trim
    }

    /// Merges this event's `next`-chain into one scheduler-visible
    /// completion. The exact consolidation semantics are an SSD-internal
    /// concern; this is the call site the FTL's read/write paths invoke
    /// after a successful `issue`, left as a no-op hook for the SSD
    /// facade to specialize.
    pub fn consolidate_metaevent(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_appends_to_the_tail() {
        let mut e = Event::new(EventType::Write, 10, 0.0, 1);
        e.chain(Event::new(EventType::Noop, 10, 0.0, 1));
        e.chain(Event::new(EventType::Noop, 10, 0.0, 1));
        let mut depth = 0;
        let mut cur = &e;
        while let Some(next) = &cur.next {
            depth += 1;
            cur = next;
        }
        assert_eq!(depth, 2);
    }

    #[test]
    fn lock_class_groups_by_event_type() {
        assert_eq!(EventType::Read.lock_class(), Some(LockClass::Read));
        assert_eq!(EventType::ReadTransfer.lock_class(), Some(LockClass::Read));
        assert_eq!(EventType::Write.lock_class(), Some(LockClass::Write));
        assert_eq!(EventType::Trim.lock_class(), Some(LockClass::Trim));
        assert_eq!(EventType::Noop.lock_class(), None);
    }

    #[test]
    fn committed_write_excludes_noop_and_trim_and_non_experiment() {
        let mut e = Event::new(EventType::Write, 0, 0.0, 1);
        e.is_experiment_io = true;
        assert!(e.counts_as_committed_write());
        e.noop = true;
        assert!(!e.counts_as_committed_write());
        e.noop = false;
        e.event_type = EventType::Trim;
        assert!(!e.counts_as_committed_write());
        e.event_type = EventType::Write;
        e.is_experiment_io = false;
        assert!(!e.counts_as_committed_write());
    }
}
