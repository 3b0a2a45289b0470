//! Device facade the scheduler submits events to.
//!
//! The media/bus model beneath the FTL's `controller.issue` call is a
//! caller-supplied concern; this module only defines the pull-based
//! boundary the scheduler drives it through. A callback straight from the
//! device back into the scheduler (`os.register_event_completion`) would
//! need shared, mutable access to the `OperatingSystem` from code it itself
//! called — exactly the aliasing `&mut` forbids, since it owns its
//! `Box<dyn Ssd>`. Recording results on the `Ssd` side and having the
//! scheduler pull them after each dispatch (`poll_completions`) keeps every
//! event owned by exactly one place at a time without reintroducing
//! `Rc<RefCell<_>>` just to route a callback. See DESIGN.md for the full
//! writeup.

use crate::error::Result;
use crate::event::Event;
use crate::ftl::FtlParent;

/// The device-facing half of the dispatch loop: the FTL/bus/media
/// internals it calls through are a caller-supplied concern.
pub trait Ssd {
    /// Accepts `event` for servicing. Implementations decide how much of
    /// `event.time_taken` to fill in; the scheduler only reads it back
    /// once the event surfaces from [`Ssd::poll_completions`].
    fn submit(&mut self, event: Event) -> Result<()>;

    /// How much longer the device needs before it can accept more work,
    /// measured from `time`. Zero means it is idle right now. The
    /// scheduler uses this to decide whether to keep pumping `get_next_ios`
    /// or wait.
    fn progress_since_os_is_waiting(&self, time: f64) -> f64;

    /// Drains and returns events that finished servicing since the last
    /// call, in completion order.
    fn poll_completions(&mut self) -> Vec<Event>;

    fn get_ftl(&mut self) -> &mut dyn FtlParent;
}

/// A minimal, synchronous `Ssd`: every `submit` completes immediately by
/// routing through the FTL and resolving on the spot. No queueing depth, no
/// media latency beyond what the FTL/config timing model already charges —
/// a stand-in for a real media model.
///
/// `PageHotnessMeasurer` is not wired in here: feeding it requires the
/// split `ReadCommand`/`ReadTransfer` phases its precondition keys on, and
/// splitting a logical `Read` into those phases is a bus/controller
/// submission concern. A caller that implements that split (or a
/// write-placement heuristic consuming the measurer) drives
/// `register_event` directly.
pub struct SimulatedSsd {
    ftl: Box<dyn FtlParent>,
    completed: Vec<Event>,
}

impl SimulatedSsd {
    pub fn new(ftl: Box<dyn FtlParent>) -> Self {
        Self { ftl, completed: Vec::new() }
    }
}

impl Ssd for SimulatedSsd {
    fn submit(&mut self, mut event: Event) -> Result<()> {
        match event.event_type {
            crate::event::EventType::Write => self.ftl.write(&mut event)?,
            crate::event::EventType::Read
            | crate::event::EventType::ReadTransfer
            | crate::event::EventType::ReadCommand => self.ftl.read(&mut event)?,
            // Trim and Noop carry no mapping work; the FTL contract only
            // names read/write.
            crate::event::EventType::Trim | crate::event::EventType::Noop => {}
        }
        self.completed.push(event);
        Ok(())
    }

    fn progress_since_os_is_waiting(&self, _time: f64) -> f64 {
        0.0
    }

    fn poll_completions(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.completed)
    }

    fn get_ftl(&mut self) -> &mut dyn FtlParent {
        self.ftl.as_mut()
    }
}
