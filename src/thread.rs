//! Workload generator interface consumed by the scheduler.
//!
//! Generator bodies are supplied by the caller — this module only defines
//! the trait.

use crate::event::Event;

/// A workload generator. Despite the name, this is not an OS thread or a
/// unit of preemptive execution — it's a lazy sequence of events the
/// scheduler pulls from cooperatively.
pub trait Thread {
    /// Called once when the scheduler adopts this thread (fresh or as a
    /// follow-up), with the scheduler's current time.
    fn init(&mut self, time: f64);

    /// Produces the next event, or `None` once the generator is exhausted.
    /// May be finite or infinite.
    fn next(&mut self) -> Option<Event>;

    /// Notifies the thread that one of its events completed.
    fn register_event_completion(&mut self, event: &Event);

    fn is_finished(&self) -> bool;
    fn set_finished(&mut self);

    fn set_time(&mut self, t: f64);
    fn get_time(&self) -> f64;

    /// Follow-up threads to splice in once this thread is finished. Called
    /// at most once; should return an empty `Vec` if there are none.
    fn take_follow_up_threads(&mut self) -> Vec<Box<dyn Thread>>;
}
