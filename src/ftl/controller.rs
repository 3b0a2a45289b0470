//! Controller/bus submission collaborator, supplied by the caller.

use crate::error::Result;
use crate::event::Event;

/// External collaborator the FTL hands resolved events to.
pub trait ControllerLike {
    /// Submits `event` to the bus/media layer. `Err` propagates as the
    /// FTL's own `read`/`write` failure.
    fn issue(&mut self, event: &mut Event) -> Result<()>;
}

/// A deterministic test double that always accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAcceptController;

impl ControllerLike for AlwaysAcceptController {
    fn issue(&mut self, _event: &mut Event) -> Result<()> {
        Ok(())
    }
}

/// A test double that fails every Nth call, for exercising the FTL's
/// failure-propagation path.
#[derive(Debug, Clone, Copy)]
pub struct FlakyController {
    pub fail_every: u64,
    calls: u64,
}

impl FlakyController {
    pub fn new(fail_every: u64) -> Self {
        Self { fail_every, calls: 0 }
    }
}

impl ControllerLike for FlakyController {
    fn issue(&mut self, _event: &mut Event) -> Result<()> {
        self.calls += 1;
        if self.fail_every != 0 && self.calls % self.fail_every == 0 {
            Err(crate::error::SimError::ControllerFailure(format!("flaky controller failed call #{}", self.calls)))
        } else {
            Ok(())
        }
    }
}
