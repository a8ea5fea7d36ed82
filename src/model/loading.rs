use std::time::{Duration, Instant};
use tracing::trace;

/// One-shot deadline that resolves a table's loading phase.
///
/// Nothing runs in the background: the owner polls it from the event loop
/// (`Message::Tick`). `poll` reports `true` exactly once, on the first call at
/// or after the deadline. A cancelled timer never fires.
#[derive(Debug, Clone)]
pub struct LoadingTimer {
    deadline: Option<Instant>,
}

impl LoadingTimer {
    pub fn start(delay: Duration, now: Instant) -> Self {
        Self {
            deadline: Some(now + delay),
        }
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            trace!("Cancelled pending loading timer");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}
