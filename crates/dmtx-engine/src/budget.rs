use std::cell::Cell;
use std::time::{Duration, Instant};

/// Cooperative time budget of one decode call.
///
/// The pipeline polls [`SearchBudget::expired`] once per image row while
/// preprocessing, every [`SearchBudget::LABEL_POLL_PIXELS`] pixels while
/// labelling, and before every candidate region and candidate symbol size.
/// Once expired the budget stays expired.
#[derive(Debug)]
pub struct SearchBudget {
    started: Instant,
    deadline: Option<Instant>,
    tripped: Cell<bool>,
}

impl SearchBudget {
    /// Documented upper bound on how far a decode call may run past its
    /// timeout: one polling interval of work.
    pub const OVERSHOOT_BOUND: Duration = Duration::from_millis(25);

    /// Pixels labelled between two polls.
    pub const LABEL_POLL_PIXELS: usize = 4096;

    pub fn new(timeout: Option<Duration>) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: timeout.and_then(|t| started.checked_add(t)),
            tripped: Cell::new(false),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn expired(&self) -> bool {
        if self.tripped.get() {
            return true;
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => {
                self.tripped.set(true);
                true
            }
            _ => false,
        }
    }

    /// Whether a poll has already observed the deadline, without reading the clock.
    pub fn has_tripped(&self) -> bool {
        self.tripped.get()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
