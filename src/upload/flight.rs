use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exclusive slot for the form's one in-flight upload.
///
/// `try_acquire` is a compare-and-set; the returned permit frees the slot when
/// dropped, so every exit path of a submission resets `loading`.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn try_acquire(&self) -> Option<FlightPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightPermit {
                busy: self.busy.clone(),
            })
    }
}

#[derive(Debug)]
#[must_use = "dropping the permit ends the flight"]
pub struct FlightPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for FlightPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
