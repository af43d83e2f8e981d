//! Dioxus-backed timers and haptics for the hold-to-upload control.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use dioxus::core::Task;
use dioxus::prelude::*;
use tracing::trace;

use crate::upload::{HapticFeedback, HapticKind, TimerHost, TimerId};

#[cfg(not(target_arch = "wasm32"))]
async fn hold_delay(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(target_arch = "wasm32")]
async fn hold_delay(duration: Duration) {
    gloo_timers::future::TimeoutFuture::new(duration.as_millis() as u32).await;
}

/// Schedules timers as tasks on the current Dioxus scope. Every fire is
/// handed to `dispatch` together with the id returned at scheduling time.
#[derive(Clone)]
pub struct DioxusTimers {
    tasks: Rc<RefCell<HashMap<TimerId, Task>>>,
    next_id: Rc<Cell<u64>>,
    dispatch: Rc<dyn Fn(TimerId)>,
}

impl DioxusTimers {
    pub fn new(dispatch: impl Fn(TimerId) + 'static) -> Self {
        Self {
            tasks: Rc::new(RefCell::new(HashMap::new())),
            next_id: Rc::new(Cell::new(1)),
            dispatch: Rc::new(dispatch),
        }
    }

    fn allocate(&self) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        TimerId(id)
    }
}

impl TimerHost for DioxusTimers {
    fn schedule_once(&mut self, delay: Duration) -> TimerId {
        let id = self.allocate();
        let tasks = self.tasks.clone();
        let dispatch = self.dispatch.clone();
        let task = spawn(async move {
            hold_delay(delay).await;
            // Gone from the map means cancelled while we slept.
            if tasks.borrow_mut().remove(&id).is_some() {
                dispatch(id);
            }
        });
        self.tasks.borrow_mut().insert(id, task);
        id
    }

    fn schedule_repeating(&mut self, interval: Duration) -> TimerId {
        let id = self.allocate();
        let tasks = self.tasks.clone();
        let dispatch = self.dispatch.clone();
        let task = spawn(async move {
            loop {
                hold_delay(interval).await;
                if !tasks.borrow().contains_key(&id) {
                    break;
                }
                dispatch(id);
            }
        });
        self.tasks.borrow_mut().insert(id, task);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        let task = self.tasks.borrow_mut().remove(&id);
        if let Some(task) = task {
            trace!(timer = id.0, "timer cancelled");
            task.cancel();
        }
    }
}

fn vibration_pattern(kind: HapticKind) -> &'static str {
    match kind {
        HapticKind::Medium => "[20]",
        HapticKind::Success => "[15, 60, 15]",
        HapticKind::Warning => "[40, 40, 40]",
    }
}

/// Pulses the device vibration motor through the webview.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceHaptics;

impl HapticFeedback for DeviceHaptics {
    fn pulse(&self, kind: HapticKind) {
        let script = format!(
            "if (navigator.vibrate) {{ navigator.vibrate({}); }}",
            vibration_pattern(kind)
        );
        let _ = document::eval(&script);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_pattern_is_a_double_tap() {
        assert_eq!(vibration_pattern(HapticKind::Success), "[15, 60, 15]");
        assert_ne!(
            vibration_pattern(HapticKind::Medium),
            vibration_pattern(HapticKind::Warning)
        );
    }
}
