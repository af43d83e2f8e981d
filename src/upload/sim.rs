//! Virtual-clock doubles for driving the upload pipeline in tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;

use super::error::{PickerError, UploadError, ValidationError};
use super::form::UploadListener;
use super::hold::{HapticFeedback, HapticKind, TimerHost, TimerId};
use super::payload::UploadPayload;
use super::submitter::UploadTransport;
use crate::api::models::UploadAck;

#[derive(Debug, Clone, Copy)]
struct SimTimer {
    due_ms: u64,
    every_ms: Option<u64>,
}

#[derive(Debug, Default)]
struct SimClock {
    now_ms: u64,
    next_id: u64,
    timers: BTreeMap<TimerId, SimTimer>,
}

/// Timer host whose clock only moves when a test calls [`SimTimers::advance`].
/// Clones share one clock.
#[derive(Debug, Clone, Default)]
pub struct SimTimers {
    clock: Rc<RefCell<SimClock>>,
}

impl SimTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.borrow().now_ms
    }

    pub fn pending(&self) -> usize {
        self.clock.borrow().timers.len()
    }

    /// Moves the clock forward, handing each due timer to `deliver` in
    /// deadline order. Cancellations made inside `deliver` take effect for
    /// the rest of the window.
    pub fn advance(&self, ms: u64, mut deliver: impl FnMut(TimerId)) {
        let target = self.now_ms() + ms;
        while let Some(id) = self.pop_due(target) {
            deliver(id);
        }
        self.clock.borrow_mut().now_ms = target;
    }

    fn pop_due(&self, until_ms: u64) -> Option<TimerId> {
        let mut clock = self.clock.borrow_mut();
        let (id, timer) = clock
            .timers
            .iter()
            .filter(|(_, timer)| timer.due_ms <= until_ms)
            .min_by_key(|(id, timer)| (timer.due_ms, **id))
            .map(|(id, timer)| (*id, *timer))?;

        clock.now_ms = timer.due_ms;
        match timer.every_ms {
            Some(every) => {
                if let Some(entry) = clock.timers.get_mut(&id) {
                    entry.due_ms += every.max(1);
                }
            }
            None => {
                clock.timers.remove(&id);
            }
        }
        Some(id)
    }

    fn insert(&mut self, delay: Duration, repeating: bool) -> TimerId {
        let mut clock = self.clock.borrow_mut();
        let id = TimerId(clock.next_id);
        clock.next_id += 1;
        let delay_ms = delay.as_millis() as u64;
        let timer = SimTimer {
            due_ms: clock.now_ms + delay_ms,
            every_ms: repeating.then_some(delay_ms),
        };
        clock.timers.insert(id, timer);
        id
    }
}

impl TimerHost for SimTimers {
    fn schedule_once(&mut self, delay: Duration) -> TimerId {
        self.insert(delay, false)
    }

    fn schedule_repeating(&mut self, every: Duration) -> TimerId {
        self.insert(every, true)
    }

    fn cancel(&mut self, timer: TimerId) {
        self.clock.borrow_mut().timers.remove(&timer);
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingHaptics {
    pulses: Rc<RefCell<Vec<HapticKind>>>,
}

impl RecordingHaptics {
    pub fn pulses(&self) -> Vec<HapticKind> {
        self.pulses.borrow().clone()
    }

    pub fn count(&self, kind: HapticKind) -> usize {
        self.pulses
            .borrow()
            .iter()
            .filter(|pulse| **pulse == kind)
            .count()
    }
}

impl HapticFeedback for RecordingHaptics {
    fn pulse(&self, kind: HapticKind) {
        self.pulses.borrow_mut().push(kind);
    }
}

/// Transport that records every payload and answers with a fixed result.
#[derive(Debug)]
pub struct RecordingTransport {
    calls: RefCell<Vec<UploadPayload>>,
    response: Result<UploadAck, UploadError>,
}

impl RecordingTransport {
    pub fn succeeding() -> Self {
        Self::answering(Ok(UploadAck::default()))
    }

    pub fn failing(err: UploadError) -> Self {
        Self::answering(Err(err))
    }

    pub fn answering(response: Result<UploadAck, UploadError>) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            response,
        }
    }

    pub fn calls(&self) -> Vec<UploadPayload> {
        self.calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl UploadTransport for RecordingTransport {
    async fn send(&self, payload: UploadPayload) -> Result<UploadAck, UploadError> {
        self.calls.borrow_mut().push(payload);
        self.response.clone()
    }
}

/// Screen callback surface that keeps every signal it receives.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenSignal {
    Success,
    Failure(UploadError),
    Validation(ValidationError),
    Picker(PickerError),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    signals: Rc<RefCell<Vec<ScreenSignal>>>,
}

impl RecordingListener {
    pub fn signals(&self) -> Vec<ScreenSignal> {
        self.signals.borrow().clone()
    }

    pub fn successes(&self) -> usize {
        self.signals
            .borrow()
            .iter()
            .filter(|signal| matches!(signal, ScreenSignal::Success))
            .count()
    }

    pub fn failures(&self) -> usize {
        self.signals
            .borrow()
            .iter()
            .filter(|signal| matches!(signal, ScreenSignal::Failure(_)))
            .count()
    }
}

impl UploadListener for RecordingListener {
    fn on_upload_success(&self, _ack: &UploadAck) {
        self.signals.borrow_mut().push(ScreenSignal::Success);
    }

    fn on_upload_failure(&self, reason: &UploadError) {
        self.signals
            .borrow_mut()
            .push(ScreenSignal::Failure(reason.clone()));
    }

    fn on_validation_error(&self, error: ValidationError) {
        self.signals
            .borrow_mut()
            .push(ScreenSignal::Validation(error));
    }

    fn on_picker_error(&self, error: &PickerError) {
        self.signals
            .borrow_mut()
            .push(ScreenSignal::Picker(error.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeating_timer_fires_every_interval() {
        let mut timers = SimTimers::new();
        let tick = timers.schedule_repeating(Duration::from_millis(100));
        let mut fired = Vec::new();
        timers.advance(350, |id| fired.push(id));
        assert_eq!(fired, vec![tick, tick, tick]);
        assert_eq!(timers.now_ms(), 350);
        assert_eq!(timers.pending(), 1);
    }

    #[test]
    fn cancel_inside_delivery_stops_later_fires() {
        let mut timers = SimTimers::new();
        let tick = timers.schedule_repeating(Duration::from_millis(100));
        let once = timers.schedule_once(Duration::from_millis(250));
        let mut host = timers.clone();
        let mut fired = Vec::new();
        timers.advance(1000, |id| {
            fired.push(id);
            if id == once {
                host.cancel(tick);
            }
        });
        assert_eq!(fired, vec![tick, tick, once]);
        assert_eq!(timers.pending(), 0);
    }
}
