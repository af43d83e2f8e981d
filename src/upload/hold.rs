//! Press-and-hold confirmation.
//!
//! The controller is driven by discrete events (press begin, press end, timer
//! fired) delivered one at a time by the host. It never owns a clock: timers
//! are requested from a [`TimerHost`] and identified by [`TimerId`], so a
//! cancelled session can be verified to leave nothing scheduled.

use std::time::Duration;

use tracing::{debug, info};

pub const DEFAULT_HOLD_DURATION_MS: u64 = 3000;
pub const DEFAULT_FEEDBACK_INTERVAL_MS: u64 = 100;
const HOLD_DURATION_RANGE_MS: (u64, u64) = (500, 10_000);
const FEEDBACK_INTERVAL_RANGE_MS: (u64, u64) = (16, 1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Host-scheduled callbacks. Fired timers are delivered back through
/// [`HoldController::on_timer`].
pub trait TimerHost {
    fn schedule_once(&mut self, delay: Duration) -> TimerId;
    fn schedule_repeating(&mut self, every: Duration) -> TimerId;
    /// Cancelling an unknown or already-fired timer is a no-op.
    fn cancel(&mut self, timer: TimerId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HapticKind {
    Medium,
    Success,
    Warning,
}

/// Fire-and-forget haptic pulses.
pub trait HapticFeedback {
    fn pulse(&self, kind: HapticKind);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccentColor(pub &'static str);

impl AccentColor {
    pub const RESTING: AccentColor = AccentColor("#182952");
    pub const BRIGHT: AccentColor = AccentColor("#007bff");
    pub const DEEP: AccentColor = AccentColor("#0056b3");

    pub fn as_css(self) -> &'static str {
        self.0
    }

    fn next_flash(self) -> Self {
        if self == Self::BRIGHT {
            Self::DEEP
        } else {
            Self::BRIGHT
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldTiming {
    pub hold_duration: Duration,
    pub feedback_interval: Duration,
}

impl Default for HoldTiming {
    fn default() -> Self {
        Self {
            hold_duration: Duration::from_millis(DEFAULT_HOLD_DURATION_MS),
            feedback_interval: Duration::from_millis(DEFAULT_FEEDBACK_INTERVAL_MS),
        }
    }
}

impl HoldTiming {
    pub fn from_millis(hold_ms: u64, interval_ms: u64) -> Self {
        let hold_ms = hold_ms.clamp(HOLD_DURATION_RANGE_MS.0, HOLD_DURATION_RANGE_MS.1);
        let interval_ms =
            interval_ms.clamp(FEEDBACK_INTERVAL_RANGE_MS.0, FEEDBACK_INTERVAL_RANGE_MS.1);
        Self {
            hold_duration: Duration::from_millis(hold_ms),
            feedback_interval: Duration::from_millis(interval_ms),
        }
    }
}

/// Timers owned by one in-progress hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HoldSession {
    completion: TimerId,
    feedback: TimerId,
}

impl HoldSession {
    fn cancel_all(self, timers: &mut dyn TimerHost) {
        timers.cancel(self.feedback);
        timers.cancel(self.completion);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldState {
    Idle,
    Holding(HoldSession),
    /// The completion timer fired; waiting for the submission to settle.
    Committed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldPhase {
    Idle,
    Holding,
    Committed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldRejection {
    /// A submission is loading or awaiting settlement.
    Busy,
    AlreadyHolding,
}

/// What a delivered timer meant to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    /// Stale or unknown id; nothing changed.
    Ignored,
    Tick,
    /// The hold was sustained for the full duration. Submit now.
    Commit,
}

#[derive(Debug)]
pub struct HoldController {
    state: HoldState,
    accent: AccentColor,
    timing: HoldTiming,
}

impl Default for HoldController {
    fn default() -> Self {
        Self::new(HoldTiming::default())
    }
}

impl HoldController {
    pub fn new(timing: HoldTiming) -> Self {
        Self {
            state: HoldState::Idle,
            accent: AccentColor::RESTING,
            timing,
        }
    }

    pub fn phase(&self) -> HoldPhase {
        match self.state {
            HoldState::Idle => HoldPhase::Idle,
            HoldState::Holding(_) => HoldPhase::Holding,
            HoldState::Committed => HoldPhase::Committed,
        }
    }

    pub fn accent(&self) -> AccentColor {
        self.accent
    }

    pub fn timing(&self) -> HoldTiming {
        self.timing
    }

    /// Takes effect from the next hold.
    pub fn set_timing(&mut self, timing: HoldTiming) {
        self.timing = timing;
    }

    pub fn press_begin(
        &mut self,
        timers: &mut dyn TimerHost,
        haptics: &dyn HapticFeedback,
        loading: bool,
    ) -> Result<(), HoldRejection> {
        match self.state {
            HoldState::Holding(_) => return Err(HoldRejection::AlreadyHolding),
            HoldState::Committed => return Err(HoldRejection::Busy),
            HoldState::Idle if loading => return Err(HoldRejection::Busy),
            HoldState::Idle => {}
        }

        haptics.pulse(HapticKind::Medium);
        let feedback = timers.schedule_repeating(self.timing.feedback_interval);
        let completion = timers.schedule_once(self.timing.hold_duration);
        self.state = HoldState::Holding(HoldSession {
            completion,
            feedback,
        });
        debug!(
            hold_ms = self.timing.hold_duration.as_millis() as u64,
            "hold started"
        );
        Ok(())
    }

    /// Returns `true` when a live hold was cancelled. Releasing after the
    /// completion timer fired changes nothing.
    pub fn press_end(&mut self, timers: &mut dyn TimerHost, haptics: &dyn HapticFeedback) -> bool {
        let HoldState::Holding(session) = self.state else {
            return false;
        };
        session.cancel_all(timers);
        self.state = HoldState::Idle;
        self.accent = AccentColor::RESTING;
        haptics.pulse(HapticKind::Warning);
        debug!("hold released early");
        true
    }

    pub fn on_timer(
        &mut self,
        timers: &mut dyn TimerHost,
        haptics: &dyn HapticFeedback,
        timer: TimerId,
    ) -> TimerSignal {
        let HoldState::Holding(session) = self.state else {
            return TimerSignal::Ignored;
        };

        if timer == session.feedback {
            self.accent = self.accent.next_flash();
            return TimerSignal::Tick;
        }
        if timer != session.completion {
            return TimerSignal::Ignored;
        }

        // The completion timer is one-shot and has already fired.
        timers.cancel(session.feedback);
        self.state = HoldState::Committed;
        self.accent = AccentColor::RESTING;
        haptics.pulse(HapticKind::Success);
        info!("hold completed");
        TimerSignal::Commit
    }

    /// The committed submission finished (or never started); accept new holds.
    pub fn settle(&mut self) {
        if self.state == HoldState::Committed {
            self.state = HoldState::Idle;
        }
    }

    /// Tears down a live hold without feedback, e.g. when the screen goes away.
    pub fn abandon(&mut self, timers: &mut dyn TimerHost) {
        if let HoldState::Holding(session) = self.state {
            session.cancel_all(timers);
            self.state = HoldState::Idle;
            self.accent = AccentColor::RESTING;
            debug!("hold abandoned");
        }
    }
}
