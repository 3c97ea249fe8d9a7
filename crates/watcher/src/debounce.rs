//! Burst debouncing for file system change streams.
//!
//! [`DebounceState`] folds an unbounded stream of change notifications into a
//! single "the tree has settled, run now" decision per burst. It is a plain
//! value with no clock of its own: every operation takes `now` as an
//! argument, so the poll loop drives it with real time and tests drive it
//! with synthetic instants.

use std::time::{Duration, Instant};

/// Quiet time a burst must accumulate before the action fires.
pub const DEFAULT_QUIET_THRESHOLD: Duration = Duration::from_secs(1);

/// Cadence of the polling loop.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Debounce state for the current burst.
///
/// Owned by the polling loop. Change notifications reach it through a
/// channel, so none of these operations synchronize anything.
#[derive(Debug, Clone, Copy)]
pub struct DebounceState {
    /// Arrival time of the most recent qualifying change.
    last_change: Instant,
    /// At least one change arrived since the last fire (or since startup).
    change_detected: bool,
    /// The current burst already fired and nothing new arrived since.
    triggered: bool,
}

/// Operator-facing classification of the state at a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No change pending.
    Waiting,
    /// A burst is open and quiet time is still below the threshold.
    Settling(Duration),
    /// Quiet time reached the threshold but the fire has not been claimed
    /// yet. Transient: the tick that observes this normally claims the fire.
    Ready(Duration),
}

impl DebounceState {
    /// Fresh state: nothing pending, nothing fired.
    pub fn new(now: Instant) -> Self {
        Self {
            last_change: now,
            change_detected: false,
            triggered: false,
        }
    }

    /// Record one qualifying change stamped with its arrival time.
    ///
    /// Re-opens the window if the current burst already fired. Safe to call
    /// any number of times per burst; `last_change` never moves backward even
    /// when events drain out of order.
    pub fn record_change(&mut self, at: Instant) {
        if at > self.last_change {
            self.last_change = at;
        }
        self.change_detected = true;
        self.triggered = false;
    }

    /// Elapsed time since the most recent qualifying change.
    pub fn quiet_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_change)
    }

    /// True when the burst has settled and has not fired yet.
    ///
    /// The comparison is strictly greater: at exactly the threshold the burst
    /// reports [`Phase::Ready`] but does not fire until the next tick.
    pub fn should_fire(&self, now: Instant, threshold: Duration) -> bool {
        self.change_detected && !self.triggered && self.quiet_for(now) > threshold
    }

    /// Claim the fire for the current burst.
    ///
    /// Marks the burst triggered and clears the pending flag in one step,
    /// before the action runs, so a notification arriving while the action is
    /// still executing re-opens the window instead of being wiped out when
    /// the action returns.
    ///
    /// Returns `false` and changes nothing unless the fire condition holds,
    /// so a burst can never be claimed twice.
    pub fn claim_fire(&mut self, now: Instant, threshold: Duration) -> bool {
        if !self.should_fire(now, threshold) {
            return false;
        }
        self.triggered = true;
        self.change_detected = false;
        true
    }

    /// Classify the state for the status line.
    pub fn phase(&self, now: Instant, threshold: Duration) -> Phase {
        if !self.change_detected {
            return Phase::Waiting;
        }
        let quiet = self.quiet_for(now);
        if quiet >= threshold {
            Phase::Ready(quiet)
        } else {
            Phase::Settling(quiet)
        }
    }

    /// Whether the most recent burst already ran the action.
    pub fn triggered(&self) -> bool {
        self.triggered
    }

    /// Whether a change is waiting for its quiet period.
    pub fn change_pending(&self) -> bool {
        self.change_detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: Duration = Duration::from_secs(1);

    fn at(start: Instant, ms: u64) -> Instant {
        start + Duration::from_millis(ms)
    }

    #[test]
    fn fresh_state_never_fires() {
        let start = Instant::now();
        let mut state = DebounceState::new(start);

        assert_eq!(state.phase(start, THRESHOLD), Phase::Waiting);
        assert!(!state.should_fire(at(start, 10_000), THRESHOLD));
        assert!(!state.claim_fire(at(start, 10_000), THRESHOLD));
        assert!(!state.triggered());
        assert!(!state.change_pending());
    }

    #[test]
    fn single_change_fires_after_quiet_period() {
        let start = Instant::now();
        let mut state = DebounceState::new(start);

        state.record_change(start);
        assert!(!state.should_fire(at(start, 500), THRESHOLD));
        // Exactly at the threshold the comparison is strict.
        assert!(!state.should_fire(at(start, 1000), THRESHOLD));
        assert!(state.should_fire(at(start, 1001), THRESHOLD));
    }

    #[test]
    fn fire_claims_exactly_once_per_burst() {
        let start = Instant::now();
        let mut state = DebounceState::new(start);

        state.record_change(start);
        assert!(state.claim_fire(at(start, 1100), THRESHOLD));
        assert!(state.triggered());
        assert!(!state.change_pending());

        // No new change: later ticks must not fire again.
        assert!(!state.should_fire(at(start, 2000), THRESHOLD));
        assert!(!state.claim_fire(at(start, 60_000), THRESHOLD));
    }

    #[test]
    fn burst_extends_the_window() {
        let start = Instant::now();
        let mut state = DebounceState::new(start);

        // Changes at t=0, t=0.3s, t=0.6s: the quiet period restarts each time.
        state.record_change(at(start, 0));
        state.record_change(at(start, 300));
        state.record_change(at(start, 600));

        assert!(!state.should_fire(at(start, 1500), THRESHOLD));
        assert!(!state.should_fire(at(start, 1600), THRESHOLD));
        assert!(state.should_fire(at(start, 1601), THRESHOLD));
        assert!(state.claim_fire(at(start, 1601), THRESHOLD));
    }

    #[test]
    fn repeated_notifications_collapse_to_one_fire() {
        let start = Instant::now();
        let mut state = DebounceState::new(start);

        for _ in 0..50 {
            state.record_change(at(start, 100));
        }
        assert!(state.claim_fire(at(start, 1200), THRESHOLD));
        assert!(!state.claim_fire(at(start, 2400), THRESHOLD));
    }

    #[test]
    fn change_after_fire_reopens_the_window() {
        let start = Instant::now();
        let mut state = DebounceState::new(start);

        state.record_change(at(start, 0));
        assert!(state.claim_fire(at(start, 1100), THRESHOLD));

        state.record_change(at(start, 1200));
        assert!(!state.triggered());
        assert!(!state.should_fire(at(start, 2200), THRESHOLD));
        assert!(state.claim_fire(at(start, 2201), THRESHOLD));
    }

    #[test]
    fn change_during_action_run_is_not_lost() {
        let start = Instant::now();
        let mut state = DebounceState::new(start);

        state.record_change(at(start, 0));
        // The loop claims the fire first, then runs the action.
        assert!(state.claim_fire(at(start, 1100), THRESHOLD));

        // A change lands while the action is still executing. Claiming up
        // front means this opens a fresh burst instead of being wiped out
        // when the action returns.
        state.record_change(at(start, 1150));
        assert!(state.change_pending());
        assert!(state.claim_fire(at(start, 2151), THRESHOLD));
    }

    #[test]
    fn stale_timestamps_do_not_shrink_the_quiet_period() {
        let start = Instant::now();
        let mut state = DebounceState::new(start);

        state.record_change(at(start, 100));
        // An event drained late with an older stamp must not move the window.
        state.record_change(at(start, 50));

        assert_eq!(state.quiet_for(at(start, 200)), Duration::from_millis(100));
        assert!(!state.should_fire(at(start, 1100), THRESHOLD));
        assert!(state.should_fire(at(start, 1101), THRESHOLD));
    }

    #[test]
    fn quiet_time_saturates_at_zero() {
        let start = Instant::now();
        let mut state = DebounceState::new(start);

        state.record_change(at(start, 100));
        assert_eq!(state.quiet_for(start), Duration::ZERO);
    }

    #[test]
    fn phase_tracks_the_burst_lifecycle() {
        let start = Instant::now();
        let mut state = DebounceState::new(start);

        assert_eq!(state.phase(at(start, 500), THRESHOLD), Phase::Waiting);

        state.record_change(at(start, 0));
        assert_eq!(
            state.phase(at(start, 400), THRESHOLD),
            Phase::Settling(Duration::from_millis(400))
        );

        // Exactly at the threshold the phase reads Ready while the fire
        // condition is still strict-greater.
        assert_eq!(
            state.phase(at(start, 1000), THRESHOLD),
            Phase::Ready(Duration::from_millis(1000))
        );
        assert!(!state.should_fire(at(start, 1000), THRESHOLD));

        assert!(state.claim_fire(at(start, 1500), THRESHOLD));
        assert_eq!(state.phase(at(start, 1500), THRESHOLD), Phase::Waiting);
        assert!(state.triggered());
    }

    #[test]
    fn default_quiet_threshold_is_one_second() {
        assert_eq!(DEFAULT_QUIET_THRESHOLD, Duration::from_secs(1));
    }
}
