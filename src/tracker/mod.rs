//! Active-section tracking.
//!
//! Two strategies feed the same activation call: an intersection ledger for
//! typical documents and a scroll-position scan for very long ones (or when
//! `IntersectionObserver` is missing). A time-boxed [`Suppression`] keeps
//! passive updates from overriding a click-driven scroll while it settles.

mod observe;

pub(crate) use observe::ActiveSectionTracker;

use std::cell::Cell;

/// How long a click-driven scroll wins over passive updates.
pub const SUPPRESSION_MS: f64 = 1000.0;
/// Coalescing window for intersection callbacks.
pub const INTERSECTION_BATCH_MS: u64 = 10;
/// Resize debounce for the scroll-scan strategy.
pub const RESIZE_DEBOUNCE_MS: u64 = 250;
/// Extra distance below the offset line at which a heading already counts as reached.
pub const SCAN_LOOKAHEAD: f64 = 50.0;
/// Observed band: from 20% to 70% of the viewport height.
pub const OBSERVER_ROOT_MARGIN: &str = "-20% 0px -30% 0px";

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Strategy {
    Intersection,
    ScrollScan,
}

/// Chosen once at initialization.
pub fn choose_strategy(heading_count: usize, observer_limit: usize, has_intersection: bool) -> Strategy {
    if has_intersection && heading_count <= observer_limit {
        Strategy::Intersection
    } else {
        Strategy::ScrollScan
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerState {
    Created,
    Running(Strategy),
    Stopped,
}

impl TrackerState {
    pub fn start(self, strategy: Strategy) -> Self {
        match self {
            TrackerState::Created => TrackerState::Running(strategy),
            other => other,
        }
    }

    pub fn stop(self) -> Self {
        TrackerState::Stopped
    }

    pub fn is_running(self) -> bool {
        matches!(self, TrackerState::Running(_))
    }
}

/// Scheduling state of a coalesced callback (animation frame or debounce).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pending {
    #[default]
    Idle,
    Scheduled,
}

/// Time-boxed flag set after a click-driven scroll.
///
/// Engaging it again while active just moves the deadline.
#[derive(Debug, Default)]
pub struct Suppression {
    until_ms: Cell<Option<f64>>,
}

impl Suppression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engage(&self, now_ms: f64) {
        self.until_ms.set(Some(now_ms + SUPPRESSION_MS));
    }

    pub fn is_engaged(&self, now_ms: f64) -> bool {
        match self.until_ms.get() {
            Some(until) if now_ms < until => true,
            Some(_) => {
                self.until_ms.set(None);
                false
            }
            None => false,
        }
    }

    pub fn release(&self) {
        self.until_ms.set(None);
    }
}

/// Headings currently inside the observed band, oldest entry first.
#[derive(Clone, Debug, Default)]
pub struct IntersectionLedger {
    entered: Vec<String>,
}

impl IntersectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one observer report.
    pub fn record(&mut self, id: &str, intersecting: bool) {
        self.entered.retain(|e| e != id);
        if intersecting {
            self.entered.push(id.to_string());
        }
    }

    /// Most recently entered heading still in the band.
    pub fn current(&self) -> Option<&str> {
        self.entered.last().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entered.clear();
    }
}

/// Line (document coordinates) a heading must reach to become active.
pub fn probe_line(scroll_y: f64, offset: f64) -> f64 {
    scroll_y + offset + SCAN_LOOKAHEAD
}

/// Index of the last heading (document order) whose top is at or above `probe`.
pub fn scan_active(tops: &[f64], probe: f64) -> Option<usize> {
    tops.iter().rposition(|top| *top <= probe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_strategy() {
        assert_eq!(choose_strategy(10, 100, true), Strategy::Intersection);
        assert_eq!(choose_strategy(100, 100, true), Strategy::Intersection);
        assert_eq!(choose_strategy(101, 100, true), Strategy::ScrollScan);
        assert_eq!(choose_strategy(3, 100, false), Strategy::ScrollScan);
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(Strategy::Intersection.as_ref(), "intersection");
        assert_eq!(Strategy::ScrollScan.to_string(), "scroll-scan");
    }

    #[test]
    fn test_tracker_state_transitions() {
        let s = TrackerState::Created.start(Strategy::ScrollScan);
        assert_eq!(s, TrackerState::Running(Strategy::ScrollScan));
        assert!(s.is_running());
        // Restart is ignored once running.
        assert_eq!(s.start(Strategy::Intersection), s);
        let s = s.stop();
        assert!(!s.is_running());
        assert_eq!(s.start(Strategy::Intersection), TrackerState::Stopped);
    }

    #[test]
    fn test_suppression_window() {
        let s = Suppression::new();
        assert!(!s.is_engaged(0.0));
        s.engage(1_000.0);
        assert!(s.is_engaged(1_500.0));
        assert!(s.is_engaged(1_999.0));
        assert!(!s.is_engaged(2_000.0));
        assert!(!s.is_engaged(1_500.0));
    }

    #[test]
    fn test_suppression_reengage_resets_timer() {
        let s = Suppression::new();
        s.engage(0.0);
        s.engage(800.0);
        assert!(s.is_engaged(1_500.0));
        assert!(!s.is_engaged(1_800.0));
    }

    #[test]
    fn test_suppression_release() {
        let s = Suppression::new();
        s.engage(0.0);
        s.release();
        assert!(!s.is_engaged(10.0));
    }

    #[test]
    fn test_ledger_most_recent_entry_wins() {
        let mut ledger = IntersectionLedger::new();
        ledger.record("a", true);
        ledger.record("b", true);
        assert_eq!(ledger.current(), Some("b"));

        ledger.record("b", false);
        assert_eq!(ledger.current(), Some("a"));

        // Re-entering moves a heading to the end.
        ledger.record("b", true);
        ledger.record("a", true);
        assert_eq!(ledger.current(), Some("a"));
    }

    #[test]
    fn test_ledger_empty_after_all_leave() {
        let mut ledger = IntersectionLedger::new();
        ledger.record("a", true);
        ledger.record("a", false);
        ledger.record("c", false);
        assert_eq!(ledger.current(), None);
    }

    #[test]
    fn test_scan_active_picks_last_reached() {
        let tops = [100.0, 600.0, 1_200.0, 2_000.0];
        assert_eq!(scan_active(&tops, 50.0), None);
        assert_eq!(scan_active(&tops, 100.0), Some(0));
        assert_eq!(scan_active(&tops, 1_199.0), Some(1));
        assert_eq!(scan_active(&tops, 1_250.0), Some(2));
        assert_eq!(scan_active(&tops, 10_000.0), Some(3));
        assert_eq!(scan_active(&[], 10.0), None);
    }

    #[test]
    fn test_probe_line() {
        assert_eq!(probe_line(1_000.0, 80.0), 1_130.0);
    }
}
