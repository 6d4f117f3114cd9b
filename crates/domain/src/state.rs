//! Machine state names and the preheat heuristic.
//!
//! The machine pushes raw state labels (`idle`, `pre_infusion`,
//! `click to start`, …) that are normalized into a display form before
//! publication. While warming up it also pushes a preheat countdown; the
//! countdown's *freshness* is the only signal that preheating is still in
//! progress, because the machine stops pushing it without any terminating
//! event.

use std::time::{Duration, Instant};

/// Connective words that stay lowercase unless they open the phrase.
const CONNECTIVES: [&str; 11] = [
    "to", "in", "a", "an", "the", "at", "by", "or", "and", "for", "of",
];

/// How recent the last countdown push must be for preheat to count as
/// active. Countdowns arrive roughly once a second while preheating.
pub const PREHEAT_FRESHNESS: Duration = Duration::from_secs(2);

/// Normalize a raw machine state label into display form.
///
/// Underscores become spaces, each word is title-cased except connectives
/// (`to`, `and`, …) which stay lowercase unless they are the first word.
/// Short all-caps words are treated as abbreviations (`PI` stays `PI`).
/// The result is idempotent: normalizing an already-normalized label is a
/// no-op.
#[must_use]
pub fn normalize_state_name(raw: &str) -> String {
    let spaced = raw.replace('_', " ");
    let words: Vec<String> = spaced
        .split_whitespace()
        .enumerate()
        .map(|(idx, word)| normalize_word(word, idx == 0))
        .collect();
    words.join(" ")
}

fn normalize_word(word: &str, first: bool) -> String {
    let lower = word.to_lowercase();
    if !first && CONNECTIVES.contains(&lower.as_str()) {
        return lower;
    }
    // Abbreviation safety: "PI" must not become "Pi".
    if word.len() <= 2 && word.chars().all(|c| c.is_ascii_uppercase()) {
        return word.to_string();
    }
    if word.chars().count() == 1 {
        return word.to_uppercase();
    }
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |head| {
        head.to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}

/// Derive the displayed state from the raw coarse state.
///
/// `idle` with an active preheat is shown as `Preheating`; every other
/// state passes through [`normalize_state_name`] unchanged.
#[must_use]
pub fn display_state(raw: &str, preheat_active: bool) -> String {
    if preheat_active && raw.trim().eq_ignore_ascii_case("idle") {
        return "Preheating".to_string();
    }
    normalize_state_name(raw)
}

/// Tracks the most recent preheat countdown push and its age.
#[derive(Debug, Default, Clone)]
pub struct PreheatTracker {
    countdown: Option<f64>,
    received_at: Option<Instant>,
}

impl PreheatTracker {
    /// Record a countdown value received now.
    pub fn record(&mut self, countdown: f64) {
        self.record_at(countdown, Instant::now());
    }

    /// Record a countdown value received at a given instant.
    pub fn record_at(&mut self, countdown: f64, at: Instant) {
        self.countdown = Some(countdown);
        self.received_at = Some(at);
    }

    /// The most recent countdown value, if any was ever received.
    #[must_use]
    pub fn countdown(&self) -> Option<f64> {
        self.countdown
    }

    /// Whether preheating is active right now.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active_at(Instant::now())
    }

    /// Whether preheating is active as seen from `now`.
    ///
    /// Active iff the last countdown is positive and younger than
    /// [`PREHEAT_FRESHNESS`]. No data, a zero value, or stale data all
    /// mean "not preheating".
    #[must_use]
    pub fn is_active_at(&self, now: Instant) -> bool {
        match (self.countdown, self.received_at) {
            (Some(value), Some(at)) => {
                value > 0.0 && now.saturating_duration_since(at) < PREHEAT_FRESHNESS
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_normalize_simple_lowercase_states() {
        assert_eq!(normalize_state_name("idle"), "Idle");
        assert_eq!(normalize_state_name("heating"), "Heating");
        assert_eq!(normalize_state_name("purge"), "Purge");
    }

    #[test]
    fn should_normalize_underscored_states() {
        assert_eq!(normalize_state_name("END_STAGE"), "End Stage");
        assert_eq!(normalize_state_name("pre_infusion"), "Pre Infusion");
        assert_eq!(normalize_state_name("closing_valve"), "Closing Valve");
    }

    #[test]
    fn should_keep_connectives_lowercase_inside_phrases() {
        assert_eq!(normalize_state_name("click to start"), "Click to Start");
        assert_eq!(normalize_state_name("click to purge"), "Click to Purge");
        assert_eq!(
            normalize_state_name("pour water and click to continue"),
            "Pour Water and Click to Continue"
        );
    }

    #[test]
    fn should_preserve_abbreviations() {
        assert_eq!(normalize_state_name("PI"), "PI");
        assert_eq!(normalize_state_name("PI_PHASE"), "PI Phase");
    }

    #[test]
    fn should_leave_mixed_case_states_alone() {
        assert_eq!(
            normalize_state_name("Slayer Preinfusion"),
            "Slayer Preinfusion"
        );
        assert_eq!(normalize_state_name("Immersion"), "Immersion");
    }

    #[test]
    fn should_return_empty_for_empty_or_blank_input() {
        assert_eq!(normalize_state_name(""), "");
        assert_eq!(normalize_state_name("   "), "");
    }

    #[test]
    fn should_be_idempotent() {
        for raw in [
            "idle",
            "click to start",
            "PI",
            "END_STAGE",
            "Slayer Preinfusion",
            "pour water and click to continue",
            "starting...",
        ] {
            let once = normalize_state_name(raw);
            let twice = normalize_state_name(&once);
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn should_normalize_all_observed_state_names() {
        let cases = [
            ("idle", "Idle"),
            ("heating", "Heating"),
            ("retracting", "Retracting"),
            ("PI", "PI"),
            ("Ramp", "Ramp"),
            ("Hold", "Hold"),
            ("Decline", "Decline"),
            ("purge", "Purge"),
            ("click to start", "Click to Start"),
            ("click to purge", "Click to Purge"),
            ("closing valve", "Closing Valve"),
            ("Slayer Preinfusion", "Slayer Preinfusion"),
            ("Immersion", "Immersion"),
            ("Percolation", "Percolation"),
            ("Final Percolation", "Final Percolation"),
            ("starting...", "Starting..."),
        ];
        for (raw, expected) in cases {
            assert_eq!(normalize_state_name(raw), expected, "failed for {raw:?}");
        }
    }

    #[test]
    fn should_report_inactive_without_any_data() {
        let tracker = PreheatTracker::default();
        assert!(!tracker.is_active());
    }

    #[test]
    fn should_report_active_for_fresh_positive_countdown() {
        let mut tracker = PreheatTracker::default();
        tracker.record(490.63);
        assert!(tracker.is_active());
    }

    #[test]
    fn should_report_inactive_for_zero_countdown() {
        let mut tracker = PreheatTracker::default();
        tracker.record(0.0);
        assert!(!tracker.is_active());
    }

    #[test]
    fn should_report_inactive_for_stale_countdown() {
        let mut tracker = PreheatTracker::default();
        let at = Instant::now();
        tracker.record_at(490.63, at);
        assert!(!tracker.is_active_at(at + Duration::from_secs(3)));
    }

    #[test]
    fn should_report_active_just_under_the_freshness_window() {
        let mut tracker = PreheatTracker::default();
        let at = Instant::now();
        tracker.record_at(100.0, at);
        assert!(tracker.is_active_at(at + Duration::from_millis(1990)));
    }

    #[test]
    fn should_report_inactive_just_past_the_freshness_window() {
        let mut tracker = PreheatTracker::default();
        let at = Instant::now();
        tracker.record_at(100.0, at);
        assert!(!tracker.is_active_at(at + Duration::from_millis(2010)));
    }

    #[test]
    fn should_override_idle_to_preheating_when_preheat_active() {
        assert_eq!(display_state("idle", true), "Preheating");
    }

    #[test]
    fn should_keep_idle_without_preheat() {
        assert_eq!(display_state("idle", false), "Idle");
    }

    #[test]
    fn should_ignore_preheat_for_non_idle_states() {
        assert_eq!(display_state("heating", true), "Heating");
        assert_eq!(display_state("retracting", true), "Retracting");
    }
}
