//! Temporal windows: the correlation window after a meal and the analysis
//! window over which events are fetched.
//!
//! A symptom is linked to a meal when it occurs between `min_delay` and
//! `max_delay` after the meal, both bounds inclusive. Each meal is either
//! triggered or not; several symptoms in its window still count once.

use allergen_types::{AnalysisWindow, SymptomEvent};
use chrono::{DateTime, TimeDelta, Utc};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// Default earliest symptom delay after a meal.
pub const DEFAULT_MIN_DELAY_HOURS: i64 = 2;

/// Default latest symptom delay after a meal.
pub const DEFAULT_MAX_DELAY_HOURS: i64 = 48;

/// The `[min_delay, max_delay]` interval after a meal in which a symptom
/// qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationWindow {
    min_delay: TimeDelta,
    max_delay: TimeDelta,
}

impl CorrelationWindow {
    /// Build a window from explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParameter`] if `min_delay` is negative
    /// or greater than `max_delay`.
    pub fn new(min_delay: TimeDelta, max_delay: TimeDelta) -> Result<Self, AnalysisError> {
        if min_delay < TimeDelta::zero() {
            return Err(AnalysisError::invalid("correlation window cannot start before the meal"));
        }
        if min_delay > max_delay {
            return Err(AnalysisError::invalid(format!(
                "correlation window is inverted: {min_delay} > {max_delay}"
            )));
        }
        Ok(Self {
            min_delay,
            max_delay,
        })
    }

    /// Build the window described by the analysis configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParameter`] if the configured bounds
    /// are inverted.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        Self::new(
            TimeDelta::hours(i64::from(config.min_delay_hours)),
            TimeDelta::hours(i64::from(config.max_delay_hours)),
        )
    }

    /// Earliest qualifying delay.
    pub const fn min_delay(&self) -> TimeDelta {
        self.min_delay
    }

    /// Latest qualifying delay.
    pub const fn max_delay(&self) -> TimeDelta {
        self.max_delay
    }

    /// Whether a symptom at `symptom_time` falls in the window of a meal at
    /// `meal_time`.
    pub fn contains(&self, meal_time: DateTime<Utc>, symptom_time: DateTime<Utc>) -> bool {
        let delay = symptom_time.signed_duration_since(meal_time);
        self.min_delay <= delay && delay <= self.max_delay
    }

    /// Whether any of `symptoms` falls in the window of a meal at `meal_time`.
    ///
    /// Stops at the first qualifying symptom.
    pub fn matches(&self, meal_time: DateTime<Utc>, symptoms: &[SymptomEvent]) -> bool {
        symptoms
            .iter()
            .any(|s| self.contains(meal_time, s.occurred_at))
    }
}

impl Default for CorrelationWindow {
    fn default() -> Self {
        Self {
            min_delay: TimeDelta::hours(DEFAULT_MIN_DELAY_HOURS),
            max_delay: TimeDelta::hours(DEFAULT_MAX_DELAY_HOURS),
        }
    }
}

/// Whether any symptom follows a meal at `meal_time` within the default
/// `[2h, 48h]` window.
pub fn matches(meal_time: DateTime<Utc>, symptoms: &[SymptomEvent]) -> bool {
    CorrelationWindow::default().matches(meal_time, symptoms)
}

/// The analysis window `[now - days_back days, now]`.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidParameter`] if `days_back` is zero or the
/// start would fall outside the representable date range.
pub fn analysis_window(now: DateTime<Utc>, days_back: u32) -> Result<AnalysisWindow, AnalysisError> {
    if days_back == 0 {
        return Err(AnalysisError::invalid("days_back must be at least 1"));
    }
    let span = TimeDelta::try_days(i64::from(days_back))
        .ok_or_else(|| AnalysisError::invalid(format!("days_back {days_back} is too large")))?;
    let start = now
        .checked_sub_signed(span)
        .ok_or_else(|| AnalysisError::invalid(format!("days_back {days_back} is too large")))?;
    Ok(AnalysisWindow { start, end: now })
}

/// The range symptoms are fetched over for meals in `window`.
///
/// Without `extend`, this is `window` itself, so a symptom after `window.end`
/// is never seen even when it follows a late meal within the correlation
/// window. With `extend`, the end moves out by `correlation.max_delay()`.
pub fn symptom_range(
    window: AnalysisWindow,
    correlation: &CorrelationWindow,
    extend: bool,
) -> AnalysisWindow {
    if !extend {
        return window;
    }
    let end = window
        .end
        .checked_add_signed(correlation.max_delay())
        .unwrap_or(window.end);
    AnalysisWindow {
        start: window.start,
        end,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use allergen_types::UserId;

    use super::*;

    fn symptom_at(at: DateTime<Utc>) -> SymptomEvent {
        SymptomEvent {
            user_id: UserId::new(),
            symptom_type: String::from("rash"),
            severity: 3,
            occurred_at: at,
            description: None,
        }
    }

    fn meal_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn lower_bound_is_inclusive_to_the_second() {
        let t = meal_time();
        assert!(matches(t, &[symptom_at(t + TimeDelta::hours(2))]));
        assert!(!matches(
            t,
            &[symptom_at(t + TimeDelta::hours(2) - TimeDelta::seconds(1))]
        ));
    }

    #[test]
    fn upper_bound_is_inclusive_to_the_second() {
        let t = meal_time();
        assert!(matches(t, &[symptom_at(t + TimeDelta::hours(48))]));
        assert!(!matches(
            t,
            &[symptom_at(t + TimeDelta::hours(48) + TimeDelta::seconds(1))]
        ));
    }

    #[test]
    fn symptoms_before_the_meal_never_qualify() {
        let t = meal_time();
        assert!(!matches(t, &[symptom_at(t - TimeDelta::hours(3))]));
        assert!(!matches(t, &[symptom_at(t)]));
    }

    #[test]
    fn empty_symptom_list_never_matches() {
        assert!(!matches(meal_time(), &[]));
    }

    #[test]
    fn one_qualifying_symptom_among_many_is_enough() {
        let t = meal_time();
        let symptoms = [
            symptom_at(t - TimeDelta::hours(1)),
            symptom_at(t + TimeDelta::hours(60)),
            symptom_at(t + TimeDelta::hours(6)),
        ];
        assert!(matches(t, &symptoms));
    }

    #[test]
    fn custom_bounds_are_honored() {
        let window = CorrelationWindow::new(TimeDelta::minutes(30), TimeDelta::hours(4)).unwrap();
        let t = meal_time();
        assert!(window.matches(t, &[symptom_at(t + TimeDelta::minutes(30))]));
        assert!(!window.matches(t, &[symptom_at(t + TimeDelta::hours(5))]));
    }

    #[test]
    fn inverted_or_negative_bounds_are_rejected() {
        assert!(CorrelationWindow::new(TimeDelta::hours(5), TimeDelta::hours(1)).is_err());
        assert!(CorrelationWindow::new(TimeDelta::hours(-1), TimeDelta::hours(1)).is_err());
    }

    #[test]
    fn from_config_matches_default() {
        let window = CorrelationWindow::from_config(&AnalysisConfig::default()).unwrap();
        assert_eq!(window, CorrelationWindow::default());
    }

    #[test]
    fn analysis_window_spans_days_back() {
        let now = meal_time();
        let window = analysis_window(now, 30).unwrap();
        assert_eq!(window.end, now);
        assert_eq!(window.start, now - TimeDelta::days(30));
    }

    #[test]
    fn zero_days_back_is_rejected() {
        assert!(matches!(
            analysis_window(meal_time(), 0),
            Err(AnalysisError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn symptom_range_extends_only_when_asked() {
        let now = meal_time();
        let window = analysis_window(now, 7).unwrap();
        let correlation = CorrelationWindow::default();

        assert_eq!(symptom_range(window, &correlation, false), window);
        let extended = symptom_range(window, &correlation, true);
        assert_eq!(extended.start, window.start);
        assert_eq!(extended.end, now + TimeDelta::hours(48));
    }
}
