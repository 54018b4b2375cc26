//! Offline delay scorer.
//!
//! Used only by variants with [`FallbackPolicy::Heuristic`] when the remote
//! model cannot be reached. It is a fixed additive rule, not a model; its
//! results are marked [`PredictionSource::Fallback`].
//!
//! [`FallbackPolicy::Heuristic`]: crate::variants::FallbackPolicy::Heuristic
//! [`PredictionSource::Fallback`]: crate::outcome::PredictionSource::Fallback

use crate::form::FlightQuery;
use crate::outcome::{Prediction, PredictionOutcome};
use crate::variants::OutcomeLabels;

pub const BUSY_AIRPORTS: [&str; 3] = ["ATL", "ORD", "LAX"];

/// Scores strictly above this are classified as delayed.
pub const DELAY_THRESHOLD: f64 = 0.5;

const BASE: f64 = 0.1;
const WEEKEND: f64 = 0.3;
const LATE_IN_MONTH: f64 = 0.2;
const BUSY_ORIGIN: f64 = 0.4;
const OTHER_ORIGIN: f64 = 0.1;
const EVENING_DEPARTURE: f64 = 0.3;
const DAYTIME_DEPARTURE: f64 = 0.1;

/// A field that does not parse simply fails its comparison.
fn number(query: &FlightQuery, field: &str) -> Option<i64> {
    query.get(field).and_then(|v| v.trim().parse().ok())
}

pub fn score(query: &FlightQuery) -> f64 {
    let mut score = BASE;

    if query.get("isWeekend") == Some("1") {
        score += WEEKEND;
    }
    if number(query, "dayOfMonth").is_some_and(|d| d > 25) {
        score += LATE_IN_MONTH;
    }
    score += match query.get("origin") {
        Some(origin) if BUSY_AIRPORTS.contains(&origin) => BUSY_ORIGIN,
        _ => OTHER_ORIGIN,
    };
    score += if number(query, "depHour").is_some_and(|h| h > 18) {
        EVENING_DEPARTURE
    } else {
        DAYTIME_DEPARTURE
    };

    score
}

pub fn classify(query: &FlightQuery) -> PredictionOutcome {
    if score(query) > DELAY_THRESHOLD {
        PredictionOutcome::Delay
    } else {
        PredictionOutcome::NoDelay
    }
}

pub fn predict(query: &FlightQuery, labels: &OutcomeLabels) -> Prediction {
    Prediction::fallback(classify(query), labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::PredictionSource;
    use crate::variants::Catalog;

    fn query(weekend: &str, day: &str, origin: &str, hour: &str) -> FlightQuery {
        let variant = Catalog::new("http://cloud.test", "http://local.test")
            .find("local-demo")
            .unwrap();
        let mut query = FlightQuery::empty(&variant);
        query.set("isWeekend", weekend);
        query.set("dayOfMonth", day);
        query.set("origin", origin);
        query.set("depHour", hour);
        query
    }

    #[test]
    fn test_busy_weekend_evening_is_delayed() {
        let q = query("1", "28", "ATL", "20");
        assert!((score(&q) - 1.3).abs() < 1e-9);
        assert_eq!(classify(&q), PredictionOutcome::Delay);
    }

    #[test]
    fn test_quiet_weekday_morning_is_on_time() {
        let q = query("0", "5", "BOS", "9");
        assert!((score(&q) - 0.3).abs() < 1e-9);
        assert_eq!(classify(&q), PredictionOutcome::NoDelay);
    }

    #[test]
    fn test_busy_origin_alone_tips_over() {
        let q = query("0", "10", "ORD", "6");
        assert!((score(&q) - 0.6).abs() < 1e-9);
        assert_eq!(classify(&q), PredictionOutcome::Delay);
    }

    #[test]
    fn test_score_of_exactly_half_is_on_time() {
        let q = query("0", "26", "DEN", "6");
        assert_eq!(score(&q), 0.5);
        assert_eq!(classify(&q), PredictionOutcome::NoDelay);
    }

    #[test]
    fn test_boundaries_are_strict() {
        let q = query("0", "25", "SEA", "18");
        assert!((score(&q) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_unparseable_numbers_do_not_count() {
        let q = query("yes", "late", "LAX", "evening");
        assert!((score(&q) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_predict_marks_fallback() {
        let labels = OutcomeLabels {
            delay: "Delayed",
            no_delay: "On Time",
        };
        let prediction = predict(&query("1", "28", "ATL", "20"), &labels);
        assert_eq!(prediction.label, "Delayed");
        assert_eq!(prediction.source, PredictionSource::Fallback);
    }
}
