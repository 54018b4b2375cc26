use serde::Serialize;

use crate::variants::OutcomeLabels;

/// Binary delay classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionOutcome {
    Delay,
    NoDelay,
}

impl PredictionOutcome {
    /// Parse the service's label. Exact match only.
    pub fn from_label(labels: &OutcomeLabels, label: &str) -> Option<Self> {
        if label == labels.delay {
            Some(PredictionOutcome::Delay)
        } else if label == labels.no_delay {
            Some(PredictionOutcome::NoDelay)
        } else {
            None
        }
    }

    pub fn label(self, labels: &OutcomeLabels) -> &'static str {
        match self {
            PredictionOutcome::Delay => labels.delay,
            PredictionOutcome::NoDelay => labels.no_delay,
        }
    }
}

/// Where a prediction came from.
///
/// `Fallback` means the remote model was not reached and the local
/// heuristic produced the result. Such results are demo output and must
/// not be presented as live inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub outcome: PredictionOutcome,
    pub label: &'static str,
    pub source: PredictionSource,
}

impl Prediction {
    pub fn remote(outcome: PredictionOutcome, labels: &OutcomeLabels) -> Self {
        Self {
            outcome,
            label: outcome.label(labels),
            source: PredictionSource::Remote,
        }
    }

    pub fn fallback(outcome: PredictionOutcome, labels: &OutcomeLabels) -> Self {
        Self {
            outcome,
            label: outcome.label(labels),
            source: PredictionSource::Fallback,
        }
    }

    pub fn view(&self) -> ResultView {
        ResultView::of(self)
    }
}

/// How a result block is drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub label: &'static str,
    pub style: &'static str,
    pub icon: &'static str,
}

impl ResultView {
    pub fn of(prediction: &Prediction) -> Self {
        match prediction.outcome {
            PredictionOutcome::Delay => ResultView {
                label: prediction.label,
                style: "delay",
                icon: "❌",
            },
            PredictionOutcome::NoDelay => ResultView {
                label: prediction.label,
                style: "no-delay",
                icon: "✅",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOUD: OutcomeLabels = OutcomeLabels {
        delay: "Delay",
        no_delay: "No Delay",
    };
    const LOCAL: OutcomeLabels = OutcomeLabels {
        delay: "Delayed",
        no_delay: "On Time",
    };

    #[test]
    fn test_labels_are_variant_specific() {
        assert_eq!(
            PredictionOutcome::from_label(&CLOUD, "Delay"),
            Some(PredictionOutcome::Delay)
        );
        assert_eq!(
            PredictionOutcome::from_label(&CLOUD, "No Delay"),
            Some(PredictionOutcome::NoDelay)
        );
        assert_eq!(PredictionOutcome::from_label(&CLOUD, "Delayed"), None);
        assert_eq!(
            PredictionOutcome::from_label(&LOCAL, "On Time"),
            Some(PredictionOutcome::NoDelay)
        );
        assert_eq!(PredictionOutcome::from_label(&LOCAL, "on time"), None);
    }

    #[test]
    fn test_view_follows_outcome() {
        let delayed = Prediction::remote(PredictionOutcome::Delay, &CLOUD).view();
        assert_eq!(delayed.style, "delay");
        assert_eq!(delayed.icon, "❌");
        assert_eq!(delayed.label, "Delay");

        let clear = Prediction::fallback(PredictionOutcome::NoDelay, &LOCAL).view();
        assert_eq!(clear.style, "no-delay");
        assert_eq!(clear.label, "On Time");
    }
}
