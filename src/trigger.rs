//! One scoring cycle per user trigger, and the display each state produces.

use serde::Serialize;

use crate::{
    error::PredictError,
    mapper::{self, PredictionResult},
    model::ModelHandle,
    schema::RideForm,
};

/// Observable states. Scoring happens inside [`trigger`] and is never seen.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerState {
    Idle,
    Result(PredictionResult),
    Error(PredictError),
}

/// The five output slots of the result card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    pub text: String,
    pub text_class: String,
    pub bar_value: f64,
    pub bar_color: String,
    pub caption: String,
}

impl TriggerState {
    pub fn display(&self) -> DisplayState {
        match self {
            TriggerState::Idle => DisplayState {
                text: "Ready".into(),
                text_class: "text-center text-muted".into(),
                bar_value: 0.0,
                bar_color: "info".into(),
                caption: "Click Predict to start".into(),
            },
            TriggerState::Result(r) => DisplayState {
                text: r.display_label.into(),
                text_class: r.text_class().into(),
                bar_value: r.display_percentage,
                bar_color: r.display_color.into(),
                caption: r.caption(),
            },
            TriggerState::Error(e) => DisplayState {
                text: "Error".into(),
                text_class: "text-danger".into(),
                bar_value: 0.0,
                bar_color: "danger".into(),
                caption: e.to_string(),
            },
        }
    }
}

/// Error state for a trigger whose input could not even be decoded.
pub fn rejected(model: &ModelHandle, detail: String) -> TriggerState {
    if !model.is_ready() {
        return TriggerState::Error(PredictError::ModelUnavailable);
    }
    tracing::warn!("prediction rejected: {detail}");
    TriggerState::Error(PredictError::ScoringFailure(detail))
}

/// Build the record, score it and map the probability.
pub fn trigger(model: &ModelHandle, form: &RideForm, threshold: f64) -> TriggerState {
    if !model.is_ready() {
        return TriggerState::Error(PredictError::ModelUnavailable);
    }
    let scored = form
        .into_record()
        .map_err(PredictError::from)
        .and_then(|record| model.score(&record));
    match scored {
        Ok(p) => {
            let result = mapper::map(p, threshold);
            tracing::info!(
                probability = p,
                outcome = result.display_label,
                "prediction"
            );
            TriggerState::Result(result)
        }
        Err(e) => {
            tracing::warn!("prediction rejected: {e}");
            TriggerState::Error(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mapper::{Outcome, DEFAULT_THRESHOLD},
        model::CancellationScorer,
        schema::RideRecord,
    };
    use std::sync::{Arc, Mutex};

    struct Recording {
        p: f64,
        seen: Mutex<Option<RideRecord>>,
    }

    impl CancellationScorer for Recording {
        fn predict_probability(&self, record: &RideRecord) -> anyhow::Result<f64> {
            *self.seen.lock().unwrap() = Some(record.clone());
            Ok(self.p)
        }
    }

    #[test]
    fn idle_display_is_ready() {
        let d = TriggerState::Idle.display();
        assert_eq!(d.text, "Ready");
        assert_eq!(d.bar_value, 0.0);
        assert_eq!(d.bar_color, "info");
    }

    #[test]
    fn unavailable_model_shows_error() {
        let h = ModelHandle::Unavailable { reason: "missing".into() };
        let state = trigger(&h, &RideForm::default(), DEFAULT_THRESHOLD);
        assert_eq!(state, TriggerState::Error(PredictError::ModelUnavailable));
        let d = state.display();
        assert_eq!(d.text, "Error");
        assert_eq!(d.bar_color, "danger");
        assert_eq!(d.bar_value, 0.0);
        assert_eq!(d.caption, "Model file not found.");
    }

    #[test]
    fn reference_ride_at_73_percent_is_cancelled() {
        let scorer = Arc::new(Recording { p: 0.73, seen: Mutex::new(None) });
        let h = ModelHandle::Ready(scorer.clone());
        let state = trigger(&h, &RideForm::default(), DEFAULT_THRESHOLD);

        let TriggerState::Result(r) = &state else {
            panic!("expected a result, got {state:?}");
        };
        assert_eq!(r.outcome, Outcome::Cancelled);
        assert_eq!(r.display_color, "danger");
        assert_eq!(r.display_percentage, 73.0);

        let d = state.display();
        assert_eq!(d.text, "Cancelled");
        assert_eq!(d.caption, "73.0% Risk");

        let seen = scorer.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen, RideForm::default().into_record().unwrap());
    }

    #[test]
    fn unavailable_model_wins_over_bad_form_value() {
        let h = ModelHandle::Unavailable { reason: "missing".into() };
        let form = RideForm {
            day: "Funday".into(),
            ..RideForm::default()
        };
        let d = trigger(&h, &form, DEFAULT_THRESHOLD).display();
        assert_eq!(d.text, "Error");
        assert_eq!(d.caption, "Model file not found.");
    }

    #[test]
    fn undecodable_input_reports_model_state_first() {
        let down = ModelHandle::Unavailable { reason: "missing".into() };
        assert_eq!(
            rejected(&down, "bad body".into()),
            TriggerState::Error(PredictError::ModelUnavailable)
        );
        let up = ModelHandle::from_scorer(Recording { p: 0.1, seen: Mutex::new(None) });
        assert_eq!(
            rejected(&up, "bad body".into()).display().caption,
            "Prediction failed: bad body"
        );
    }

    #[test]
    fn bad_form_value_is_a_scoring_failure() {
        let h = ModelHandle::from_scorer(Recording { p: 0.1, seen: Mutex::new(None) });
        let form = RideForm {
            day: "Funday".into(),
            ..RideForm::default()
        };
        let d = trigger(&h, &form, DEFAULT_THRESHOLD).display();
        assert_eq!(d.text, "Error");
        assert_eq!(d.caption, "Prediction failed: unknown day 'Funday'");
    }

    #[test]
    fn low_probability_is_not_cancelled() {
        let h = ModelHandle::from_scorer(Recording { p: 0.2, seen: Mutex::new(None) });
        let d = trigger(&h, &RideForm::default(), DEFAULT_THRESHOLD).display();
        assert_eq!(d.text, "Not Cancelled");
        assert_eq!(d.bar_color, "success");
        assert_eq!(d.text_class, "text-center text-success font-weight-bold");
        assert_eq!(d.caption, "20.0% Risk");
    }
}
