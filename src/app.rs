use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};

use crate::{
    model::ModelHandle,
    page,
    schema::RideForm,
    trigger::{self, DisplayState, TriggerState},
};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub model: ModelHandle,
    pub threshold: f64,
}

impl AppState {
    pub fn new(model: ModelHandle, threshold: f64) -> Self {
        Self { model, threshold }
    }
}

// ---------- Handlers ----------

async fn index() -> Html<String> {
    Html(page::render(&RideForm::default(), &TriggerState::Idle.display()))
}

// Decode failures are shown as display states, never as transport errors.

async fn predict_form(
    State(state): State<AppState>,
    payload: Result<Form<RideForm>, FormRejection>,
) -> Html<String> {
    let (form, outcome) = match payload {
        Ok(Form(form)) => {
            let outcome = trigger::trigger(&state.model, &form, state.threshold);
            (form, outcome)
        }
        Err(rej) => (RideForm::default(), trigger::rejected(&state.model, rej.body_text())),
    };
    Html(page::render(&form, &outcome.display()))
}

async fn predict_json(
    State(state): State<AppState>,
    payload: Result<Json<RideForm>, JsonRejection>,
) -> Json<DisplayState> {
    let outcome = match payload {
        Ok(Json(form)) => trigger::trigger(&state.model, &form, state.threshold),
        Err(rej) => trigger::rejected(&state.model, rej.body_text()),
    };
    Json(outcome.display())
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    match &state.model {
        ModelHandle::Ready(_) => Json(json!({ "status": "ok", "model": "ready" })),
        ModelHandle::Unavailable { reason } => {
            Json(json!({ "status": "ok", "model": "unavailable", "reason": reason }))
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/predict", post(predict_json))
        .route("/health", get(health))
        .with_state(state)
}
