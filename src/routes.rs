use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use log::{error, warn};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::{
    dispatcher::{Dispatcher, PredictResponse},
    error::ServeErr,
};

/// What `GET /` answers while the process is up.
pub const HOME_MESSAGE: &str = "ML Model is Running";

/// Builds the service's router around a shared dispatcher.
pub fn router(dispatcher: Dispatcher) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn home() -> &'static str {
    HOME_MESSAGE
}

// Liveness only, never touches the model.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn predict(
    State(dispatcher): State<Dispatcher>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, ServeErr> {
    let Json(payload) = payload.map_err(|e| {
        warn!("rejected request body: {e}");
        ServeErr::BadPayload(e.body_text())
    })?;

    match dispatcher.handle_predict(&payload) {
        Ok(response) => Ok(Json(response)),
        Err(e @ ServeErr::Predict(_)) => {
            error!("{e}");
            Err(e)
        }
        Err(e) => {
            warn!("rejected request: {e}");
            Err(e)
        }
    }
}
