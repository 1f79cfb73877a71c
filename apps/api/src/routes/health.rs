use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::llm_client::Provider;
use crate::state::AppState;

/// GET /health
/// Returns service version and which generation providers have credentials.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "bloom-api",
        "providers": {
            "claude": state.llm.is_configured(Provider::Claude),
            "groq": state.llm.is_configured(Provider::Groq),
        }
    }))
}
