use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::extract::{Json, Path};
use crate::llm_client::{LlmError, Provider, Usage};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Kept untyped so a non-string prompt gets the same 400 as a missing one.
    #[serde(default)]
    pub prompt: Value,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub response: String,
    pub usage: Usage,
}

/// POST /api/v1/llm/:provider
///
/// Raw passthrough to one provider. Unlike the insight endpoints, failures
/// surface as errors: 400 for a missing or non-string prompt, 503 when the
/// provider has no credential, 502 for anything the provider rejects.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(provider): Path<Provider>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let prompt = request.prompt.as_str().ok_or(LlmError::EmptyPrompt)?;
    let generation = state.llm.generate(provider, prompt).await?;
    Ok(Json(GenerateResponse {
        response: generation.text,
        usage: generation.usage,
    }))
}
