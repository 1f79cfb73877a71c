//! Axum route handlers for the Insights API.
//!
//! These endpoints always answer 200 with something renderable once the
//! request itself is valid. Generation failures show up as `source: "fallback"`.

use axum::extract::State;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{Json, Path, Query};
use crate::insights::models::{
    ChatAnswer, DetailText, DetailTopic, FactList, Highlight, HighlightKind, Language,
    SymptomList, WeeklyHighlights,
};
use crate::insights::service::{self, PregnancyContext, DEFAULT_FACT_COUNT};
use crate::llm_client::Provider;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InsightQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub lang: Language,
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: Option<Uuid>,
    pub question: String,
    #[serde(default)]
    pub provider: Provider,
}

async fn load_context(
    state: &AppState,
    user_id: Uuid,
) -> Result<Option<PregnancyContext>, AppError> {
    let profile = state.profiles.get(user_id).await?;
    Ok(PregnancyContext::from_profile(
        profile,
        Utc::now().date_naive(),
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/insights/weekly?user_id=&provider=
///
/// All three weekly cards, generated concurrently.
pub async fn handle_weekly(
    State(state): State<AppState>,
    Query(query): Query<InsightQuery>,
) -> Result<Json<WeeklyHighlights>, AppError> {
    let ctx = load_context(&state, query.user_id).await?;
    let weekly = service::weekly_highlights(&state.llm, query.provider, ctx.as_ref()).await;
    Ok(Json(weekly))
}

/// GET /api/v1/insights/highlights/:kind?user_id=&provider=
pub async fn handle_highlight(
    State(state): State<AppState>,
    Path(kind): Path<HighlightKind>,
    Query(query): Query<InsightQuery>,
) -> Result<Json<Highlight>, AppError> {
    let ctx = load_context(&state, query.user_id).await?;
    let card = service::weekly_highlight(&state.llm, query.provider, kind, ctx.as_ref()).await;
    Ok(Json(card))
}

/// GET /api/v1/insights/symptoms?user_id=&provider=&lang=
pub async fn handle_symptoms(
    State(state): State<AppState>,
    Query(query): Query<InsightQuery>,
) -> Result<Json<SymptomList>, AppError> {
    let ctx = load_context(&state, query.user_id).await?;
    let list = service::symptoms(&state.llm, query.provider, query.lang, ctx.as_ref()).await;
    Ok(Json(list))
}

/// GET /api/v1/insights/facts?user_id=&provider=&lang=&count=
pub async fn handle_facts(
    State(state): State<AppState>,
    Query(query): Query<InsightQuery>,
) -> Result<Json<FactList>, AppError> {
    let ctx = load_context(&state, query.user_id).await?;
    let count = query.count.unwrap_or(DEFAULT_FACT_COUNT);
    let list = service::facts(&state.llm, query.provider, query.lang, count, ctx.as_ref()).await;
    Ok(Json(list))
}

/// GET /api/v1/insights/details/:topic?user_id=&provider=
pub async fn handle_detail(
    State(state): State<AppState>,
    Path(topic): Path<DetailTopic>,
    Query(query): Query<InsightQuery>,
) -> Result<Json<DetailText>, AppError> {
    let ctx = load_context(&state, query.user_id).await?;
    let detail = service::stat_detail(&state.llm, query.provider, topic, ctx.as_ref()).await;
    Ok(Json(detail))
}

/// POST /api/v1/chat
///
/// `user_id` is optional; without a completed profile the assistant answers generically.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatAnswer>, AppError> {
    if request.question.trim().is_empty() {
        return Err(AppError::Validation("question cannot be empty".to_string()));
    }

    let ctx = match request.user_id {
        Some(user_id) => load_context(&state, user_id).await?,
        None => None,
    };
    let answer = service::chat(&state.llm, request.provider, &request.question, ctx.as_ref()).await;
    Ok(Json(answer))
}
