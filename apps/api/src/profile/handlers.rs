//! Axum route handlers for the Profile API.

use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{Json, Query};
use crate::profile::completeness::{compute_setup_report, SetupReport};
use crate::profile::gestation::GestationStats;
use crate::profile::models::{Profile, ProfileData};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Option<Profile>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// True until every setup step is complete.
    pub needs_setup: bool,
    pub stats: Option<GestationStats>,
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, AppError> {
    body.as_object()
        .ok_or_else(|| AppError::Validation("Request body must be a JSON object".to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/profile?user_id=
///
/// A missing profile is not an error: the client opens the setup wizard.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.profiles.get(query.user_id).await?;
    Ok(Json(ProfileResponse { profile }))
}

/// POST /api/v1/profile?user_id=
///
/// Creates the profile. `profile_completed` is derived, never taken from the body.
pub async fn handle_create_profile(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    let data = ProfileData::default()
        .merged(as_object(&body)?)
        .map_err(|e| AppError::Validation(format!("Invalid profile data: {e}")))?;

    let profile = state.profiles.create(query.user_id, data).await?;
    info!(
        "Profile created for user {} (completed={})",
        query.user_id, profile.profile_completed
    );
    Ok((
        StatusCode::CREATED,
        Json(ProfileResponse {
            profile: Some(profile),
        }),
    ))
}

/// PATCH /api/v1/profile?user_id=
///
/// Merges the given keys into the stored profile. `null` clears a field.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
    Json(body): Json<Value>,
) -> Result<Json<ProfileResponse>, AppError> {
    let patch = as_object(&body)?;
    let profile = state.profiles.update(query.user_id, patch).await?;
    Ok(Json(ProfileResponse {
        profile: Some(profile),
    }))
}

/// DELETE /api/v1/profile?user_id=
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.profiles.delete(query.user_id).await?;
    Ok(Json(DeleteResponse {
        message: "Profile deleted successfully".to_string(),
    }))
}

/// GET /api/v1/profile/setup?user_id=
///
/// Which setup steps still need input. A missing profile reports every step.
pub async fn handle_setup_status(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<SetupReport>, AppError> {
    let data = state
        .profiles
        .get(query.user_id)
        .await?
        .map(|p| p.data)
        .unwrap_or_default();
    Ok(Json(compute_setup_report(&data)))
}

/// GET /api/v1/dashboard?user_id=
///
/// Static gestation numbers. Computed locally, no model call.
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let profile = state
        .profiles
        .get(query.user_id)
        .await?
        .and_then(Profile::completed);

    let today = Utc::now().date_naive();
    let stats = profile
        .as_ref()
        .and_then(|p| p.data.last_period)
        .map(|lmp| GestationStats::compute(lmp, today));

    Ok(Json(DashboardResponse {
        needs_setup: profile.is_none(),
        stats,
    }))
}
