pub mod generate;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::insights::handlers as insights;
use crate::profile::handlers as profile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile API
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile)
                .post(profile::handle_create_profile)
                .patch(profile::handle_update_profile)
                .delete(profile::handle_delete_profile),
        )
        .route("/api/v1/profile/setup", get(profile::handle_setup_status))
        .route("/api/v1/dashboard", get(profile::handle_dashboard))
        // Insights API
        .route("/api/v1/insights/weekly", get(insights::handle_weekly))
        .route(
            "/api/v1/insights/highlights/:kind",
            get(insights::handle_highlight),
        )
        .route("/api/v1/insights/symptoms", get(insights::handle_symptoms))
        .route("/api/v1/insights/facts", get(insights::handle_facts))
        .route(
            "/api/v1/insights/details/:topic",
            get(insights::handle_detail),
        )
        .route("/api/v1/chat", post(insights::handle_chat))
        // Raw generation
        .route("/api/v1/llm/:provider", post(generate::handle_generate))
        .with_state(state)
}
