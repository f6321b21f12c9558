// File: gzsurvey-core/src/api/mod.rs

pub mod admin_routes;
pub mod cors;
pub mod error;
pub mod extract;
pub mod survey_routes;

use std::sync::Arc;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::rate_limit::RateLimits;
use crate::services::{AdminSessionManager, SurveySessionManager};

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub surveys: Arc<SurveySessionManager>,
    pub admins: Arc<AdminSessionManager>,
    pub limits: RateLimits,
}

pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    let admin = Router::new()
        .route("/login", post(admin_routes::login))
        .route("/logout", post(admin_routes::logout))
        .route("/verify", get(admin_routes::verify))
        .route("/refresh", post(admin_routes::refresh))
        .route("/change-password", post(admin_routes::change_password))
        .route("/mark-redeemed", post(admin_routes::mark_redeemed))
        .route("/update-status", post(admin_routes::update_status))
        .route("/update-profile", post(admin_routes::update_profile));

    Router::new()
        .route("/init-survey", post(survey_routes::init_survey))
        .route("/submit-survey", post(survey_routes::submit_survey))
        .route("/get-reward-details", post(survey_routes::get_reward_details))
        .route("/generate-reward", post(survey_routes::generate_reward))
        .nest("/admin-auth", admin)
        .fallback(not_found)
        .layer(cors::cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
