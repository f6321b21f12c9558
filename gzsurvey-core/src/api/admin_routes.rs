// File: gzsurvey-core/src/api/admin_routes.rs

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::error::ApiError;
use crate::api::extract::{authorization_token, Bearer, Caller, JsonBody};
use crate::api::AppState;
use crate::Error;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MarkRedeemedRequest {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub profile_pic: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    let result = state.admins.login(&email, &password, &caller).await?;

    Ok(Json(json!({
        "success": true,
        "token": result.tokens.token,
        "refresh_token": result.tokens.refresh_token,
        "user": result.user,
    })))
}

pub async fn logout(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Bearer(token): Bearer,
) -> Result<Json<Value>, ApiError> {
    state.admins.logout(&token, &caller).await?;
    Ok(Json(json!({ "success": true })))
}

/// Always answers with a `valid` flag, so the dashboard can branch on it.
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = authorization_token(&headers).unwrap_or_default();
    match state.admins.verify(&token).await {
        Ok(identity) => Json(json!({
            "valid": true,
            "user": {
                "id": identity.claims.admin_id,
                "email": identity.email,
                "brand": identity.claims.brand,
                "branch": identity.claims.branch,
                "role": identity.claims.role,
            },
        }))
        .into_response(),
        Err(Error::InvalidToken) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "valid": false, "error": Error::InvalidToken.to_string() })),
        )
            .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RefreshRequest>,
) -> Result<Json<Value>, ApiError> {
    let tokens = state
        .admins
        .refresh(req.refresh_token.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(json!({
        "success": true,
        "token": tokens.token,
        "refresh_token": tokens.refresh_token,
    })))
}

pub async fn change_password(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Bearer(token): Bearer,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .admins
        .change_password(
            &token,
            req.current_password.as_deref().unwrap_or_default(),
            req.new_password.as_deref().unwrap_or_default(),
            &caller,
        )
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Password updated. Please log in again.",
    })))
}

pub async fn mark_redeemed(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Bearer(token): Bearer,
    JsonBody(req): JsonBody<MarkRedeemedRequest>,
) -> Result<Json<Value>, ApiError> {
    let identity = state.admins.verify(&token).await?;
    let id = req
        .id
        .ok_or_else(|| Error::InvalidInput("Survey ID is required".into()))?;

    state.surveys.mark_redeemed(&id, &identity).await?;
    state.admins.record_redemption(&identity, &id, &caller).await;
    Ok(Json(json!({ "success": true })))
}

pub async fn update_status(
    State(state): State<AppState>,
    Bearer(token): Bearer,
    JsonBody(req): JsonBody<UpdateStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    state.admins.verify(&token).await?;
    let (Some(id), Some(status)) = (req.id, req.status) else {
        return Err(Error::InvalidInput("Survey ID and status are required".into()).into());
    };

    state.surveys.update_status(&id, &status).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Bearer(token): Bearer,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> Result<Json<Value>, ApiError> {
    let profile = state
        .admins
        .update_profile(&token, req.display_name.as_deref(), req.profile_pic.as_deref())
        .await?;
    Ok(Json(json!({
        "success": true,
        "display_name": profile.display_name,
        "profile_pic": profile.profile_pic,
    })))
}
