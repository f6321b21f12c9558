// File: gzsurvey-core/src/api/survey_routes.rs

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use gzsurvey_common::models::StartOutcome;

use crate::api::error::ApiError;
use crate::api::extract::{Caller, JsonBody};
use crate::api::AppState;
use crate::Error;

#[derive(Debug, Deserialize)]
pub struct InitSurveyRequest {
    pub receipt: Option<String>,
    pub brand: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitSurveyRequest {
    pub response_id: Option<String>,
    pub payload: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RewardDetailsRequest {
    pub response_id: Option<String>,
    pub reward_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRewardRequest {
    pub response_id: Option<String>,
}

pub async fn init_survey(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(req): JsonBody<InitSurveyRequest>,
) -> Result<Json<Value>, ApiError> {
    state.limits.init_survey.check_and_record(&caller.client_ip).await?;

    let receipt = req.receipt.unwrap_or_default();
    let outcome = state
        .surveys
        .start(&receipt, req.brand.as_deref(), req.branch.as_deref())
        .await?;

    Ok(Json(match outcome {
        StartOutcome::Created(id) => json!({ "response_id": id, "created": true }),
        StartOutcome::Resumed(id) => json!({ "response_id": id, "resumed": true }),
    }))
}

pub async fn submit_survey(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(req): JsonBody<SubmitSurveyRequest>,
) -> Result<Json<Value>, ApiError> {
    state.limits.submit_survey.check_and_record(&caller.client_ip).await?;

    let (Some(response_id), Some(payload)) = (req.response_id, req.payload) else {
        return Err(Error::InvalidInput("Missing response_id or payload in request body.".into()).into());
    };
    let reward_code = state.surveys.submit(&response_id, &payload).await?;
    Ok(Json(json!({ "reward_code": reward_code })))
}

pub async fn get_reward_details(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(req): JsonBody<RewardDetailsRequest>,
) -> Result<Json<Value>, ApiError> {
    state.limits.reward_details.check_and_record(&caller.client_ip).await?;

    let (Some(response_id), Some(reward_code)) = (req.response_id, req.reward_code) else {
        return Err(Error::InvalidRewardCode.into());
    };
    let details = state
        .surveys
        .fetch_reward_details(&response_id, &reward_code)
        .await?;
    Ok(Json(json!({ "reward_code": details.reward_code, "receipt": details.receipt })))
}

pub async fn generate_reward(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(req): JsonBody<GenerateRewardRequest>,
) -> Result<Json<Value>, ApiError> {
    state.limits.generate_reward.check_and_record(&caller.client_ip).await?;

    let response_id = req
        .response_id
        .ok_or_else(|| Error::InvalidInput("Missing response_id in request body".into()))?;
    let reward_code = state.surveys.generate_reward(&response_id).await?;
    Ok(Json(json!({ "reward_code": reward_code })))
}
