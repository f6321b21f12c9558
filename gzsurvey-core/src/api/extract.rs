// File: gzsurvey-core/src/api/extract.rs

use std::convert::Infallible;
use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use gzsurvey_common::models::RequestMeta;

use crate::api::error::ApiError;
use crate::auth::bearer_token;
use crate::Error;

/// `Json<T>` whose rejection is the crate's generic `InvalidInput` reply.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                debug!("Rejected request body: {}", rejection.body_text());
                Err(ApiError(Error::InvalidInput("Invalid request body".into())))
            }
        }
    }
}

/// Client IP and user agent for throttling and audit.
pub struct Caller(pub RequestMeta);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(request_meta(&parts.headers)))
    }
}

/// Bearer token from `Authorization`. Missing or malformed is `InvalidToken`.
pub struct Bearer(pub String);

impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authorization_token(&parts.headers)
            .map(Bearer)
            .ok_or(ApiError(Error::InvalidToken))
    }
}

pub fn authorization_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(String::from)
}

/// First hop of `X-Forwarded-For`, which the fronting proxy sets.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from)
        .unwrap_or_else(|| RequestMeta::UNKNOWN_IP.to_string())
}

pub fn request_meta(headers: &HeaderMap) -> RequestMeta {
    RequestMeta {
        client_ip: client_ip(headers),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    }
}
