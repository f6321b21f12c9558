// File: gzsurvey-core/src/api/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use crate::Error;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Router-boundary wrapper that turns a crate [`Error`] into an HTTP reply.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidInput(_)
            | Error::InvalidReceipt(_)
            | Error::AlreadyRewarded { .. }
            | Error::AlreadyRedeemed => StatusCode::BAD_REQUEST,
            Error::UnknownSession
            | Error::InvalidCredentials
            | Error::InvalidToken
            | Error::InvalidRewardCode => StatusCode::UNAUTHORIZED,
            Error::RateLimited | Error::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the caller is allowed to read. Internal detail never leaves the process.
    pub fn public_message(&self) -> String {
        match &self.0 {
            Error::InvalidInput(msg) | Error::InvalidReceipt(msg) => msg.clone(),
            e if e.is_client_error() => e.to_string(),
            _ => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self.0);
        }

        let message = self.public_message();
        let body = match &self.0 {
            Error::AlreadyRewarded { response_id: Some(id) } => json!({
                "error": message,
                "existing_reward": true,
                "response_id": id,
            }),
            Error::AlreadyRewarded { response_id: None } => json!({
                "error": message,
                "existing_reward": true,
            }),
            _ => json!({ "error": message }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        let cases = [
            (Error::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (Error::InvalidReceipt("x".into()), StatusCode::BAD_REQUEST),
            (Error::AlreadyRewarded { response_id: None }, StatusCode::BAD_REQUEST),
            (Error::AlreadyRedeemed, StatusCode::BAD_REQUEST),
            (Error::UnknownSession, StatusCode::UNAUTHORIZED),
            (Error::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (Error::InvalidRewardCode, StatusCode::UNAUTHORIZED),
            (Error::InvalidToken, StatusCode::UNAUTHORIZED),
            (Error::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (Error::TooManyAttempts, StatusCode::TOO_MANY_REQUESTS),
            (Error::Provider("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::UniqueViolation("k".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status_code(), status);
        }
    }

    #[test]
    fn internal_detail_is_hidden() {
        let e = ApiError(Error::Provider("connection refused to 10.0.0.5".into()));
        assert_eq!(e.public_message(), "Internal server error");
        let e = ApiError(Error::InvalidReceipt("Receipt is required".into()));
        assert_eq!(e.public_message(), "Receipt is required");
    }
}
