//! Error types for the Oura MCP implementation.
//!
//! - `OuraError`: every way a call to the Oura API can fail. Tools never
//!   surface it as a protocol error; its `Display` text is embedded in the
//!   tool's plain text answer.
//! - `AuthError`: failures while authenticating callers of the MCP endpoint,
//!   rendered as HTTP responses by axum.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OuraError {
    #[error("OURA_API_TOKEN not configured")]
    MissingToken,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for OuraError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for OuraError {
    fn from(err: reqwest_middleware::Error) -> Self {
        Self::Request(err.to_string())
    }
}

impl From<serde_json::Error> for OuraError {
    fn from(err: serde_json::Error) -> Self {
        Self::Request(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token lacks required scope: {0}")]
    InsufficientScope(String),

    #[error("Invalid OAuth callback: {0}")]
    InvalidCallback(String),

    #[error("OAuth code exchange failed: {0}")]
    Exchange(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::InsufficientScope(_) => StatusCode::FORBIDDEN,
            Self::InvalidCallback(_) => StatusCode::BAD_REQUEST,
            Self::Exchange(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, self.to_string()).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"oura-mcp\""),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_tool_output() {
        assert_eq!(OuraError::MissingToken.to_string(), "OURA_API_TOKEN not configured");
        let err = OuraError::Status { status: 401, body: "Unauthorized".into() };
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");
        assert_eq!(
            OuraError::Request("timed out".into()).to_string(),
            "Request failed: timed out"
        );
    }

    #[test]
    fn unauthorized_responses_carry_challenge() {
        let response = AuthError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

        let response = AuthError::InsufficientScope("user".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
