//! Request gateway for the Oura v2 API.
//!
//! This module provides:
//! - `OuraClient`: the single point through which tools reach the Oura API
//! - Tracing integration for outbound requests
//! - Normalisation of every failure into `OuraError`

use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{ClientBuilder, Result as MiddlewareResult};
use reqwest_tracing::{
    ReqwestOtelSpanBackend, TracingMiddleware, default_on_request_end, reqwest_otel_span,
};
use serde_json::Value;
use tracing::{Span, debug, warn};

use crate::mcp::{config::OuraConfig, error::OuraError};

/// Parsed JSON body on success, or the reason the call failed.
pub type ApiResult = Result<Value, OuraError>;

// Span backend for outbound Oura calls. Request headers stay out of the span,
// they carry the bearer token.
// Only referenced as a type parameter of TracingMiddleware.
#[allow(dead_code)]
struct OuraTracing;

impl ReqwestOtelSpanBackend for OuraTracing {
    fn on_request_start(req: &Request, _extension: &mut Extensions) -> Span {
        reqwest_otel_span!(name = "oura-api-request", req)
    }

    fn on_request_end(
        span: &Span,
        outcome: &MiddlewareResult<Response>,
        _extension: &mut Extensions,
    ) {
        default_on_request_end(span, outcome);
    }
}

#[derive(Clone)]
pub struct OuraClient {
    config: OuraConfig,
}

impl OuraClient {
    #[must_use]
    pub const fn new(config: OuraConfig) -> Self {
        Self { config }
    }

    /// Issues one authenticated GET to `{api_base}/{endpoint}`.
    ///
    /// No request is made when the token is missing. There is exactly one
    /// attempt per call; the configured timeout is the only cancellation.
    /// The underlying HTTP client lives only for the duration of this call.
    ///
    /// # Errors
    /// * `MissingToken` - `OURA_API_TOKEN` was not configured
    /// * `Status` - the API answered with a non-2xx status
    /// * `Request` - transport failure, timeout or an undecodable body
    pub async fn fetch(&self, endpoint: &str, query: &[(&str, String)]) -> ApiResult {
        let result = self.send(endpoint, query).await;
        if let Err(err) = &result {
            warn!(endpoint, error = %err, "oura api call failed");
        }
        result
    }

    async fn send(&self, endpoint: &str, query: &[(&str, String)]) -> ApiResult {
        let token = self
            .config
            .api_token
            .as_deref()
            .ok_or(OuraError::MissingToken)?;

        let client = ClientBuilder::new(
            reqwest::Client::builder()
                .timeout(self.config.timeout)
                .build()?,
        )
        .with(TracingMiddleware::<OuraTracing>::new())
        .build();

        let url = format!("{}/{}", self.config.api_base, endpoint.trim_start_matches('/'));
        debug!(%url, ?query, "calling oura api");

        let response = client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OuraError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
