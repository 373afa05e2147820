//! Optional GitHub OAuth protection for the MCP endpoint.
//!
//! When GitHub credentials are configured, callers must present a GitHub
//! access token as `Authorization: Bearer <token>`. The token is checked
//! against GitHub's `/user` API and must carry the required scopes.
//!
//! The OAuth authorization code flow itself is handled by the `oauth2`
//! crate; this module only wires it to a few routes:
//! - `GET /auth/login` redirects to GitHub's consent page
//! - `GET /auth/callback` exchanges the returned code for an access token
//! - `GET /.well-known/oauth-protected-resource` describes the protected
//!   resource (RFC 9728) so MCP clients can discover how to authenticate

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use anyhow::{Result, anyhow};
use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, RedirectUrl, Scope, TokenResponse, TokenUrl, basic::BasicClient,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::mcp::{config::GithubAuthConfig, error::AuthError};

const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_ISSUER: &str = "https://github.com/login/oauth";

const METADATA_PATH: &str = "/.well-known/oauth-protected-resource";

/// How long a login's CSRF state stays valid.
const STATE_TTL: Duration = Duration::from_secs(600);

/// Upper bound on outstanding logins; the oldest state is evicted beyond it.
const MAX_PENDING_STATES: usize = 1024;

type GithubClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

#[derive(Clone)]
pub struct GithubAuth {
    inner: Arc<Inner>,
}

struct Inner {
    oauth: GithubClient,
    http: reqwest::Client,
    api_base: String,
    base_url: String,
    required_scopes: Vec<String>,
    pending_states: Mutex<HashMap<String, Instant>>,
}

impl GithubAuth {
    /// # Errors
    /// Fails when the callback URL derived from `BASE_URL` is not a valid URL
    /// or the HTTP client cannot be built.
    pub fn new(config: &GithubAuthConfig) -> Result<Self> {
        Self::with_endpoints(config, GITHUB_AUTHORIZE_URL, GITHUB_TOKEN_URL, GITHUB_API_BASE)
    }

    fn with_endpoints(
        config: &GithubAuthConfig,
        authorize_url: &str,
        token_url: &str,
        api_base: &str,
    ) -> Result<Self> {
        let oauth = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_type(AuthType::RequestBody)
            .set_auth_uri(AuthUrl::new(authorize_url.to_string())?)
            .set_token_uri(TokenUrl::new(token_url.to_string())?)
            .set_redirect_uri(
                RedirectUrl::new(config.callback_url())
                    .map_err(|e| anyhow!("BASE_URL does not form a valid callback URL: {e}"))?,
            );

        // No redirects on the token exchange, as recommended by `oauth2`.
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                oauth,
                http,
                api_base: api_base.trim_end_matches('/').to_string(),
                base_url: config.base_url.clone(),
                required_scopes: config.required_scopes.clone(),
                pending_states: Mutex::new(HashMap::new()),
            }),
        })
    }

    fn remember_state(&self, state: String) -> Result<(), AuthError> {
        let mut pending = self.lock_states()?;
        pending.retain(|_, issued| issued.elapsed() < STATE_TTL);
        while pending.len() >= MAX_PENDING_STATES {
            let Some(oldest) = pending
                .iter()
                .min_by_key(|(_, issued)| **issued)
                .map(|(state, _)| state.clone())
            else {
                break;
            };
            pending.remove(&oldest);
        }
        pending.insert(state, Instant::now());
        Ok(())
    }

    /// Consumes a CSRF state, returning whether it was issued and is still fresh.
    fn take_state(&self, state: &str) -> Result<bool, AuthError> {
        let mut pending = self.lock_states()?;
        Ok(pending
            .remove(state)
            .is_some_and(|issued| issued.elapsed() < STATE_TTL))
    }

    fn lock_states(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Instant>>, AuthError> {
        self.inner
            .pending_states
            .lock()
            .map_err(|_| AuthError::Internal("oauth state lock poisoned".to_string()))
    }

    fn metadata_url(&self) -> String {
        format!("{}{METADATA_PATH}", self.inner.base_url)
    }

    /// Protected resource metadata pointing clients at GitHub and the login route.
    fn resource_metadata(&self) -> Value {
        let base_url = &self.inner.base_url;
        json!({
            "resource": format!("{base_url}/mcp"),
            "authorization_servers": [GITHUB_ISSUER],
            "scopes_supported": self.inner.required_scopes,
            "bearer_methods_supported": ["header"],
            "resource_documentation": format!("{base_url}/auth/login"),
        })
    }

    /// Turns a rejection into a response; 401s advertise the metadata document.
    fn challenge(&self, err: AuthError) -> Response {
        let mut response = err.into_response();
        if response.status() == StatusCode::UNAUTHORIZED {
            let challenge = format!(
                "Bearer realm=\"oura-mcp\", resource_metadata=\"{}\"",
                self.metadata_url()
            );
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }

    /// Checks a caller's GitHub token against the `/user` API.
    ///
    /// # Errors
    /// * `InvalidToken` - GitHub rejected the token
    /// * `InsufficientScope` - the token lacks a required scope
    /// * `Internal` - GitHub could not be reached
    pub async fn verify(&self, token: &str) -> Result<(), AuthError> {
        let response = self
            .inner
            .http
            .get(format!("{}/user", self.inner.api_base))
            .bearer_auth(token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| AuthError::Internal(format!("GitHub token check failed: {e}")))?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "github rejected bearer token");
            return Err(AuthError::InvalidToken);
        }

        let granted = response
            .headers()
            .get("x-oauth-scopes")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        missing_scope(granted, &self.inner.required_scopes)
            .map_or(Ok(()), |scope| Err(AuthError::InsufficientScope(scope)))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// First required scope absent from GitHub's comma separated grant list.
fn missing_scope(granted: &str, required: &[String]) -> Option<String> {
    let granted: Vec<&str> = granted.split(',').map(str::trim).collect();
    required
        .iter()
        .find(|scope| !granted.contains(&scope.as_str()))
        .cloned()
}

async fn require_bearer(State(auth): State<GithubAuth>, request: Request, next: Next) -> Response {
    let verified = match bearer_token(request.headers()) {
        Some(token) => auth.verify(&token).await,
        None => Err(AuthError::MissingToken),
    };
    match verified {
        Ok(()) => next.run(request).await,
        Err(err) => auth.challenge(err),
    }
}

async fn protected_resource(State(auth): State<GithubAuth>) -> Json<Value> {
    Json(auth.resource_metadata())
}

async fn login(State(auth): State<GithubAuth>) -> Result<Redirect, AuthError> {
    let (authorize_url, csrf_state) = auth
        .inner
        .oauth
        .authorize_url(CsrfToken::new_random)
        .add_scopes(auth.inner.required_scopes.iter().cloned().map(Scope::new))
        .url();
    auth.remember_state(csrf_state.secret().clone())?;
    Ok(Redirect::to(authorize_url.as_str()))
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

async fn callback(
    State(auth): State<GithubAuth>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<Value>, AuthError> {
    if let Some(error) = params.error {
        return Err(AuthError::InvalidCallback(error));
    }

    let state = params
        .state
        .ok_or_else(|| AuthError::InvalidCallback("missing state".to_string()))?;
    if !auth.take_state(&state)? {
        return Err(AuthError::InvalidCallback("unknown or expired state".to_string()));
    }

    let code = params
        .code
        .ok_or_else(|| AuthError::InvalidCallback("missing code".to_string()))?;

    let token = auth
        .inner
        .oauth
        .exchange_code(AuthorizationCode::new(code))
        .request_async(&auth.inner.http)
        .await
        .map_err(|e| AuthError::Exchange(e.to_string()))?;

    info!("github oauth login completed");
    let scopes: Vec<&str> = token
        .scopes()
        .map(|scopes| scopes.iter().map(|scope| scope.as_str()).collect())
        .unwrap_or_default();
    Ok(Json(json!({
        "access_token": token.access_token().secret(),
        "token_type": "bearer",
        "scope": scopes.join(","),
    })))
}

/// Puts `mcp` behind bearer verification and adds the OAuth login and
/// discovery routes.
pub fn protect(mcp: Router, auth: GithubAuth) -> Router {
    let login_routes = Router::new()
        .route("/auth/login", get(login))
        .route("/auth/callback", get(callback))
        .route(METADATA_PATH, get(protected_resource))
        .with_state(auth.clone());

    mcp.layer(middleware::from_fn_with_state(auth, require_bearer))
        .merge(login_routes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use oauth2::url::Url;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string_contains, header as header_is, method, path},
    };

    fn config() -> GithubAuthConfig {
        GithubAuthConfig::new("client".into(), "secret".into(), "https://oura.example.com")
    }

    fn auth_for(server: &MockServer) -> GithubAuth {
        GithubAuth::with_endpoints(
            &config(),
            &format!("{}/login/oauth/authorize", server.uri()),
            &format!("{}/login/oauth/access_token", server.uri()),
            &server.uri(),
        )
        .unwrap()
    }

    fn state_from_redirect(redirect: Redirect) -> String {
        let response = redirect.into_response();
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        let url = Url::parse(location).unwrap();
        assert!(url.query_pairs().any(|(k, v)| k == "scope" && v == "user"));
        assert!(
            url.query_pairs()
                .any(|(k, v)| k == "redirect_uri" && v == "https://oura.example.com/auth/callback")
        );
        url.query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[test]
    fn parses_bearer_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer gho_abc"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("gho_abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn reports_first_missing_scope() {
        let required = vec!["user".to_string()];
        assert_eq!(missing_scope("repo, user", &required), None);
        assert_eq!(missing_scope("repo", &required).as_deref(), Some("user"));
        assert_eq!(missing_scope("", &required).as_deref(), Some("user"));
    }

    #[tokio::test]
    async fn verify_accepts_scoped_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header_is("authorization", "Bearer good"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-oauth-scopes", "repo, user")
                    .set_body_json(json!({ "login": "someone" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        auth_for(&server).verify("good").await.unwrap();
    }

    #[tokio::test]
    async fn verify_rejects_bad_or_underscoped_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_is("authorization", "Bearer revoked"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(header_is("authorization", "Bearer narrow"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-oauth-scopes", "repo"))
            .mount(&server)
            .await;

        let auth = auth_for(&server);
        assert!(matches!(auth.verify("revoked").await, Err(AuthError::InvalidToken)));
        assert!(matches!(
            auth.verify("narrow").await,
            Err(AuthError::InsufficientScope(scope)) if scope == "user"
        ));
    }

    #[test]
    fn pending_states_are_capped() {
        let auth = GithubAuth::new(&config()).unwrap();
        for i in 0..MAX_PENDING_STATES + 100 {
            auth.remember_state(format!("state-{i}")).unwrap();
        }
        let last = format!("state-{}", MAX_PENDING_STATES + 99);
        assert_eq!(auth.lock_states().unwrap().len(), MAX_PENDING_STATES);
        assert!(auth.take_state(&last).unwrap());
    }

    #[test]
    fn unauthorized_challenge_points_at_metadata() {
        let auth = GithubAuth::new(&config()).unwrap();
        let response = auth.challenge(AuthError::MissingToken);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let challenge = response.headers()[header::WWW_AUTHENTICATE].to_str().unwrap();
        assert!(challenge.starts_with("Bearer "));
        assert!(challenge.contains(
            "resource_metadata=\"https://oura.example.com/.well-known/oauth-protected-resource\""
        ));

        let response = auth.challenge(AuthError::InsufficientScope("user".into()));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn metadata_describes_resource_and_login() {
        let auth = GithubAuth::new(&config()).unwrap();
        let Json(metadata) = protected_resource(State(auth)).await;
        assert_eq!(metadata["resource"], "https://oura.example.com/mcp");
        assert_eq!(metadata["authorization_servers"], json!([GITHUB_ISSUER]));
        assert_eq!(metadata["scopes_supported"], json!(["user"]));
        assert_eq!(metadata["resource_documentation"], "https://oura.example.com/auth/login");
    }

    #[tokio::test]
    async fn callback_rejects_unknown_state() {
        let server = MockServer::start().await;
        let params = CallbackParams {
            code: Some("code".into()),
            state: Some("forged".into()),
            error: None,
        };
        let result = callback(State(auth_for(&server)), Query(params)).await;
        assert!(matches!(result, Err(AuthError::InvalidCallback(_))));
    }

    #[tokio::test]
    async fn login_then_callback_exchanges_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .and(body_string_contains("code=abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "gho_token",
                "token_type": "bearer",
                "scope": "user"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = auth_for(&server);
        let state = state_from_redirect(login(State(auth.clone())).await.unwrap());

        let params = CallbackParams {
            code: Some("abc123".into()),
            state: Some(state.clone()),
            error: None,
        };
        let Json(body) = callback(State(auth.clone()), Query(params)).await.unwrap();
        assert_eq!(body["access_token"], "gho_token");
        assert_eq!(body["scope"], "user");

        // A state is single use.
        let replay = CallbackParams {
            code: Some("abc123".into()),
            state: Some(state),
            error: None,
        };
        assert!(matches!(
            callback(State(auth), Query(replay)).await,
            Err(AuthError::InvalidCallback(_))
        ));
    }
}
