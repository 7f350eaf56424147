//! Session state and the authorized API client.
//!
//! # Design
//! `SessionClient` is the single choke point for outbound calls: it attaches
//! the bearer credential, serializes JSON bodies, executes through an
//! injected [`Transport`] and classifies every non-2xx status into an
//! [`ApiError`], so no caller ever inspects raw status codes. The credential
//! lives in an injected [`SessionStore`] rather than ambient global state;
//! an external login flow sets it, [`SessionClient::logout`] clears it.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// Default navigation target handed out after logout.
pub const DEFAULT_LOGIN_REDIRECT: &str = "/auth/login";

/// Shared session state: at most one opaque bearer credential.
///
/// Presence of a credential is the whole authentication model here; token
/// issuance and refresh happen outside this crate.
#[derive(Debug, Default)]
pub struct SessionStore {
    credential: RwLock<Option<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a credential. The external login flow calls this.
    pub fn set_credential(&self, token: impl Into<String>) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn credential(&self) -> Option<String> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Explicit signal returned by [`SessionClient::logout`]. The presentation
/// layer performs the actual navigation; this crate never does.
#[must_use = "the caller is responsible for navigating to the target"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutRedirect {
    pub target: String,
}

/// Authorized HTTP client for the fridge API.
///
/// `base_url` includes the API prefix, e.g. `http://localhost:3000/api`;
/// endpoint strings are appended to it verbatim.
#[derive(Clone)]
pub struct SessionClient {
    base_url: String,
    login_redirect: String,
    session: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    cancel: CancellationToken,
}

impl SessionClient {
    pub fn new(base_url: &str, session: Arc<SessionStore>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            login_redirect: DEFAULT_LOGIN_REDIRECT.to_string(),
            session,
            transport,
            cancel: CancellationToken::new(),
        }
    }

    /// Override the post-logout navigation target.
    pub fn with_login_redirect(mut self, target: impl Into<String>) -> Self {
        self.login_redirect = target.into();
        self
    }

    /// Token the presentation layer can use to abort all in-flight requests.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Perform an API call and classify the outcome.
    ///
    /// The bearer credential is attached when one is stored. `body` is
    /// serialized to JSON and travels only on non-GET requests. A 2xx
    /// response is returned raw for the caller to decode; every other
    /// status comes back as the matching [`ApiError`] variant.
    pub async fn request<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&T>,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_request(endpoint, method, body)?;
        debug!(method = method.as_str(), path = %request.path, "api request");

        let response = match self
            .cancel
            .run_until_cancelled(self.transport.execute(request))
            .await
        {
            None => return Err(ApiError::Cancelled),
            Some(Err(err)) => {
                warn!(error = %err, "transport failure");
                return Err(err.into());
            }
            Some(Ok(response)) => response,
        };

        match classify_status(response) {
            Ok(response) => Ok(response),
            Err(err) => {
                warn!(error = %err, "api request failed");
                Err(err)
            }
        }
    }

    fn build_request<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&T>,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = Vec::new();
        if let Some(token) = self.session.credential() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }

        // Bodies only travel on non-GET requests.
        let body = match body {
            Some(payload) if method != HttpMethod::Get => {
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(
                    serde_json::to_string(payload)
                        .map_err(|e| ApiError::Serialization(e.to_string()))?,
                )
            }
            _ => None,
        };

        Ok(HttpRequest {
            method,
            path: format!("{}{endpoint}", self.base_url),
            headers,
            body,
        })
    }

    /// True iff a credential is currently stored. Pure read.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Clear the stored credential and hand back the navigation target.
    pub fn logout(&self) -> LogoutRedirect {
        self.session.clear();
        debug!("session cleared");
        LogoutRedirect {
            target: self.login_redirect.clone(),
        }
    }
}

/// Centralized status interpretation: 2xx passes through, 401/403 means the
/// credential was rejected, 404 means the resource is gone, remaining 4xx
/// are payload rejections and anything else is the server's fault.
fn classify_status(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    match response.status {
        200..=299 => Ok(response),
        status @ (401 | 403) => Err(ApiError::Auth { status }),
        404 => Err(ApiError::NotFound),
        400..=499 => Err(ApiError::Validation(rejection_message(&response))),
        status => Err(ApiError::Server {
            status,
            body: response.body,
        }),
    }
}

fn rejection_message(response: &HttpResponse) -> String {
    let body = response.body.trim();
    if body.is_empty() {
        format!("request rejected (HTTP {})", response.status)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::TransportError;

    /// Unit tests never reach the network; this transport refuses to.
    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError::Connect("no network in unit tests".to_string()))
        }
    }

    fn client(session: Arc<SessionStore>) -> SessionClient {
        SessionClient::new("http://localhost:3000/api", session, Arc::new(NullTransport))
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn credential_present_attaches_bearer_header() {
        let session = Arc::new(SessionStore::new());
        session.set_credential("tok123");
        let req = client(session)
            .build_request::<()>("/products", HttpMethod::Get, None)
            .unwrap();
        assert!(req
            .headers
            .contains(&("authorization".to_string(), "Bearer tok123".to_string())));
    }

    #[test]
    fn no_credential_omits_authorization_header() {
        let session = Arc::new(SessionStore::new());
        let req = client(session)
            .build_request::<()>("/products", HttpMethod::Get, None)
            .unwrap();
        assert!(req.headers.iter().all(|(name, _)| name != "authorization"));
    }

    #[test]
    fn body_is_serialized_with_content_type_for_post() {
        let session = Arc::new(SessionStore::new());
        let payload = serde_json::json!({"name": "Milk"});
        let req = client(session)
            .build_request("/products", HttpMethod::Post, Some(&payload))
            .unwrap();
        assert!(req
            .headers
            .contains(&("content-type".to_string(), "application/json".to_string())));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Milk");
    }

    #[test]
    fn get_requests_never_carry_a_body() {
        let session = Arc::new(SessionStore::new());
        let payload = serde_json::json!({"name": "Milk"});
        let req = client(session)
            .build_request("/products", HttpMethod::Get, Some(&payload))
            .unwrap();
        assert!(req.body.is_none());
        assert!(req.headers.iter().all(|(name, _)| name != "content-type"));
    }

    #[test]
    fn endpoint_is_appended_to_trimmed_base() {
        let session = Arc::new(SessionStore::new());
        let client = SessionClient::new(
            "http://localhost:3000/api/",
            session,
            Arc::new(NullTransport),
        );
        let req = client
            .build_request::<()>("/products", HttpMethod::Get, None)
            .unwrap();
        assert_eq!(req.path, "http://localhost:3000/api/products");
    }

    #[test]
    fn success_statuses_pass_through() {
        assert!(classify_status(response(200, "[]")).is_ok());
        assert!(classify_status(response(201, "{}")).is_ok());
        assert!(classify_status(response(204, "")).is_ok());
    }

    #[test]
    fn unauthorized_statuses_classify_as_auth() {
        let err = classify_status(response(401, "")).unwrap_err();
        assert!(matches!(err, ApiError::Auth { status: 401 }));
        let err = classify_status(response(403, "")).unwrap_err();
        assert!(matches!(err, ApiError::Auth { status: 403 }));
    }

    #[test]
    fn missing_resource_classifies_as_not_found() {
        let err = classify_status(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn other_client_errors_classify_as_validation() {
        let err = classify_status(response(422, "quantity out of range")).unwrap_err();
        match err {
            ApiError::Validation(msg) => assert_eq!(msg, "quantity out of range"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn empty_rejection_body_gets_a_status_message() {
        let err = classify_status(response(400, "")).unwrap_err();
        match err {
            ApiError::Validation(msg) => assert_eq!(msg, "request rejected (HTTP 400)"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn server_errors_classify_as_server() {
        let err = classify_status(response(500, "boom")).unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 500, .. }));
    }

    #[test]
    fn logout_clears_credential_and_returns_default_target() {
        let session = Arc::new(SessionStore::new());
        session.set_credential("tok123");
        let client = client(Arc::clone(&session));
        assert!(client.is_authenticated());

        let redirect = client.logout();
        assert_eq!(redirect.target, DEFAULT_LOGIN_REDIRECT);
        assert!(!client.is_authenticated());
        assert!(session.credential().is_none());
    }

    #[test]
    fn logout_is_safe_when_already_logged_out() {
        let session = Arc::new(SessionStore::new());
        let client = client(session);
        let redirect = client.logout();
        assert_eq!(redirect.target, DEFAULT_LOGIN_REDIRECT);
        assert!(!client.is_authenticated());
    }

    #[test]
    fn login_redirect_is_configurable() {
        let session = Arc::new(SessionStore::new());
        let client = client(session).with_login_redirect("/welcome");
        assert_eq!(client.logout().target, "/welcome");
    }

    #[tokio::test]
    async fn cancelled_token_aborts_the_request() {
        let session = Arc::new(SessionStore::new());
        let client = client(session);
        client.cancellation_token().cancel();
        let err = client
            .request::<()>("/products", HttpMethod::Get, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
    }

    #[tokio::test]
    async fn transport_failure_surfaces_as_transport_error() {
        let session = Arc::new(SessionStore::new());
        let err = client(session)
            .request::<()>("/products", HttpMethod::Get, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(TransportError::Connect(_))));
    }
}
