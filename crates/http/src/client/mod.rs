//! Job board API client
//!
//! [`SessionClient`] owns the access/refresh token pair and sends every
//! request through the same pipeline:
//!
//! 1. If the access token expires within the refresh horizon, renew it first.
//!    A failed proactive renewal is logged and the request goes out anyway.
//! 2. Send the request with `Authorization: Bearer <access_token>`.
//! 3. On `401`, renew the token (joining a renewal already in flight) and
//!    resend the request once. If renewal fails the session is cleared and the
//!    call fails with [`ClientError::SessionExpired`].

pub mod applications;
pub mod auth;
pub mod dashboard;
pub mod employers;
pub mod error;
pub mod jobs;
pub mod public;
pub mod session;
pub mod store;
pub mod token;

mod refresh;

use crate::types::{RefreshRequest, TokenPair};
use error::{ClientError, parse_error_body};
use futures::FutureExt;
use jobboard_core::config::ApiConfig;
use jobboard_core::{Clock, SystemClock};
use refresh::RefreshCoordinator;
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use session::Session;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use store::{MemoryTokenStore, TokenStore};

/// Default refresh horizon: renew tokens that expire within five minutes
pub const DEFAULT_REFRESH_HORIZON: Duration = Duration::from_secs(300);

/// Callback invoked when a failed renewal ends the session
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// Method, body and query of a request, kept so it can be resent after a
/// token renewal
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    body: Option<serde_json::Value>,
    query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Attach a JSON body
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Serialization`] if the body cannot be encoded
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Append query parameters
    pub fn query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }
}

/// Session-aware API client
///
/// Cloning is cheap; clones share the session, the token store and the
/// in-flight refresh.
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    base_url: String,
    session: Session,
    refresh: RefreshCoordinator,
    clock: Arc<dyn Clock>,
    refresh_horizon: Duration,
    on_session_expired: Option<SessionExpiredHook>,
}

impl fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.inner.base_url)
            .field("authenticated", &self.inner.session.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionClient {
    /// Create a client with an in-memory token store
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> SessionClientBuilder {
        SessionClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Send an authenticated request and return the successful response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Network`] if the backend is unreachable,
    /// [`ClientError::SessionExpired`] if a `401` could not be recovered by
    /// renewing the token, and the normalized error body for any other
    /// non-success status.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        self.refresh_if_expiring().await;

        let sent_token = self.inner.session.access_token();
        let mut response = self
            .inner
            .dispatch(path, &options, sent_token.as_deref())
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(token) = self.recover_unauthorized(sent_token.as_deref()).await? {
                debug!(%path, "Retrying request with renewed access token");
                response = self.inner.dispatch(path, &options, Some(&token)).await?;
            }
        }

        self.inner.ensure_success(response).await
    }

    /// Send a request and decode the JSON response body
    ///
    /// # Errors
    ///
    /// See [`SessionClient::request`]; additionally returns
    /// [`ClientError::Serialization`] if the body does not decode into `T`
    pub async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let response = self.request(path, options).await?;
        self.inner.decode(response).await
    }

    /// Send a request whose response body is irrelevant
    ///
    /// # Errors
    ///
    /// See [`SessionClient::request`]
    pub async fn execute_empty(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<(), ClientError> {
        self.request(path, options).await.map(drop)
    }

    /// Renew the access token, joining a renewal already in flight.
    ///
    /// On success the new pair replaces the session and is persisted. This
    /// does not clear the session on failure; the request pipeline does that.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionExpired`] if there is no refresh token,
    /// the backend rejects it, or the session was logged out or replaced while
    /// the exchange was in flight. Returns the transport error if the backend
    /// is unreachable
    pub async fn refresh(&self) -> Result<TokenPair, ClientError> {
        let inner = Arc::clone(&self.inner);
        self.inner
            .refresh
            .run(move || async move { inner.exchange_refresh_token().await }.boxed())
            .await
    }

    /// Whether a token renewal is currently in flight
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    async fn refresh_if_expiring(&self) {
        let state = self.inner.session.snapshot();
        if state.access_token.is_none() || state.refresh_token.is_none() {
            return;
        }

        let now = self.inner.clock.now_millis();
        if !token::is_expiring_soon(state.token_expiry_ms, now, self.inner.refresh_horizon) {
            return;
        }

        debug!("Access token expires soon, renewing before request");
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "Proactive token refresh failed, continuing with current token");
        }
    }

    /// Decide how to answer a `401`.
    ///
    /// `Ok(Some(token))` means resend with `token`, `Ok(None)` means the 401
    /// is final.
    async fn recover_unauthorized(
        &self,
        sent_token: Option<&str>,
    ) -> Result<Option<String>, ClientError> {
        let state = self.inner.session.snapshot();
        if state.refresh_token.is_none() {
            return Ok(None);
        }

        // Another request renewed the token while this one was in flight
        if let Some(current) = state.access_token {
            if Some(current.as_str()) != sent_token {
                return Ok(Some(current));
            }
        }

        match self.refresh().await {
            Ok(pair) => Ok(Some(pair.access_token)),
            Err(err) => {
                self.expire_session(&err);
                Err(ClientError::SessionExpired)
            }
        }
    }

    fn expire_session(&self, cause: &ClientError) {
        if self.inner.session.clear() {
            warn!(error = %cause, "Token refresh failed, session cleared");
            if let Some(hook) = &self.inner.on_session_expired {
                hook();
            }
        }
    }
}

impl ClientInner {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn network_error(&self, err: &reqwest::Error) -> ClientError {
        ClientError::Network {
            base_url: self.base_url.clone(),
            message: err.to_string(),
        }
    }

    async fn dispatch(
        &self,
        path: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let mut request = self.http.request(options.method.clone(), self.url(path));

        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        debug!(method = %options.method, %path, authenticated = token.is_some(), "Sending request");
        request.send().await.map_err(|err| self.network_error(&err))
    }

    async fn ensure_success(&self, response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = parse_error_body(status, &body);
        debug!(status = status.as_u16(), error = %error, "Request failed");
        Err(error)
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ClientError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.network_error(&err))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// POST without credentials and without the refresh pipeline
    async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::post().json(body)?;
        let response = self.dispatch(path, &options, None).await?;
        let response = self.ensure_success(response).await?;
        self.decode(response).await
    }

    async fn exchange_refresh_token(&self) -> Result<TokenPair, ClientError> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or(ClientError::SessionExpired)?;

        let request = RefreshRequest {
            refresh_token: refresh_token.clone(),
        };
        let pair: TokenPair = match self.post_public("/auth/refresh", &request).await {
            Ok(pair) => pair,
            Err(err @ ClientError::Network { .. }) => return Err(err),
            Err(err) => {
                debug!(error = %err, "Refresh token rejected");
                return Err(ClientError::SessionExpired);
            }
        };

        // Logout or a new login while the exchange was in flight wins
        if !self.session.replace_if_refresh_token(&refresh_token, &pair) {
            debug!("Session changed during token refresh, discarding new tokens");
            return Err(ClientError::SessionExpired);
        }
        info!("Access token refreshed");
        Ok(pair)
    }
}

/// Builder for [`SessionClient`]
#[derive(Default)]
pub struct SessionClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    store: Option<Arc<dyn TokenStore>>,
    clock: Option<Arc<dyn Clock>>,
    refresh_horizon: Option<Duration>,
    on_session_expired: Option<SessionExpiredHook>,
}

impl SessionClientBuilder {
    /// Apply base URL, timeout, user agent and refresh horizon from config
    pub fn config(mut self, config: &ApiConfig) -> Self {
        self.base_url = Some(config.base_url.clone());
        self.timeout = config.timeout();
        self.user_agent = Some(config.user_agent.clone());
        self.refresh_horizon = Some(config.refresh_horizon());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Persist tokens to `store`; the session is restored from it on build
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Renew access tokens expiring within `horizon`
    pub fn refresh_horizon(mut self, horizon: Duration) -> Self {
        self.refresh_horizon = Some(horizon);
        self
    }

    /// Called once when a failed renewal clears the session
    pub fn on_session_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(hook));
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the base URL is missing or
    /// invalid, or the HTTP client cannot be created
    pub fn build(self) -> Result<SessionClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url {base_url}: {e}")))?;

        let mut client_builder = ClientBuilder::new();
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| format!("jobboard-client/{}", env!("CARGO_PKG_VERSION"))),
        );
        let http = client_builder
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));

        Ok(SessionClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                session: Session::restore(store),
                refresh: RefreshCoordinator::default(),
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                refresh_horizon: self.refresh_horizon.unwrap_or(DEFAULT_REFRESH_HORIZON),
                on_session_expired: self.on_session_expired,
            }),
        })
    }
}
