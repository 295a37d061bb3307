//! Login, registration and session inspection

use super::session::SessionState;
use super::token::is_expiring_soon;
use super::{ClientError, SessionClient};
use crate::types::{AuthResponse, LoginRequest, RegisterRequest};

impl SessionClient {
    /// Log in with email and password and persist the issued tokens.
    ///
    /// # Errors
    ///
    /// Invalid credentials surface as the backend's error, typically
    /// [`ClientError::Http`] with status 401
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self.inner.post_public("/auth/login", &request).await?;

        self.inner.session.set_tokens(&response.token_pair());
        info!(employer_id = %response.employer_id, "Logged in");
        Ok(response)
    }

    /// Register a new employer account and persist the issued tokens
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for rejected fields and
    /// [`ClientError::Http`] for other backend refusals
    pub async fn register(&self, profile: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let response: AuthResponse = self.inner.post_public("/auth/register", profile).await?;

        self.inner.session.set_tokens(&response.token_pair());
        info!(employer_id = %response.employer_id, "Registered employer account");
        Ok(response)
    }

    /// Forget the session locally. The backend is not contacted.
    pub fn logout(&self) {
        if self.inner.session.clear() {
            info!("Logged out");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.session.is_authenticated()
    }

    /// Whether the held access token expires within the refresh horizon
    pub fn is_token_expiring_soon(&self) -> bool {
        let expiry = self.inner.session.snapshot().token_expiry_ms;
        is_expiring_soon(
            expiry,
            self.inner.clock.now_millis(),
            self.inner.refresh_horizon,
        )
    }

    pub fn session_state(&self) -> SessionState {
        self.inner.session.snapshot()
    }
}
