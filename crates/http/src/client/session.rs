//! In-memory session state mirrored to a [`TokenStore`]

use super::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenStore};
use super::token::decode_expiry_millis;
use crate::types::TokenPair;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Tokens currently held by the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Derived from `access_token` whenever it is set
    pub token_expiry_ms: Option<i64>,
}

impl SessionState {
    fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        let token_expiry_ms = access_token.as_deref().and_then(decode_expiry_millis);
        Self {
            access_token,
            refresh_token,
            token_expiry_ms,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Session tokens plus the store they are persisted to.
///
/// Every mutation completes under one short lock and is never held across an
/// await point.
pub(crate) struct Session {
    state: Mutex<SessionState>,
    store: Arc<dyn TokenStore>,
}

impl Session {
    /// Load whatever tokens the store holds
    pub fn restore(store: Arc<dyn TokenStore>) -> Self {
        let state = SessionState::new(store.get(ACCESS_TOKEN_KEY), store.get(REFRESH_TOKEN_KEY));
        if state.is_authenticated() {
            debug!("Restored session from token store");
        }

        Self {
            state: Mutex::new(state),
            store,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.lock().refresh_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    /// Replace the whole token pair and persist it
    pub fn set_tokens(&self, pair: &TokenPair) {
        *self.lock() = Self::state_for(pair);
        self.persist(pair);
    }

    /// Install `pair` only while the held refresh token is still `expected`.
    ///
    /// Returns `false`, leaving memory and store untouched, when the session
    /// was cleared or replaced in the meantime.
    pub fn replace_if_refresh_token(&self, expected: &str, pair: &TokenPair) -> bool {
        {
            let mut state = self.lock();
            if state.refresh_token.as_deref() != Some(expected) {
                return false;
            }
            *state = Self::state_for(pair);
        }
        self.persist(pair);
        true
    }

    fn state_for(pair: &TokenPair) -> SessionState {
        SessionState::new(
            Some(pair.access_token.clone()),
            Some(pair.refresh_token.clone()),
        )
    }

    fn persist(&self, pair: &TokenPair) {
        for (key, value) in [
            (ACCESS_TOKEN_KEY, &pair.access_token),
            (REFRESH_TOKEN_KEY, &pair.refresh_token),
        ] {
            if let Err(err) = self.store.set(key, value) {
                warn!(key, error = %err, "Failed to persist session token");
            }
        }
    }

    /// Forget both tokens in memory and in the store.
    ///
    /// Returns whether the session held any token before.
    pub fn clear(&self) -> bool {
        let previous = std::mem::take(&mut *self.lock());

        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(err) = self.store.remove(key) {
                warn!(key, error = %err, "Failed to remove session token");
            }
        }

        previous.access_token.is_some() || previous.refresh_token.is_some()
    }
}
