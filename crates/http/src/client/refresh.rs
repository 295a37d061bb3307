//! Single-flight coordination of token refreshes
//!
//! At most one refresh runs at a time. Callers that need a refresh while one
//! is pending await the same shared future and all observe its outcome.

use super::error::ClientError;
use crate::types::TokenPair;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub(crate) type RefreshOutcome = Result<TokenPair, ClientError>;

type InFlight = Shared<BoxFuture<'static, RefreshOutcome>>;

#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    in_flight: Mutex<Option<InFlight>>,
}

impl RefreshCoordinator {
    fn slot(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_refreshing(&self) -> bool {
        self.slot().is_some()
    }

    /// Join the pending refresh, or start one with `start` if none is pending
    pub async fn run<F>(&self, start: F) -> RefreshOutcome
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let refresh = {
            let mut slot = self.slot();
            if let Some(pending) = slot.as_ref() {
                debug!("Joining in-flight token refresh");
                pending.clone()
            } else {
                let refresh = start().shared();
                *slot = Some(refresh.clone());
                refresh
            }
        };

        let outcome = refresh.clone().await;

        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|pending| pending.ptr_eq(&refresh)) {
            *slot = None;
        }

        outcome
    }
}
