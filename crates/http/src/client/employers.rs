//! Employer profile

use super::{ClientError, RequestOptions, SessionClient};
use crate::types::{Employer, EmployerUpdate};

impl SessionClient {
    /// Profile of the logged-in employer
    pub async fn current_employer(&self) -> Result<Employer, ClientError> {
        self.execute("/employers/me", RequestOptions::get()).await
    }

    pub async fn update_employer(&self, update: &EmployerUpdate) -> Result<Employer, ClientError> {
        self.execute("/employers/me", RequestOptions::put().json(update)?).await
    }
}
