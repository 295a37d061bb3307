//! Job applications

use super::{ClientError, RequestOptions, SessionClient};
use crate::types::{Application, ApplicationCreate, ApplicationStatus, ApplicationStatusUpdate};

impl SessionClient {
    /// Submit an application to a job. No login is needed.
    pub async fn submit_application(
        &self,
        application: &ApplicationCreate,
    ) -> Result<Application, ClientError> {
        self.execute("/applications", RequestOptions::post().json(application)?).await
    }

    /// Applications received for one of the employer's jobs
    pub async fn list_applications(&self, job_id: &str) -> Result<Vec<Application>, ClientError> {
        self.execute(&format!("/applications/job/{job_id}"), RequestOptions::get()).await
    }

    pub async fn get_application(&self, id: &str) -> Result<Application, ClientError> {
        self.execute(&format!("/applications/{id}"), RequestOptions::get()).await
    }

    /// Move an application to a new review state
    pub async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<Application, ClientError> {
        let options = RequestOptions::patch().json(&ApplicationStatusUpdate { status })?;
        let updated: Application = self
            .execute(&format!("/applications/{id}/status"), options)
            .await?;
        info!(application_id = %id, %status, "Updated application status");
        Ok(updated)
    }
}
