//! Job postings owned by the logged-in employer

use super::{ClientError, RequestOptions, SessionClient};
use crate::types::{Job, JobCreate, JobUpdate};

impl SessionClient {
    /// List the employer's job postings
    pub async fn list_jobs(&self) -> Result<Vec<Job>, ClientError> {
        self.execute("/jobs", RequestOptions::get()).await
    }

    pub async fn get_job(&self, id: &str) -> Result<Job, ClientError> {
        self.execute(&format!("/jobs/{id}"), RequestOptions::get()).await
    }

    /// Create a job posting
    pub async fn create_job(&self, job: &JobCreate) -> Result<Job, ClientError> {
        let created: Job = self.execute("/jobs", RequestOptions::post().json(job)?).await?;
        info!(job_id = %created.id, "Created job posting");
        Ok(created)
    }

    /// Update a job posting; unset fields are left unchanged
    pub async fn update_job(&self, id: &str, update: &JobUpdate) -> Result<Job, ClientError> {
        self.execute(&format!("/jobs/{id}"), RequestOptions::put().json(update)?).await
    }

    pub async fn delete_job(&self, id: &str) -> Result<(), ClientError> {
        self.execute_empty(&format!("/jobs/{id}"), RequestOptions::delete()).await?;
        info!(job_id = %id, "Deleted job posting");
        Ok(())
    }
}
