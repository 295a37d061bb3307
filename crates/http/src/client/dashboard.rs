//! Cached view of the logged-in employer's data
//!
//! Reads go through per-resource [`TtlCache`]s; writes go to the backend and
//! invalidate whatever they made stale.

use super::{ClientError, SessionClient};
use crate::types::{
    Application, ApplicationStatus, Employer, EmployerUpdate, Job, JobCreate, JobUpdate,
};
use jobboard_core::config::CacheConfig;
use jobboard_core::{Clock, TtlCache};
use std::sync::Arc;

const CURRENT_EMPLOYER: &str = "me";

pub struct EmployerDashboard {
    client: SessionClient,
    employer: TtlCache<&'static str, Employer>,
    /// Keyed by employer id
    jobs: TtlCache<String, Vec<Job>>,
    /// Keyed by job id
    applications: TtlCache<String, Vec<Application>>,
}

impl EmployerDashboard {
    pub fn new(client: SessionClient, config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            employer: TtlCache::from_config(config, Arc::clone(&clock)),
            jobs: TtlCache::from_config(config, Arc::clone(&clock)),
            applications: TtlCache::from_config(config, clock),
        }
    }

    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    pub async fn employer(&self) -> Result<Employer, ClientError> {
        if let Some(employer) = self.employer.get(&CURRENT_EMPLOYER).await {
            trace!("Employer profile served from cache");
            return Ok(employer);
        }

        let employer = self.client.current_employer().await?;
        self.employer.set(CURRENT_EMPLOYER, employer.clone()).await;
        Ok(employer)
    }

    /// Job postings of the logged-in employer
    pub async fn jobs(&self) -> Result<Vec<Job>, ClientError> {
        let employer_id = self.employer().await?.id;
        if let Some(jobs) = self.jobs.get(&employer_id).await {
            trace!(%employer_id, "Job list served from cache");
            return Ok(jobs);
        }

        let jobs = self.client.list_jobs().await?;
        self.jobs.set(employer_id, jobs.clone()).await;
        Ok(jobs)
    }

    pub async fn applications(&self, job_id: &str) -> Result<Vec<Application>, ClientError> {
        let key = job_id.to_string();
        if let Some(applications) = self.applications.get(&key).await {
            trace!(%job_id, "Applications served from cache");
            return Ok(applications);
        }

        let applications = self.client.list_applications(job_id).await?;
        self.applications.set(key, applications.clone()).await;
        Ok(applications)
    }

    pub async fn create_job(&self, job: &JobCreate) -> Result<Job, ClientError> {
        let created = self.client.create_job(job).await?;
        self.jobs.invalidate(&created.employer_id).await;
        Ok(created)
    }

    pub async fn update_job(&self, id: &str, update: &JobUpdate) -> Result<Job, ClientError> {
        let updated = self.client.update_job(id, update).await?;
        self.jobs.invalidate(&updated.employer_id).await;
        Ok(updated)
    }

    /// Delete a job posting along with its cached applications
    pub async fn delete_job(&self, id: &str) -> Result<(), ClientError> {
        self.client.delete_job(id).await?;
        // The owning employer is not known from the id alone
        self.jobs.clear().await;
        self.applications.invalidate(&id.to_string()).await;
        Ok(())
    }

    pub async fn update_application_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<Application, ClientError> {
        let updated = self.client.update_application_status(id, status).await?;
        self.applications.invalidate(&updated.job_id).await;
        Ok(updated)
    }

    pub async fn update_profile(&self, update: &EmployerUpdate) -> Result<Employer, ClientError> {
        let employer = self.client.update_employer(update).await?;
        self.employer.set(CURRENT_EMPLOYER, employer.clone()).await;
        Ok(employer)
    }

    /// Drop every cached entry
    pub async fn clear(&self) {
        self.employer.clear().await;
        self.jobs.clear().await;
        self.applications.clear().await;
        debug!("Dashboard cache cleared");
    }
}
