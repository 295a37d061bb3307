//! Public job search, readable without a session

use super::{ClientError, RequestOptions, SessionClient};
use crate::filters::JobFilters;
use crate::types::{Category, Job};

impl SessionClient {
    /// Search active job postings
    pub async fn search_jobs(&self, filters: &JobFilters) -> Result<Vec<Job>, ClientError> {
        let options = RequestOptions::get().query(filters.to_query_pairs());
        self.execute("/public/jobs", options).await
    }

    pub async fn get_public_job(&self, id: &str) -> Result<Job, ClientError> {
        self.execute(&format!("/public/jobs/{id}"), RequestOptions::get()).await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.execute("/categories", RequestOptions::get()).await
    }

    /// Distinct locations of active postings
    pub async fn list_locations(&self) -> Result<Vec<String>, ClientError> {
        self.execute("/public/locations", RequestOptions::get()).await
    }
}
