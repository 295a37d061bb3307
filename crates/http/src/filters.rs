//! Public job search filters
//!
//! Filters round-trip through a URL query string so the current search can be
//! bookmarked or shared, and are sent to `/public/jobs` as query parameters.

use crate::types::JobType;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Search filters for public job listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilters {
    /// Free-text search over title and description
    pub search: Option<String>,
    pub location: Option<String>,
    /// Category id
    pub category: Option<String>,
    pub job_type: Option<JobType>,
    /// 1-based page number
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl JobFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn job_type(mut self, job_type: JobType) -> Self {
        self.job_type = Some(job_type);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when no filter would be sent
    pub fn is_empty(&self) -> bool {
        self.to_query_pairs().is_empty()
    }

    /// Query parameters for the set filters; blank text filters are skipped
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        let text = [
            ("search", &self.search),
            ("location", &self.location),
            ("category", &self.category),
        ];
        for (key, value) in text {
            if let Some(value) = value.as_deref().map(str::trim) {
                if !value.is_empty() {
                    pairs.push((key.to_string(), value.to_string()));
                }
            }
        }

        if let Some(job_type) = self.job_type {
            pairs.push(("job_type".to_string(), job_type.as_str().to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }

    /// Encode as a URL query string without the leading `?`
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_query_pairs())
            .finish()
    }

    /// Parse filters from a URL query string.
    ///
    /// Unknown keys and unparseable values are ignored so a hand-edited URL
    /// degrades to a broader search instead of failing.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut filters = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "search" => filters.search = Some(value.to_string()),
                "location" => filters.location = Some(value.to_string()),
                "category" => filters.category = Some(value.to_string()),
                "job_type" => filters.job_type = value.parse().ok(),
                "page" => filters.page = value.parse().ok(),
                "limit" => filters.limit = value.parse().ok(),
                other => trace!(key = other, "Ignoring unknown filter parameter"),
            }
        }

        filters
    }
}
