//! Job board HTTP client
//!
//! A session-aware client for the job board REST backend. It keeps the
//! access/refresh token pair, renews the access token before it expires or
//! after the backend rejects it, and exposes typed calls for the job,
//! employer, application and public search endpoints.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod error;
pub mod filters;
pub mod types;

pub use client::dashboard::EmployerDashboard;
pub use client::error::ClientError;
pub use client::store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use client::{RequestOptions, SessionClient, SessionClientBuilder};
pub use error::ProblemDetails;
pub use filters::JobFilters;
pub use types::TokenPair;
