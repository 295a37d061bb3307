//! Job board core types and utilities

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;

pub use cache::TtlCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ApiConfig, CacheConfig, JobBoardConfig, LogConfig};
pub use error::{CoreError, CoreResult};
