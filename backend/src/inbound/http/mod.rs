//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod state;
pub mod users;

pub use error::{ErrorBody, extractor_config};
pub use health::{ComponentInfo, HealthState, ReadinessReport, ReadinessStatus};
pub use state::HttpState;
