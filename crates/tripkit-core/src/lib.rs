pub mod app_config;
pub mod config;
pub mod geo;
pub mod trips;
pub mod users;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::Coordinates;
pub use trips::{Collaborator, CollaboratorRole, Place, Trip, TripSummary};
pub use users::{AuthUser, UserSummary};

use thiserror::Error;

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
