//! Startup configuration.
//!
//! - settings: layered `DATA_API_*` settings for the data backend.
//! - environment: validation of the deployment's named environment values.

pub mod environment;
pub mod settings;

pub use environment::{
    DeploymentEnvironment, EnvironmentConfigError, EnvironmentSettings,
    environment_settings_from_env,
};
pub use settings::{DataApiSettings, SettingsError};
