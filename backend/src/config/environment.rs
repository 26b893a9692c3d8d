//! Validation of the deployment's named environment values.
//!
//! The marketplace reads its database, payment and security secrets from the
//! process environment. They are checked once at startup so a misconfigured
//! deployment fails fast instead of on the first request that needs them.

use std::fmt;

use mockable::Env;
use tracing::warn;
use url::Url;

const NODE_ENV: &str = "NODE_ENV";
const SUPABASE_URL_ENV: &str = "PUBLIC_SUPABASE_URL";
const SUPABASE_ANON_KEY_ENV: &str = "PUBLIC_SUPABASE_ANON_KEY";
const SERVICE_ROLE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";
const STRIPE_PUBLISHABLE_KEY_ENV: &str = "PUBLIC_STRIPE_PUBLISHABLE_KEY";
const STRIPE_SECRET_KEY_ENV: &str = "STRIPE_SECRET_KEY";
const STRIPE_WEBHOOK_SECRET_ENV: &str = "STRIPE_WEBHOOK_SECRET";
const RATE_LIMIT_SECRET_ENV: &str = "RATE_LIMIT_SECRET";
const CSRF_SECRET_ENV: &str = "CSRF_SECRET";
const SENTRY_DSN_ENV: &str = "SENTRY_DSN";

const NODE_ENV_EXPECTED: &str = "development|test|production";
/// Shortest accepted signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Deployment stage named by `NODE_ENV`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DeploymentEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl DeploymentEnvironment {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "development" => Some(Self::Development),
            "test" => Some(Self::Test),
            "production" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    fn requires_data_backend(self) -> bool {
        !matches!(self, Self::Test)
    }
}

impl fmt::Display for DeploymentEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        })
    }
}

/// Validated environment values.
///
/// Secrets are held as plain strings and never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvironmentSettings {
    pub environment: DeploymentEnvironment,
    pub supabase_url: Option<Url>,
    pub supabase_anon_key: Option<String>,
    pub service_role_key: Option<String>,
    pub stripe_publishable_key: Option<String>,
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub rate_limit_secret: Option<String>,
    pub csrf_secret: Option<String>,
    pub sentry_dsn: Option<Url>,
}

impl fmt::Debug for EnvironmentSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentSettings")
            .field("environment", &self.environment)
            .field("supabase_url", &self.supabase_url.as_ref().map(Url::as_str))
            .field("stripe_secret_key", &self.stripe_secret_key.as_ref().map(|_| "<set>"))
            .finish_non_exhaustive()
    }
}

/// Errors raised while validating environment values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentConfigError {
    /// A required environment variable is missing or blank.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but malformed. The value is not echoed since it
    /// may be a secret.
    #[error("invalid value for {name}; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        expected: &'static str,
    },
    /// Production deployments need this secret.
    #[error("{name} is required in production")]
    MissingProductionSecret { name: &'static str },
}

/// Read `name`, treating blank values as unset.
fn lookup<E: Env>(env: &E, name: &str) -> Option<String> {
    env.string(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn url_value<E: Env>(env: &E, name: &'static str) -> Result<Option<Url>, EnvironmentConfigError> {
    lookup(env, name)
        .map(|value| {
            Url::parse(&value).map_err(|_| EnvironmentConfigError::InvalidEnv {
                name,
                expected: "an absolute URL",
            })
        })
        .transpose()
}

fn prefixed<E: Env>(
    env: &E,
    name: &'static str,
    prefix: &str,
    expected: &'static str,
) -> Result<Option<String>, EnvironmentConfigError> {
    match lookup(env, name) {
        Some(value) if !value.starts_with(prefix) => {
            Err(EnvironmentConfigError::InvalidEnv { name, expected })
        }
        other => Ok(other),
    }
}

fn secret<E: Env>(env: &E, name: &'static str) -> Result<Option<String>, EnvironmentConfigError> {
    match lookup(env, name) {
        Some(value) if value.chars().count() < MIN_SECRET_LEN => {
            Err(EnvironmentConfigError::InvalidEnv {
                name,
                expected: "at least 32 characters",
            })
        }
        other => Ok(other),
    }
}

fn deployment_environment<E: Env>(env: &E) -> Result<DeploymentEnvironment, EnvironmentConfigError> {
    match lookup(env, NODE_ENV) {
        None => Ok(DeploymentEnvironment::default()),
        Some(value) => DeploymentEnvironment::parse(&value).ok_or(
            EnvironmentConfigError::InvalidEnv {
                name: NODE_ENV,
                expected: NODE_ENV_EXPECTED,
            },
        ),
    }
}

fn required<T>(
    value: Option<T>,
    name: &'static str,
    needed: bool,
) -> Result<Option<T>, EnvironmentConfigError> {
    match value {
        None if needed => Err(EnvironmentConfigError::MissingEnv { name }),
        other => Ok(other),
    }
}

/// Validate the marketplace environment.
///
/// The Supabase URL and anon key are required outside `test`; production
/// additionally requires `STRIPE_SECRET_KEY`.
///
/// # Examples
///
/// ```rust
/// use marketplace::config::{DeploymentEnvironment, environment_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "NODE_ENV" => Some("test".to_owned()),
///     _ => None,
/// });
///
/// let settings = environment_settings_from_env(&env).expect("test env is valid");
/// assert_eq!(settings.environment, DeploymentEnvironment::Test);
/// assert!(settings.supabase_url.is_none());
/// ```
///
/// # Errors
///
/// Returns the first [`EnvironmentConfigError`] encountered.
pub fn environment_settings_from_env<E: Env>(
    env: &E,
) -> Result<EnvironmentSettings, EnvironmentConfigError> {
    let environment = deployment_environment(env)?;
    let needs_backend = environment.requires_data_backend();

    let supabase_url = required(url_value(env, SUPABASE_URL_ENV)?, SUPABASE_URL_ENV, needs_backend)?;
    let supabase_anon_key = required(
        lookup(env, SUPABASE_ANON_KEY_ENV),
        SUPABASE_ANON_KEY_ENV,
        needs_backend,
    )?;
    let stripe_secret_key = prefixed(env, STRIPE_SECRET_KEY_ENV, "sk_", "a value starting with sk_")?;
    if environment.is_production() && stripe_secret_key.is_none() {
        return Err(EnvironmentConfigError::MissingProductionSecret {
            name: STRIPE_SECRET_KEY_ENV,
        });
    }

    let settings = EnvironmentSettings {
        environment,
        supabase_url,
        supabase_anon_key,
        service_role_key: lookup(env, SERVICE_ROLE_KEY_ENV),
        stripe_publishable_key: prefixed(
            env,
            STRIPE_PUBLISHABLE_KEY_ENV,
            "pk_",
            "a value starting with pk_",
        )?,
        stripe_secret_key,
        stripe_webhook_secret: prefixed(
            env,
            STRIPE_WEBHOOK_SECRET_ENV,
            "whsec_",
            "a value starting with whsec_",
        )?,
        rate_limit_secret: secret(env, RATE_LIMIT_SECRET_ENV)?,
        csrf_secret: secret(env, CSRF_SECRET_ENV)?,
        sentry_dsn: url_value(env, SENTRY_DSN_ENV)?,
    };

    if settings.csrf_secret.is_none() && environment.is_production() {
        warn!("CSRF_SECRET not set in production");
    }
    Ok(settings)
}
