//! Environment parsing for settings profiles.
//!
//! Reads go through [`mockable::Env`] so tests supply an isolated environment
//! instead of mutating the process one.

use std::time::Duration;

use mockable::Env;

use super::ConfigurationError;

/// Token signing secret.
pub const JWT_SECRET_KEY_ENV: &str = "JWT_SECRET_KEY";
/// Access-token lifetime in minutes.
pub const ACCESS_TOKEN_EXPIRES_ENV: &str = "JWT_ACCESS_TOKEN_EXPIRES";
/// Refresh-token lifetime in days.
pub const REFRESH_TOKEN_EXPIRES_ENV: &str = "JWT_REFRESH_TOKEN_EXPIRES";
/// Password-hashing cost factor.
pub const BCRYPT_LOG_ROUNDS_ENV: &str = "BCRYPT_LOG_ROUNDS";
/// Symmetric key for field encryption.
pub const ENCRYPTION_KEY_ENV: &str = "ENCRYPTION_KEY";
/// Relational database connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

const DEFAULT_ACCESS_MINUTES: u64 = 15;
const DEFAULT_REFRESH_DAYS: u64 = 7;
const DEFAULT_BCRYPT_LOG_ROUNDS: u32 = 10;
const BCRYPT_ROUNDS_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_DAY: u64 = 86_400;

const POSITIVE_MINUTES_EXPECTED: &str = "a positive whole number of minutes";
const POSITIVE_DAYS_EXPECTED: &str = "a positive whole number of days";
const ROUNDS_EXPECTED: &str = "an integer between 4 and 31";

/// Parsed environment values shared by every profile.
///
/// Blank values count as unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSnapshot {
    pub(super) jwt_secret_key: Option<String>,
    pub(super) encryption_key: Option<String>,
    pub(super) database_url: Option<String>,
    pub(super) access_token_ttl: Duration,
    pub(super) refresh_token_ttl: Duration,
    pub(super) bcrypt_log_rounds: u32,
}

impl EnvSnapshot {
    /// Read and validate every settings variable.
    ///
    /// # Errors
    /// [`ConfigurationError::InvalidEnv`] when a numeric variable is not a
    /// positive integer or the cost factor is out of range.
    ///
    /// # Examples
    /// ```rust
    /// use healix::config::EnvSnapshot;
    /// use mockable::MockEnv;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|name| match name {
    ///     "JWT_ACCESS_TOKEN_EXPIRES" => Some("30".to_owned()),
    ///     _ => None,
    /// });
    ///
    /// let snapshot = EnvSnapshot::read(&env).expect("valid environment");
    /// assert_eq!(snapshot.access_token_ttl().as_secs(), 30 * 60);
    /// ```
    pub fn read<E: Env>(env: &E) -> Result<Self, ConfigurationError> {
        let access_minutes = positive_u64(
            env,
            ACCESS_TOKEN_EXPIRES_ENV,
            DEFAULT_ACCESS_MINUTES,
            POSITIVE_MINUTES_EXPECTED,
        )?;
        let refresh_days = positive_u64(
            env,
            REFRESH_TOKEN_EXPIRES_ENV,
            DEFAULT_REFRESH_DAYS,
            POSITIVE_DAYS_EXPECTED,
        )?;

        Ok(Self {
            jwt_secret_key: non_blank(env, JWT_SECRET_KEY_ENV),
            encryption_key: non_blank(env, ENCRYPTION_KEY_ENV),
            database_url: non_blank(env, DATABASE_URL_ENV),
            access_token_ttl: scaled(
                ACCESS_TOKEN_EXPIRES_ENV,
                access_minutes,
                SECONDS_PER_MINUTE,
                POSITIVE_MINUTES_EXPECTED,
            )?,
            refresh_token_ttl: scaled(
                REFRESH_TOKEN_EXPIRES_ENV,
                refresh_days,
                SECONDS_PER_DAY,
                POSITIVE_DAYS_EXPECTED,
            )?,
            bcrypt_log_rounds: bcrypt_rounds(env)?,
        })
    }

    /// Access-token lifetime before any profile override.
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    /// Refresh-token lifetime.
    pub fn refresh_token_ttl(&self) -> Duration {
        self.refresh_token_ttl
    }
}

fn non_blank<E: Env>(env: &E, name: &str) -> Option<String> {
    env.string(name).filter(|value| !value.trim().is_empty())
}

fn positive_u64<E: Env>(
    env: &E,
    name: &'static str,
    default: u64,
    expected: &'static str,
) -> Result<u64, ConfigurationError> {
    let Some(raw) = env.string(name) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigurationError::InvalidEnv {
            name,
            value: raw,
            expected,
        }),
    }
}

fn scaled(
    name: &'static str,
    units: u64,
    seconds_per_unit: u64,
    expected: &'static str,
) -> Result<Duration, ConfigurationError> {
    units
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigurationError::InvalidEnv {
            name,
            value: units.to_string(),
            expected,
        })
}

fn bcrypt_rounds<E: Env>(env: &E) -> Result<u32, ConfigurationError> {
    let Some(raw) = env.string(BCRYPT_LOG_ROUNDS_ENV) else {
        return Ok(DEFAULT_BCRYPT_LOG_ROUNDS);
    };
    match raw.trim().parse::<u32>() {
        Ok(rounds) if BCRYPT_ROUNDS_RANGE.contains(&rounds) => Ok(rounds),
        _ => Err(ConfigurationError::InvalidEnv {
            name: BCRYPT_LOG_ROUNDS_ENV,
            value: raw,
            expected: ROUNDS_EXPECTED,
        }),
    }
}
