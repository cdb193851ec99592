//! Fixed mapping from profile names to settings.

use std::collections::BTreeMap;
use std::sync::Arc;

use mockable::Env;
use tracing::debug;

use super::{ConfigurationError, EnvSnapshot, ProfileName, Settings};

/// Registry key that aliases the development profile.
pub const DEFAULT_PROFILE_ALIAS: &str = "default";

/// Read-only registry of settings profiles.
///
/// Built once per process; `default` resolves to the same shared instance as
/// `development`.
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
///
/// use healix::config::{ConfigRegistry, ProfileName};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
/// let registry = ConfigRegistry::from_env(&env).expect("defaults are valid");
///
/// let development = registry.lookup("development").expect("registered");
/// let default = registry.lookup("default").expect("registered");
/// assert!(Arc::ptr_eq(&development, &default));
/// assert_eq!(default.profile(), ProfileName::Development);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    profiles: BTreeMap<ProfileName, Arc<Settings>>,
}

impl ConfigRegistry {
    /// Build every profile from the environment.
    ///
    /// # Errors
    /// Propagates [`ConfigurationError::InvalidEnv`] for malformed numeric
    /// variables.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigurationError> {
        let snapshot = EnvSnapshot::read(env)?;
        Ok(Self::from_snapshot(&snapshot))
    }

    /// Build every profile from an already parsed snapshot.
    pub fn from_snapshot(snapshot: &EnvSnapshot) -> Self {
        let profiles = ProfileName::ALL
            .into_iter()
            .map(|profile| (profile, Arc::new(Settings::for_profile(profile, snapshot))))
            .collect();
        Self { profiles }
    }

    /// Fetch the settings registered under `name`.
    ///
    /// # Errors
    /// [`ConfigurationError::UnknownProfile`] for names other than
    /// `development`, `production`, `testing`, and `default`.
    pub fn lookup(&self, name: &str) -> Result<Arc<Settings>, ConfigurationError> {
        let profile = parse_profile(name)?;
        self.profiles
            .get(&profile)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownProfile {
                name: name.to_owned(),
            })
    }

    /// Look up `name` and apply the profile's validation rules.
    ///
    /// # Errors
    /// Everything [`Self::lookup`] and [`Settings::validate`] return.
    pub fn resolve(&self, name: &str) -> Result<Arc<Settings>, ConfigurationError> {
        let settings = self.lookup(name)?;
        settings.validate()?;
        debug!(profile = %settings.profile(), requested = name, "settings resolved");
        Ok(settings)
    }

    /// Registered names in a stable order, the alias last.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.profiles
            .keys()
            .map(|profile| profile.as_str())
            .chain(std::iter::once(DEFAULT_PROFILE_ALIAS))
    }
}

fn parse_profile(name: &str) -> Result<ProfileName, ConfigurationError> {
    match name {
        "development" | DEFAULT_PROFILE_ALIAS => Ok(ProfileName::Development),
        "production" => Ok(ProfileName::Production),
        "testing" => Ok(ProfileName::Testing),
        _ => Err(ConfigurationError::UnknownProfile {
            name: name.to_owned(),
        }),
    }
}
