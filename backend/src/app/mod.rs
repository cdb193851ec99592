//! Application handle and its bootstrap sequence.
//!
//! [`create_app`] resolves a settings profile, binds the shared subsystems
//! onto a fresh [`Application`], mounts the feature modules, materialises
//! their tables, and installs the error translator. [`build_app`] turns the
//! finished handle into an actix-web `App`; HTTP workers each build one from
//! a clone of the same handle.

mod error;
pub mod factory;
pub mod routes;
pub mod schema;
mod service;

use std::fmt;
use std::sync::Arc;

use actix_web::web;
use mockable::Env;
use tracing::{debug, info};

use crate::config::{ConfigRegistry, ConfigurationError, DATABASE_URL_ENV, DatabaseTarget, Settings};
use crate::domain::SchemaReport;
use crate::domain::ports::{SchemaStore, TokenService};
use crate::inbound::http::ErrorTranslator;
use crate::inbound::http::cors::CorsPolicy;
use crate::inbound::http::health::HealthState;
use crate::inbound::http::modules::RouteModule;
use crate::outbound::persistence::{
    DbPool, InMemorySchemaStore, PoolConfig, PostgresSchemaStore,
};
use crate::outbound::tokens::JwtTokenManager;

pub use error::{BootstrapCause, BootstrapError, BootstrapStage, PersistenceError};
pub use factory::{create_app, create_app_with_modules};
pub use routes::{RouteRegistrar, RouteTable};
pub use schema::SchemaMaterializer;
pub use service::build_app;

/// Process-wide context shared by every application the process builds.
///
/// Holds the configuration registry, which is read once from the
/// environment. Creating applications never mutates it.
#[derive(Debug, Clone)]
pub struct AppContext {
    registry: Arc<ConfigRegistry>,
}

impl AppContext {
    /// Wrap an already built registry.
    pub fn new(registry: ConfigRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Build the registry from `env`.
    ///
    /// # Errors
    /// [`ConfigurationError::InvalidEnv`] for malformed numeric variables.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigurationError> {
        ConfigRegistry::from_env(env).map(Self::new)
    }

    /// Configuration registry.
    pub fn registry(&self) -> &ConfigRegistry {
        &self.registry
    }
}

/// Bound persistence backend.
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn SchemaStore>,
    pool: Option<DbPool>,
}

impl Persistence {
    /// Process-local store for the testing profile.
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemorySchemaStore::new()),
            pool: None,
        }
    }

    /// PostgreSQL store over `pool`, echoing DDL when `echo` is set.
    pub fn postgres(pool: DbPool, echo: bool) -> Self {
        Self {
            store: Arc::new(PostgresSchemaStore::new(pool.clone(), echo)),
            pool: Some(pool),
        }
    }

    /// Bind an arbitrary schema store with no connection pool.
    pub fn with_store(store: Arc<dyn SchemaStore>) -> Self {
        Self { store, pool: None }
    }

    /// Schema store used by the materialiser.
    pub fn store(&self) -> &dyn SchemaStore {
        self.store.as_ref()
    }

    /// Connection pool, when backed by PostgreSQL.
    pub fn pool(&self) -> Option<&DbPool> {
        self.pool.as_ref()
    }
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistence")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

/// Application handle assembled by the factory.
///
/// Cloning shares every bound subsystem; each HTTP worker builds its `App`
/// from a clone.
#[derive(Clone)]
pub struct Application {
    settings: Arc<Settings>,
    stage: BootstrapStage,
    persistence: Option<Persistence>,
    tokens: Option<Arc<dyn TokenService>>,
    cors: Option<CorsPolicy>,
    routes: RouteTable,
    schema: Option<SchemaReport>,
    errors: Option<ErrorTranslator>,
    health: web::Data<HealthState>,
}

impl Application {
    /// Allocate a handle for `settings` with nothing bound.
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            stage: BootstrapStage::Created,
            persistence: None,
            tokens: None,
            cors: None,
            routes: RouteTable::new(),
            schema: None,
            errors: None,
            health: web::Data::new(HealthState::new()),
        }
    }

    /// Bind the persistence backend selected by the settings.
    ///
    /// Does nothing when a backend is already bound.
    ///
    /// # Errors
    /// [`ConfigurationError::MissingEnv`] when no database is configured;
    /// [`PersistenceError::Connection`] when the pool cannot be built.
    pub async fn bind_persistence(&mut self) -> Result<(), BootstrapCause> {
        if self.persistence.is_some() {
            debug!(profile = %self.settings.profile(), "persistence already bound");
            return Ok(());
        }
        let persistence = match self.settings.database() {
            DatabaseTarget::Postgres(url) => {
                let pool = DbPool::new(PoolConfig::new(url))
                    .await
                    .map_err(PersistenceError::from)?;
                info!(database = ?url, "database pool ready");
                Persistence::postgres(pool, self.settings.sql_echo())
            }
            DatabaseTarget::InMemory => {
                info!("using in-memory schema store");
                Persistence::in_memory()
            }
            DatabaseTarget::Unset => {
                return Err(ConfigurationError::MissingEnv {
                    name: DATABASE_URL_ENV,
                }
                .into());
            }
        };
        self.persistence = Some(persistence);
        Ok(())
    }

    /// Bind `persistence` unless a backend is already bound.
    pub fn attach_persistence(&mut self, persistence: Persistence) {
        if self.persistence.is_some() {
            debug!("persistence already bound");
            return;
        }
        self.persistence = Some(persistence);
    }

    /// Attach a token manager signing with the profile's secret and
    /// lifetimes, replacing any previous one.
    pub fn bind_token_manager(&mut self) {
        let manager = JwtTokenManager::from_settings(&self.settings);
        self.attach_token_service(Arc::new(manager));
    }

    /// Attach `tokens`, replacing any previous token service.
    pub fn attach_token_service(&mut self, tokens: Arc<dyn TokenService>) {
        if self.tokens.replace(tokens).is_some() {
            debug!("token manager replaced");
        }
    }

    /// Attach the permissive cross-origin policy.
    pub fn bind_cors(&mut self) {
        self.cors = Some(CorsPolicy::permissive());
    }

    /// Mount `modules` in order.
    ///
    /// # Errors
    /// See [`RouteRegistrar::register`].
    pub fn register_routes(
        &mut self,
        modules: impl IntoIterator<Item = Arc<dyn RouteModule>>,
    ) -> Result<(), ConfigurationError> {
        RouteRegistrar::register(&mut self.routes, modules)
    }

    /// Create the tables declared by the registered modules.
    ///
    /// # Errors
    /// [`PersistenceError::NotBound`] before [`Self::bind_persistence`];
    /// otherwise whatever the store reports.
    pub async fn materialize_schema(&mut self) -> Result<&SchemaReport, PersistenceError> {
        let persistence = self.persistence.as_ref().ok_or(PersistenceError::NotBound)?;
        let report = SchemaMaterializer::new(persistence.store())
            .materialize(self.routes.entities())
            .await?;
        Ok(&*self.schema.insert(report))
    }

    /// Install the standard error translator, replacing any previous one.
    pub fn register_error_handlers(&mut self) {
        self.register_error_translator(ErrorTranslator::default());
    }

    /// Install `translator`, replacing any previous one.
    pub fn register_error_translator(&mut self, translator: ErrorTranslator) {
        if self.errors.replace(translator).is_some() {
            debug!("error translator replaced");
        }
    }

    pub(crate) fn advance(&mut self, stage: BootstrapStage) {
        self.stage = stage;
        info!(profile = %self.settings.profile(), %stage, "bootstrap stage reached");
    }

    /// Settings the handle was built from.
    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Last bootstrap stage reached.
    pub fn stage(&self) -> BootstrapStage {
        self.stage
    }

    /// Whether every bootstrap stage has completed.
    pub fn is_ready(&self) -> bool {
        self.stage.is_ready()
    }

    /// Bound persistence backend.
    pub fn persistence(&self) -> Option<&Persistence> {
        self.persistence.as_ref()
    }

    /// Bound token service.
    pub fn token_service(&self) -> Option<&Arc<dyn TokenService>> {
        self.tokens.as_ref()
    }

    /// Cross-origin policy.
    pub fn cors(&self) -> Option<CorsPolicy> {
        self.cors
    }

    /// Mounted modules.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Outcome of the last materialisation.
    pub fn schema_report(&self) -> Option<&SchemaReport> {
        self.schema.as_ref()
    }

    /// Installed error translator.
    pub fn error_translator(&self) -> Option<&ErrorTranslator> {
        self.errors.as_ref()
    }

    /// Shared probe state.
    pub fn health(&self) -> &web::Data<HealthState> {
        &self.health
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("profile", &self.settings.profile())
            .field("stage", &self.stage)
            .field("persistence", &self.persistence)
            .field("tokens_bound", &self.tokens.is_some())
            .field("cors", &self.cors)
            .field("routes", &self.routes)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
