//! Builds application handles for a named settings profile.

use std::sync::Arc;

use tracing::error;

use crate::inbound::http::modules::{RouteModule, default_modules};

use super::{AppContext, Application, BootstrapError, BootstrapStage};

/// Build a ready application for `profile` with the standard modules.
///
/// # Errors
/// See [`create_app_with_modules`].
///
/// # Examples
/// ```rust
/// use healix::app::{AppContext, BootstrapStage, create_app};
/// use mockable::MockEnv;
///
/// # actix_web::rt::System::new().block_on(async {
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
/// let ctx = AppContext::from_env(&env).expect("defaults are valid");
///
/// let app = create_app(&ctx, "testing").await.expect("testing boots");
/// assert_eq!(app.stage(), BootstrapStage::ErrorHandlersInstalled);
/// assert_eq!(app.routes().len(), 5);
/// # });
/// ```
pub async fn create_app(ctx: &AppContext, profile: &str) -> Result<Application, BootstrapError> {
    create_app_with_modules(ctx, profile, default_modules()).await
}

/// Build a ready application for `profile`, mounting `modules` in order.
///
/// Each call produces an independent handle. Stages run strictly in
/// sequence: settings, subsystems, routes, schema, error handlers.
///
/// # Errors
/// [`BootstrapError`] naming the stage that could not be reached:
/// - `configured_settings` for unknown profiles or invalid settings;
/// - `subsystems_bound` when persistence cannot be bound;
/// - `routes_registered` for duplicate or malformed prefixes;
/// - `schema_ready` when table creation fails.
pub async fn create_app_with_modules(
    ctx: &AppContext,
    profile: &str,
    modules: impl IntoIterator<Item = Arc<dyn RouteModule>>,
) -> Result<Application, BootstrapError> {
    let result = bootstrap(ctx, profile, modules).await;
    if let Err(err) = &result {
        error!(profile, stage = %err.stage(), error = %err.cause(), "bootstrap failed");
    }
    result
}

async fn bootstrap(
    ctx: &AppContext,
    profile: &str,
    modules: impl IntoIterator<Item = Arc<dyn RouteModule>>,
) -> Result<Application, BootstrapError> {
    let settings = ctx
        .registry()
        .resolve(profile)
        .map_err(|err| BootstrapError::new(BootstrapStage::ConfiguredSettings, err))?;
    let mut app = Application::new(settings);
    app.advance(BootstrapStage::ConfiguredSettings);

    app.bind_persistence()
        .await
        .map_err(|err| BootstrapError::new(BootstrapStage::SubsystemsBound, err))?;
    app.bind_token_manager();
    app.bind_cors();
    app.advance(BootstrapStage::SubsystemsBound);

    app.register_routes(modules)
        .map_err(|err| BootstrapError::new(BootstrapStage::RoutesRegistered, err))?;
    app.advance(BootstrapStage::RoutesRegistered);

    app.materialize_schema()
        .await
        .map_err(|err| BootstrapError::new(BootstrapStage::SchemaReady, err))?;
    app.advance(BootstrapStage::SchemaReady);

    app.register_error_handlers();
    app.advance(BootstrapStage::ErrorHandlersInstalled);

    Ok(app)
}

#[cfg(test)]
mod tests {
    use mockable::MockEnv;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::app::routes::tests::{NOTES, stub};
    use crate::app::{BootstrapCause, PersistenceError};
    use crate::config::{ConfigurationError, DATABASE_URL_ENV};
    use crate::domain::EntitySchema;

    #[fixture]
    fn ctx() -> AppContext {
        let mut env = MockEnv::new();
        env.expect_string().returning(|_| None);
        AppContext::from_env(&env).expect("defaults are valid")
    }

    #[rstest]
    #[tokio::test]
    async fn testing_profile_reaches_every_stage(ctx: AppContext) {
        let app = create_app(&ctx, "testing").await.expect("testing boots");

        assert!(app.is_ready());
        assert!(app.persistence().is_some_and(|p| p.pool().is_none()));
        assert!(app.token_service().is_some());
        assert!(app.cors().is_some());
        assert!(app.error_translator().is_some());
        let report = app.schema_report().expect("materialised");
        assert_eq!(report.created.len(), 5);
        assert!(report.existing.is_empty());
    }

    #[rstest]
    #[case("staging")]
    #[case("")]
    #[tokio::test]
    async fn unknown_profiles_fail_before_anything_binds(ctx: AppContext, #[case] name: &str) {
        let err = create_app(&ctx, name).await.expect_err("unknown profile");
        assert_eq!(err.stage(), BootstrapStage::ConfiguredSettings);
        assert_eq!(
            err.configuration(),
            Some(&ConfigurationError::UnknownProfile {
                name: name.to_owned()
            })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn production_without_database_url_fails_configuration(ctx: AppContext) {
        let err = create_app(&ctx, "production")
            .await
            .expect_err("no database");
        assert_eq!(err.stage(), BootstrapStage::ConfiguredSettings);
        assert_eq!(
            err.cause(),
            &BootstrapCause::Configuration(ConfigurationError::MissingEnv {
                name: DATABASE_URL_ENV
            })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_prefixes_fail_route_registration(ctx: AppContext) {
        let err = create_app_with_modules(
            &ctx,
            "testing",
            vec![stub("/api/notes", &[]), stub("/api/notes", &[])],
        )
        .await
        .expect_err("duplicate prefix");
        assert_eq!(err.stage(), BootstrapStage::RoutesRegistered);
        assert_eq!(
            err.configuration(),
            Some(&ConfigurationError::DuplicateRoutePrefix {
                prefix: "/api/notes".to_owned()
            })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_ddl_fails_schema_stage(ctx: AppContext) {
        const BLANK: &[EntitySchema] = &[EntitySchema::new("", &[])];
        let err = create_app_with_modules(&ctx, "testing", vec![stub("/api/blank", BLANK)])
            .await
            .expect_err("blank table name");
        assert_eq!(err.stage(), BootstrapStage::SchemaReady);
        assert!(matches!(
            err.persistence(),
            Some(PersistenceError::Query { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn each_call_returns_an_independent_handle(ctx: AppContext) {
        const ENTITIES: &[EntitySchema] = &[NOTES];
        let first = create_app_with_modules(&ctx, "testing", vec![stub("/api/notes", ENTITIES)])
            .await
            .expect("first boots");
        let second = create_app_with_modules(&ctx, "testing", vec![stub("/api/notes", ENTITIES)])
            .await
            .expect("second boots");

        assert_eq!(
            first.schema_report().map(|r| r.created.clone()),
            Some(vec!["notes".to_owned()])
        );
        assert_eq!(
            second.schema_report().map(|r| r.created.clone()),
            Some(vec!["notes".to_owned()])
        );
        first.health().mark_ready();
        assert!(!second.health().is_ready());
    }
}
