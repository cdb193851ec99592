//! Turns an application handle into an actix-web `App`.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::Condition;
use actix_web::{App, web};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::doc::ApiDoc;
use crate::inbound::http::error::{json_config, not_found, path_config, query_config};
use crate::inbound::http::health::{live, ready};
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;

use super::Application;

/// Assemble the HTTP surface of `app`.
///
/// Mounts the probes and every registered module under its prefix, plus
/// Swagger UI when the profile enables debug behaviour, then layers the error translator, the cross-origin policy, and request
/// tracing. Subsystems missing from the handle are simply left out: no
/// translator means framework defaults, no token service means guarded
/// routes answer `service_unavailable`.
///
/// # Examples
/// ```rust
/// use actix_web::{http::StatusCode, test};
/// use healix::app::{AppContext, build_app, create_app};
/// use mockable::MockEnv;
///
/// # actix_web::rt::System::new().block_on(async {
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
/// let ctx = AppContext::from_env(&env).expect("defaults are valid");
/// let app = create_app(&ctx, "testing").await.expect("testing boots");
///
/// let service = test::init_service(build_app(&app)).await;
/// let res = test::call_service(&service, test::TestRequest::get().uri("/health/live").to_request()).await;
/// assert_eq!(res.status(), StatusCode::OK);
/// # });
/// ```
pub fn build_app(
    app: &Application,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let mut service = App::new()
        .app_data(app.health().clone())
        .app_data(json_config())
        .app_data(path_config())
        .app_data(query_config());
    if let Some(tokens) = app.token_service() {
        service = service.app_data(web::Data::new(HttpState::new(Arc::clone(tokens))));
    }
    service = service.service(ready).service(live);

    for module in app.routes().modules() {
        let module = Arc::clone(module);
        service = service.service(
            web::scope(module.prefix()).configure(move |cfg| module.configure(cfg)),
        );
    }

    if app.settings().debug() {
        service = service
            .service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    let translator = app.error_translator().cloned();
    let cors = app.cors();
    service
        .default_service(web::to(not_found))
        .wrap(Condition::new(
            translator.is_some(),
            translator.unwrap_or_default().middleware(),
        ))
        .wrap(Condition::new(
            cors.is_some(),
            cors.unwrap_or_default().middleware(),
        ))
        .wrap(Trace)
}
