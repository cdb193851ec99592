//! Every per-request failure leaves the served application as the same JSON
//! envelope, tagged with the request's trace identifier.

mod healix_support;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::test;
use healix::app::build_app;
use healix::domain::{ErrorCode, Role, TRACE_ID_HEADER, TokenKind};
use healix::inbound::http::ErrorEnvelope;
use healix_support::{bearer_get, testing_app, token_for};
use rstest::rstest;

async fn envelope_of<B: MessageBody>(res: ServiceResponse<B>) -> (StatusCode, String, ErrorEnvelope) {
    let status = res.status();
    let trace_id = res
        .headers()
        .get(TRACE_ID_HEADER)
        .expect("trace id header")
        .to_str()
        .expect("ascii header")
        .to_owned();
    assert_eq!(
        res.headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("application/json")
    );
    let body: ErrorEnvelope = test::read_body_json(res).await;
    (status, trace_id, body)
}

fn assert_consistent(status: StatusCode, trace_id: &str, body: &ErrorEnvelope, code: ErrorCode) {
    assert_eq!(body.error_code, code);
    assert_eq!(body.status, status.as_u16());
    assert_eq!(body.trace_id.as_deref(), Some(trace_id));
    assert!(!body.message.is_empty());
}

#[rstest]
#[actix_web::test]
async fn unknown_paths_become_not_found_envelopes() {
    let app = testing_app().await;
    let service = test::init_service(build_app(&app)).await;

    let res = test::call_service(
        &service,
        test::TestRequest::get().uri("/api/unknown").to_request(),
    )
    .await;
    let (status, trace_id, body) = envelope_of(res).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_consistent(status, &trace_id, &body, ErrorCode::NotFound);
    assert!(body.message.contains("/api/unknown"));
}

#[rstest]
#[actix_web::test]
async fn wrong_methods_become_method_not_allowed_envelopes() {
    let app = testing_app().await;
    let service = test::init_service(build_app(&app)).await;

    let res = test::call_service(
        &service,
        test::TestRequest::get().uri("/api/auth/refresh").to_request(),
    )
    .await;
    let (status, trace_id, body) = envelope_of(res).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_consistent(status, &trace_id, &body, ErrorCode::MethodNotAllowed);
}

#[rstest]
#[case(None)]
#[case(Some("Basic cGF0aWVudDpzZWNyZXQ="))]
#[case(Some("Bearer not-a-token"))]
#[actix_web::test]
async fn bad_credentials_become_unauthorized_envelopes(#[case] authorization: Option<&str>) {
    let app = testing_app().await;
    let service = test::init_service(build_app(&app)).await;

    let mut req = test::TestRequest::get().uri("/api/biomarkers");
    if let Some(value) = authorization {
        req = req.insert_header((AUTHORIZATION, value));
    }
    let res = test::call_service(&service, req.to_request()).await;
    let (status, trace_id, body) = envelope_of(res).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_consistent(status, &trace_id, &body, ErrorCode::Unauthorized);
}

#[rstest]
#[actix_web::test]
async fn refresh_tokens_are_not_access_tokens() {
    let app = testing_app().await;
    let refresh = token_for(&app, "patient-7", Role::User, TokenKind::Refresh);
    let service = test::init_service(build_app(&app)).await;

    let res =
        test::call_service(&service, bearer_get("/api/biomarkers", &refresh).to_request()).await;
    let (status, trace_id, body) = envelope_of(res).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_consistent(status, &trace_id, &body, ErrorCode::Unauthorized);
}

#[rstest]
#[actix_web::test]
async fn access_tokens_cannot_refresh() {
    let app = testing_app().await;
    let access = token_for(&app, "patient-7", Role::User, TokenKind::Access);
    let service = test::init_service(build_app(&app)).await;

    let res = test::call_service(
        &service,
        test::TestRequest::post()
            .uri("/api/auth/refresh")
            .insert_header((AUTHORIZATION, format!("Bearer {access}")))
            .to_request(),
    )
    .await;
    let (status, trace_id, body) = envelope_of(res).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_consistent(status, &trace_id, &body, ErrorCode::Unauthorized);
}

#[rstest]
#[actix_web::test]
async fn users_are_forbidden_from_the_admin_module() {
    let app = testing_app().await;
    let token = token_for(&app, "patient-7", Role::User, TokenKind::Access);
    let service = test::init_service(build_app(&app)).await;

    let res = test::call_service(&service, bearer_get("/api/admin", &token).to_request()).await;
    let (status, trace_id, body) = envelope_of(res).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_consistent(status, &trace_id, &body, ErrorCode::Forbidden);
}

#[rstest]
#[actix_web::test]
async fn unready_probe_becomes_service_unavailable_envelope() {
    let app = testing_app().await;
    let service = test::init_service(build_app(&app)).await;

    let res = test::call_service(
        &service,
        test::TestRequest::get().uri("/health/ready").to_request(),
    )
    .await;
    let (status, trace_id, body) = envelope_of(res).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_consistent(status, &trace_id, &body, ErrorCode::ServiceUnavailable);
}
