//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while making every
//! per-request failure leave the service as the same JSON envelope.
//!
//! Four paths feed the envelope:
//! - handlers returning [`Error`] go through [`ResponseError`];
//! - JSON, path, and query extractor failures become `invalid_request`;
//! - unmatched paths hit [`not_found`];
//! - [`ErrorTranslator::middleware`] rewrites every remaining error response,
//!   including those the framework produces on its own such as 405.

use std::collections::BTreeMap;

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER, fallback_message};

/// Status used for `code` when no translator has overridden it.
pub const fn default_status(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Uniform JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// HTTP status code, repeated in the body.
    #[schema(example = 404)]
    pub status: u16,
    /// Failure category.
    #[schema(example = "not_found")]
    pub error_code: ErrorCode,
    /// Human-readable message; generic for internal errors.
    #[schema(example = "Resource not found")]
    pub message: String,
    /// Correlation identifier for log lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub trace_id: Option<String>,
}

impl ErrorEnvelope {
    fn render(status: StatusCode, error: &Error) -> Self {
        let code = error.code();
        let message = match code {
            ErrorCode::InternalError => fallback_message(code).to_owned(),
            _ => error.message().to_owned(),
        };
        Self {
            status: status.as_u16(),
            error_code: code,
            message,
            trace_id: error.trace_id().map(str::to_owned),
        }
    }

    fn into_response(self, status: StatusCode) -> HttpResponse {
        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id.as_deref() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(self)
    }
}

/// Mapping from failure category to HTTP status.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use healix::domain::ErrorCode;
/// use healix::inbound::http::error::ErrorTranslator;
///
/// let translator = ErrorTranslator::default();
/// assert_eq!(translator.status_for(ErrorCode::Conflict), StatusCode::CONFLICT);
/// assert_eq!(
///     translator.code_for_status(StatusCode::METHOD_NOT_ALLOWED),
///     ErrorCode::MethodNotAllowed
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorTranslator {
    statuses: BTreeMap<ErrorCode, StatusCode>,
}

impl Default for ErrorTranslator {
    fn default() -> Self {
        Self {
            statuses: ErrorCode::ALL
                .into_iter()
                .map(|code| (code, default_status(code)))
                .collect(),
        }
    }
}

impl ErrorTranslator {
    /// Translator with the standard category mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the status returned for `code`.
    pub fn with_status(mut self, code: ErrorCode, status: StatusCode) -> Self {
        self.statuses.insert(code, status);
        self
    }

    /// Status for a failure category.
    pub fn status_for(&self, code: ErrorCode) -> StatusCode {
        self.statuses
            .get(&code)
            .copied()
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Category for a status the framework produced without a domain error.
    ///
    /// Statuses outside the mapping fall back by class: other 4xx codes are
    /// `invalid_request`, everything else `internal_error`.
    pub fn code_for_status(&self, status: StatusCode) -> ErrorCode {
        self.statuses
            .iter()
            .find(|(_, mapped)| **mapped == status)
            .map(|(code, _)| *code)
            .unwrap_or(if status.is_client_error() {
                ErrorCode::InvalidRequest
            } else {
                ErrorCode::InternalError
            })
    }

    /// Envelope for `error`, redacting internal messages.
    pub fn envelope(&self, error: &Error) -> ErrorEnvelope {
        ErrorEnvelope::render(self.status_for(error.code()), error)
    }

    /// Full HTTP response for `error`.
    pub fn respond(&self, error: &Error) -> HttpResponse {
        let status = self.status_for(error.code());
        ErrorEnvelope::render(status, error).into_response(status)
    }

    /// Middleware rewriting every error response into the envelope using this
    /// translator.
    pub fn middleware<B: 'static>(&self) -> ErrorHandlers<B> {
        let translator = self.clone();
        ErrorHandlers::new().default_handler(move |res| translator.rewrite(res))
    }

    fn rewrite<B>(&self, res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
        let status = res.status();
        let domain = res
            .response()
            .error()
            .and_then(|err| err.as_error::<Error>())
            .cloned();
        let error = match domain {
            Some(error) => error,
            None => {
                if let Some(err) = res.response().error() {
                    debug!(error = %err, %status, "framework error translated");
                }
                let code = self.code_for_status(status);
                Error::new(code, fallback_message(code))
            }
        };
        if error.code() == ErrorCode::InternalError {
            error!(detail = error.message(), trace_id = ?error.trace_id(), "internal error");
        }

        let (req, original) = res.into_parts();
        let mut response = self.respond(&error);
        carry_headers(original.headers(), &mut response);
        Ok(ErrorHandlerResponse::Response(
            ServiceResponse::new(req, response).map_into_right_body(),
        ))
    }
}

fn carry_headers(from: &HeaderMap, to: &mut HttpResponse) {
    let kept: Vec<(HeaderName, HeaderValue)> = from
        .iter()
        .filter(|(name, _)| **name != CONTENT_TYPE && **name != CONTENT_LENGTH)
        .filter(|(name, _)| !to.headers().contains_key(*name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    for (name, value) in kept {
        to.headers_mut().append(name, value);
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        default_status(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        ErrorEnvelope::render(status, self).into_response(status)
    }
}

/// JSON body extractor settings reporting failures as `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| Error::invalid_request(err.to_string()).into())
}

/// Path extractor settings reporting failures as `invalid_request`.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| Error::invalid_request(err.to_string()).into())
}

/// Query extractor settings reporting failures as `invalid_request`.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| Error::invalid_request(err.to_string()).into())
}

/// Default service for paths no module registered.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, Error> {
    Err(Error::not_found(format!(
        "no route for {} {}",
        req.method(),
        req.path()
    )))
}

#[cfg(test)]
mod tests {
    //! Envelope rendering and translation paths.
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::{App, test as actix_test};
    use rstest::{fixture, rstest};

    const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

    #[fixture]
    fn translator() -> ErrorTranslator {
        ErrorTranslator::default()
    }

    async fn body_of(response: HttpResponse) -> ErrorEnvelope {
        let bytes = to_bytes(response.into_body())
            .await
            .expect("reading response body succeeds");
        serde_json::from_slice(&bytes).expect("envelope JSON")
    }

    #[rstest]
    #[case(ErrorCode::InvalidRequest, 400)]
    #[case(ErrorCode::Unauthorized, 401)]
    #[case(ErrorCode::Forbidden, 403)]
    #[case(ErrorCode::NotFound, 404)]
    #[case(ErrorCode::MethodNotAllowed, 405)]
    #[case(ErrorCode::Conflict, 409)]
    #[case(ErrorCode::ServiceUnavailable, 503)]
    #[case(ErrorCode::InternalError, 500)]
    fn categories_map_to_statuses(
        translator: ErrorTranslator,
        #[case] code: ErrorCode,
        #[case] status: u16,
    ) {
        assert_eq!(translator.status_for(code).as_u16(), status);
        assert_eq!(ResponseError::status_code(&Error::new(code, "x")).as_u16(), status);
        assert_eq!(
            translator.code_for_status(StatusCode::from_u16(status).expect("valid status")),
            code
        );
    }

    #[rstest]
    #[case(StatusCode::PAYLOAD_TOO_LARGE, ErrorCode::InvalidRequest)]
    #[case(StatusCode::BAD_GATEWAY, ErrorCode::InternalError)]
    fn unmapped_statuses_fall_back_by_class(
        translator: ErrorTranslator,
        #[case] status: StatusCode,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(translator.code_for_status(status), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn internal_errors_are_redacted(translator: ErrorTranslator) {
        let error = Error::internal("connection string postgres://secret").with_trace_id(TRACE_ID);
        let response = translator.respond(&error);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|value| value.to_str().ok()),
            Some(TRACE_ID)
        );
        let body = body_of(response).await;
        assert_eq!(
            body,
            ErrorEnvelope {
                status: 500,
                error_code: ErrorCode::InternalError,
                message: "Internal server error".to_owned(),
                trace_id: Some(TRACE_ID.to_owned()),
            }
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn client_errors_keep_their_message() {
        let response = ResponseError::error_response(&Error::conflict("already booked"));
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(response.headers().get(TRACE_ID_HEADER).is_none());

        let body = body_of(response).await;
        assert_eq!(body.error_code, ErrorCode::Conflict);
        assert_eq!(body.message, "already booked");
        assert_eq!(body.trace_id, None);
    }

    #[rstest]
    fn envelope_omits_absent_trace_id(translator: ErrorTranslator) {
        let json = serde_json::to_value(translator.envelope(&Error::forbidden("no")))
            .expect("envelope serialises");
        assert_eq!(
            json,
            serde_json::json!({"status": 403, "error_code": "forbidden", "message": "no"})
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn middleware_translates_framework_405() {
        let app = actix_test::init_service(
            App::new().wrap(ErrorTranslator::default().middleware()).service(
                web::resource("/only-get")
                    .route(web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        let req = actix_test::TestRequest::post().uri("/only-get").to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body: ErrorEnvelope = actix_test::read_body_json(res).await;
        assert_eq!(body.error_code, ErrorCode::MethodNotAllowed);
        assert_eq!(body.message, "Method not allowed");
    }

    #[rstest]
    #[actix_web::test]
    async fn middleware_applies_overridden_statuses() {
        let translator =
            ErrorTranslator::default().with_status(ErrorCode::Conflict, StatusCode::UNPROCESSABLE_ENTITY);
        let app = actix_test::init_service(
            App::new().wrap(translator.middleware()).route(
                "/clash",
                web::get().to(|| async { Err::<HttpResponse, _>(Error::conflict("clash")) }),
            ),
        )
        .await;

        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/clash").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorEnvelope = actix_test::read_body_json(res).await;
        assert_eq!(body.status, 422);
        assert_eq!(body.message, "clash");
    }

    #[derive(Debug, serde::Deserialize)]
    struct Booking {
        #[serde(rename = "slot")]
        _slot: u32,
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_json_is_an_invalid_request() {
        let app = actix_test::init_service(
            App::new().app_data(json_config()).route(
                "/bookings",
                web::post().to(|_body: web::Json<Booking>| async { HttpResponse::Created() }),
            ),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/bookings")
            .insert_header((CONTENT_TYPE, "application/json"))
            .set_payload("{\"slot\": \"soon\"}")
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: ErrorEnvelope = actix_test::read_body_json(res).await;
        assert_eq!(body.error_code, ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[actix_web::test]
    async fn unmatched_paths_are_not_found() {
        let app = actix_test::init_service(App::new().default_service(web::to(not_found))).await;

        let req = actix_test::TestRequest::get().uri("/api/unknown").to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: ErrorEnvelope = actix_test::read_body_json(res).await;
        assert_eq!(body.error_code, ErrorCode::NotFound);
        assert_eq!(body.message, "no route for GET /api/unknown");
    }
}
