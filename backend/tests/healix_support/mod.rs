//! Shared helpers for the application-level integration suites.

use std::collections::HashMap;

use actix_web::http::header::AUTHORIZATION;
use actix_web::test::TestRequest;
use healix::app::{AppContext, Application, create_app};
use healix::domain::{Principal, Role, TokenKind};
use mockable::MockEnv;

/// Context whose environment holds exactly `pairs`.
pub fn context_with(pairs: &[(&str, &str)]) -> AppContext {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    AppContext::from_env(&env).expect("environment is valid")
}

/// Application bootstrapped on the testing profile with an empty environment.
pub async fn testing_app() -> Application {
    create_app(&context_with(&[]), "testing")
        .await
        .expect("testing profile boots")
}

/// Sign a token of `kind` with the application's own token manager.
pub fn token_for(app: &Application, subject: &str, role: Role, kind: TokenKind) -> String {
    let principal = Principal::new(subject, role).expect("valid principal");
    app.token_service()
        .expect("token manager bound")
        .issue(&principal, kind)
        .expect("token signs")
        .token
}

/// GET `uri` carrying `token` as a bearer credential.
pub fn bearer_get(uri: &str, token: &str) -> TestRequest {
    TestRequest::get()
        .uri(uri)
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
}
