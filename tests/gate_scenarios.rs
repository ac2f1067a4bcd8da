#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use authgate::{
    api::{router, SessionCookies},
    gate::{
        AccessGate, CookieSessionOracle, OracleError, RouteTable, Session, SessionOracle,
        DEFAULT_ACCESS_TOKEN_COOKIE, DEFAULT_EXCLUDE_PATTERN, DEFAULT_ID_TOKEN_COOKIE,
    },
    identity::{CredentialActions, HttpIdentityProvider},
};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{COOKIE, LOCATION},
        HeaderMap, Request, StatusCode,
    },
    response::Response,
    Router,
};
use serde_json::Value;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tower::ServiceExt;

fn app_with(oracle: Arc<dyn SessionOracle>) -> Router {
    let gate = AccessGate::new(oracle, RouteTable::new(DEFAULT_EXCLUDE_PATTERN).unwrap());
    // Never reached by these scenarios.
    let provider =
        HttpIdentityProvider::new("http://127.0.0.1:9", Duration::from_millis(100)).unwrap();
    router(
        gate,
        CredentialActions::new(Arc::new(provider)),
        SessionCookies::new(
            DEFAULT_ACCESS_TOKEN_COOKIE.to_string(),
            DEFAULT_ID_TOKEN_COOKIE.to_string(),
            false,
        ),
    )
}

fn app() -> Router {
    app_with(Arc::new(CookieSessionOracle::default()))
}

async fn get(app: Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn session_cookie() -> String {
    format!("{DEFAULT_ACCESS_TOKEN_COOKIE}=access; {DEFAULT_ID_TOKEN_COOKIE}=identity")
}

struct BrokenOracle {
    calls: AtomicUsize,
}

#[async_trait]
impl SessionOracle for BrokenOracle {
    async fn fetch_session(
        &self,
        _request: &HeaderMap,
        _response: &mut HeaderMap,
    ) -> Result<Session, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(OracleError::Status(500))
    }
}

#[tokio::test]
async fn sign_in_page_without_tokens_passes_through() {
    let response = get(app(), "/sign-in", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(LOCATION).is_none());
}

#[tokio::test]
async fn protected_path_without_tokens_redirects_to_sign_in() {
    let response = get(app(), "/dashboard", None).await;
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/sign-in");
}

#[tokio::test]
async fn sign_in_page_with_tokens_redirects_home() {
    let response = get(app(), "/sign-in", Some(&session_cookie())).await;
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn api_without_tokens_passes_through() {
    let response = get(app(), "/api/hello", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "Hello Next.js!");
}

#[tokio::test]
async fn protected_path_with_tokens_is_allowed() {
    let response = get(app(), "/", Some(&session_cookie())).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn single_token_is_not_a_session() {
    let cookie = format!("{DEFAULT_ACCESS_TOKEN_COOKIE}=access");
    let response = get(app(), "/dashboard", Some(&cookie)).await;
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/sign-in");
}

#[tokio::test]
async fn broken_oracle_fails_closed_and_skips_excluded_paths() {
    let oracle = Arc::new(BrokenOracle {
        calls: AtomicUsize::new(0),
    });

    let response = get(app_with(oracle.clone()), "/dashboard", None).await;
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/sign-in");

    let response = get(app_with(oracle.clone()), "/sign-in", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 2);

    let response = get(app_with(oracle.clone()), "/_next/static/chunk.js", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 2);
}
