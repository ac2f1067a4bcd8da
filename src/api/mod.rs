use crate::{
    gate::{access_gate, AccessGate},
    identity::CredentialActions,
};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod handlers;
mod openapi;

pub use handlers::SessionCookies;
pub use openapi::openapi;

use handlers::{auth, health, hello, pages};

/// Build the application router with the access gate in front of every route.
#[must_use]
pub fn router(gate: AccessGate, actions: CredentialActions, cookies: SessionCookies) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/sign-in", get(pages::sign_in))
        .route("/api/health", get(health::health))
        .route("/api/hello", get(hello::hello).post(hello::hello))
        .route("/api/ez", get(hello::ez).post(hello::ez))
        .route("/api/pz", get(hello::pz).post(hello::pz))
        .route("/api/auth/sign-up", post(auth::sign_up))
        .route("/api/auth/confirm-sign-up", post(auth::confirm_sign_up))
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/auth/sign-out", post(auth::sign_out))
        .fallback(pages::not_found)
        .layer(from_fn_with_state(gate, access_gate))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(actions))
                .layer(Extension(cookies)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(port: u16, app: Router) -> Result<()> {
    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gate::{tests::FakeOracle, RouteTable, DEFAULT_EXCLUDE_PATTERN};
    use crate::identity::tests::FakeProvider;
    use axum::{
        body::to_bytes,
        http::{header::LOCATION, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(oracle: FakeOracle) -> Router {
        let gate = AccessGate::new(
            Arc::new(oracle),
            RouteTable::new(DEFAULT_EXCLUDE_PATTERN).unwrap(),
        );
        router(
            gate,
            CredentialActions::new(Arc::new(FakeProvider::default())),
            SessionCookies::new("at".to_string(), "it".to_string(), false),
        )
    }

    async fn fetch(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn request_id_is_generated_and_propagated() {
        let response = fetch(app(FakeOracle::anonymous()), "/api/hello").await;
        assert_eq!(response.status(), StatusCode::OK);
        let request_id = response.headers().get("x-request-id").unwrap();
        assert!(Ulid::from_string(request_id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn request_id_is_kept_when_present() {
        let response = app(FakeOracle::anonymous())
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("x-request-id", "abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers().get("x-request-id").unwrap(), "abc");
    }

    #[tokio::test]
    async fn unknown_path_is_gated_before_404() {
        let response = fetch(app(FakeOracle::anonymous()), "/nowhere").await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/sign-in");

        let response = fetch(app(FakeOracle::valid()), "/nowhere").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn home_requires_a_session() {
        let response = fetch(app(FakeOracle::anonymous()), "/").await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

        let response = fetch(app(FakeOracle::valid()), "/").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn sign_in_page_forms_post_to_auth_endpoints() {
        let response = fetch(app(FakeOracle::anonymous()), "/sign-in").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();

        let forms: Vec<&str> = html
            .split("<form")
            .skip(1)
            .map(|tag| tag.split('>').next().unwrap())
            .collect();
        assert_eq!(forms.len(), 3);
        for form in forms {
            assert!(form.contains(r#"method="post""#), "{form}");
            assert!(form.contains(r#"action="/api/auth/"#), "{form}");
        }
    }

    #[tokio::test]
    async fn oracle_failure_fails_closed() {
        let response = fetch(app(FakeOracle::failing()), "/dashboard").await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/sign-in");

        let response = fetch(app(FakeOracle::failing()), "/sign-in").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
