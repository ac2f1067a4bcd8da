use super::AccessGate;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

/// axum middleware running the [`AccessGate`] in front of every route.
///
/// Emits exactly one response: the downstream one on `allow`, otherwise a
/// `307` redirect. Headers the oracle wrote are appended to either.
pub async fn access_gate(State(gate): State<AccessGate>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let request_headers = request.headers().clone();

    let mut oracle_headers = HeaderMap::new();
    let decision = gate
        .evaluate(&path, &request_headers, &mut oracle_headers)
        .await;

    debug!(path = %path, decision = decision.as_str(), "access gate resolved");

    let mut response = match decision.location() {
        None => next.run(request).await,
        Some(location) => Redirect::temporary(location).into_response(),
    };

    let headers = response.headers_mut();
    for (name, value) in &oracle_headers {
        headers.append(name.clone(), value.clone());
    }

    response
}
