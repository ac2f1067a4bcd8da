//! Static greeting endpoints under `/api`.

use axum::response::{IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Debug, PartialEq, Eq)]
pub struct Message {
    message: &'static str,
}

const fn message(message: &'static str) -> Json<Message> {
    Json(Message { message })
}

#[utoipa::path(
    method(get, post),
    path = "/api/hello",
    responses((status = 200, description = "Greeting", body = Message)),
    tag = "authgate"
)]
pub async fn hello() -> impl IntoResponse {
    message("Hello Next.js!")
}

#[utoipa::path(
    method(get, post),
    path = "/api/ez",
    responses((status = 200, description = "Greeting", body = Message)),
    tag = "authgate"
)]
pub async fn ez() -> impl IntoResponse {
    message("Hello Next.js this is ez!")
}

#[utoipa::path(
    method(get, post),
    path = "/api/pz",
    responses((status = 200, description = "Greeting", body = Message)),
    tag = "authgate"
)]
pub async fn pz() -> impl IntoResponse {
    message("Hello Next.js! this is pz ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    #[tokio::test]
    async fn greetings_answer_get_and_post() {
        let app = Router::new()
            .route("/api/hello", get(hello).post(hello))
            .route("/api/ez", get(ez).post(ez))
            .route("/api/pz", get(pz).post(pz));

        let cases = [
            ("GET", "/api/hello", "Hello Next.js!"),
            ("POST", "/api/hello", "Hello Next.js!"),
            ("GET", "/api/ez", "Hello Next.js this is ez!"),
            ("POST", "/api/pz", "Hello Next.js! this is pz "),
        ];

        for (method, uri, expected) in cases {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{method} {uri}");
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["message"], expected);
        }
    }
}
