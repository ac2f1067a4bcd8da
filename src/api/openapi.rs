use super::handlers::{auth, health, hello};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        hello::hello,
        hello::ez,
        hello::pz,
        auth::sign_up,
        auth::confirm_sign_up,
        auth::sign_in,
        auth::sign_out,
    ),
    tags(
        (name = "authgate", description = "Service endpoints"),
        (name = "auth", description = "Sign up, confirmation, sign in and sign out")
    )
)]
struct ApiDoc;

/// `OpenAPI` document for the `/api` routes.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_api_routes() {
        let doc = openapi();
        for path in [
            "/api/health",
            "/api/hello",
            "/api/ez",
            "/api/pz",
            "/api/auth/sign-up",
            "/api/auth/confirm-sign-up",
            "/api/auth/sign-in",
            "/api/auth/sign-out",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path}");
        }
        assert_eq!(doc.info.title, env!("CARGO_PKG_NAME"));
    }
}
