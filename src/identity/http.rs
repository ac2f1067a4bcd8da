//! JSON-over-HTTP identity provider client.

use super::{
    IdentityProvider, ProviderError, SessionTokens, SignInOutput, SignInStep, SignUpOutput,
    SignUpStep,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Serialize)]
struct SignUpBody<'a> {
    username: &'a str,
    password: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct ConfirmSignUpBody<'a> {
    username: &'a str,
    confirmation_code: &'a str,
}

#[derive(Serialize)]
struct SignInBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignOutBody<'a> {
    access_token: Option<&'a str>,
    global: bool,
}

#[derive(Deserialize)]
struct SignUpReply {
    is_sign_up_complete: bool,
    next_step: SignUpNextStep,
}

#[derive(Deserialize)]
struct SignUpNextStep {
    sign_up_step: SignUpStep,
}

#[derive(Deserialize)]
struct ConfirmSignUpReply {
    is_sign_up_complete: bool,
}

#[derive(Deserialize)]
struct SignInReply {
    next_step: SignInNextStep,
    tokens: Option<TokensReply>,
}

#[derive(Deserialize)]
struct SignInNextStep {
    sign_in_step: SignInStep,
}

#[derive(Deserialize)]
struct TokensReply {
    access_token: String,
    id_token: String,
}

#[derive(Deserialize)]
struct ErrorReply {
    message: String,
}

#[derive(Clone, Debug)]
pub struct HttpIdentityProvider {
    client: Client,
    base_url: String,
}

impl HttpIdentityProvider {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn send<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Response, ProviderError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        debug!("identity provider answered {status} for {path}");

        if status.is_success() {
            return Ok(response);
        }

        // Providers answer with `{ "message": ... }`; fall back to the raw body.
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorReply>(&text)
            .map(|reply| reply.message)
            .unwrap_or(text);

        Err(ProviderError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ProviderError> {
        self.send(path, body)
            .await?
            .json()
            .await
            .map_err(|err| ProviderError::Decode(err.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip_all)]
    async fn sign_up(
        &self,
        username: &str,
        password: &SecretString,
        email: &str,
    ) -> Result<SignUpOutput, ProviderError> {
        let body = SignUpBody {
            username,
            password: password.expose_secret(),
            email,
        };
        let reply: SignUpReply = self.post("sign-up", &body).await?;
        Ok(SignUpOutput {
            is_sign_up_complete: reply.is_sign_up_complete,
            next_step: reply.next_step.sign_up_step,
        })
    }

    #[instrument(skip_all)]
    async fn confirm_sign_up(
        &self,
        username: &str,
        confirmation_code: &SecretString,
    ) -> Result<bool, ProviderError> {
        let body = ConfirmSignUpBody {
            username,
            confirmation_code: confirmation_code.expose_secret(),
        };
        let reply: ConfirmSignUpReply = self.post("confirm-sign-up", &body).await?;
        Ok(reply.is_sign_up_complete)
    }

    #[instrument(skip_all)]
    async fn sign_in(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SignInOutput, ProviderError> {
        let body = SignInBody {
            username,
            password: password.expose_secret(),
        };
        let reply: SignInReply = self.post("sign-in", &body).await?;
        Ok(SignInOutput {
            next_step: reply.next_step.sign_in_step,
            tokens: reply.tokens.map(|tokens| SessionTokens {
                access_token: SecretString::from(tokens.access_token),
                id_token: SecretString::from(tokens.id_token),
            }),
        })
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: Option<&SecretString>) -> Result<(), ProviderError> {
        let body = SignOutBody {
            access_token: access_token.map(|token| token.expose_secret()),
            global: true,
        };
        self.send("sign-out", &body).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router.into_make_service()).await;
        });
        format!("http://{addr}/")
    }

    fn provider_router() -> Router {
        Router::new()
            .route(
                "/sign-up",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["username"], "ada@example.com");
                    assert_eq!(body["email"], "ada@example.com");
                    Json(json!({
                        "is_sign_up_complete": false,
                        "next_step": { "sign_up_step": "CONFIRM_SIGN_UP" }
                    }))
                }),
            )
            .route(
                "/confirm-sign-up",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({ "is_sign_up_complete": body["confirmation_code"] == "123456" }))
                }),
            )
            .route(
                "/sign-in",
                post(|Json(body): Json<Value>| async move {
                    if body["password"] == "correct-horse" {
                        Json(json!({
                            "next_step": { "sign_in_step": "DONE" },
                            "tokens": { "access_token": "acc", "id_token": "idt" }
                        }))
                        .into_response()
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({ "message": "Incorrect username or password." })),
                        )
                            .into_response()
                    }
                }),
            )
            .route(
                "/sign-out",
                post(|Json(body): Json<Value>| async move {
                    if body["global"] == true && body["access_token"] == "acc" {
                        StatusCode::NO_CONTENT
                    } else {
                        StatusCode::BAD_REQUEST
                    }
                }),
            )
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[tokio::test]
    async fn sign_up_maps_next_step() {
        let base = spawn(provider_router()).await;
        let provider = HttpIdentityProvider::new(&base, Duration::from_secs(5)).unwrap();
        let output = provider
            .sign_up("ada@example.com", &secret("hunter2hunter2"), "ada@example.com")
            .await
            .unwrap();
        assert!(!output.is_sign_up_complete);
        assert_eq!(output.next_step, SignUpStep::ConfirmSignUp);
    }

    #[tokio::test]
    async fn confirm_sign_up_reports_completion() {
        let base = spawn(provider_router()).await;
        let provider = HttpIdentityProvider::new(&base, Duration::from_secs(5)).unwrap();
        assert!(provider
            .confirm_sign_up("ada@example.com", &secret("123456"))
            .await
            .unwrap());
        assert!(!provider
            .confirm_sign_up("ada@example.com", &secret("654321"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn sign_in_returns_tokens() {
        let base = spawn(provider_router()).await;
        let provider = HttpIdentityProvider::new(&base, Duration::from_secs(5)).unwrap();
        let output = provider
            .sign_in("ada@example.com", &secret("correct-horse"))
            .await
            .unwrap();
        assert_eq!(output.next_step, SignInStep::Done);
        let tokens = output.tokens.unwrap();
        assert_eq!(tokens.access_token.expose_secret(), "acc");
        assert_eq!(tokens.id_token.expose_secret(), "idt");
    }

    #[tokio::test]
    async fn rejected_sign_in_keeps_provider_message() {
        let base = spawn(provider_router()).await;
        let provider = HttpIdentityProvider::new(&base, Duration::from_secs(5)).unwrap();
        let err = provider
            .sign_in("ada@example.com", &secret("wrong"))
            .await
            .unwrap_err();
        match err {
            ProviderError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect username or password.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn sign_out_is_global() {
        let base = spawn(provider_router()).await;
        let provider = HttpIdentityProvider::new(&base, Duration::from_secs(5)).unwrap();
        provider.sign_out(Some(&secret("acc"))).await.unwrap();
        assert!(provider.sign_out(None).await.is_err());
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let provider =
            HttpIdentityProvider::new("https://idp.example.com/v1/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            provider.endpoint("sign-in"),
            "https://idp.example.com/v1/sign-in"
        );
    }
}
