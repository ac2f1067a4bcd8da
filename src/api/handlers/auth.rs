//! Credential endpoints backing the sign-up / sign-in page.
//!
//! Flow Overview: validate the payload into typed form values, forward to the
//! identity provider through [`CredentialActions`], then answer with the
//! resulting [`FlowView`]. Provider failures surface only as static messages.
//! Payloads arrive as JSON from the page script, or urlencoded when a form is
//! submitted without it.

use crate::{
    forms::{
        AuthFlow, AuthStep, ConfirmForm, Email, FlowView, SignInForm, SignUpForm,
        ValidationError, SIGN_OUT_FAILED,
    },
    gate::{cookie_value, SIGN_IN_PATH},
    identity::{CredentialActions, SessionTokens, SignInStep},
};
use axum::{
    async_trait,
    extract::{Extension, Form, FromRequest, Request},
    http::{
        header::{InvalidHeaderValue, CONTENT_TYPE, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

/// Names and attributes of the cookies holding the session tokens.
#[derive(Clone, Debug)]
pub struct SessionCookies {
    access_token_name: String,
    id_token_name: String,
    secure: bool,
}

impl SessionCookies {
    #[must_use]
    pub fn new(access_token_name: String, id_token_name: String, secure: bool) -> Self {
        Self {
            access_token_name,
            id_token_name,
            secure,
        }
    }

    #[must_use]
    pub fn access_token_name(&self) -> &str {
        &self.access_token_name
    }

    #[must_use]
    pub fn id_token_name(&self) -> &str {
        &self.id_token_name
    }

    fn cookie(
        &self,
        name: &str,
        value: &str,
        max_age: Option<u32>,
    ) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
        if let Some(max_age) = max_age {
            cookie.push_str(&format!("; Max-Age={max_age}"));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }

    fn store(&self, tokens: &SessionTokens) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            self.cookie(
                &self.access_token_name,
                tokens.access_token.expose_secret(),
                None,
            )?,
        );
        headers.append(
            SET_COOKIE,
            self.cookie(&self.id_token_name, tokens.id_token.expose_secret(), None)?,
        );
        Ok(headers)
    }

    fn clear(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for name in [&self.access_token_name, &self.id_token_name] {
            match self.cookie(name, "", Some(0)) {
                Ok(cookie) => {
                    headers.append(SET_COOKIE, cookie);
                }
                Err(err) => error!("Failed to build cookie {name}: {err}"),
            }
        }
        headers
    }
}

/// Request body decoded as a urlencoded form or as JSON, by `Content-Type`.
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let urlencoded = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if urlencoded {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        }
    }
}

#[derive(ToSchema, Deserialize)]
pub struct SignUpRequest {
    email: String,
    password: String,
    confirm_password: String,
    redirect: Option<String>,
}

#[derive(ToSchema, Deserialize)]
pub struct ConfirmSignUpRequest {
    email: String,
    code: String,
    redirect: Option<String>,
}

#[derive(ToSchema, Deserialize)]
pub struct SignInRequest {
    email: String,
    password: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct ValidationBody {
    field: &'static str,
    rule: &'static str,
    message: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct SignOutResponse {
    navigate_to: Option<String>,
    error: Option<String>,
}

fn missing_payload() -> Response {
    (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response()
}

fn invalid(err: &ValidationError) -> Response {
    let body = ValidationBody {
        field: err.field.as_str(),
        rule: err.rule.as_str(),
        message: err.message(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn flow_response(ok: bool, failure: StatusCode, view: FlowView) -> Response {
    let status = if ok { StatusCode::OK } else { failure };
    (status, Json(view)).into_response()
}

#[utoipa::path(
    post,
    path = "/api/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Sign up accepted by the identity provider", body = FlowView),
        (status = 400, description = "Invalid payload or sign up failed", body = FlowView)
    ),
    tag = "auth"
)]
pub async fn sign_up(
    actions: Extension<CredentialActions>,
    payload: Option<Payload<SignUpRequest>>,
) -> impl IntoResponse {
    let Some(Payload(request)) = payload else {
        return missing_payload();
    };

    let form = match SignUpForm::new(&request.email, request.password, &request.confirm_password)
    {
        Ok(form) => form,
        Err(err) => return invalid(&err),
    };

    let email = form.email().as_str();
    let result = actions
        .sign_up(email, form.password().secret(), email)
        .await;

    let mut flow = AuthFlow::new(request.redirect.as_deref());
    let navigate_to = flow.on_sign_up(email, &result);

    flow_response(result.is_ok(), StatusCode::BAD_REQUEST, flow.view(navigate_to))
}

#[utoipa::path(
    post,
    path = "/api/auth/confirm-sign-up",
    request_body = ConfirmSignUpRequest,
    responses(
        (status = 200, description = "Confirmation code accepted", body = FlowView),
        (status = 400, description = "Invalid payload or confirmation failed", body = FlowView)
    ),
    tag = "auth"
)]
pub async fn confirm_sign_up(
    actions: Extension<CredentialActions>,
    payload: Option<Payload<ConfirmSignUpRequest>>,
) -> impl IntoResponse {
    let Some(Payload(request)) = payload else {
        return missing_payload();
    };

    let email = match Email::new(&request.email) {
        Ok(email) => email,
        Err(err) => return invalid(&err),
    };
    let form = match ConfirmForm::new(request.code) {
        Ok(form) => form,
        Err(err) => return invalid(&err),
    };

    let result = actions
        .confirm_sign_up(email.as_str(), form.code().secret())
        .await;

    let mut flow = AuthFlow::awaiting_confirmation(email.as_str(), request.redirect.as_deref());
    let navigate_to = flow.on_confirm(&result);

    flow_response(result.is_ok(), StatusCode::BAD_REQUEST, flow.view(navigate_to))
}

#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Sign in processed; session cookies set when done", body = FlowView),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Sign in failed or no session was issued", body = FlowView)
    ),
    tag = "auth"
)]
pub async fn sign_in(
    actions: Extension<CredentialActions>,
    cookies: Extension<SessionCookies>,
    payload: Option<Payload<SignInRequest>>,
) -> impl IntoResponse {
    let Some(Payload(request)) = payload else {
        return missing_payload();
    };

    let form = match SignInForm::new(&request.email, request.password) {
        Ok(form) => form,
        Err(err) => return invalid(&err),
    };

    let result = actions
        .sign_in(form.email().as_str(), form.password().secret())
        .await;

    let mut flow = AuthFlow::new(None);
    flow.select_tab(AuthStep::SignIn);
    let navigate_to = flow.on_sign_in(&result);

    if let Ok(output) = &result {
        if output.next_step == SignInStep::Done && output.tokens.is_none() {
            warn!("Identity provider completed sign in without issuing tokens");
        }
    }

    let headers = match result.as_ref().ok().and_then(|output| output.tokens.as_ref()) {
        Some(tokens) => match cookies.store(tokens) {
            Ok(headers) => headers,
            Err(err) => {
                error!("Failed to build session cookies: {err}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        },
        None => HeaderMap::new(),
    };

    let status = if flow.error().is_none() {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    (status, headers, Json(flow.view(navigate_to))).into_response()
}

#[utoipa::path(
    post,
    path = "/api/auth/sign-out",
    responses(
        (status = 200, description = "Signed out globally; session cookies cleared", body = SignOutResponse),
        (status = 502, description = "Sign out failed at the identity provider", body = SignOutResponse)
    ),
    tag = "auth"
)]
pub async fn sign_out(
    headers: HeaderMap,
    actions: Extension<CredentialActions>,
    cookies: Extension<SessionCookies>,
) -> impl IntoResponse {
    let access_token = match cookie_value(&headers, cookies.access_token_name()) {
        Ok(token) => token.map(SecretString::from),
        Err(err) => {
            warn!("Ignoring unreadable session cookie: {err}");
            None
        }
    };

    let result = actions.sign_out(access_token.as_ref()).await;

    // Local cookies are cleared even when the provider call failed.
    let clear = cookies.clear();
    match result {
        Ok(()) => (
            StatusCode::OK,
            clear,
            Json(SignOutResponse {
                navigate_to: Some(SIGN_IN_PATH.to_string()),
                error: None,
            }),
        )
            .into_response(),
        Err(_) => (
            StatusCode::BAD_GATEWAY,
            clear,
            Json(SignOutResponse {
                navigate_to: None,
                error: Some(SIGN_OUT_FAILED.to_string()),
            }),
        )
            .into_response(),
    }
}
