//! Session oracles: the only source of truth the gate consults about sessions.
//!
//! An oracle sees the request headers and may write headers to the response
//! side of the pair (e.g. refreshed cookies). It never decides access itself.

use async_trait::async_trait;
use axum::http::{
    header::{AUTHORIZATION, COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue, StatusCode,
};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

pub const DEFAULT_ACCESS_TOKEN_COOKIE: &str = "authgate_access_token";
pub const DEFAULT_ID_TOKEN_COOKIE: &str = "authgate_id_token";

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("session oracle request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("session oracle returned unexpected status {0}")]
    Status(u16),
    #[error("invalid session oracle response: {0}")]
    Decode(String),
    #[error("malformed session: {0}")]
    MalformedSession(String),
}

/// Token presence as reported by an oracle.
#[derive(Debug, Default)]
pub struct Session {
    access_token: Option<SecretString>,
    id_token: Option<SecretString>,
}

impl Session {
    #[must_use]
    pub fn new(access_token: Option<SecretString>, id_token: Option<SecretString>) -> Self {
        Self {
            access_token,
            id_token,
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session is valid when both tokens are present and non-empty.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        present(self.access_token.as_ref()) && present(self.id_token.as_ref())
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }
}

fn present(token: Option<&SecretString>) -> bool {
    token.is_some_and(|t| !t.expose_secret().trim().is_empty())
}

#[async_trait]
pub trait SessionOracle: Send + Sync {
    /// Report the session carried by `request`.
    ///
    /// Headers written to `response` are attached to whatever response the
    /// gate ends up emitting.
    async fn fetch_session(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
    ) -> Result<Session, OracleError>;
}

/// Reads the session tokens straight from the request cookies.
#[derive(Clone, Debug)]
pub struct CookieSessionOracle {
    access_token_cookie: String,
    id_token_cookie: String,
}

impl CookieSessionOracle {
    #[must_use]
    pub fn new(access_token_cookie: String, id_token_cookie: String) -> Self {
        Self {
            access_token_cookie,
            id_token_cookie,
        }
    }
}

impl Default for CookieSessionOracle {
    fn default() -> Self {
        Self::new(
            DEFAULT_ACCESS_TOKEN_COOKIE.to_string(),
            DEFAULT_ID_TOKEN_COOKIE.to_string(),
        )
    }
}

#[async_trait]
impl SessionOracle for CookieSessionOracle {
    async fn fetch_session(
        &self,
        request: &HeaderMap,
        _response: &mut HeaderMap,
    ) -> Result<Session, OracleError> {
        let access_token = match cookie_value(request, &self.access_token_cookie)? {
            Some(token) => Some(token),
            None => bearer_token(request),
        };
        let id_token = cookie_value(request, &self.id_token_cookie)?;

        Ok(Session::new(
            access_token.map(SecretString::from),
            id_token.map(SecretString::from),
        ))
    }
}

/// Look up a cookie by name across every `Cookie` header of the request.
///
/// # Errors
/// Returns [`OracleError::MalformedSession`] if a `Cookie` header is not valid UTF-8.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Result<Option<String>, OracleError> {
    for header in headers.get_all(COOKIE) {
        let value = header
            .to_str()
            .map_err(|_| OracleError::MalformedSession("cookie header is not UTF-8".to_string()))?;
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.trim() == name {
                return Ok(Some(val.trim().to_string()));
            }
        }
    }
    Ok(None)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[derive(Deserialize)]
struct SessionReport {
    access_token: Option<String>,
    id_token: Option<String>,
    #[serde(default)]
    set_cookie: Vec<String>,
}

/// Asks a remote session service, forwarding the caller's credentials.
#[derive(Clone, Debug)]
pub struct HttpSessionOracle {
    client: Client,
    url: String,
}

impl HttpSessionOracle {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: String, timeout: Duration) -> Result<Self, OracleError> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl SessionOracle for HttpSessionOracle {
    #[instrument(skip_all, fields(oracle.url = %self.url))]
    async fn fetch_session(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
    ) -> Result<Session, OracleError> {
        let mut forwarded = HeaderMap::new();
        for name in [COOKIE, AUTHORIZATION] {
            for value in request.get_all(&name) {
                forwarded.append(name.clone(), value.clone());
            }
        }

        let reply = self
            .client
            .post(&self.url)
            .headers(forwarded)
            .send()
            .await?;

        let status = reply.status();
        debug!("session oracle answered {status}");

        if status == StatusCode::NO_CONTENT || status == StatusCode::UNAUTHORIZED {
            return Ok(Session::anonymous());
        }
        if status != StatusCode::OK {
            return Err(OracleError::Status(status.as_u16()));
        }

        let report: SessionReport = reply
            .json()
            .await
            .map_err(|err| OracleError::Decode(err.to_string()))?;

        // All or nothing: a bad entry leaves the response untouched.
        let refreshed = report
            .set_cookie
            .iter()
            .map(|cookie| HeaderValue::from_str(cookie))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| OracleError::MalformedSession("invalid set_cookie value".to_string()))?;

        for value in refreshed {
            response.append(SET_COOKIE, value);
        }

        Ok(Session::new(
            report.access_token.map(SecretString::from),
            report.id_token.map(SecretString::from),
        ))
    }
}
