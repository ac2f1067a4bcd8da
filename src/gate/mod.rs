//! Access gate: session lookup plus route decision for every inbound request.
//!
//! Flow Overview: skip excluded infrastructure paths, ask the oracle about the
//! session (one call, no retries), then map `(session_valid, path)` through
//! the [`RouteTable`]. Oracle failures count as "no session".

mod middleware;
mod oracle;
mod routes;

pub use middleware::access_gate;
pub use oracle::{
    cookie_value, CookieSessionOracle, HttpSessionOracle, OracleError, Session, SessionOracle,
    DEFAULT_ACCESS_TOKEN_COOKIE, DEFAULT_ID_TOKEN_COOKIE,
};
pub use routes::{
    decide_class, Decision, RouteClass, RouteTable, DEFAULT_EXCLUDE_PATTERN, HOME_PATH,
    SIGN_IN_PATH,
};

use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::{error, trace};

#[derive(Clone)]
pub struct AccessGate {
    oracle: Arc<dyn SessionOracle>,
    routes: RouteTable,
}

impl AccessGate {
    #[must_use]
    pub fn new(oracle: Arc<dyn SessionOracle>, routes: RouteTable) -> Self {
        Self { oracle, routes }
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Ask the oracle whether `request` carries a valid session.
    ///
    /// Never fails: oracle errors are logged and reported as `false`.
    pub async fn session_valid(&self, request: &HeaderMap, response: &mut HeaderMap) -> bool {
        match self.oracle.fetch_session(request, response).await {
            Ok(session) => session.is_valid(),
            Err(err) => {
                error!("Authentication error: {err}");
                false
            }
        }
    }

    /// Resolve the decision for a request to `path`.
    pub async fn evaluate(
        &self,
        path: &str,
        request: &HeaderMap,
        response: &mut HeaderMap,
    ) -> Decision {
        if self.routes.is_excluded(path) {
            trace!("{path} is excluded from the access gate");
            return Decision::Allow;
        }

        let session_valid = self.session_valid(request, response).await;
        self.routes.decide(path, session_valid)
    }
}
