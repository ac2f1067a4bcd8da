use crate::{
    api::{self, SessionCookies},
    cli::telemetry,
    gate::{AccessGate, CookieSessionOracle, HttpSessionOracle, RouteTable, SessionOracle},
    identity::{CredentialActions, HttpIdentityProvider},
};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub identity_provider_url: String,
    pub upstream_timeout_seconds: u64,
    pub session_oracle_url: Option<String>,
    pub access_token_cookie: String,
    pub id_token_cookie: String,
    pub exclude_pattern: String,
    pub secure_cookies: bool,
}

fn log_startup_args(args: &Args) {
    debug!(
        port = args.port,
        identity_provider_url = %args.identity_provider_url,
        session_oracle_url = args.session_oracle_url.as_deref().unwrap_or("cookies"),
        exclude_pattern = %args.exclude_pattern,
        upstream_timeout_seconds = args.upstream_timeout_seconds,
        secure_cookies = args.secure_cookies,
        "startup configuration"
    );
}

fn session_oracle(args: &Args, timeout: Duration) -> Result<Arc<dyn SessionOracle>> {
    Ok(match &args.session_oracle_url {
        Some(url) => {
            info!("Using session oracle at {url}");
            Arc::new(
                HttpSessionOracle::new(url.clone(), timeout)
                    .context("Failed to build session oracle client")?,
            )
        }
        None => Arc::new(CookieSessionOracle::new(
            args.access_token_cookie.clone(),
            args.id_token_cookie.clone(),
        )),
    })
}

/// Execute the server action.
/// # Errors
/// Returns an error if a client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let timeout = Duration::from_secs(args.upstream_timeout_seconds);

    let routes = RouteTable::new(&args.exclude_pattern)
        .with_context(|| format!("Invalid exclude pattern: {}", args.exclude_pattern))?;
    let gate = AccessGate::new(session_oracle(&args, timeout)?, routes);

    let provider = HttpIdentityProvider::new(&args.identity_provider_url, timeout)
        .context("Failed to build identity provider client")?;
    let actions = CredentialActions::new(Arc::new(provider));

    let cookies = SessionCookies::new(
        args.access_token_cookie.clone(),
        args.id_token_cookie.clone(),
        args.secure_cookies,
    );

    let result = api::new(args.port, api::router(gate, actions, cookies)).await;

    telemetry::shutdown_tracer();

    result
}
