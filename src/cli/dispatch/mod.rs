//! Map parsed CLI arguments to the action the binary executes.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{gate, identity};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let identity_opts = identity::Options::parse(matches)?;
    let gate_opts = gate::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        identity_provider_url: identity_opts.url,
        upstream_timeout_seconds: identity_opts.timeout_seconds,
        session_oracle_url: gate_opts.session_oracle_url,
        access_token_cookie: gate_opts.access_token_cookie,
        id_token_cookie: gate_opts.id_token_cookie,
        exclude_pattern: gate_opts.exclude_pattern,
        secure_cookies: gate_opts.secure_cookies,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn server_action_from_env() {
        temp_env::with_vars(
            [
                ("AUTHGATE_PORT", Some("9090")),
                (
                    "AUTHGATE_IDENTITY_PROVIDER_URL",
                    Some("https://idp.example.com/v1"),
                ),
                ("AUTHGATE_SESSION_ORACLE_URL", None),
                ("AUTHGATE_EXCLUDE_PATTERN", None),
                ("AUTHGATE_SECURE_COOKIES", None),
            ],
            || {
                let matches = commands::new().get_matches_from(["authgate"]);
                let Action::Server(args) = handler(&matches).unwrap();
                assert_eq!(args.port, 9090);
                assert_eq!(args.identity_provider_url, "https://idp.example.com/v1");
                assert_eq!(args.upstream_timeout_seconds, 10);
                assert!(args.session_oracle_url.is_none());
                assert_eq!(
                    args.exclude_pattern,
                    crate::gate::DEFAULT_EXCLUDE_PATTERN
                );
                assert!(!args.secure_cookies);
            },
        );
    }

    #[test]
    fn invalid_identity_provider_url() {
        temp_env::with_vars(
            [(
                "AUTHGATE_IDENTITY_PROVIDER_URL",
                Some("no scheme"),
            )],
            || {
                let matches = commands::new().get_matches_from(["authgate"]);
                assert!(handler(&matches).is_err());
            },
        );
    }
}
