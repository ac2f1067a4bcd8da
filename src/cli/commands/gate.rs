use crate::gate::{
    RouteTable, DEFAULT_ACCESS_TOKEN_COOKIE, DEFAULT_EXCLUDE_PATTERN, DEFAULT_ID_TOKEN_COOKIE,
};
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use url::Url;

pub const ARG_SESSION_ORACLE_URL: &str = "session-oracle-url";
pub const ARG_ACCESS_TOKEN_COOKIE: &str = "access-token-cookie";
pub const ARG_ID_TOKEN_COOKIE: &str = "id-token-cookie";
pub const ARG_EXCLUDE_PATTERN: &str = "exclude-pattern";
pub const ARG_SECURE_COOKIES: &str = "secure-cookies";

#[derive(Debug, Clone)]
pub struct Options {
    pub session_oracle_url: Option<String>,
    pub access_token_cookie: String,
    pub id_token_cookie: String,
    pub exclude_pattern: String,
    pub secure_cookies: bool,
}

impl Options {
    /// Parse access gate arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the oracle URL or the exclusion pattern is invalid.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let session_oracle_url = matches
            .get_one::<String>(ARG_SESSION_ORACLE_URL)
            .cloned()
            .filter(|v| !v.trim().is_empty());

        if let Some(url) = &session_oracle_url {
            Url::parse(url).with_context(|| format!("Invalid session oracle URL: {url}"))?;
        }

        let read = |id: &str, default: &str| -> String {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let exclude_pattern = read(ARG_EXCLUDE_PATTERN, DEFAULT_EXCLUDE_PATTERN);
        RouteTable::new(&exclude_pattern)
            .with_context(|| format!("Invalid exclude pattern: {exclude_pattern}"))?;

        Ok(Self {
            session_oracle_url,
            access_token_cookie: read(ARG_ACCESS_TOKEN_COOKIE, DEFAULT_ACCESS_TOKEN_COOKIE),
            id_token_cookie: read(ARG_ID_TOKEN_COOKIE, DEFAULT_ID_TOKEN_COOKIE),
            exclude_pattern,
            secure_cookies: matches.get_flag(ARG_SECURE_COOKIES),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_ORACLE_URL)
                .long(ARG_SESSION_ORACLE_URL)
                .help("Session oracle endpoint; when unset the session is read from cookies")
                .env("AUTHGATE_SESSION_ORACLE_URL"),
        )
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_COOKIE)
                .long(ARG_ACCESS_TOKEN_COOKIE)
                .help("Cookie holding the access token")
                .default_value(DEFAULT_ACCESS_TOKEN_COOKIE)
                .env("AUTHGATE_ACCESS_TOKEN_COOKIE"),
        )
        .arg(
            Arg::new(ARG_ID_TOKEN_COOKIE)
                .long(ARG_ID_TOKEN_COOKIE)
                .help("Cookie holding the identity token")
                .default_value(DEFAULT_ID_TOKEN_COOKIE)
                .env("AUTHGATE_ID_TOKEN_COOKIE"),
        )
        .arg(
            Arg::new(ARG_EXCLUDE_PATTERN)
                .long(ARG_EXCLUDE_PATTERN)
                .help("Regular expression of paths that bypass the access gate")
                .default_value(DEFAULT_EXCLUDE_PATTERN)
                .env("AUTHGATE_EXCLUDE_PATTERN"),
        )
        .arg(
            Arg::new(ARG_SECURE_COOKIES)
                .long(ARG_SECURE_COOKIES)
                .help("Mark session cookies as Secure")
                .env("AUTHGATE_SECURE_COOKIES")
                .action(ArgAction::SetTrue),
        )
}
