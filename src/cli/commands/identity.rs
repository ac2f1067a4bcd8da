use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use url::Url;

pub const ARG_IDENTITY_PROVIDER_URL: &str = "identity-provider-url";
pub const ARG_UPSTREAM_TIMEOUT_SECONDS: &str = "upstream-timeout-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub url: String,
    pub timeout_seconds: u64,
}

impl Options {
    /// Parse identity provider arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the provider URL is missing or invalid.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<String>(ARG_IDENTITY_PROVIDER_URL)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("missing required argument: --{ARG_IDENTITY_PROVIDER_URL}")
            })?;

        Url::parse(&url).with_context(|| format!("Invalid identity provider URL: {url}"))?;

        Ok(Self {
            url,
            timeout_seconds: matches
                .get_one::<u64>(ARG_UPSTREAM_TIMEOUT_SECONDS)
                .copied()
                .unwrap_or(10),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDENTITY_PROVIDER_URL)
                .long(ARG_IDENTITY_PROVIDER_URL)
                .help("Identity provider base URL, example: https://idp.tld/v1")
                .env("AUTHGATE_IDENTITY_PROVIDER_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_UPSTREAM_TIMEOUT_SECONDS)
                .long(ARG_UPSTREAM_TIMEOUT_SECONDS)
                .help("Timeout for identity provider and session oracle requests")
                .default_value("10")
                .env("AUTHGATE_UPSTREAM_TIMEOUT_SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
