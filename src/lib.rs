//! # Authgate (session-gated routing)
//!
//! `authgate` sits in front of a small sign-up / sign-in surface whose
//! credentials live in an external identity provider. Every inbound request
//! passes through the access gate, which asks a session oracle whether the
//! caller holds a valid session and answers with one of three decisions:
//!
//! - **allow**: the request continues to its handler.
//! - **redirect to sign-in**: unauthenticated access to a protected route.
//! - **redirect to home**: an authenticated caller opening the sign-in page.
//!
//! ## Fail Closed
//!
//! Any oracle failure (transport error, malformed session, provider outage) is
//! logged and treated as "no session". The gate always produces a response.
//!
//! ## Excluded Paths
//!
//! Infrastructure prefixes (`/api`, `/_next/static`, `/_next/image`,
//! `/favicon.ico`) skip the gate entirely; see [`gate::RouteTable`].
//!
//! ## Credentials
//!
//! Sign up, confirmation, sign in and sign out are forwarded verbatim to the
//! identity provider through [`identity::CredentialActions`]. Provider errors
//! are logged and surfaced to the caller as static, non-specific messages.

pub mod api;
pub mod cli;
pub mod forms;
pub mod gate;
pub mod identity;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
