//! Route classification and the allow/redirect decision table.

use regex::Regex;

/// Path of the public authentication entry page.
pub const SIGN_IN_PATH: &str = "/sign-in";

/// Where authenticated callers land when they open the sign-in page.
pub const HOME_PATH: &str = "/";

/// Infrastructure prefixes that never go through the gate.
pub const DEFAULT_EXCLUDE_PATTERN: &str = r"^/(?:api|_next/static|_next/image|favicon\.ico)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteClass {
    /// The sign-in page; reachable without a session.
    AuthEntry,
    /// Everything else that is not excluded.
    Protected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToSignIn,
    RedirectToHome,
}

impl Decision {
    /// Redirect target, `None` for [`Decision::Allow`].
    #[must_use]
    pub const fn location(self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::RedirectToSignIn => Some(SIGN_IN_PATH),
            Self::RedirectToHome => Some(HOME_PATH),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::RedirectToSignIn => "redirect-to-sign-in",
            Self::RedirectToHome => "redirect-to-home",
        }
    }
}

/// Maps `(class, session_valid)` to a decision.
#[must_use]
pub const fn decide_class(class: RouteClass, session_valid: bool) -> Decision {
    match (session_valid, class) {
        (true, RouteClass::AuthEntry) => Decision::RedirectToHome,
        (true, RouteClass::Protected) | (false, RouteClass::AuthEntry) => Decision::Allow,
        (false, RouteClass::Protected) => Decision::RedirectToSignIn,
    }
}

/// Classifies request paths against the sign-in page and the exclusion set.
#[derive(Clone, Debug)]
pub struct RouteTable {
    excluded: Regex,
}

impl RouteTable {
    /// Build a table from an exclusion regex.
    ///
    /// # Errors
    /// Returns an error if `exclude_pattern` is not a valid regular expression.
    pub fn new(exclude_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            excluded: Regex::new(exclude_pattern)?,
        })
    }

    /// Paths matching the exclusion pattern are passed through untouched.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.is_match(path)
    }

    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        if path == SIGN_IN_PATH {
            RouteClass::AuthEntry
        } else {
            RouteClass::Protected
        }
    }

    /// Decide what to do with a request for `path`.
    ///
    /// Excluded paths are always allowed regardless of the session.
    #[must_use]
    pub fn decide(&self, path: &str, session_valid: bool) -> Decision {
        if self.is_excluded(path) {
            return Decision::Allow;
        }
        decide_class(self.classify(path), session_valid)
    }

    #[must_use]
    pub fn exclude_pattern(&self) -> &str {
        self.excluded.as_str()
    }
}
