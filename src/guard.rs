//! Navigation-time authentication guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every screen that requires an identity goes through [`check`] so the
//! unauthenticated redirect behaves identically everywhere. The guard trusts
//! an unverified persisted token until `fetch_user` confirms or rejects it.

use crate::state::session::Session;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Send the user to `to`, remembering the requested `from` for after login.
    Redirect { to: String, from: String },
}

/// Decide whether `target` may render for `session`.
#[must_use]
pub fn check(session: &Session, target: &str) -> GuardDecision {
    let has_token = session.token.as_deref().is_some_and(|t| !t.is_empty());
    if session.is_authenticated || has_token {
        GuardDecision::Allow
    } else {
        GuardDecision::Redirect { to: LOGIN_PATH.to_owned(), from: target.to_owned() }
    }
}

// =============================================================================
// ROUTE TABLE
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteRule {
    /// Path pattern; `:name` segments match any single segment.
    pub pattern: String,
    pub protected: bool,
}

/// Which paths require an identity. Unknown paths are public.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let public = ["/", "/login", "/register", "/tours", "/tours/:id", "/terms"];
        let protected = ["/profile", "/tours/new", "/tours/:id/edit", "/reservations", "/admin/reservations"];
        let mut table = Self::new();
        // Literal patterns go first so `/tours/new` wins over `/tours/:id`.
        for pattern in protected {
            table = table.route(pattern, true);
        }
        for pattern in public {
            table = table.route(pattern, false);
        }
        table
    }
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule. Earlier rules take precedence.
    #[must_use]
    pub fn route(mut self, pattern: &str, protected: bool) -> Self {
        self.rules.push(RouteRule { pattern: pattern.to_owned(), protected });
        self
    }

    #[must_use]
    pub fn is_protected(&self, path: &str) -> bool {
        self.rules
            .iter()
            .find(|rule| pattern_matches(&rule.pattern, path))
            .is_some_and(|rule| rule.protected)
    }

    /// Guard `path` only if the table marks it protected.
    #[must_use]
    pub fn decide(&self, session: &Session, path: &str) -> GuardDecision {
        if self.is_protected(path) { check(session, path) } else { GuardDecision::Allow }
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|segment| !segment.is_empty())
}

pub(crate) fn pattern_matches(pattern: &str, path: &str) -> bool {
    let mut want = split_path(pattern);
    let mut have = split_path(path);
    loop {
        match (want.next(), have.next()) {
            (None, None) => return true,
            (Some(w), Some(h)) if w.starts_with(':') || w == h => {}
            _ => return false,
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
