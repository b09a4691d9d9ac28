//! Current location and navigation history.
//!
//! DESIGN
//! ======
//! The router only records where the user is and how they got there; it
//! never talks to the backend. Guarded navigation consults the route table
//! and lands denied requests on the login path with the original target kept
//! in `from` so the login screen can send the user back.

use crate::guard::{GuardDecision, HOME_PATH, LOGIN_PATH, RouteTable};
use crate::state::session::Session;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    /// Where the user was headed before being redirected here.
    pub from: Option<String>,
}

impl Location {
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self { path: path.to_owned(), from: None }
    }

    /// Path to continue to after a successful login.
    #[must_use]
    pub fn return_path(&self) -> &str {
        self.from.as_deref().unwrap_or(HOME_PATH)
    }
}

#[derive(Clone, Debug)]
pub struct Router {
    routes: RouteTable,
    current: Location,
    history: Vec<Location>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouteTable::default())
    }
}

impl Router {
    #[must_use]
    pub fn new(routes: RouteTable) -> Self {
        Self { routes, current: Location::new(HOME_PATH), history: Vec::new() }
    }

    #[must_use]
    pub fn current(&self) -> &Location {
        &self.current
    }

    /// Every location entered, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Location] {
        &self.history
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    fn enter(&mut self, location: Location) -> &Location {
        self.history.push(location.clone());
        self.current = location;
        &self.current
    }

    /// Navigate to `path`, redirecting through the guard when it is protected.
    pub fn navigate(&mut self, path: &str, session: &Session) -> GuardDecision {
        let decision = self.routes.decide(session, path);
        match &decision {
            GuardDecision::Allow => {
                self.enter(Location::new(path));
            }
            GuardDecision::Redirect { to, from } => {
                tracing::debug!(%from, %to, "navigation redirected");
                self.enter(Location { path: to.clone(), from: Some(from.clone()) });
            }
        }
        decision
    }

    /// Unconditional jump to the login screen, remembering where the user was.
    pub fn redirect_to_login(&mut self) -> &Location {
        let from = (self.current.path != LOGIN_PATH).then(|| self.current.path.clone());
        self.enter(Location { path: LOGIN_PATH.to_owned(), from })
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
