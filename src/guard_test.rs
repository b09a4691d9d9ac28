use super::*;

fn session(is_authenticated: bool, token: Option<&str>) -> Session {
    Session { is_authenticated, token: token.map(str::to_owned), ..Session::default() }
}

// =============================================================================
// check
// =============================================================================

#[test]
fn check_redirects_without_token_or_auth() {
    assert_eq!(
        check(&session(false, None), "/reservations"),
        GuardDecision::Redirect { to: "/login".into(), from: "/reservations".into() }
    );
}

#[test]
fn check_trusts_unverified_token() {
    assert_eq!(check(&session(false, Some("abc")), "/reservations"), GuardDecision::Allow);
}

#[test]
fn check_allows_authenticated() {
    assert_eq!(check(&session(true, None), "/profile"), GuardDecision::Allow);
}

#[test]
fn check_treats_empty_token_as_absent() {
    assert!(matches!(check(&session(false, Some("")), "/profile"), GuardDecision::Redirect { .. }));
}

#[test]
fn check_preserves_query_in_from() {
    let decision = check(&session(false, None), "/admin/reservations?status=pending");
    assert_eq!(
        decision,
        GuardDecision::Redirect { to: LOGIN_PATH.into(), from: "/admin/reservations?status=pending".into() }
    );
}

// =============================================================================
// pattern_matches
// =============================================================================

#[test]
fn pattern_literal_match() {
    assert!(pattern_matches("/tours", "/tours"));
    assert!(pattern_matches("/tours", "/tours/"));
    assert!(!pattern_matches("/tours", "/tours/7"));
}

#[test]
fn pattern_param_segment() {
    assert!(pattern_matches("/tours/:id/edit", "/tours/7/edit"));
    assert!(!pattern_matches("/tours/:id/edit", "/tours/7"));
}

#[test]
fn pattern_root() {
    assert!(pattern_matches("/", "/"));
    assert!(!pattern_matches("/", "/terms"));
}

#[test]
fn pattern_ignores_query_and_fragment() {
    assert!(pattern_matches("/reservations", "/reservations?page=2#top"));
}

// =============================================================================
// RouteTable
// =============================================================================

#[test]
fn default_table_protects_account_screens() {
    let table = RouteTable::default();
    for path in ["/profile", "/tours/new", "/tours/12/edit", "/reservations", "/admin/reservations"] {
        assert!(table.is_protected(path), "expected {path} protected");
    }
}

#[test]
fn default_table_public_screens() {
    let table = RouteTable::default();
    for path in ["/", "/login", "/register", "/tours", "/tours/12", "/terms", "/unknown"] {
        assert!(!table.is_protected(path), "expected {path} public");
    }
}

#[test]
fn decide_allows_public_for_anonymous() {
    assert_eq!(RouteTable::default().decide(&session(false, None), "/tours/3"), GuardDecision::Allow);
}

#[test]
fn decide_redirects_protected_for_anonymous() {
    assert!(matches!(
        RouteTable::default().decide(&session(false, None), "/profile"),
        GuardDecision::Redirect { .. }
    ));
}

#[test]
fn custom_rule_precedence() {
    let table = RouteTable::new().route("/tours/:id", false).route("/tours/new", true);
    assert!(!table.is_protected("/tours/new"));
}
