use super::*;

fn anonymous() -> Session {
    Session::default()
}

fn signed_in() -> Session {
    Session { is_authenticated: true, token: Some("tok".into()), ..Session::default() }
}

#[test]
fn starts_at_home_with_empty_history() {
    let router = Router::default();
    assert_eq!(router.current(), &Location::new("/"));
    assert!(router.history().is_empty());
}

#[test]
fn navigate_public_path_enters_it() {
    let mut router = Router::default();
    assert_eq!(router.navigate("/tours/4", &anonymous()), GuardDecision::Allow);
    assert_eq!(router.current().path, "/tours/4");
    assert_eq!(router.history().len(), 1);
}

#[test]
fn navigate_protected_anonymous_lands_on_login() {
    let mut router = Router::default();
    let decision = router.navigate("/reservations", &anonymous());
    assert!(matches!(decision, GuardDecision::Redirect { .. }));
    assert_eq!(router.current().path, LOGIN_PATH);
    assert_eq!(router.current().from.as_deref(), Some("/reservations"));
    assert_eq!(router.current().return_path(), "/reservations");
}

#[test]
fn navigate_protected_signed_in_enters_it() {
    let mut router = Router::default();
    router.navigate("/profile", &signed_in());
    assert_eq!(router.current(), &Location::new("/profile"));
}

#[test]
fn return_path_defaults_home() {
    assert_eq!(Location::new(LOGIN_PATH).return_path(), "/");
}

#[test]
fn redirect_to_login_remembers_current() {
    let mut router = Router::default();
    router.navigate("/profile", &signed_in());
    let location = router.redirect_to_login().clone();
    assert_eq!(location, Location { path: "/login".into(), from: Some("/profile".into()) });
    assert_eq!(router.history().len(), 2);
}

#[test]
fn redirect_to_login_from_login_has_no_from() {
    let mut router = Router::default();
    router.redirect_to_login();
    router.redirect_to_login();
    assert_eq!(router.current().from, None);
    assert_eq!(router.history()[0].from.as_deref(), Some("/"));
}
