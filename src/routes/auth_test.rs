use super::*;

// =============================================================================
// env_bool — uses unique env var names to avoid races with parallel tests.
// =============================================================================

#[test]
fn env_bool_true_variants() {
    for (i, val) in ["1", "true", "yes", "on"].iter().enumerate() {
        let key = format!("__TEST_EB_TRUE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(true), "expected true for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_false_variants() {
    for (i, val) in ["0", "false", "no", "off"].iter().enumerate() {
        let key = format!("__TEST_EB_FALSE_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), Some(false), "expected false for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
}

#[test]
fn env_bool_invalid_returns_none() {
    let key = "__TEST_EB_INVALID_5521__";
    unsafe { std::env::set_var(key, "maybe") };
    assert_eq!(env_bool(key), None);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_bool_unset_returns_none() {
    assert_eq!(env_bool("__TEST_EB_SURELY_UNSET_XYZ_91__"), None);
}

// =============================================================================
// validate_registration
// =============================================================================

fn body(username: &str, email: &str, password: &str) -> RegisterBody {
    RegisterBody { username: username.into(), email: email.into(), password: password.into() }
}

#[test]
fn valid_registration_passes() {
    assert!(validate_registration(&body("alice", "a@x.com", "secret1")).is_ok());
}

#[test]
fn blank_fields_are_rejected() {
    assert!(validate_registration(&body("", "a@x.com", "secret1")).is_err());
    assert!(validate_registration(&body("alice", "   ", "secret1")).is_err());
    assert!(validate_registration(&body("alice", "a@x.com", "")).is_err());
}

#[test]
fn email_must_contain_at_sign() {
    assert!(validate_registration(&body("alice", "not-an-email", "secret1")).is_err());
}

#[test]
fn short_password_is_rejected() {
    let err = validate_registration(&body("alice", "a@x.com", "five5")).unwrap_err();
    assert!(err.contains("at least 6"));
}

#[test]
fn six_char_password_is_accepted() {
    assert!(validate_registration(&body("alice", "a@x.com", "sixsix")).is_ok());
}

// =============================================================================
// cookies
// =============================================================================

#[test]
fn session_cookie_is_http_only_lax() {
    let cookie = session_cookie("abc123".into());
    assert_eq!(cookie.name(), COOKIE_NAME);
    assert_eq!(cookie.value(), "abc123");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
}

#[test]
fn clear_cookie_expires_immediately() {
    let cookie = clear_session_cookie();
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
}
