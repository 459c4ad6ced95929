//! Unit tests for session configuration parsing.

use std::collections::HashMap;
use std::io::Write;

use super::*;
use mockable::MockEnv;
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp key file");
    file.write_all(&vec![b'k'; len]).expect("write key");
    file
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

struct ReleaseVars {
    vars: HashMap<&'static str, String>,
    _key: NamedTempFile,
}

impl ReleaseVars {
    fn set(mut self, name: &'static str, value: &str) -> Self {
        self.vars.insert(name, value.to_owned());
        self
    }

    fn unset(mut self, name: &'static str) -> Self {
        self.vars.remove(name);
        self
    }

    fn load(&self, mode: BuildMode) -> Result<SessionSettings, SessionConfigError> {
        session_settings_from_env(&mock_env(self.vars.clone()), mode)
    }
}

#[fixture]
fn release_vars() -> ReleaseVars {
    let key = key_file(SESSION_KEY_MIN_LEN);
    let vars = HashMap::from([
        (KEY_FILE_ENV, key.path().to_string_lossy().into_owned()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ]);
    ReleaseVars { vars, _key: key }
}

#[rstest]
fn complete_release_settings_load(release_vars: ReleaseVars) {
    let settings = release_vars.load(BuildMode::Release).expect("valid settings");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(release_vars: ReleaseVars, #[case] missing: &'static str) {
    let error = release_vars
        .unset(missing)
        .load(BuildMode::Release)
        .err()
        .expect("missing toggle rejected");

    assert!(matches!(error, SessionConfigError::MissingEnv { name } if name == missing));
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(SAMESITE_ENV, "sometimes")]
#[case(ALLOW_EPHEMERAL_ENV, "")]
fn release_rejects_unparsable_values(
    release_vars: ReleaseVars,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let error = release_vars
        .set(name, value)
        .load(BuildMode::Release)
        .err()
        .expect("invalid value rejected");

    assert!(matches!(error, SessionConfigError::InvalidEnv { name: got, .. } if got == name));
}

#[rstest]
fn release_rejects_same_site_none_without_secure(release_vars: ReleaseVars) {
    let error = release_vars
        .set(COOKIE_SECURE_ENV, "0")
        .set(SAMESITE_ENV, "None")
        .load(BuildMode::Release)
        .err()
        .expect("insecure SameSite=None rejected");

    assert!(matches!(error, SessionConfigError::InsecureSameSiteNone));
}

#[rstest]
fn release_rejects_ephemeral_keys(release_vars: ReleaseVars) {
    let error = release_vars
        .set(ALLOW_EPHEMERAL_ENV, "yes")
        .load(BuildMode::Release)
        .err()
        .expect("ephemeral keys rejected");

    assert!(matches!(error, SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_rejects_short_keys(release_vars: ReleaseVars) {
    let short = key_file(SESSION_KEY_MIN_LEN - 1);
    let error = release_vars
        .set(KEY_FILE_ENV, &short.path().to_string_lossy())
        .load(BuildMode::Release)
        .err()
        .expect("short key rejected");

    assert!(matches!(
        error,
        SessionConfigError::KeyTooShort { length, .. } if length == SESSION_KEY_MIN_LEN - 1
    ));
}

#[rstest]
fn release_requires_a_readable_key(release_vars: ReleaseVars) {
    let error = release_vars
        .set(KEY_FILE_ENV, "/nonexistent/session-key")
        .load(BuildMode::Release)
        .err()
        .expect("unreadable key rejected");

    assert!(matches!(error, SessionConfigError::KeyRead { .. }));
}

#[rstest]
fn debug_builds_fall_back_to_safe_defaults() {
    let settings = session_settings_from_env(&mock_env(HashMap::from([(
        KEY_FILE_ENV,
        "/nonexistent/session-key".to_owned(),
    )])), BuildMode::Debug)
    .expect("debug defaults");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn fingerprint_is_stable_for_a_key(release_vars: ReleaseVars) {
    let first = release_vars.load(BuildMode::Release).expect("settings");
    let second = release_vars.load(BuildMode::Release).expect("settings");

    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first.fingerprint().chars().all(|c| c.is_ascii_hexdigit()));
}

#[rstest]
#[case("Y", Some(true))]
#[case(" false ", Some(false))]
#[case("2", None)]
fn booleans_accept_common_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
    assert_eq!(parse_bool(raw), expected);
}
