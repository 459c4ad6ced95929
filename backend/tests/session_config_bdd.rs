//! Session cookie settings as the server loads them at startup.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use abroad::inbound::http::session_config::{
    BuildMode, COOKIE_SECURE_ENV, KEY_FILE_ENV, SESSION_KEY_MIN_LEN, SessionConfigError,
    SessionSettings, session_settings_from_env,
};
use actix_web::cookie::SameSite;
use mockable::MockEnv;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::NamedTempFile;

type Outcome = Result<SessionSettings, SessionConfigError>;

struct SettingsWorld {
    mode: Cell<BuildMode>,
    vars: RefCell<HashMap<String, String>>,
    /// Held so the key file outlives the load.
    key_file: RefCell<Option<NamedTempFile>>,
    outcome: RefCell<Option<Outcome>>,
}

impl SettingsWorld {
    fn set(&self, name: &str, value: &str) {
        self.vars.borrow_mut().insert(name.to_owned(), value.to_owned());
    }

    fn failure(&self) -> String {
        match self.outcome.borrow().as_ref().expect("settings were loaded") {
            Ok(_) => panic!("expected loading to fail"),
            Err(error) => format!("{error:?}"),
        }
    }
}

#[fixture]
fn world() -> SettingsWorld {
    SettingsWorld {
        mode: Cell::new(BuildMode::Release),
        vars: RefCell::new(HashMap::new()),
        key_file: RefCell::new(None),
        outcome: RefCell::new(None),
    }
}

#[given("a release build")]
fn release_build(world: &SettingsWorld) {
    world.mode.set(BuildMode::Release);
}

#[given("a debug build")]
fn debug_build(world: &SettingsWorld) {
    world.mode.set(BuildMode::Debug);
}

#[given("the environment sets {name} to {value}")]
fn environment_sets(world: &SettingsWorld, name: String, value: String) {
    world.set(&name, &value);
}

#[given("a {len} byte session key file")]
fn key_file(world: &SettingsWorld, len: usize) {
    let file = NamedTempFile::new().expect("temporary key file");
    std::fs::write(file.path(), vec![0x5a; len]).expect("write key bytes");
    world.set(KEY_FILE_ENV, &file.path().to_string_lossy());
    *world.key_file.borrow_mut() = Some(file);
}

#[when("the session settings are loaded")]
fn load(world: &SettingsWorld) {
    let vars = world.vars.borrow().clone();
    let mut env = MockEnv::new();
    env.expect_string()
        .returning(move |name| vars.get(name).cloned());
    let outcome = session_settings_from_env(&env, world.mode.get());
    *world.outcome.borrow_mut() = Some(outcome);
}

#[then("loading succeeds with secure cookies and SameSite {policy}")]
fn loads_with(world: &SettingsWorld, policy: String) {
    let outcome = world.outcome.borrow();
    let settings = match outcome.as_ref().expect("settings were loaded") {
        Ok(settings) => settings,
        Err(error) => panic!("expected settings, got {error}"),
    };
    let expected = match policy.as_str() {
        "Strict" => SameSite::Strict,
        "Lax" => SameSite::Lax,
        "None" => SameSite::None,
        other => panic!("unknown SameSite policy {other}"),
    };
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, expected);
}

#[then("loading fails because SESSION_COOKIE_SECURE is missing")]
fn fails_missing_secure(world: &SettingsWorld) {
    let failure = world.failure();
    assert!(failure.contains("MissingEnv"), "{failure}");
    assert!(failure.contains(COOKIE_SECURE_ENV), "{failure}");
}

#[then("loading fails because ephemeral keys are not allowed")]
fn fails_ephemeral(world: &SettingsWorld) {
    assert_eq!(world.failure(), "EphemeralNotAllowed");
}

#[then("loading fails because SameSite None is insecure")]
fn fails_same_site_none(world: &SettingsWorld) {
    assert_eq!(world.failure(), "InsecureSameSiteNone");
}

#[then("loading fails because the key is too short")]
fn fails_short_key(world: &SettingsWorld) {
    let failure = world.failure();
    assert!(failure.starts_with("KeyTooShort"), "{failure}");
    assert!(failure.contains(&format!("min_len: {SESSION_KEY_MIN_LEN}")), "{failure}");
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Explicit secure settings are accepted"
)]
fn explicit_secure_settings(world: SettingsWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "The secure flag must be stated"
)]
fn secure_flag_must_be_stated(world: SettingsWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Ephemeral keys are refused"
)]
fn ephemeral_keys_are_refused(world: SettingsWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "SameSite None needs secure cookies"
)]
fn same_site_none_needs_secure_cookies(world: SettingsWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Short keys are refused"
)]
fn short_keys_are_refused(world: SettingsWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Debug builds start with nothing configured"
)]
fn debug_builds_start_unconfigured(world: SettingsWorld) {
    drop(world);
}
