//! Session cookie settings read from the environment.
//!
//! Debug builds fall back to permissive defaults with a warning; release
//! builds refuse to start on missing or unsafe values. The resulting
//! [`SessionSettings`] builds the cookie-session middleware that carries the
//! signed-in principal.

use std::path::PathBuf;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{time::Duration, Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

pub const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub const SAMESITE_ENV: &str = "SESSION_SAMESITE";
pub const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
pub const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "abroad_session";
/// Sessions expire this many hours after sign-in.
pub const SESSION_TTL_HOURS: i64 = 2;
/// Minimum key file length accepted in release builds.
pub const SESSION_KEY_MIN_LEN: usize = 64;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
// `Key::derive_from` panics below this length.
const DERIVE_MIN_LEN: usize = 32;
const FINGERPRINT_BYTES: usize = 8;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Whether unsafe session settings are tolerated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// ```rust
    /// use abroad::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated cookie-session settings.
#[derive(Clone)]
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Truncated SHA-256 of the signing key, safe to log.
    ///
    /// ```rust
    /// use abroad::inbound::http::session_config::SessionSettings;
    /// use actix_web::cookie::{Key, SameSite};
    ///
    /// let settings = SessionSettings {
    ///     key: Key::generate(),
    ///     cookie_secure: true,
    ///     same_site: SameSite::Strict,
    /// };
    /// assert_eq!(settings.fingerprint().len(), 16);
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.key.signing());
        hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
    }

    /// Private (encrypted) cookie sessions with a fixed time-to-live.
    #[must_use]
    pub fn middleware(&self) -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name(SESSION_COOKIE_NAME.to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(self.cookie_secure)
            .cookie_http_only(true)
            .cookie_content_security(CookieContentSecurity::Private)
            .cookie_same_site(self.same_site)
            .session_lifecycle(
                PersistentSession::default().session_ttl(Duration::hours(SESSION_TTL_HOURS)),
            )
            .build()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Read and validate session settings.
///
/// # Errors
///
/// In release builds, any missing toggle, unparsable value, `SameSite=None`
/// without secure cookies, an ephemeral-key opt-in, or an unreadable or short
/// key file is an error.
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = flag(env, mode, COOKIE_SECURE_ENV, true)?;
    let same_site = same_site(env, mode, cookie_secure)?;
    let allow_ephemeral = flag(env, mode, ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = session_key(env, mode, allow_ephemeral)?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Use `fallback` in debug builds, fail in release builds.
fn relax<T>(mode: BuildMode, fallback: T, error: SessionConfigError) -> Result<T, SessionConfigError> {
    if mode.is_debug() {
        warn!(%error, "session setting relaxed for debug build");
        Ok(fallback)
    } else {
        Err(error)
    }
}

fn flag<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    debug_default: bool,
) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(name) else {
        return relax(mode, debug_default, SessionConfigError::MissingEnv { name });
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None => relax(
            mode,
            debug_default,
            SessionConfigError::InvalidEnv {
                name,
                value,
                expected: BOOL_EXPECTED,
            },
        ),
    }
}

fn same_site<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let Some(value) = env.string(SAMESITE_ENV) else {
        return relax(
            mode,
            SameSite::Lax,
            SessionConfigError::MissingEnv { name: SAMESITE_ENV },
        );
    };
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => relax(mode, SameSite::None, SessionConfigError::InsecureSameSiteNone),
        _ => relax(
            mode,
            SameSite::Lax,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value,
                expected: SAMESITE_EXPECTED,
            },
        ),
    }
}

fn session_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );
    let mut bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(source) if mode.is_debug() || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "using temporary session key (dev only)");
            return Ok(Key::generate());
        }
        Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
    };
    let length = bytes.len();
    let min_len = if mode.is_debug() {
        DERIVE_MIN_LEN
    } else {
        SESSION_KEY_MIN_LEN
    };
    let result = if length < min_len {
        Err(SessionConfigError::KeyTooShort {
            path,
            length,
            min_len,
        })
    } else {
        Ok(Key::derive_from(&bytes))
    };
    bytes.zeroize();
    result
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
