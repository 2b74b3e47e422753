use serde::{Deserialize, Serialize};
use tower_cookies::{
    cookie::{time::Duration, SameSite},
    Cookie, Cookies, Key,
};

use super::VerifiedIdentity;

pub const SESSION_COOKIE: &str = "pantry_session";

const SESSION_MAX_AGE_DAYS: i64 = 7;

/// Key and cookie attributes for the encrypted session cookie
#[derive(Clone)]
pub struct SessionSettings {
    pub key: Key,
    /// Only send the cookie over HTTPS. Cross-site cookies need this.
    pub secure: bool,
}

/// Per-browser session state, stored encrypted in a cookie
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// CSRF state of an authorization request in flight
    #[serde(default)]
    pub oauth_state: Option<String>,
    #[serde(default)]
    pub user: Option<VerifiedIdentity>,
}

impl Session {
    /// Reads the session; a missing, tampered or outdated cookie yields an empty session
    pub fn load(cookies: &Cookies, settings: &SessionSettings) -> Self {
        cookies
            .private(&settings.key)
            .get(SESSION_COOKIE)
            .and_then(|cookie| match serde_json::from_str(cookie.value()) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable session cookie");
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn store(&self, cookies: &Cookies, settings: &SessionSettings) {
        let value = match serde_json::to_string(self) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "Session serialization error");
                return;
            }
        };

        let same_site = if settings.secure {
            SameSite::None
        } else {
            SameSite::Lax
        };

        let cookie = Cookie::build((SESSION_COOKIE, value))
            .path("/")
            .http_only(true)
            .secure(settings.secure)
            .same_site(same_site)
            .max_age(Duration::days(SESSION_MAX_AGE_DAYS))
            .build();

        cookies.private(&settings.key).add(cookie);
    }

    pub fn clear(cookies: &Cookies, settings: &SessionSettings) {
        let cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
        cookies.private(&settings.key).remove(cookie);
    }
}
