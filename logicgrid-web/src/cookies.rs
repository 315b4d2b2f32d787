//! Session and federation-state cookies

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use logicgrid_core::AppConfig;

/// Cookie names and attributes, fixed at start-up
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub session_name: String,
    pub state_name: String,
    /// `Secure` flag, on in production only
    pub secure: bool,
    pub state_ttl_secs: i64,
}

impl CookieSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            session_name: config.session.cookie_name.clone(),
            state_name: config.session.state_cookie_name.clone(),
            secure: config.is_production(),
            state_ttl_secs: config.session.state_ttl_secs,
        }
    }

    fn base(&self, name: &str, value: String) -> Cookie<'static> {
        Cookie::build((name.to_string(), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }

    pub fn session_token(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.session_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn state_value(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.state_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn set_session(&self, jar: CookieJar, token: String) -> CookieJar {
        jar.add(self.base(&self.session_name, token))
    }

    pub fn clear_session(&self, jar: CookieJar) -> CookieJar {
        jar.remove(self.base(&self.session_name, String::new()))
    }

    pub fn set_state(&self, jar: CookieJar, state: String) -> CookieJar {
        let mut cookie = self.base(&self.state_name, state);
        cookie.set_max_age(time::Duration::seconds(self.state_ttl_secs));
        jar.add(cookie)
    }

    pub fn clear_state(&self, jar: CookieJar) -> CookieJar {
        jar.remove(self.base(&self.state_name, String::new()))
    }
}
