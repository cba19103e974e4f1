//! `Set-Cookie` header values for the session cookies.

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};

use crate::config::auth::CookieConfig;
use crate::services::token::TokenGroup;

pub const ACCESS_TOKEN_COOKIE: &str = "ACCESS_TOKEN";
pub const REFRESH_TOKEN_COOKIE: &str = "REFRESH_TOKEN";
pub const RETURN_TO_COOKIE: &str = "OAUTH2_RETURN_TO";
pub const STATE_COOKIE: &str = "OAUTH2_STATE";

pub const RETURN_TO_MAX_AGE: i64 = 180;
pub const STATE_MAX_AGE: i64 = 300;

#[derive(Debug, Clone)]
pub struct CookieSettings {
    domain: Option<String>,
    same_site: String,
    http_only: bool,
    secure: bool,
}

impl CookieSettings {
    pub fn new(config: &CookieConfig) -> Self {
        let domain = Some(config.domain.trim().to_string()).filter(|d| !d.is_empty());
        Self {
            domain,
            same_site: config.same_site.clone(),
            http_only: config.http_only,
            secure: config.secure,
        }
    }

    pub fn build(&self, name: &str, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; SameSite={}",
            name, value, max_age, self.same_site
        );
        if let Some(domain) = &self.domain {
            cookie.push_str(&format!("; Domain={}", domain));
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn expire(&self, name: &str) -> String {
        self.build(name, "", 0)
    }

    /// Both token cookies, each living as long as its token
    pub fn token_cookies(&self, tokens: &TokenGroup, access_ttl: i64, refresh_ttl: i64) -> [String; 2] {
        [
            self.build(ACCESS_TOKEN_COOKIE, &tokens.access_token, access_ttl),
            self.build(REFRESH_TOKEN_COOKIE, &tokens.refresh_token, refresh_ttl),
        ]
    }

    pub fn expired_token_cookies(&self) -> [String; 2] {
        [self.expire(ACCESS_TOKEN_COOKIE), self.expire(REFRESH_TOKEN_COOKIE)]
    }
}

/// Append each cookie as its own `Set-Cookie` header
pub fn append_cookies<I>(headers: &mut HeaderMap, cookies: I)
where
    I: IntoIterator<Item = String>,
{
    for cookie in cookies {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Dropping malformed cookie header: {}", e),
        }
    }
}

/// Look up a cookie value from the request `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(domain: &str, http_only: bool, secure: bool) -> CookieSettings {
        CookieSettings::new(&CookieConfig {
            domain: domain.to_string(),
            same_site: "Lax".to_string(),
            http_only,
            secure,
        })
    }

    #[test]
    fn test_cookie_without_domain() {
        assert_eq!(
            settings("", true, false).build(ACCESS_TOKEN_COOKIE, "abc", 3600),
            "ACCESS_TOKEN=abc; Path=/; Max-Age=3600; SameSite=Lax; HttpOnly"
        );
    }

    #[test]
    fn test_cookie_with_all_attributes() {
        assert_eq!(
            settings("aiminder.click", true, true).build(REFRESH_TOKEN_COOKIE, "r", 10),
            "REFRESH_TOKEN=r; Path=/; Max-Age=10; SameSite=Lax; Domain=aiminder.click; HttpOnly; Secure"
        );
    }

    #[test]
    fn test_expired_cookie_is_empty() {
        assert_eq!(
            settings("", false, false).expire(RETURN_TO_COOKIE),
            "OAUTH2_RETURN_TO=; Path=/; Max-Age=0; SameSite=Lax"
        );
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("a=1; ACCESS_TOKEN=tok; OAUTH2_STATE="),
        );
        assert_eq!(read_cookie(&headers, ACCESS_TOKEN_COOKIE), Some("tok".to_string()));
        assert_eq!(read_cookie(&headers, STATE_COOKIE), None);
        assert_eq!(read_cookie(&headers, "missing"), None);
    }
}
