use std::env;

use super::{env_bool, env_parse, parse_list};

const DEV_ACCESS_SECRET: &str = "aiminder-dev-access-token-secret-change-me-0001";
const DEV_REFRESH_SECRET: &str = "aiminder-dev-refresh-token-secret-change-me-0002";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub oauth: OAuthConfig,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            cookie: CookieConfig::from_env(),
            oauth: OAuthConfig::from_env(),
        }
    }
}

/// Signing material for the two token kinds. The secrets must differ.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_token_secret: String,
    /// Seconds
    pub access_token_expiration: i64,
    pub refresh_token_secret: String,
    /// Seconds
    pub refresh_token_expiration: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let access_token_secret = env::var("AIMINDER_JWT_ACCESS_SECRET").unwrap_or_else(|_| {
            tracing::warn!("AIMINDER_JWT_ACCESS_SECRET not set, using development secret");
            DEV_ACCESS_SECRET.to_string()
        });
        let refresh_token_secret = env::var("AIMINDER_JWT_REFRESH_SECRET").unwrap_or_else(|_| {
            tracing::warn!("AIMINDER_JWT_REFRESH_SECRET not set, using development secret");
            DEV_REFRESH_SECRET.to_string()
        });

        Self {
            access_token_secret,
            access_token_expiration: env_parse("AIMINDER_JWT_ACCESS_EXPIRATION", 3600),
            refresh_token_secret,
            refresh_token_expiration: env_parse("AIMINDER_JWT_REFRESH_EXPIRATION", 1_209_600),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Omitted from Set-Cookie when blank
    pub domain: String,
    pub same_site: String,
    pub http_only: bool,
    pub secure: bool,
}

impl CookieConfig {
    pub fn from_env() -> Self {
        Self {
            domain: env::var("AIMINDER_COOKIE_DOMAIN").unwrap_or_default(),
            same_site: env::var("AIMINDER_COOKIE_SAME_SITE").unwrap_or_else(|_| "Lax".to_string()),
            http_only: env_bool("AIMINDER_COOKIE_HTTP_ONLY", true),
            secure: env_bool("AIMINDER_COOKIE_SECURE", false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl OAuthClientConfig {
    fn from_env(prefix: &str) -> Option<Self> {
        let client_id = env::var(format!("AIMINDER_{}_CLIENT_ID", prefix)).ok()?;
        Some(Self {
            client_id,
            client_secret: env::var(format!("AIMINDER_{}_CLIENT_SECRET", prefix))
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Frontend base URL
    pub client_url: String,
    /// Where to land after login when no return_to target applies. Blank = client_url.
    pub default_redirect_url: String,
    pub error_url: String,
    /// Public base URL of this backend, used to build provider callback URIs
    pub callback_base_url: String,
    /// Hosts accepted as post-login redirect targets
    pub allowed_redirect_hosts: Vec<String>,
    pub google: Option<OAuthClientConfig>,
    pub kakao: Option<OAuthClientConfig>,
}

impl OAuthConfig {
    pub fn from_env() -> Self {
        let client_url = env::var("AIMINDER_OAUTH_CLIENT_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let error_url = env::var("AIMINDER_OAUTH_ERROR_URL")
            .unwrap_or_else(|_| format!("{}/login?error=oauth", client_url.trim_end_matches('/')));

        Self {
            default_redirect_url: env::var("AIMINDER_OAUTH_DEFAULT_REDIRECT_URL").unwrap_or_default(),
            error_url,
            callback_base_url: env::var("AIMINDER_OAUTH_CALLBACK_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            allowed_redirect_hosts: parse_list(
                &env::var("AIMINDER_ALLOWED_REDIRECT_HOSTS").unwrap_or_else(|_| "localhost".to_string()),
            ),
            google: OAuthClientConfig::from_env("GOOGLE"),
            kakao: OAuthClientConfig::from_env("KAKAO"),
            client_url,
        }
    }

    /// Fallback landing page after login
    pub fn default_redirect(&self) -> String {
        if self.default_redirect_url.trim().is_empty() {
            self.client_url.trim_end_matches('/').to_string()
        } else {
            self.default_redirect_url.clone()
        }
    }
}
