//! OAuth2 authorization-code flow against Google and Kakao.

use rand::Rng;
use serde_json::Value;

use crate::config::auth::{OAuthClientConfig, OAuthConfig};
use crate::error::{AppError, Result};
use crate::models::user::OAuth2Provider;

/// Static endpoints of an identity provider
struct ProviderEndpoints {
    authorize: &'static str,
    token: &'static str,
    user_info: &'static str,
    scope: &'static str,
}

fn endpoints(provider: OAuth2Provider) -> ProviderEndpoints {
    match provider {
        OAuth2Provider::Google => ProviderEndpoints {
            authorize: "https://accounts.google.com/o/oauth2/v2/auth",
            token: "https://oauth2.googleapis.com/token",
            user_info: "https://www.googleapis.com/oauth2/v3/userinfo",
            scope: "openid profile",
        },
        OAuth2Provider::Kakao => ProviderEndpoints {
            authorize: "https://kauth.kakao.com/oauth/authorize",
            token: "https://kauth.kakao.com/oauth/token",
            user_info: "https://kapi.kakao.com/v2/user/me",
            scope: "profile_nickname",
        },
    }
}

/// Generate a cryptographically secure random string (hex)
pub fn generate_random_string(length: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..length).map(|_| rng.random()).collect();
    hex::encode(bytes)
}

#[derive(Clone)]
pub struct OAuth2Service {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl OAuth2Service {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    fn client(&self, provider: OAuth2Provider) -> Result<&OAuthClientConfig> {
        let client = match provider {
            OAuth2Provider::Google => self.config.google.as_ref(),
            OAuth2Provider::Kakao => self.config.kakao.as_ref(),
        };
        client.ok_or_else(|| {
            AppError::invalid_request(format!("OAuth2 provider {} is not configured", provider))
        })
    }

    pub fn redirect_uri(&self, provider: OAuth2Provider) -> String {
        format!(
            "{}/api/login/oauth2/code/{}",
            self.config.callback_base_url.trim_end_matches('/'),
            provider.as_str().to_lowercase()
        )
    }

    /// Provider consent page URL carrying the given `state`
    pub fn authorization_url(&self, provider: OAuth2Provider, state: &str) -> Result<String> {
        let client = self.client(provider)?;
        let endpoints = endpoints(provider);

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            endpoints.authorize,
            urlencoding::encode(&client.client_id),
            urlencoding::encode(&self.redirect_uri(provider)),
            urlencoding::encode(endpoints.scope),
            urlencoding::encode(state),
        ))
    }

    /// Exchange the authorization code and return the provider's user id
    pub async fn fetch_provider_id(&self, provider: OAuth2Provider, code: &str) -> Result<String> {
        let client = self.client(provider)?;
        let endpoints = endpoints(provider);
        let redirect_uri = self.redirect_uri(provider);

        let token_response = self
            .http
            .post(endpoints.token)
            .form(&[
                ("client_id", client.client_id.as_str()),
                ("client_secret", client.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !token_response.status().is_success() {
            let status = token_response.status();
            let body = token_response.text().await.unwrap_or_default();
            return Err(AppError::internal(format!(
                "Token exchange with {} failed ({}): {}",
                provider, status, body
            )));
        }

        let token_data: Value = token_response.json().await?;
        let access_token = token_data["access_token"]
            .as_str()
            .ok_or_else(|| AppError::internal("No access token in provider response"))?;

        let user_info: Value = self
            .http
            .get(endpoints.user_info)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        provider_id_from(provider, &user_info)
            .ok_or_else(|| AppError::internal(format!("No user id in {} user info", provider)))
    }
}

/// Google carries the id as `sub`, Kakao as a numeric `id`
fn provider_id_from(provider: OAuth2Provider, user_info: &Value) -> Option<String> {
    match provider {
        OAuth2Provider::Google => user_info["sub"].as_str().map(str::to_string),
        OAuth2Provider::Kakao => match &user_info["id"] {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> OAuthConfig {
        OAuthConfig {
            client_url: "http://localhost:3000".to_string(),
            default_redirect_url: String::new(),
            error_url: "http://localhost:3000/login?error=oauth".to_string(),
            callback_base_url: "http://localhost:8080/".to_string(),
            allowed_redirect_hosts: vec!["localhost".to_string()],
            google: Some(OAuthClientConfig {
                client_id: "google-client".to_string(),
                client_secret: "secret".to_string(),
            }),
            kakao: None,
        }
    }

    #[test]
    fn test_authorization_url() {
        let service = OAuth2Service::new(config());
        let url = service.authorization_url(OAuth2Provider::Google, "abc").unwrap();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=google-client"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fapi%2Flogin%2Foauth2%2Fcode%2Fgoogle"
        ));
        assert!(url.contains("state=abc"));
    }

    #[test]
    fn test_unconfigured_provider_is_rejected() {
        let service = OAuth2Service::new(config());
        assert!(service.authorization_url(OAuth2Provider::Kakao, "abc").is_err());
    }

    #[test]
    fn test_provider_id_extraction() {
        assert_eq!(
            provider_id_from(OAuth2Provider::Google, &json!({"sub": "1234"})),
            Some("1234".to_string())
        );
        assert_eq!(
            provider_id_from(OAuth2Provider::Kakao, &json!({"id": 987654321})),
            Some("987654321".to_string())
        );
        assert_eq!(provider_id_from(OAuth2Provider::Kakao, &json!({})), None);
    }

    #[test]
    fn test_random_string_is_hex() {
        let s = generate_random_string(16);
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
