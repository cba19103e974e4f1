//! Access/refresh token issuance and validation.
//!
//! The two token kinds are signed with independent HS256 secrets, so a token
//! of one kind never decodes under the other kind's key. Each user keeps at
//! most one stored refresh token; issuing a new one overwrites the old row.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{sea_query::OnConflict, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::auth::JwtConfig;
use crate::error::{AuthError, Result};
use crate::models::prelude::*;
use crate::models::{refresh_token, user};
use crate::state::DbConn;

/// JWT claims shared by access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub provider: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    fn new(user: &user::Model, ttl_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id.to_string(),
            provider: user.provider.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenGroup {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl SigningKeys {
    fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }
}

#[derive(Clone)]
pub struct TokenService {
    db: DbConn,
    access: SigningKeys,
    refresh: SigningKeys,
}

impl TokenService {
    pub fn new(db: DbConn, jwt: &JwtConfig) -> Self {
        if jwt.access_token_secret == jwt.refresh_token_secret {
            tracing::warn!("Access and refresh token secrets are identical");
        }

        Self {
            db,
            access: SigningKeys::new(&jwt.access_token_secret, jwt.access_token_expiration),
            refresh: SigningKeys::new(&jwt.refresh_token_secret, jwt.refresh_token_expiration),
        }
    }

    pub fn access_token_ttl(&self) -> i64 {
        self.access.ttl_seconds
    }

    pub fn refresh_token_ttl(&self) -> i64 {
        self.refresh.ttl_seconds
    }

    /// Sign an access token. Pure, nothing is persisted.
    pub fn create_access_token(&self, user: &user::Model) -> Result<String> {
        let claims = Claims::new(user, self.access.ttl_seconds);
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.access.encoding)?)
    }

    /// Sign a refresh token and store it as the user's only valid one
    pub async fn create_refresh_token(&self, user: &user::Model) -> Result<String> {
        let claims = Claims::new(user, self.refresh.ttl_seconds);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.refresh.encoding)?;

        let now = Utc::now();
        let row = refresh_token::ActiveModel {
            user_id: Set(user.id),
            token: Set(token.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        RefreshToken::insert(row)
            .on_conflict(
                OnConflict::column(refresh_token::Column::UserId)
                    .update_columns([refresh_token::Column::Token, refresh_token::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(token)
    }

    pub async fn create_token_group(&self, user: &user::Model) -> Result<TokenGroup> {
        Ok(TokenGroup {
            access_token: self.create_access_token(user)?,
            refresh_token: self.create_refresh_token(user).await?,
        })
    }

    pub fn decode_access_token(&self, token: &str) -> Result<Claims> {
        decode_with(token, &self.access.decoding).ok_or_else(|| AuthError::InvalidAccessToken.into())
    }

    /// Decode under the refresh key and require the stored token to match exactly.
    /// Returns the owning user id.
    pub async fn validate_refresh_token(&self, token: &str) -> Result<Uuid> {
        let user_id = decode_with(token, &self.refresh.decoding)
            .and_then(|claims| claims.user_id())
            .ok_or(AuthError::InvalidRefreshToken)?;

        let stored = RefreshToken::find_by_id(user_id).one(&self.db).await?;

        match stored {
            Some(row) if row.token == token => Ok(user_id),
            _ => Err(AuthError::InvalidRefreshToken.into()),
        }
    }

    pub async fn delete_refresh_token(&self, user_id: Uuid) -> Result<()> {
        RefreshToken::delete_by_id(user_id).exec(&self.db).await?;
        Ok(())
    }
}

fn decode_with(token: &str, key: &DecodingKey) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<Claims>(token, key, &validation)
        .map(|data| data.claims)
        .ok()
}
