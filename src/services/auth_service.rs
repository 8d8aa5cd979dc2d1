//! Authentication service - registration and token issuance.
//!
//! Registration is open to anyone. Login hands out an access/refresh token
//! pair; refresh trades a refresh token for a new access token.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    Config, MIN_NAME_LENGTH, SECONDS_PER_HOUR, TOKEN_KIND_ACCESS, TOKEN_KIND_REFRESH,
    TOKEN_TYPE_BEARER,
};
use crate::domain::{normalize_email, CreateUser, Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    /// "access" or "refresh"
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn is_access(&self) -> bool {
        self.token_type == TOKEN_KIND_ACCESS
    }

    pub fn is_refresh(&self) -> bool {
        self.token_type == TOKEN_KIND_REFRESH
    }
}

/// Token pair returned after a successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// JWT refresh token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub refresh_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// New access token returned by a refresh
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessToken {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User>;

    /// Check credentials and issue an access/refresh token pair
    async fn login(&self, email: String, password: String) -> AppResult<TokenPair>;

    /// Exchange a refresh token for a new access token
    async fn refresh(&self, refresh_token: &str) -> AppResult<AccessToken>;

    /// Verify an access token and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Issues and checks HS256 tokens with the configured secret.
#[derive(Clone)]
pub struct TokenIssuer {
    config: Config,
}

impl TokenIssuer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Access token lifetime in seconds
    pub fn access_ttl_seconds(&self) -> i64 {
        self.config.jwt_expiration_hours * SECONDS_PER_HOUR
    }

    pub fn issue(&self, user: &User, kind: &str) -> AppResult<String> {
        let hours = if kind == TOKEN_KIND_REFRESH {
            self.config.jwt_refresh_expiration_hours
        } else {
            self.config.jwt_expiration_hours
        };

        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            token_type: kind.to_string(),
            exp: (now + Duration::hours(hours)).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret_bytes()),
        )?)
    }

    /// Decode and validate signature and expiry.
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    fn access_token(&self, user: &User) -> AppResult<AccessToken> {
        Ok(AccessToken {
            access_token: self.issue(user, TOKEN_KIND_ACCESS)?,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.access_ttl_seconds(),
        })
    }

    fn token_pair(&self, user: &User) -> AppResult<TokenPair> {
        let access = self.access_token(user)?;
        Ok(TokenPair {
            access_token: access.access_token,
            refresh_token: self.issue(user, TOKEN_KIND_REFRESH)?,
            token_type: access.token_type,
            expires_in: access.expires_in,
        })
    }
}

/// Concrete implementation of AuthService backed by the user repository.
pub struct Authenticator {
    repo: Arc<dyn UserRepository>,
    tokens: TokenIssuer,
}

impl Authenticator {
    /// Create new auth service instance
    pub fn new(repo: Arc<dyn UserRepository>, config: Config) -> Self {
        Self {
            repo,
            tokens: TokenIssuer::new(config),
        }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User> {
        // Field format is checked by the handler's ValidatedJson extractor;
        // the name limit is re-checked here because it applies after trimming
        let input = CreateUser::new(&email, password, &name);
        if (input.name.chars().count() as u64) < MIN_NAME_LENGTH {
            return Err(AppError::validation("Name is required"));
        }

        if self.repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&input.password)?.into_string();
        let user = self.repo.create(input, password_hash).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenPair> {
        let user = self.repo.find_by_email(&normalize_email(&email)).await?;

        // Verify against a dummy hash when the user is unknown so response
        // time does not reveal which emails are registered
        let stored = match &user {
            Some(user) => Password::from_hash(user.password_hash.clone()),
            None => Password::dummy(),
        };
        let password_valid = stored.verify(&password);

        match user {
            Some(user) if password_valid && user.can_login() => {
                tracing::info!(user_id = %user.id, "User logged in");
                self.tokens.token_pair(&user)
            }
            _ => Err(AppError::InvalidCredentials),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<AccessToken> {
        let claims = self.tokens.decode(refresh_token)?;
        if !claims.is_refresh() {
            return Err(AppError::Unauthorized);
        }

        // The account may have been disabled since the refresh token was issued
        let user = self
            .repo
            .find_by_id(claims.sub)
            .await?
            .filter(User::can_login)
            .ok_or(AppError::Unauthorized)?;

        self.tokens.access_token(&user)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.tokens.decode(token)?;
        if !claims.is_access() {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }
}
