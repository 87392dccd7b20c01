//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{violation_messages, Credentials, Role, User, UserClaims},
    repository::Repository,
};

const CREDENTIAL_FIELDS: [&str; 2] = ["username", "password"];

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Create an account with the `user` role
    pub async fn register(&self, credentials: Credentials) -> AppResult<User> {
        self.create_account(credentials, Role::User).await
    }

    /// Authenticate by username and password and return a JWT with the user
    pub async fn authenticate(&self, credentials: &Credentials) -> AppResult<(String, User)> {
        let invalid = || AppError::Authentication("invalid username/password".to_string());

        let user = self
            .repository
            .users
            .find_by_username(&credentials.username)
            .await?
            .ok_or_else(invalid)?;

        if !self.verify_password(&user, &credentials.password)? {
            return Err(invalid());
        }

        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            role: user.role,
            exp: now + self.token_lifetime_secs(),
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!(username = %user.username, role = %user.role, "User logged in");
        Ok((token, user))
    }

    /// Make sure the configured admin account exists. An existing account of
    /// that name is left untouched.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<()> {
        if self.repository.users.find_by_username(username).await?.is_some() {
            tracing::debug!(username, "Admin account already present");
            return Ok(());
        }

        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        match self.create_account(credentials, Role::Admin).await {
            // Another instance created it first
            Err(AppError::UsernameTaken(_)) => Ok(()),
            other => other.map(|_| ()),
        }
    }

    /// List every account
    pub async fn get_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.find_all().await
    }

    /// Get one account by username
    pub async fn get_user(&self, username: &str) -> AppResult<User> {
        self.repository
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Seconds a freshly issued token stays valid
    pub fn token_lifetime_secs(&self) -> i64 {
        self.config.jwt_expiration_hours as i64 * 3600
    }

    async fn create_account(&self, credentials: Credentials, role: Role) -> AppResult<User> {
        if let Err(errors) = credentials.validate() {
            return Err(AppError::Validation(violation_messages(&errors, &CREDENTIAL_FIELDS)));
        }

        if self
            .repository
            .users
            .find_by_username(&credentials.username)
            .await?
            .is_some()
        {
            return Err(AppError::UsernameTaken(credentials.username));
        }

        let hash = self.hash_password(&credentials.password)?;
        let user = User::new(credentials.username, hash, role);
        self.repository.users.insert(&user).await?;

        tracing::info!(username = %user.username, role = %role, "Account created");
        Ok(user)
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
