//! Registration, login and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{NewUser, RegisterRequest, Role, User, UserClaims},
    repository::{AccountStore, Repository},
};

/// Hash a password with argon2 and a fresh salt
pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored argon2 hash
pub(crate) fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account; email and mobile must both be unused
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        if self.repository.users.exists_by_email(&request.email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        if self
            .repository
            .users
            .exists_by_mobile(&request.mobile)
            .await?
        {
            return Err(AppError::Conflict(
                "Mobile number already registered".to_string(),
            ));
        }

        let user = self
            .repository
            .users
            .insert(NewUser {
                name: request.name,
                email: request.email,
                password: hash_password(&request.password)?,
                role: request.role.unwrap_or_default(),
                mobile: request.mobile,
            })
            .await?;

        tracing::info!(user = user.id, "account registered");
        Ok(user)
    }

    /// Authenticate by email and password, returning a JWT and the user
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !verify_password(&user.password, password) {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Authenticate and additionally require the given role
    pub async fn login_with_role(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> AppResult<(String, User)> {
        let (token, user) = self.login(email, password).await?;
        if user.role != role {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }
        Ok((token, user))
    }

    pub async fn get(&self, user_id: i64) -> AppResult<User> {
        self.repository
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_mobile(&self, mobile: &str) -> AppResult<User> {
        self.repository
            .users
            .find_by_mobile(mobile)
            .await?
            .ok_or_else(|| AppError::NotFound("Mobile number not registered".to_string()))
    }

    /// Whether any admin account exists yet
    pub async fn admin_exists(&self) -> AppResult<bool> {
        self.repository.users.exists_by_role(Role::Admin).await
    }

    /// Create a JWT token for a user
    pub fn create_token(&self, user: &User) -> AppResult<String> {
        let now = chrono::Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Validate a bearer token, returning its claims
    pub fn validate_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))
    }
}
