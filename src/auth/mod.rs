use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::extract::{FromRef, FromRequestParts};
use chrono::Utc;
use http::{header, request::Parts};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::user::{self, ActiveModel as UserActiveModel, Entity as UserEntity},
    errors::ServiceError,
};

/// JWT claims carried by staff tokens. Capabilities are the two flat
/// booleans the rest of the system checks per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub is_admin: bool,
    pub is_employee: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Request/response types
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub is_admin: bool,
    pub is_employee: bool,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_employee: bool,
}

/// Issues and validates staff tokens against the users table.
#[derive(Clone)]
pub struct AuthService {
    db: Arc<DbPool>,
    jwt_secret: String,
    jwt_expiration_secs: usize,
}

impl AuthService {
    pub fn new(db: Arc<DbPool>, jwt_secret: String, jwt_expiration_secs: usize) -> Self {
        Self {
            db,
            jwt_secret,
            jwt_expiration_secs,
        }
    }

    /// Creates a staff account with an argon2-hashed password.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegisterRequest) -> Result<user::Model, ServiceError> {
        if request.username.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Username is required".to_string(),
            ));
        }
        if request.password.len() < 8 {
            return Err(ServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let existing = UserEntity::find()
            .filter(user::Column::Username.eq(request.username.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "Username '{}' is already taken",
                request.username
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(request.password.as_bytes(), &salt)
            .map_err(|e| ServiceError::InternalError(format!("Password hashing failed: {}", e)))?
            .to_string();

        let model = UserActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(request.username.clone()),
            password_hash: Set(password_hash),
            is_admin: Set(request.is_admin),
            is_employee: Set(request.is_employee),
            ..Default::default()
        };

        let created = model.insert(&*self.db).await?;
        info!(user_id = %created.id, "staff account created");
        Ok(created)
    }

    /// Verifies credentials and issues a signed token.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let user = UserEntity::find()
            .filter(user::Column::Username.eq(request.username.clone()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid credentials".to_string()))?;

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| ServiceError::InternalError(format!("Stored hash invalid: {}", e)))?;

        if Argon2::default()
            .verify_password(request.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            warn!("failed login attempt");
            return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = self.issue_token(&user)?;

        Ok(LoginResponse {
            token,
            username: user.username,
            is_admin: user.is_admin,
            is_employee: user.is_employee,
        })
    }

    pub fn issue_token(&self, user: &user::Model) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            is_employee: user.is_employee,
            iat: now,
            exp: now + self.jwt_expiration_secs as i64,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("Token signing failed: {}", e)))
    }

    /// Number of staff accounts; the register endpoint is only open
    /// while this is zero.
    pub async fn user_count(&self) -> Result<u64, ServiceError> {
        use sea_orm::PaginatorTrait;
        Ok(UserEntity::find().count(&*self.db).await?)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::Unauthorized("Invalid or expired token".to_string()))
    }
}

/// Authenticated staff member extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    pub is_admin: bool,
    pub is_employee: bool,
}

impl AuthUser {
    pub fn can_serve(&self) -> bool {
        self.is_admin || self.is_employee
    }
}

/// Extracts the bearer token from an Authorization header set.
pub fn bearer_token(headers: &http::HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    crate::AppState: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = crate::AppState::from_ref(state);
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ServiceError::Unauthorized("Missing bearer token".to_string()))?;
        let claims = app_state.services.auth.validate_token(token)?;

        Ok(AuthUser {
            user_id: claims.sub,
            username: claims.username,
            is_admin: claims.is_admin,
            is_employee: claims.is_employee,
        })
    }
}

/// Waiter/kitchen capability: admins implicitly qualify.
#[derive(Debug, Clone)]
pub struct EmployeeUser(pub AuthUser);

impl<S> FromRequestParts<S> for EmployeeUser
where
    S: Send + Sync,
    crate::AppState: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.can_serve() {
            return Err(ServiceError::Forbidden(
                "Staff access required".to_string(),
            ));
        }
        Ok(EmployeeUser(user))
    }
}

/// Administrator capability.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    crate::AppState: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(ServiceError::Forbidden(
                "Administrator access required".to_string(),
            ));
        }
        Ok(AdminUser(user))
    }
}
