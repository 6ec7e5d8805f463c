use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::user;
use crate::errors::ServiceError;
use crate::AppState;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

/// JWT claim set.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated caller, inserted into request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ServiceError::Unauthorized("Authentication required".to_string()))
    }
}

/// Issues and validates tokens, and owns credential checks against the
/// users table.
pub struct AuthService {
    db: Arc<DatabaseConnection>,
    jwt_secret: String,
    jwt_expiration_secs: usize,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash).map_err(|e| ServiceError::HashError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

impl AuthService {
    pub fn new(db: Arc<DatabaseConnection>, jwt_secret: String, jwt_expiration_secs: usize) -> Self {
        Self {
            db,
            jwt_secret,
            jwt_expiration_secs,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ServiceError> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(email.clone()))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let record = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            email: Set(email),
            password_hash: Set(hash_password(&request.password)?),
            role: Set(ROLE_USER.to_string()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let saved = record.insert(self.db.as_ref()).await?;

        info!(user_id = %saved.id, "registered new user");
        self.auth_response(&saved)
    }

    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ServiceError> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?;

        // Same failure for unknown email and wrong password.
        let invalid = || ServiceError::Unauthorized("Invalid email or password".to_string());
        let account = found.ok_or_else(invalid)?;
        if !account.active {
            warn!(user_id = %account.id, "login attempt on deactivated account");
            return Err(invalid());
        }
        if !verify_password(&request.password, &account.password_hash)? {
            return Err(invalid());
        }

        self.auth_response(&account)
    }

    pub fn generate_token(&self, account: &user::Model) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: account.id.to_string(),
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.jwt_expiration_secs as i64,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("failed to sign token: {}", e)))
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

    /// Rotates the caller's password after checking the current one.
    #[instrument(skip(self, request))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<(), ServiceError> {
        request.validate()?;
        let account = user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;

        if !verify_password(&request.current_password, &account.password_hash)? {
            return Err(ServiceError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        let mut record: user::ActiveModel = account.into();
        record.password_hash = Set(hash_password(&request.new_password)?);
        record.updated_at = Set(Utc::now());
        record.update(self.db.as_ref()).await?;

        info!(%user_id, "password changed");
        Ok(())
    }

    fn auth_response(&self, account: &user::Model) -> Result<AuthResponse, ServiceError> {
        Ok(AuthResponse {
            token: self.generate_token(account)?,
            user: AuthUser {
                user_id: account.id,
                name: account.name.clone(),
                email: account.email.clone(),
                role: account.role.clone(),
            },
        })
    }
}

/// Validates the bearer token and stashes the caller in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    let token = match token {
        Some(token) if !token.is_empty() => token,
        _ => {
            return ServiceError::Unauthorized("Missing bearer token".to_string()).into_response()
        }
    };

    let claims = match state.auth.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    let user_id = match claims.sub.parse::<Uuid>() {
        Ok(id) => id,
        Err(_) => {
            return ServiceError::Unauthorized("Invalid token subject".to_string()).into_response()
        }
    };

    request.extensions_mut().insert(AuthUser {
        user_id,
        name: claims.name,
        email: claims.email,
        role: claims.role,
    });

    next.run(request).await
}

async fn require_role(role: &'static str, request: Request, next: Next) -> Response {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.role == role => next.run(request).await,
        Some(_) => ServiceError::Forbidden(format!("Requires {} role", role)).into_response(),
        None => ServiceError::Unauthorized("Authentication required".to_string()).into_response(),
    }
}

/// Router sugar for protecting route groups.
pub trait AuthRouterExt {
    fn with_auth(self, state: AppState) -> Self;
    fn with_role(self, role: &'static str, state: AppState) -> Self;
}

impl AuthRouterExt for Router<AppState> {
    fn with_auth(self, state: AppState) -> Self {
        self.route_layer(middleware::from_fn_with_state(state, auth_middleware))
    }

    fn with_role(self, role: &'static str, state: AppState) -> Self {
        self.route_layer(middleware::from_fn(move |request: Request, next: Next| {
            require_role(role, request, next)
        }))
        .with_auth(state)
    }
}

pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route(
            "/me",
            get(me_handler).route_layer(middleware::from_fn_with_state(state, auth_middleware)),
        )
}

async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ServiceError> {
    Ok(Json(state.auth.login(request).await?))
}

async fn me_handler(user: AuthUser) -> Json<AuthUser> {
    Json(user)
}
