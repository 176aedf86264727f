use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

use crate::dto::auth_dto::{SessionResponse, TokenResponse};
use crate::middleware::auth::SessionContext;
use crate::models::user::{LoginRequest, User, UserResponse};
use crate::repositories::UserRepository;
use crate::services::auth_service::{normalize_email, verify_password};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

pub struct AuthController {
    users: Arc<dyn UserRepository>,
    jwt: JwtConfig,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Credenciales inválidas".to_string())
}

impl AuthController {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtConfig) -> Self {
        Self { users, jwt }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("🔒 Login rechazado para {}", email);
            return Err(invalid_credentials());
        };

        if !verify_password(&request.password, &user.password_hash)? {
            warn!("🔒 Contraseña incorrecta para {}", email);
            return Err(invalid_credentials());
        }

        self.users.record_login(user.id).await?;
        info!("✅ Login exitoso: {}", user.email);

        self.issue(user)
    }

    /// Emite un token nuevo para una sesión todavía válida
    pub async fn refresh(&self, session: &SessionContext) -> AppResult<TokenResponse> {
        if session.is_expired(Utc::now()) {
            return Err(AppError::Unauthorized("Sesión expirada".to_string()));
        }

        let user = self.current_user(session).await?;
        info!("🔄 Token renovado para {}", user.email);
        self.issue(user)
    }

    pub async fn me(&self, session: &SessionContext) -> AppResult<SessionResponse> {
        let user = self.current_user(session).await?;

        Ok(SessionResponse {
            user: UserResponse::from(user),
            issued_at: session.issued_at,
            expires_at: session.expires_at,
            needs_renewal: session.needs_renewal(Utc::now(), self.jwt.renewal_window),
        })
    }

    async fn current_user(&self, session: &SessionContext) -> AppResult<User> {
        self.users
            .find_by_id(session.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado".to_string()))
    }

    fn issue(&self, user: User) -> AppResult<TokenResponse> {
        let issued = generate_token(&user, &self.jwt, Utc::now())?;

        Ok(TokenResponse {
            token: issued.token,
            token_type: "Bearer",
            expires_at: issued.expires_at,
            user: UserResponse::from(user),
        })
    }
}
