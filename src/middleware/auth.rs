//! Middleware de autenticación JWT
//!
//! Este módulo verifica el token de cada request y deja un
//! `SessionContext` explícito en las extensions. No hay sesión global:
//! los handlers lo reciben como extractor.

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::{
    models::financial_entry::FinancialEntry,
    models::user::UserRole,
    state::AppState,
    utils::errors::AppError,
    utils::jwt::{extract_token_from_header, timestamp_to_datetime, verify_token, JwtClaims},
};

/// Identidad verificada de una request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn from_claims(claims: &JwtClaims) -> Result<Self, AppError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("ID de usuario inválido".to_string()))?;

        Ok(Self {
            user_id,
            email: claims.email.clone(),
            role: claims.role,
            issued_at: timestamp_to_datetime(claims.iat)?,
            expires_at: timestamp_to_datetime(claims.exp)?,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Aún válida pero dentro de la ventana de renovación
    pub fn needs_renewal(&self, now: DateTime<Utc>, window: Duration) -> bool {
        !self.is_expired(now) && self.expires_at - now <= window
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Solo el autor o un admin editan un registro financiero
    pub fn can_edit_entry(&self, entry: &FinancialEntry) -> bool {
        self.is_admin() || entry.created_user_id == self.user_id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Sesión requerida".to_string()))
    }
}

/// Middleware de autenticación JWT
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt)?;
    let mut session = SessionContext::from_claims(&claims)?;

    // Verificar que el usuario sigue existiendo; el rol vigente es el de la base
    let user = state
        .users
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado".to_string()))?;
    session.role = user.role;

    debug!("🔑 Sesión de {} ({})", session.email, session.role.as_str());
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::financial_entry::EntryType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn session(role: UserRole, expires_in: Duration) -> SessionContext {
        let now = Utc::now();
        SessionContext {
            user_id: Uuid::new_v4(),
            email: "motorista@frota.com".to_string(),
            role,
            issued_at: now,
            expires_at: now + expires_in,
        }
    }

    fn entry_by(user_id: Uuid) -> FinancialEntry {
        FinancialEntry {
            id: Uuid::new_v4(),
            truck_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            entry_type: EntryType::Expense,
            category: "Pedágio".to_string(),
            amount: Decimal::from(12),
            liters_filled: None,
            odometer_reading: None,
            description: None,
            created_user_id: user_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_expiry_and_renewal_window() {
        let s = session(UserRole::User, Duration::minutes(5));
        let now = Utc::now();
        assert!(!s.is_expired(now));
        assert!(s.needs_renewal(now, Duration::minutes(10)));
        assert!(!s.needs_renewal(now, Duration::minutes(1)));
        assert!(s.is_expired(now + Duration::minutes(6)));
        assert!(!s.needs_renewal(now + Duration::minutes(6), Duration::minutes(10)));
    }

    #[test]
    fn test_entry_edit_permission() {
        let user = session(UserRole::User, Duration::hours(1));
        let admin = session(UserRole::Admin, Duration::hours(1));

        let own = entry_by(user.user_id);
        let foreign = entry_by(Uuid::new_v4());

        assert!(user.can_edit_entry(&own));
        assert!(!user.can_edit_entry(&foreign));
        assert!(admin.can_edit_entry(&foreign));
    }

    #[test]
    fn test_from_claims_rejects_bad_subject() {
        let claims = JwtClaims {
            sub: "not-a-uuid".into(),
            email: "x@y.com".into(),
            role: UserRole::User,
            iat: 0,
            exp: 60,
        };
        assert!(SessionContext::from_claims(&claims).is_err());
    }
}
