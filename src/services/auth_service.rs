//! Servicio de autenticación
//!
//! Hash de contraseñas con bcrypt y alta del usuario administrador inicial.

use bcrypt::{hash, verify};
use tracing::info;

use crate::config::environment::EnvironmentConfig;
use crate::models::user::{NewUser, User, UserRole};
use crate::repositories::UserRepository;
use crate::utils::errors::AppResult;

pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    Ok(hash(password, cost)?)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    Ok(verify(password, password_hash)?)
}

/// Normaliza un email para búsqueda y almacenamiento
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Crea el administrador de `ADMIN_EMAIL` / `ADMIN_PASSWORD` si aún no existe
pub async fn ensure_admin_user(
    users: &dyn UserRepository,
    config: &EnvironmentConfig,
) -> AppResult<Option<User>> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(None);
    };
    let email = normalize_email(email);

    if let Some(existing) = users.find_by_email(&email).await? {
        return Ok(Some(existing));
    }

    let admin = users
        .create(NewUser {
            display_name: email.split('@').next().unwrap_or("admin").to_string(),
            email,
            password_hash: hash_password(password, config.bcrypt_cost)?,
            role: UserRole::Admin,
        })
        .await?;

    info!("👤 Usuario administrador creado: {}", admin.email);
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryUserRepository;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("segredo123", 4).unwrap();
        assert!(verify_password("segredo123", &hashed).unwrap());
        assert!(!verify_password("outra", &hashed).unwrap());
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let users = InMemoryUserRepository::new();
        let config = EnvironmentConfig {
            admin_email: Some(" Admin@Frota.com ".into()),
            admin_password: Some("segredo123".into()),
            bcrypt_cost: 4,
            ..EnvironmentConfig::default()
        };

        let first = ensure_admin_user(&users, &config).await.unwrap().unwrap();
        let second = ensure_admin_user(&users, &config).await.unwrap().unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.email, "admin@frota.com");
        assert_eq!(first.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_no_admin_without_credentials() {
        let users = InMemoryUserRepository::new();
        let created = ensure_admin_user(&users, &EnvironmentConfig::default()).await.unwrap();
        assert!(created.is_none());
    }
}
