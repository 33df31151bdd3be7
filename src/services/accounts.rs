//! # 계정(User Store) 서비스
//!
//! 사용자 생성 규칙과 비밀번호 처리를 한곳에 모읍니다.
//! HTTP 회원가입(`routes::auth::register`)과 CLI(`create-superuser`)가
//! 모두 이 모듈을 거쳐 사용자를 만듭니다.
//!
//! 규칙:
//! - 이메일은 필수이며, 저장 전에 전체를 소문자로 정규화합니다.
//! - 이미 사용 중인 이메일이면 검증 에러입니다.
//! - 비밀번호는 Argon2id 해시로만 저장합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sqlx::SqlitePool;

use crate::db::users as db_users;
use crate::error::AppError;
use crate::models::user::{User, UserExtra};

/// 이메일 정규화: 앞뒤 공백 제거 후 전체 소문자
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 일반 사용자를 생성합니다.
///
/// `email`이 `None`이거나 공백뿐이면 `email` 필드 검증 에러를 반환합니다.
pub async fn create_user(
    pool: &SqlitePool,
    email: Option<&str>,
    password: &str,
    extra: UserExtra,
) -> Result<User, AppError> {
    let email = email.map(normalize_email).unwrap_or_default();
    if email.is_empty() {
        return Err(AppError::field("email", "Users must have an email address"));
    }

    if db_users::find_by_email(pool, &email).await?.is_some() {
        return Err(duplicate_email());
    }

    let password_hash = hash_password(password)?;
    // 사전 확인과 INSERT 사이에 같은 이메일이 먼저 들어오면 UNIQUE 제약이 걸립니다.
    let user = match db_users::create_user(pool, &email, &password_hash, &extra).await {
        Err(AppError::Database(sqlx::Error::Database(e))) if e.is_unique_violation() => {
            return Err(duplicate_email());
        }
        result => result?,
    };

    tracing::info!(user_id = user.id, "Created user");
    Ok(user)
}

/// 관리자(superuser)를 생성합니다. staff/superuser 플래그가 켜진 채로 한 번에 저장됩니다.
pub async fn create_superuser(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let extra = UserExtra {
        is_staff: true,
        is_superuser: true,
        ..UserExtra::default()
    };
    let user = create_user(pool, Some(email), password, extra).await?;

    tracing::info!(user_id = user.id, "Created superuser");
    Ok(user)
}

fn duplicate_email() -> AppError {
    AppError::field("email", "User with this email already exists.")
}

/// 이메일/비밀번호로 사용자를 확인합니다.
///
/// 존재하지 않는 사용자, 틀린 비밀번호, 비활성 계정은 모두 같은 401 메시지를 씁니다.
pub async fn authenticate(pool: &SqlitePool, email: &str, password: &str) -> Result<User, AppError> {
    let invalid = || AppError::Unauthorized("Unable to authenticate with provided credentials".to_string());

    let user = db_users::find_by_email(pool, &normalize_email(email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(password, &user.password_hash)? || !user.is_active {
        return Err(invalid());
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_lowercased_and_trimmed() {
        assert_eq!(normalize_email(" test@LONDONAPPDEV.COM "), "test@londonappdev.com");
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("Testpass123").unwrap();
        assert!(verify_password("Testpass123", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
        assert_ne!(hash, "Testpass123");
    }
}
