use aide::axum::ApiRouter;
use argon2rs::argon2i_simple;
use base64::engine::general_purpose;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::database::AppState;
use crate::error::{ServiceError, ServiceResult};

pub mod accounts;
pub mod appointments;
pub mod attachments;
pub mod auth;
pub mod crud;
pub mod departments;
pub mod medical_rooms;
pub mod positions;
pub mod register;
pub mod roles;
pub mod shift_workings;
pub mod staff;
pub mod users;

const PASSWORD_SALT_LENGTH: usize = 16;

pub fn init(app_state: AppState) -> ApiRouter {
    ApiRouter::new()
        .merge(auth::router(app_state.clone()))
        .merge(register::router(app_state.clone()))
        .merge(accounts::router(app_state.clone()))
        .merge(roles::router(app_state.clone()))
        .merge(positions::router(app_state.clone()))
        .merge(departments::router(app_state.clone()))
        .merge(medical_rooms::router(app_state.clone()))
        .merge(staff::router(app_state.clone()))
        .merge(users::router(app_state.clone()))
        .merge(shift_workings::router(app_state.clone()))
        .merge(appointments::router(app_state.clone()))
        .merge(attachments::router(app_state))
}

/// Hashes `password` with argon2i and a random salt, the result has the form `<salt>$<hash>`.
pub fn password_hash_create(password: &str) -> ServiceResult<String> {
    if password.is_empty() {
        return Err(ServiceError::BadRequest(
            "Empty password",
            "Password should not be empty".to_owned(),
        ));
    }

    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PASSWORD_SALT_LENGTH)
        .map(char::from)
        .collect();
    let hash = argon2i_simple(password, &salt);

    Ok(format!("{}${}", salt, general_purpose::STANDARD.encode(hash)))
}

pub fn password_hash_verify(hash: &str, password: &str) -> ServiceResult<bool> {
    if password.is_empty() {
        return Ok(false);
    }

    let (salt, encoded) = hash.split_once('$').ok_or_else(|| {
        ServiceError::InternalServerError("Stored password hash has an invalid format".to_owned())
    })?;
    let expected = general_purpose::STANDARD.decode(encoded).map_err(|_| {
        ServiceError::InternalServerError("Could not decode stored password hash".to_owned())
    })?;
    let actual = argon2i_simple(password, salt);

    Ok(constant_time_eq(&expected, &actual))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = password_hash_create("correct horse").unwrap();
        let (salt, _) = hash.split_once('$').unwrap();
        assert_eq!(salt.len(), PASSWORD_SALT_LENGTH);

        assert!(password_hash_verify(&hash, "correct horse").unwrap());
        assert!(!password_hash_verify(&hash, "battery staple").unwrap());
        assert!(!password_hash_verify(&hash, "").unwrap());
    }

    #[test]
    fn test_password_hashes_are_salted() {
        let a = password_hash_create("secret").unwrap();
        let b = password_hash_create("secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_passwords_and_hashes() {
        assert!(matches!(
            password_hash_create(""),
            Err(ServiceError::BadRequest(_, _))
        ));
        assert!(matches!(
            password_hash_verify("no separator", "secret"),
            Err(ServiceError::InternalServerError(_))
        ));
    }
}
