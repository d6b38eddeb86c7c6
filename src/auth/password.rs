use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{error, instrument};

use super::AuthError;

/// Hashes a plain-text password with Argon2 default parameters.
#[instrument(skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.is_empty() {
        return Err(AuthError::InternalError(
            "Password cannot be empty for hashing".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "Argon2 password hashing failed");
            AuthError::InternalError(format!("Password hashing failed: {}", e))
        })
}

/// Checks `password` against a stored PHC hash string. A malformed hash is an
/// error; a mismatch is `Ok(false)`.
#[instrument(skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, password: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "Stored password hash is malformed");
        AuthError::InternalError("Stored password hash is malformed".to_string())
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::InternalError(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}
