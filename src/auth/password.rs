//! Password hashing with Argon2id (PHC string format).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use super::AuthError;

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Crypto(format!("hash error: {e}")))
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("P4$$w0rd").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("P4$$w0rd", &hash).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("P4$$w0rd").unwrap();
        assert!(!verify_password("password", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_a_fresh_salt() {
        assert_ne!(hash_password("secret12").unwrap(), hash_password("secret12").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(verify_password("x", "not-a-phc-string"), Err(AuthError::Crypto(_))));
    }
}
