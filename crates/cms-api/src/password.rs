use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString, rand_core::OsRng},
};

/// Bytes beyond this length are ignored when hashing and verifying, so
/// passwords that share their first 72 bytes are interchangeable.
pub const MAX_PASSWORD_BYTES: usize = 72;

fn truncate(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
}

/// Hashes with Argon2id and a fresh random salt, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(truncate(password), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, password_hash::Error> {
    let parsed = PasswordHash::new(stored_hash)?;
    match Argon2::default().verify_password(truncate(password), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifies() {
        let a = hash_password("hunter22").unwrap();
        let b = hash_password("hunter22").unwrap();

        assert_ne!(a, "hunter22");
        assert_ne!(a, b);
        assert!(verify_password("hunter22", &a).unwrap());
        assert!(verify_password("hunter22", &b).unwrap());
    }

    #[test]
    fn wrong_password_fails() {
        let hash = hash_password("correct horse").unwrap();
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn bytes_past_limit_are_ignored() {
        let base = "p".repeat(MAX_PASSWORD_BYTES);
        let hash = hash_password(&format!("{base}one")).unwrap();
        assert!(verify_password(&format!("{base}two"), &hash).unwrap());
        assert!(!verify_password(&base[1..], &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }
}
