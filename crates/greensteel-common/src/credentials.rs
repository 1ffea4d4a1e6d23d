//! Credential hashing for seeded accounts.
//!
//! Fixture accounts are stored with a real Argon2id hash so the rows look exactly like
//! ones written by the registration flow. Nothing here verifies passwords.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};

use crate::error::DbCheckError;

/// Hash a password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, DbCheckError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbCheckError::Credential {
            message: e.to_string(),
        })
}
