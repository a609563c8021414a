//! Argon2id password storage. Stored values are PHC strings, so the
//! algorithm, parameters and salt travel with the hash.
use argon2::Argon2;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::password_hash::SaltString;
use rand::Rng;

const SALT_BYTES: usize = 16;

/// Salted Argon2id hash in PHC string form.
pub fn hash(password: &str) -> anyhow::Result<String> {
    let mut bytes = [0u8; SALT_BYTES];
    rand::rng().fill(&mut bytes);
    let salt = SaltString::encode_b64(&bytes).map_err(|e| anyhow::anyhow!("salt: {}", e))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hashing: {}", e))?;
    Ok(phc.to_string())
}

/// False for a wrong password. A stored value that is not a PHC string
/// never verifies and is logged.
pub fn verify(password: &str, stored: &str) -> bool {
    let Ok(phc) = PasswordHash::new(stored) else {
        log::warn!("stored password hash is not a PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &phc)
        .is_ok()
}
