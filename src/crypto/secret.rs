//! One-way secret hashing for stored credentials.
//!
//! Secrets never land in the store in clear. Each one is run through
//! PBKDF2-SHA256 under a fresh random salt, and the salt plus derived
//! hash are encoded together as `base64(salt)$base64(hash)`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::CryptoError;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const SALT_LENGTH: usize = 32;
pub const HASH_LENGTH: usize = 32;

/// Hash a secret under a fresh random salt.
pub fn hash_secret(secret: &str) -> String {
    let salt = generate_salt();
    let mut derived = derive(secret, &salt);
    let encoded = format!("{}${}", STANDARD.encode(salt), STANDARD.encode(derived));
    derived.zeroize();
    encoded
}

/// Check a candidate secret against a stored `salt$hash` encoding.
/// The hash comparison is constant time.
pub fn verify_secret(secret: &str, stored: &str) -> Result<bool, CryptoError> {
    let (salt_b64, hash_b64) = stored
        .split_once('$')
        .ok_or(CryptoError::MalformedSecretHash)?;

    let salt_bytes = STANDARD
        .decode(salt_b64)
        .map_err(|_| CryptoError::MalformedSecretHash)?;
    let salt: [u8; SALT_LENGTH] = salt_bytes
        .try_into()
        .map_err(|_| CryptoError::MalformedSecretHash)?;

    let expected = STANDARD
        .decode(hash_b64)
        .map_err(|_| CryptoError::MalformedSecretHash)?;
    if expected.len() != HASH_LENGTH {
        return Err(CryptoError::MalformedSecretHash);
    }

    let mut derived = derive(secret, &salt);
    let matches = derived.ct_eq(&expected).unwrap_u8() == 1;
    derived.zeroize();
    Ok(matches)
}

/// Run a full derivation against a fixed salt and discard the result.
///
/// Callers that fail to resolve a username still burn the same KDF cost
/// as a real verification, so timing does not reveal whether the
/// username or the secret was wrong.
pub fn dummy_verify(secret: &str) {
    let mut derived = derive(secret, &[0u8; SALT_LENGTH]);
    derived.zeroize();
}

/// Derive hash bytes from secret + salt using PBKDF2-SHA256
fn derive(secret: &str, salt: &[u8; SALT_LENGTH]) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, PBKDF2_ITERATIONS, &mut out);
    out
}

/// Generate a cryptographically random salt
fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
