pub mod secret;

pub use secret::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Malformed stored secret: expected base64(salt)$base64(hash)")]
    MalformedSecretHash,
}
