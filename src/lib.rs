//! Salted password hashing and verification.
//!
//! Hashes are self-describing strings (PHC format for Argon2id, `$2b$` for
//! bcrypt) carrying the algorithm, cost parameters and salt next to the
//! digest, so nothing besides the hash itself needs to be stored.
//!
//! ```no_run
//! let hash = pwcred::hash_password("Tr0ub4dor&3")?;
//! assert!(pwcred::is_valid(&hash, "Tr0ub4dor&3"));
//! assert!(!pwcred::is_valid(&hash, "tr0ub4dor&3"));
//! # Ok::<(), pwcred::Error>(())
//! ```

mod config;
mod consts;
mod error;
mod utils;

use log::info;
use once_cell::sync::Lazy;

pub use config::{Algorithm, Argon2Config, HasherConfig};
pub use consts::{ARGON2_MAX_PASSWORD_LENGTH, BCRYPT_MAX_PASSWORD_LENGTH};
pub use error::{Error, Result};
pub use utils::crypto::{CredentialHelper, HashedPassword};

static DEFAULT_HELPER: Lazy<CredentialHelper> = Lazy::new(|| {
    info!("Init default password hasher");
    CredentialHelper::default()
});

/// Hashes `password` with Argon2id, default parameters and a fresh salt.
pub fn hash_password(password: &str) -> Result<HashedPassword> {
    DEFAULT_HELPER.hash(password)
}

/// Checks `password` against a hash produced by [`hash_password`] or by any
/// [`CredentialHelper`]. Malformed hashes evaluate to false.
pub fn is_valid(hashed_password: impl AsRef<[u8]>, password: &str) -> bool {
    DEFAULT_HELPER.is_valid(hashed_password, password)
}
