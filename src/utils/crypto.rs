use std::fmt;

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm as Argon2Algorithm, Argon2, Params, Version,
};
use bcrypt::BcryptError;
use log::{debug, trace, warn};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::config::{Algorithm, HasherConfig};
use crate::consts::{
    ARGON2_MAX_PASSWORD_LENGTH, ARGON2_VERIFY_MAX_MEMORY_COST, ARGON2_VERIFY_MAX_PARALLELISM,
    ARGON2_VERIFY_MAX_TIME_COST, BCRYPT_CURRENT_VERSION, BCRYPT_MAX_COST,
    BCRYPT_MAX_PASSWORD_LENGTH, BCRYPT_MIN_COST, BCRYPT_PREFIXES, BCRYPT_VERIFY_MAX_COST,
};
use crate::error::{Error, Result};

/// A self-describing password hash: algorithm, cost parameters, salt and
/// digest in a single ASCII string. Store it as-is; never build one by hand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for HashedPassword {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<String> for HashedPassword {
    fn from(hash: String) -> Self {
        Self(hash)
    }
}

impl fmt::Display for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Scheme of a stored hash, read from its prefix
enum Scheme<'a> {
    Bcrypt,
    Argon2(PasswordHash<'a>),
}

impl<'a> Scheme<'a> {
    fn detect(hash: &'a str) -> Result<Self> {
        if BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix)) {
            return Ok(Scheme::Bcrypt);
        }

        let parsed = PasswordHash::new(hash).map_err(|e| Error::MalformedHash(e.to_string()))?;
        Argon2Algorithm::new(parsed.algorithm.as_str()).map_err(|_| {
            Error::MalformedHash(format!("unsupported algorithm '{}'", parsed.algorithm))
        })?;

        Ok(Scheme::Argon2(parsed))
    }
}

/// Hashes and verifies passwords with a fixed configuration.
///
/// Holds no mutable state, so one instance can be shared across threads.
/// Hashing is deliberately slow; async callers should run it on a blocking
/// worker pool.
#[derive(Debug, Clone)]
pub struct CredentialHelper {
    config: HasherConfig,
    params: Params,
}

impl Default for CredentialHelper {
    fn default() -> Self {
        Self {
            config: HasherConfig::default(),
            params: Params::default(),
        }
    }
}

impl CredentialHelper {
    pub fn new(config: HasherConfig) -> Result<Self> {
        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&config.bcrypt_cost) {
            return Err(Error::Config(format!(
                "bcrypt cost {} outside {BCRYPT_MIN_COST}..={BCRYPT_MAX_COST}",
                config.bcrypt_cost
            )));
        }
        let params = config.argon2.params()?;

        debug!("Password hasher ready ({})", config.algorithm);
        Ok(Self { config, params })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(HasherConfig::from_env()?)
    }

    pub fn config(&self) -> &HasherConfig {
        &self.config
    }

    /// Hashes `password` (UTF-8) with a fresh random salt. Two calls with the
    /// same input never return the same hash.
    ///
    /// Fails with [`Error::Length`] instead of truncating input the algorithm
    /// cannot take whole, and with [`Error::Encoding`] for a NUL byte under bcrypt.
    pub fn hash(&self, password: &str) -> Result<HashedPassword> {
        trace!("Hashing password with {}", self.config.algorithm);

        let hash = match self.config.algorithm {
            Algorithm::Bcrypt => {
                check_bcrypt_input(password)?;
                bcrypt::hash(password, self.config.bcrypt_cost)
                    .map_err(|e| Error::Hashing(e.to_string()))?
            }
            Algorithm::Argon2id => {
                check_length(password, ARGON2_MAX_PASSWORD_LENGTH)?;
                let salt = SaltString::generate(&mut OsRng);
                self.argon2()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| Error::Hashing(e.to_string()))?
                    .to_string()
            }
        };

        Ok(HashedPassword(hash))
    }

    /// Same as [`hash`](Self::hash) for a plaintext received as raw bytes.
    pub fn hash_bytes(&self, password: &[u8]) -> Result<HashedPassword> {
        self.hash(std::str::from_utf8(password)?)
    }

    /// Checks `password` against a stored hash of either supported scheme.
    ///
    /// A wrong password is `Ok(false)`. A hash that cannot be parsed, or whose
    /// embedded cost exceeds the verification ceiling (the `*_VERIFY_MAX_*`
    /// limits, raised to this helper's own settings when those are higher), is
    /// [`Error::MalformedHash`]; use [`is_valid`](Self::is_valid) to treat it as
    /// a mismatch.
    pub fn verify(&self, hash: impl AsRef<[u8]>, password: &str) -> Result<bool> {
        let hash = std::str::from_utf8(hash.as_ref())
            .map_err(|_| Error::MalformedHash("hash is not valid UTF-8".into()))?;

        match Scheme::detect(hash)? {
            Scheme::Bcrypt => {
                let (_, cost) = bcrypt_version_and_cost(hash)?;
                self.check_bcrypt_ceiling(cost)?;
                if check_bcrypt_input(password).is_err() {
                    trace!("Candidate cannot have been hashed by bcrypt");
                    return Ok(false);
                }
                bcrypt::verify(password, hash).map_err(malformed_bcrypt)
            }
            Scheme::Argon2(parsed) => {
                let params = Params::try_from(&parsed)
                    .map_err(|e| Error::MalformedHash(e.to_string()))?;
                self.check_argon2_ceiling(&params)?;
                match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                    Ok(()) => Ok(true),
                    Err(password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(Error::MalformedHash(e.to_string())),
                }
            }
        }
    }

    /// Evaluates to true only if `password` matches the hash; any error,
    /// including a malformed hash, evaluates to false.
    pub fn is_valid(&self, hash: impl AsRef<[u8]>, password: &str) -> bool {
        self.verify(hash, password).unwrap_or_else(|e| {
            warn!("Password verification failed: {e}");
            false
        })
    }

    /// Whether a stored hash should be replaced by a fresh [`hash`](Self::hash)
    /// of the same password, because it uses another algorithm or other cost
    /// parameters than this helper.
    pub fn needs_rehash(&self, hash: impl AsRef<[u8]>) -> Result<bool> {
        let hash = std::str::from_utf8(hash.as_ref())
            .map_err(|_| Error::MalformedHash("hash is not valid UTF-8".into()))?;

        let outdated = match (Scheme::detect(hash)?, self.config.algorithm) {
            (Scheme::Bcrypt, Algorithm::Bcrypt) => {
                let (version, cost) = bcrypt_version_and_cost(hash)?;
                version != BCRYPT_CURRENT_VERSION || cost != self.config.bcrypt_cost
            }
            (Scheme::Argon2(parsed), Algorithm::Argon2id) => {
                let params = Params::try_from(&parsed)
                    .map_err(|e| Error::MalformedHash(e.to_string()))?;
                parsed.algorithm.as_str() != Argon2Algorithm::Argon2id.as_str()
                    || parsed.version.unwrap_or(Version::V0x13 as u32) != Version::V0x13 as u32
                    || params.m_cost() != self.params.m_cost()
                    || params.t_cost() != self.params.t_cost()
                    || params.p_cost() != self.params.p_cost()
            }
            _ => true,
        };

        if outdated {
            debug!("Stored hash does not match current {} settings", self.config.algorithm);
        }
        Ok(outdated)
    }

    fn check_bcrypt_ceiling(&self, cost: u32) -> Result<()> {
        let max = BCRYPT_VERIFY_MAX_COST.max(self.config.bcrypt_cost);
        if cost > max {
            return Err(Error::MalformedHash(format!("bcrypt cost {cost} above {max}")));
        }
        Ok(())
    }

    fn check_argon2_ceiling(&self, params: &Params) -> Result<()> {
        let max_memory = ARGON2_VERIFY_MAX_MEMORY_COST.max(self.params.m_cost());
        let max_time = ARGON2_VERIFY_MAX_TIME_COST.max(self.params.t_cost());
        let max_parallelism = ARGON2_VERIFY_MAX_PARALLELISM.max(self.params.p_cost());
        let limits = [
            ("memory", params.m_cost(), max_memory),
            ("time", params.t_cost(), max_time),
            ("parallelism", params.p_cost(), max_parallelism),
        ];
        for (name, value, max) in limits {
            if value > max {
                return Err(Error::MalformedHash(format!("argon2 {name} cost {value} above {max}")));
            }
        }
        Ok(())
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Argon2Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

// Rejects input the primitive would otherwise truncate
fn check_length(password: &str, max: usize) -> Result<()> {
    if password.len() > max {
        return Err(Error::Length { len: password.len(), max });
    }
    Ok(())
}

// bcrypt takes at most 72 bytes and reads its input as a C string
fn check_bcrypt_input(password: &str) -> Result<()> {
    check_length(password, BCRYPT_MAX_PASSWORD_LENGTH)?;
    if password.contains('\0') {
        return Err(Error::Encoding("bcrypt input cannot contain NUL bytes".into()));
    }
    Ok(())
}

// `$<version>$<cost>$<salt+digest>`
fn bcrypt_version_and_cost(hash: &str) -> Result<(&str, u32)> {
    let mut fields = hash.split('$').skip(1);
    let version = fields.next().unwrap_or_default();
    let cost = fields
        .next()
        .and_then(|cost| cost.parse().ok())
        .ok_or_else(|| Error::MalformedHash("bcrypt cost missing".into()))?;
    Ok((version, cost))
}

// bcrypt errors echo the hash they failed on; keep only the category
fn malformed_bcrypt(error: BcryptError) -> Error {
    let category = match error {
        BcryptError::InvalidCost(_) | BcryptError::CostNotAllowed(_) => "invalid bcrypt cost",
        BcryptError::InvalidPrefix(_) => "invalid bcrypt prefix",
        BcryptError::InvalidSaltLen(_) => "invalid bcrypt salt length",
        BcryptError::InvalidBase64(_) => "invalid bcrypt base64 encoding",
        _ => "invalid bcrypt hash",
    };
    Error::MalformedHash(category.into())
}
