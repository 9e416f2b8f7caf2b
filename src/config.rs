use std::env;
use std::fmt;
use std::str::FromStr;

use argon2::Params;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::consts::{
    BCRYPT_DEFAULT_COST, ENV_ALGORITHM, ENV_ARGON2_MEMORY_COST, ENV_ARGON2_PARALLELISM,
    ENV_ARGON2_TIME_COST, ENV_BCRYPT_COST,
};
use crate::error::{Error, Result};

/// Hashing scheme used for newly produced hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Argon2id,
    Bcrypt,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Argon2id => "argon2id",
            Algorithm::Bcrypt => "bcrypt",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "argon2id" | "argon2" => Ok(Algorithm::Argon2id),
            "bcrypt" => Ok(Algorithm::Bcrypt),
            other => Err(Error::Config(format!("unknown algorithm '{other}'"))),
        }
    }
}

/// Argon2id cost parameters. `memory_cost` is in KiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2Config {
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: Params::DEFAULT_M_COST,
            time_cost: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl Argon2Config {
    pub(crate) fn params(&self) -> Result<Params> {
        Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|e| Error::Config(format!("argon2 parameters rejected: {e}")))
    }
}

/// Settings for a [`CredentialHelper`](crate::CredentialHelper).
///
/// Cost factors are deployment tuning: raise them as hardware gets faster and
/// use [`CredentialHelper::needs_rehash`](crate::CredentialHelper::needs_rehash)
/// to migrate stored hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    pub algorithm: Algorithm,
    pub bcrypt_cost: u32,
    pub argon2: Argon2Config,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            bcrypt_cost: BCRYPT_DEFAULT_COST,
            argon2: Argon2Config::default(),
        }
    }
}

impl HasherConfig {
    pub fn argon2id(argon2: Argon2Config) -> Self {
        Self {
            algorithm: Algorithm::Argon2id,
            argon2,
            ..Self::default()
        }
    }

    pub fn bcrypt(cost: u32) -> Self {
        Self {
            algorithm: Algorithm::Bcrypt,
            bcrypt_cost: cost,
            ..Self::default()
        }
    }

    /// Reads the configuration from the process environment, after loading
    /// a `.env` file if one is present. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            algorithm: read_env(ENV_ALGORITHM)?.unwrap_or(defaults.algorithm),
            bcrypt_cost: read_env(ENV_BCRYPT_COST)?.unwrap_or(defaults.bcrypt_cost),
            argon2: Argon2Config {
                memory_cost: read_env(ENV_ARGON2_MEMORY_COST)?
                    .unwrap_or(defaults.argon2.memory_cost),
                time_cost: read_env(ENV_ARGON2_TIME_COST)?.unwrap_or(defaults.argon2.time_cost),
                parallelism: read_env(ENV_ARGON2_PARALLELISM)?
                    .unwrap_or(defaults.argon2.parallelism),
            },
        };

        debug!("Loaded hasher configuration from environment: {:?}", config);
        Ok(config)
    }
}

fn read_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("{key}={value:?}: {e}"))),
        Err(env::VarError::NotPresent) => {
            trace!("{key} not set, using default");
            Ok(None)
        }
        Err(e) => Err(Error::Config(format!("{key}: {e}"))),
    }
}
