pub const BCRYPT_DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;
pub const BCRYPT_MIN_COST: u32 = 4;
pub const BCRYPT_MAX_COST: u32 = 31;
pub const BCRYPT_MAX_PASSWORD_LENGTH: usize = 72;
pub const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];
pub const BCRYPT_CURRENT_VERSION: &str = "2b";
// Highest cost accepted from a stored hash, unless the helper is configured higher
pub const BCRYPT_VERIFY_MAX_COST: u32 = 16;

pub const ARGON2_MAX_PASSWORD_LENGTH: usize = argon2::MAX_PWD_LEN;
// Highest parameters accepted from a stored hash, unless the helper is configured higher
pub const ARGON2_VERIFY_MAX_MEMORY_COST: u32 = 256 * 1024;
pub const ARGON2_VERIFY_MAX_TIME_COST: u32 = 16;
pub const ARGON2_VERIFY_MAX_PARALLELISM: u32 = 16;

pub const ENV_ALGORITHM: &str = "PASSWORD_HASH_ALGORITHM";
pub const ENV_BCRYPT_COST: &str = "PASSWORD_HASH_BCRYPT_COST";
pub const ENV_ARGON2_MEMORY_COST: &str = "PASSWORD_HASH_ARGON2_MEMORY_COST";
pub const ENV_ARGON2_TIME_COST: &str = "PASSWORD_HASH_ARGON2_TIME_COST";
pub const ENV_ARGON2_PARALLELISM: &str = "PASSWORD_HASH_ARGON2_PARALLELISM";
