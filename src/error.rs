use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The plaintext cannot be turned into the byte form the primitive accepts.
    #[error("Password cannot be encoded: {0}")]
    Encoding(String),

    /// The plaintext exceeds what the primitive can hash without truncating it.
    #[error("Password is {len} bytes long, the maximum supported is {max}")]
    Length { len: usize, max: usize },

    /// The stored hash cannot be parsed into algorithm, parameters, salt and digest.
    #[error("Malformed password hash: {0}")]
    MalformedHash(String),

    #[error("Invalid hasher configuration: {0}")]
    Config(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl From<std::str::Utf8Error> for Error {
    fn from(error: std::str::Utf8Error) -> Self {
        Error::Encoding(format!("not valid UTF-8 ({error})"))
    }
}
