use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("'{0}' is not a valid directory")]
    NotADirectoryError(String),

    #[error("SSH address must be in format username@hostname[:port]: {0}")]
    InvalidAddressError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Git Clone Error: {0}")]
    CloneError(String),

    #[error("Connection failed: {0}")]
    ConnectionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Clipboard initialization failed: {0}")]
    ClipboardInitError(String),

    #[error("Clipboard write failed: {0}")]
    ClipboardWriteError(String),

    #[error("Tokenizer Error: {0}")]
    TokenizerError(String),
}
