use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Server URL is not an `http://` or `https://` URL.
    #[error("invalid server url: {0}")]
    InvalidServer(String),
}
