use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("content is not valid {encoding} (invalid byte sequence at offset {offset})")]
    Decode { encoding: String, offset: usize },

    #[error("no decoder available for encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("{0}")]
    Other(String),
}
