use std::io;

use thiserror::Error;

/// Top-level error type for the pagesum binary.
#[derive(Debug, Error)]
pub enum PagesumError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Page source error: {0}")]
  Source(String),

  #[error("Content extraction error: {0}")]
  Extract(String),

  #[error("Summarization API error: {0}")]
  Api(String),

  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("TOML error: {0}")]
  Toml(#[from] toml::de::Error),
}

/// Convenience alias used across the binary.
pub type Result<T> = std::result::Result<T, PagesumError>;
