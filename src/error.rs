//! Error types for the library side.  The binary wraps these in `anyhow`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode store: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("invalid store key {0:?}")]
    InvalidKey(String),
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to read layout {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid layout: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate element id {0:?}")]
    DuplicateId(String),
    #[error("element {child:?} names unknown parent {parent:?}")]
    UnknownParent { child: String, parent: String },
    #[error("invalid {attr} value {value:?}")]
    BadAttribute { attr: &'static str, value: String },
    #[error("viewport must be positive, got {width}x{height}")]
    BadViewport { width: f64, height: f64 },
}
