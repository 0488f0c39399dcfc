//! Error types, one enum per concern, folded into [`Error`].

use std::path::PathBuf;

/// Top-level error returned by the command handler.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("barcode error: {0}")]
    Ean13(#[from] Ean13Error),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("print error: {0}")]
    Print(#[from] PrintError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Empty or missing product name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct InvalidInput {
    pub reason: &'static str,
}

impl InvalidInput {
    pub const EMPTY_NAME: InvalidInput = InvalidInput { reason: "product name must not be empty" };
    pub const NO_SELECTION: InvalidInput = InvalidInput { reason: "please select a product" };
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Ean13Error {
    #[error("expected {expected} digits, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("non-digit character {0:?}")]
    NonDigit(char),

    #[error("invalid check digit: expected {expected}, found {found}")]
    CheckDigit { expected: u8, found: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("product already exists: {0}")]
    Duplicate(String),

    #[error("product not found: {0}")]
    NotFound(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not parse font data")]
    Font,

    #[error("failed to read font {path}: {source}")]
    FontFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("raw printing is only supported on Windows (Win32 spooler)")]
    Unsupported,

    #[error("{call} failed for printer {printer}")]
    Spooler { call: &'static str, printer: String },

    #[error("no printer configured; set label.printer or pass --output")]
    NoPrinter,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
