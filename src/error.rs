// Error types for palette construction, encoding and output.
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort a conversion run.
///
/// Decode failures of individual input images are not represented here:
/// those are logged and the image is skipped. Only when nothing survives
/// does the run fail with [`AssetError::NoValidInputImages`].
#[derive(Debug, Error)]
pub enum AssetError {
    /// A palette entry is not exactly six hex digits (after an optional `#`).
    #[error("Invalid hex color format: '{value}'")]
    InvalidPaletteFormat { value: String },

    #[error("Palette file not found at '{}'", path.display())]
    PaletteFileNotFound { path: PathBuf },

    /// The palette file is not JSON, or lacks a `palette` list of strings.
    #[error("Invalid palette file '{}': {reason}", path.display())]
    PaletteFileMalformed { path: PathBuf, reason: String },

    /// Width or height does not fit the single header byte.
    #[error("Image '{name}' is {width}x{height}; width and height must each be at most 255")]
    DimensionOverflow {
        name: String,
        width: u32,
        height: u32,
    },

    #[error("No valid input images found.")]
    NoValidInputImages,

    #[error("Invalid input pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write PNG '{}': {source}", path.display())]
    Png {
        path: PathBuf,
        #[source]
        source: png::EncodingError,
    },
}

pub type Result<T> = std::result::Result<T, AssetError>;
