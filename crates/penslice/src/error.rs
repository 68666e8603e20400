//! Error types for the slicing pipeline.

use thiserror::Error;

/// Fatal conditions of a whole slicing run.
#[derive(Error, Debug)]
pub enum SliceError {
    /// The input contained no shapes at all.
    #[error("No drawable shapes were provided")]
    NoDrawableShapes,

    /// Every shape was degenerate or resolved to zero density.
    #[error("No toolpaths were generated from the input shapes")]
    NoToolpaths,

    /// The configuration cannot drive a slicing run.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Problems found while validating a [`crate::SlicerConfig`].
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// A numeric value is outside its usable range.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// A palette entry is not a `#RRGGBB` hex color.
    #[error("Invalid color '{0}': expected #RRGGBB")]
    InvalidColor(String),

    /// Color mode is on but the printer lists no colors.
    #[error("Color mode is enabled but printer '{0}' defines no available colors")]
    MissingPalette(String),
}
