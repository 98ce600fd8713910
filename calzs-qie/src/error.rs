//! QIE-specific error types.

use crate::FrameFlavor;
use calzs_core::ChannelId;
use thiserror::Error;

/// Result type for QIE operations.
pub type Result<T> = std::result::Result<T, Error>;

/// QIE-specific error types.
#[derive(Error, Debug)]
pub enum Error {
    /// A frame was built with an unsupported number of time slices.
    #[error("invalid frame length {got}, expected 1..={max}")]
    InvalidFrameLength { got: usize, max: usize },

    /// Unknown frame flavor code.
    #[error("invalid frame flavor code: {0:#x}")]
    InvalidFlavor(u8),

    /// A channel address belongs to a subdetector this frame flavor
    /// does not read out.
    #[error("{flavor:?} frame cannot carry channel {channel}")]
    WrongSubdetector {
        flavor: FrameFlavor,
        channel: ChannelId,
    },

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] calzs_core::Error),
}
