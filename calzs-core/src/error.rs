//! Error types for calzs-core.

use crate::ChannelId;
use thiserror::Error;

/// Result type alias for calzs operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for calzs operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No calibration value exists for a channel. A missing pedestal makes
    /// the decision impossible; defaulting it to zero would bias results.
    #[error("no calibration value for channel {channel}")]
    MissingCalibration { channel: ChannelId },

    /// The configured summation window does not fit the frame.
    #[error(
        "summation window [{first_sample}, {first_sample}+{sample_count}) \
         exceeds frame length {frame_len}"
    )]
    WindowOutOfBounds {
        first_sample: usize,
        sample_count: usize,
        frame_len: usize,
    },

    /// A raw channel word does not decode to a valid channel address.
    #[error("invalid channel id: {raw:#010x}")]
    InvalidChannel { raw: u32 },

    /// A channel appeared twice while building a conditions set.
    #[error("duplicate calibration entry for channel {channel}")]
    DuplicateChannel { channel: ChannelId },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
