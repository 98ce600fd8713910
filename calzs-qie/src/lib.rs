//! calzs-qie: QIE readout frame formats and sample word decoding.
//!
//! This crate provides the hardware-specific frame layouts produced by the
//! QIE front-end family, all exposed to algorithms through the common
//! [`Digi`] trait from calzs-core.
//!
//! # Key Components
//!
//! - [`QieSample`], [`Qie10Sample`], [`Qie11Sample`] - sample word bit-field
//!   decoding
//! - [`HbheFrame`], [`HoFrame`], [`HfFrame`] - legacy QIE8 frames
//! - [`Qie10Frame`], [`Qie11Frame`] - upgrade flat frames

mod error;
mod frame;
mod sample;

pub use error::{Error, Result};
pub use frame::{
    AnyFrame, FrameFlavor, HbheFrame, HfFrame, HoFrame, Qie10Frame, Qie11Frame, MAX_TIME_SLICES,
};
pub use sample::{Qie10Sample, Qie11Sample, QieSample};

// Re-export core types for convenience
pub use calzs_core::{ChannelId, Digi, Subdetector};
