//! calzs-core: Core traits and types for calorimeter zero suppression.
//!
//! This crate provides the foundational abstractions shared by the
//! suppression algorithm, the hardware frame formats, and the I/O layer:
//! channel addressing, the frame capability trait, calibration values, and
//! decision parameters.
//!

pub mod calib;
pub mod channel;
pub mod config;
pub mod digi;
pub mod error;
pub mod statistics;

pub use calib::{CalibrationValue, ConditionsSet};
pub use channel::{ChannelId, Subdetector};
pub use config::ZsConfig;
pub use digi::{Digi, DigiSamples, GenericDigi};
pub use error::{Error, Result};
pub use statistics::SuppressionStatistics;
