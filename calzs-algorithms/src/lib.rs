//! calzs-algorithms: The zero-suppression classifier and batch drivers.
//!
//! The classifier implements the classic amplitude rule: sum a configured
//! window of pedestal-subtracted ADC samples and keep the frame when the
//! sum strictly exceeds the threshold (or, two-sided, falls below its
//! negation). Everything else in this crate is plumbing around that rule:
//! the prepare/done calibration bracket and batch application with
//! mark-and-pass handling.
//!
#![warn(missing_docs)]

mod energy;
mod processing;

pub use energy::{ZsDecision, ZsEnergy, ZsRun};
pub use processing::{suppress_frames, RetainedFrame, SuppressionOutcome};

// Re-export core decision types
pub use calzs_core::{SuppressionStatistics, ZsConfig};
