//! Suppression decision parameters.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the amplitude-based suppression decision.
///
/// Fixed at classifier construction time and shared by every decision in a
/// run. The summation window is `[first_sample, first_sample + sample_count)`
/// in time slices; it must fit inside every frame the classifier sees.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZsConfig {
    /// Compute decisions but never drop: frames failing the threshold are
    /// flagged and retained.
    pub mark_and_pass: bool,
    /// Decision threshold in ADC counts. The pedestal-subtracted window sum
    /// must exceed this strictly for a frame to be kept.
    pub threshold: i32,
    /// First time slice of the summation window.
    pub first_sample: usize,
    /// Number of time slices summed.
    pub sample_count: usize,
    /// Also keep frames whose window sum falls below `-threshold`
    /// (symmetric capture of negative-going fluctuations).
    pub two_sided: bool,
}

impl Default for ZsConfig {
    fn default() -> Self {
        Self {
            mark_and_pass: false,
            threshold: 8,
            first_sample: 4,
            sample_count: 2,
            two_sided: false,
        }
    }
}

impl ZsConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets mark-and-pass mode.
    #[must_use]
    pub fn with_mark_and_pass(mut self, mark_and_pass: bool) -> Self {
        self.mark_and_pass = mark_and_pass;
        self
    }

    /// Sets the decision threshold in ADC counts.
    #[must_use]
    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the summation window.
    #[must_use]
    pub fn with_window(mut self, first_sample: usize, sample_count: usize) -> Self {
        self.first_sample = first_sample;
        self.sample_count = sample_count;
        self
    }

    /// Sets two-sided capture.
    #[must_use]
    pub fn with_two_sided(mut self, two_sided: bool) -> Self {
        self.two_sided = two_sided;
        self
    }

    /// Checks that the configured window fits a frame of `frame_len` slices.
    ///
    /// # Errors
    /// Returns [`Error::WindowOutOfBounds`] if it does not. An oversized
    /// window is a configuration mismatch against the hardware frame length
    /// and is never silently truncated.
    pub fn check_window(&self, frame_len: usize) -> Result<()> {
        if self.sample_count == 0 || self.first_sample + self.sample_count > frame_len {
            return Err(Error::WindowOutOfBounds {
                first_sample: self.first_sample,
                sample_count: self.sample_count,
                frame_len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ZsConfig::new()
            .with_threshold(24)
            .with_window(0, 4)
            .with_two_sided(true)
            .with_mark_and_pass(true);

        assert_eq!(config.threshold, 24);
        assert_eq!(config.first_sample, 0);
        assert_eq!(config.sample_count, 4);
        assert!(config.two_sided);
        assert!(config.mark_and_pass);
    }

    #[test]
    fn test_window_check() {
        let config = ZsConfig::new().with_window(2, 5);
        assert!(config.check_window(7).is_ok());
        let err = config.check_window(4).unwrap_err();
        assert!(matches!(
            err,
            Error::WindowOutOfBounds {
                first_sample: 2,
                sample_count: 5,
                frame_len: 4,
            }
        ));
    }

    #[test]
    fn test_empty_window_rejected() {
        let config = ZsConfig::new().with_window(0, 0);
        assert!(config.check_window(10).is_err());
    }
}
