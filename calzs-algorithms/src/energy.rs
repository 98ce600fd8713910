//! The amplitude-based zero-suppression classifier.

use calzs_core::{ConditionsSet, Digi, Error, Result, ZsConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Amplitude-based zero-suppression classifier.
///
/// For each frame, sums `sample_count` ADC samples beginning at
/// `first_sample`, subtracts the channel's pedestal over the window, and
/// compares against an ADC-count threshold. With `two_sided`, negative
/// fluctuations past `-threshold` are kept as well.
///
/// The classifier itself is stateless; per-run access to calibration values
/// goes through the bracket returned by [`prepare`](ZsEnergy::prepare).
#[derive(Debug, Clone)]
pub struct ZsEnergy {
    config: ZsConfig,
}

impl ZsEnergy {
    /// Creates a classifier with the given decision parameters.
    #[must_use]
    pub fn new(config: ZsConfig) -> Self {
        Self { config }
    }

    /// Returns the decision parameters.
    #[must_use]
    pub fn config(&self) -> &ZsConfig {
        &self.config
    }

    /// Opens a processing-run bracket over a calibration set.
    ///
    /// The returned [`ZsRun`] borrows `conditions` for its whole lifetime,
    /// so classification before `prepare` or after [`ZsRun::done`] does not
    /// compile; the two-state prepare/done machine is enforced statically.
    #[must_use]
    pub fn prepare<'run>(&'run self, conditions: &'run ConditionsSet) -> ZsRun<'run> {
        ZsRun {
            config: &self.config,
            conditions,
        }
    }
}

impl Default for ZsEnergy {
    fn default() -> Self {
        Self::new(ZsConfig::default())
    }
}

/// The decision for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZsDecision {
    /// Whether the frame passes the threshold rule. Advisory under
    /// mark-and-pass: the driver retains the frame either way.
    pub keep: bool,
    /// The pedestal-subtracted window sum the decision was made on,
    /// in ADC counts.
    pub window_sum: i64,
}

/// One processing run of the classifier: the `prepare`/`done` bracket.
///
/// Holds the calibration set by shared reference. `classify` takes `&self`
/// and mutates nothing, so a run may be shared across worker threads.
pub struct ZsRun<'run> {
    config: &'run ZsConfig,
    conditions: &'run ConditionsSet,
}

impl ZsRun<'_> {
    /// Classifies one frame.
    ///
    /// Deterministic and side-effect free: repeated calls with the same
    /// frame yield the same decision.
    ///
    /// # Errors
    /// - [`Error::WindowOutOfBounds`] if the configured window does not fit
    ///   the frame; the window is never truncated.
    /// - [`Error::MissingCalibration`] if the frame's channel has no
    ///   calibration value; an unknown pedestal is never treated as zero.
    pub fn classify<D: Digi>(&self, digi: &D) -> Result<ZsDecision> {
        self.config.check_window(digi.len())?;

        let channel = digi.channel();
        let calib = self
            .conditions
            .lookup(channel)
            .ok_or(Error::MissingCalibration { channel })?;

        let mut sum: i64 = 0;
        for i in self.config.first_sample..self.config.first_sample + self.config.sample_count {
            sum += i64::from(digi.adc(i));
        }
        // Pedestals are fractional; round the window total once rather than
        // rounding per sample.
        let pedestal_total =
            (f64::from(calib.pedestal) * self.config.sample_count as f64).round() as i64;
        let window_sum = sum - pedestal_total;

        let threshold = i64::from(self.config.threshold);
        let keep = if self.config.two_sided {
            window_sum > threshold || window_sum < -threshold
        } else {
            window_sum > threshold
        };

        Ok(ZsDecision { keep, window_sum })
    }

    /// Classifies one frame, reporting only the keep/discard decision.
    ///
    /// # Errors
    /// Same conditions as [`classify`](Self::classify).
    pub fn should_keep<D: Digi>(&self, digi: &D) -> Result<bool> {
        self.classify(digi).map(|decision| decision.keep)
    }

    /// Returns the decision parameters this run was opened with.
    #[must_use]
    pub fn config(&self) -> &ZsConfig {
        self.config
    }

    /// Closes the bracket, releasing the borrowed calibration set.
    ///
    /// Equivalent to dropping the run; spelled out so call sites read as
    /// prepare/classify/done.
    pub fn done(self) {}
}
