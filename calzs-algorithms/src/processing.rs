//! Batch suppression drivers.
//!
//! The classifier decides; this layer applies the decision to whole frame
//! collections, honors mark-and-pass retention, and keeps the counters.

use crate::energy::{ZsDecision, ZsRun};
use calzs_core::{Digi, Result, SuppressionStatistics};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A frame that survived suppression.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RetainedFrame<D> {
    /// The frame itself.
    pub frame: D,
    /// True when the frame failed the threshold but was retained because
    /// the run was in mark-and-pass mode.
    pub flagged: bool,
    /// The pedestal-subtracted window sum the decision was made on.
    pub window_sum: i64,
}

/// The result of suppressing one batch of frames.
#[derive(Debug, Clone)]
pub struct SuppressionOutcome<D> {
    /// Frames retained, in input order.
    pub retained: Vec<RetainedFrame<D>>,
    /// Decision counters for the batch.
    pub statistics: SuppressionStatistics,
}

/// Suppresses a batch of frames against an open run.
///
/// Classification is fanned out across the rayon pool (the run holds the
/// calibration set read-only, so sharing it is sound); retention and
/// counting happen in input order afterwards. Under mark-and-pass every
/// frame is retained and failing frames come back flagged; otherwise
/// failing frames are dropped.
///
/// # Errors
/// Fails on the first frame whose classification fails (bad window or
/// missing calibration). A batch with a configuration mismatch is not
/// partially suppressed.
pub fn suppress_frames<D>(run: &ZsRun<'_>, frames: Vec<D>) -> Result<SuppressionOutcome<D>>
where
    D: Digi + Send,
{
    let decisions: Vec<(D, ZsDecision)> = frames
        .into_par_iter()
        .map(|frame| run.classify(&frame).map(|decision| (frame, decision)))
        .collect::<Result<_>>()?;

    let mark_and_pass = run.config().mark_and_pass;
    let mut outcome = SuppressionOutcome {
        retained: Vec::with_capacity(decisions.len()),
        statistics: SuppressionStatistics::default(),
    };

    for (frame, decision) in decisions {
        let flagged = mark_and_pass && !decision.keep;
        outcome.statistics.record(decision.keep, flagged);
        if decision.keep || mark_and_pass {
            outcome.retained.push(RetainedFrame {
                frame,
                flagged,
                window_sum: decision.window_sum,
            });
        }
    }

    Ok(outcome)
}
