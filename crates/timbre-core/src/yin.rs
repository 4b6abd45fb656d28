//! Yin pitch estimation (de Cheveigné and Kawahara, 2002).
//!
//! Steps 1-3 of the published algorithm (difference function, cumulative
//! mean normalization, absolute threshold) plus parabolic refinement of
//! the chosen lag. The estimator is stateful: the previous period estimate
//! seeds a continuity check that prefers staying near the last result over
//! re-searching the whole lag range every frame.

use alloc::vec::Vec;
use libm::{ceilf, roundf};

use crate::buffers::try_buffer;
use crate::error::AnalyzerError;

/// Lowest lag the candidate scan considers.
const SCAN_FLOOR: usize = 30;

/// Absolute threshold on the normalized difference function.
const ABS_THRESHOLD: f32 = 0.1;

/// Stateful Yin pitch estimator over fixed-length frames.
#[derive(Debug, Clone)]
pub struct Yin {
    /// Sampling frequency in Hz.
    sample_rate: u32,
    /// Input frame length in samples; lags cover half of it.
    frame_length: usize,
    /// Minimum period in samples, set indirectly via `set_max_frequency`.
    min_period: usize,
    /// Period estimate from the previous call, seeded at 1.0.
    prev_period_estimate: f32,
    /// Cumulative mean normalized difference function, one entry per lag.
    delta: Vec<f32>,
}

impl Yin {
    /// Create an estimator for the given sample rate and frame length.
    ///
    /// The maximum detectable frequency defaults to 1500 Hz.
    pub fn new(sample_rate: u32, frame_length: usize) -> Result<Self, AnalyzerError> {
        let delta = try_buffer("yin difference", frame_length / 2)?;
        let mut yin = Self {
            sample_rate,
            frame_length,
            min_period: 1,
            prev_period_estimate: 1.0,
            delta,
        };
        yin.set_max_frequency(1500.0);
        Ok(yin)
    }

    /// Set the maximum frequency the estimator will report.
    ///
    /// Values at or below 200 Hz are assumed to be a caller bug and are
    /// replaced by a 2000 Hz cap.
    pub fn set_max_frequency(&mut self, max_frequency: f32) {
        let max_frequency = if max_frequency <= 200.0 {
            2000.0
        } else {
            max_frequency
        };
        self.min_period = ceilf(self.sample_rate as f32 / max_frequency) as usize;
    }

    /// Maximum frequency the estimator will report, in Hz.
    pub fn max_frequency(&self) -> f32 {
        self.sample_rate as f32 / self.min_period as f32
    }

    /// Estimate the pitch of one frame, in Hz.
    ///
    /// `frame` must hold at least the configured frame length; only the
    /// first `frame_length` samples are read. The returned estimate feeds
    /// the continuity check of the next call on this instance.
    pub fn pitch(&mut self, frame: &[f32]) -> f32 {
        debug_assert!(frame.len() >= self.frame_length);

        self.cumulative_mean_normalized_difference(frame);

        // prefer a minimum adjacent to the previous estimate, for
        // consistency, even when it is not the optimal choice
        let period = match self.continuity_minimum() {
            Some(lag) => lag,
            None => self.period_candidate(),
        };

        let lags = self.frame_length / 2;
        let refined = if period > 0 && period < lags - 1 {
            Self::parabolic_interpolation(
                period,
                self.delta[period - 1],
                self.delta[period],
                self.delta[period + 1],
            )
        } else {
            period as f32
        };

        self.prev_period_estimate = refined;
        self.sample_rate as f32 / refined
    }

    /// Steps 1-3 of the Yin algorithm: squared lag differences normalized
    /// by the running cumulative sum, with lag 0 forced to 1.0 to exclude
    /// the trivial zero-lag minimum.
    fn cumulative_mean_normalized_difference(&mut self, frame: &[f32]) {
        let lags = self.frame_length / 2;
        let mut cumulative_sum = 0.0f32;

        for tau in 0..lags {
            let mut value = 0.0f32;
            for j in 0..lags {
                let diff = frame[j] - frame[j + tau];
                value += diff * diff;
            }

            cumulative_sum += value;
            if cumulative_sum > 0.0 {
                value = value * tau as f32 / cumulative_sum;
            }
            self.delta[tau] = value;
        }

        self.delta[0] = 1.0;
    }

    /// Search `round(prev) - 1 ..= round(prev) + 1` for a strict local
    /// minimum, excluding the buffer edges. The last match wins.
    fn continuity_minimum(&self) -> Option<usize> {
        let lags = self.frame_length / 2;
        let prev = roundf(self.prev_period_estimate) as i64;

        let mut found = None;
        for i in (prev - 1)..=(prev + 1) {
            if i > 0 && i < lags as i64 - 1 {
                let i = i as usize;
                if self.delta[i] < self.delta[i - 1] && self.delta[i] < self.delta[i + 1] {
                    found = Some(i);
                }
            }
        }
        found
    }

    /// Scan lags upward from the fixed floor for the first local minimum
    /// below the absolute threshold; fall back to the global minimum of
    /// the scanned range when none qualifies.
    fn period_candidate(&self) -> usize {
        let lags = self.frame_length / 2;

        let mut min_value = 100000.0f32;
        let mut min_index = 0usize;

        for i in SCAN_FLOOR..lags.saturating_sub(1) {
            if self.delta[i] < min_value {
                min_value = self.delta[i];
                min_index = i;
            }

            if self.delta[i] < ABS_THRESHOLD
                && self.delta[i] < self.delta[i - 1]
                && self.delta[i] < self.delta[i + 1]
            {
                return i;
            }
        }

        min_index
    }

    /// Parabolic refinement of the chosen lag from the three surrounding
    /// difference values. All-equal neighbors would divide by zero, so the
    /// lag is returned unrefined in that case.
    fn parabolic_interpolation(period: usize, y1: f32, y2: f32, y3: f32) -> f32 {
        if y3 == y2 && y2 == y1 {
            period as f32
        } else {
            period as f32 + (y3 - y1) / (2.0 * (2.0 * y2 - y3 - y1))
        }
    }
}
