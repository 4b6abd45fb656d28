//! Mel-frequency cepstral coefficients.
//!
//! The filter bank is precomputed once per configuration: one triangular
//! filter per coefficient, with centre frequencies evenly spaced on the
//! Mel scale between 0 Hz and Nyquist and converted back to bin indices.
//! Per call the magnitude spectrum is squared into per-filter energies,
//! log-compressed, and decorrelated with a DCT-II.

use alloc::vec::Vec;
use libm::{cosf, exp, floor, log, logf};

use crate::buffers::try_buffer;
use crate::error::AnalyzerError;

/// MFCC engine with a precomputed triangular Mel filter bank.
#[derive(Debug, Clone)]
pub struct Mfcc {
    /// Number of cepstral coefficients produced per call.
    num_coefficients: usize,
    /// Magnitude spectrum size (half the frame length).
    num_bins: usize,
    /// Sampling frequency in Hz.
    sample_rate: u32,
    /// Triangular filter weights, `[coefficient][bin]`.
    filter_bank: Vec<Vec<f32>>,
    /// Mel-spectrum energies, reused across calls.
    mel_spectrum: Vec<f32>,
    /// Pre-DCT copy of the log energies.
    dct_scratch: Vec<f32>,
    /// Final coefficient vector, overwritten per call.
    coefficients: Vec<f32>,
}

impl Mfcc {
    /// Build the engine for a frame length (twice the bin count), sample
    /// rate, and coefficient count. Allocates and fills the filter bank.
    pub fn new(
        frame_length: usize,
        sample_rate: u32,
        num_coefficients: usize,
    ) -> Result<Self, AnalyzerError> {
        let num_bins = frame_length / 2;

        let mut filter_bank = Vec::new();
        filter_bank
            .try_reserve_exact(num_coefficients)
            .map_err(|_| AnalyzerError::Allocation {
                buffer: "mel filter bank",
                len: num_coefficients,
            })?;
        for _ in 0..num_coefficients {
            filter_bank.push(try_buffer::<f32>("mel filter row", num_bins)?);
        }

        let mut mfcc = Self {
            num_coefficients,
            num_bins,
            sample_rate,
            filter_bank,
            mel_spectrum: try_buffer("mel spectrum", num_coefficients)?,
            dct_scratch: try_buffer("dct scratch", num_coefficients)?,
            coefficients: try_buffer("mfcc vector", num_coefficients)?,
        };
        mfcc.build_filter_bank()?;
        Ok(mfcc)
    }

    /// Number of coefficients produced per call.
    pub fn num_coefficients(&self) -> usize {
        self.num_coefficients
    }

    /// The triangular filter weights, `[coefficient][bin]`.
    pub fn filter_bank(&self) -> &[Vec<f32>] {
        &self.filter_bank
    }

    /// The coefficient vector from the most recent call.
    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    /// Compute the cepstral coefficients from a magnitude spectrum.
    ///
    /// Only the first half of a mirrored spectrum should be passed; the
    /// result is a borrowed view overwritten by the next call.
    pub fn compute(&mut self, magnitude_spectrum: &[f32]) -> &[f32] {
        // Mel-spectrum energies: squared magnitudes through each filter
        for (energy, filter) in self.mel_spectrum.iter_mut().zip(self.filter_bank.iter()) {
            let mut coeff = 0.0f64;
            for (&mag, &weight) in magnitude_spectrum.iter().zip(filter.iter()) {
                coeff += f64::from(mag * mag * weight);
            }
            *energy = coeff as f32;
        }

        // log compression; the epsilon keeps log(0) out of silent bands
        for (out, &energy) in self.coefficients.iter_mut().zip(self.mel_spectrum.iter()) {
            *out = logf(energy + f32::MIN_POSITIVE);
        }

        self.discrete_cosine_transform();
        &self.coefficients
    }

    /// In-place DCT-II over the log energies, scaled by a plain factor of
    /// 2 (no orthonormalization).
    fn discrete_cosine_transform(&mut self) {
        self.dct_scratch.copy_from_slice(&self.coefficients);

        let n = self.num_coefficients as f32;
        let pi_over_n = core::f32::consts::PI / n;

        for (k, out) in self.coefficients.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for (j, &value) in self.dct_scratch.iter().enumerate() {
                sum += value * cosf(pi_over_n * (j as f32 + 0.5) * k as f32);
            }
            *out = 2.0 * sum;
        }
    }

    /// Precompute the triangular filters. Centre frequencies are evenly
    /// spaced on the Mel scale and mapped back to bin indices; a filter
    /// ramps from 0 at its left neighbor's centre up to 1 at its own, then
    /// back down to 0 at its right neighbor's. Zero-width triangles are
    /// accepted and simply contribute nothing.
    fn build_filter_bank(&mut self) -> Result<(), AnalyzerError> {
        let max_mel = floor(frequency_to_mel(self.sample_rate as f64 / 2.0)) as i64;
        let min_mel = floor(frequency_to_mel(0.0)) as i64;

        let mut centre_indices =
            try_buffer::<usize>("mel centres", self.num_coefficients + 2)?;
        let nyquist = self.sample_rate as f64 / 2.0;
        for (i, centre) in centre_indices.iter_mut().enumerate() {
            // even Mel spacing, kept in integer arithmetic before the
            // exponential mapping back to a bin index
            let f = (i as i64 * (max_mel - min_mel) / (self.num_coefficients as i64 + 1)
                + min_mel) as f64;

            let mut tmp = log(1.0 + 1000.0 / 700.0) / 1000.0;
            tmp = (exp(f * tmp) - 1.0) / nyquist;
            tmp = 0.5 + 700.0 * self.num_bins as f64 * tmp;

            *centre = floor(tmp) as usize;
        }

        for (i, filter) in self.filter_bank.iter_mut().enumerate() {
            filter.fill(0.0);

            let begin = centre_indices[i];
            let centre = centre_indices[i + 1];
            let end = centre_indices[i + 2];

            let range_up = (centre - begin) as f32;
            let range_down = (end - centre) as f32;

            // upward slope
            for k in begin..centre.min(self.num_bins) {
                filter[k] = (k - begin) as f32 / range_up;
            }
            // downward slope
            for k in centre..end.min(self.num_bins) {
                filter[k] = (end - k) as f32 / range_down;
            }
        }

        Ok(())
    }
}

/// Mel value for a frequency in Hz.
fn frequency_to_mel(frequency: f64) -> f64 {
    1127.0 * log(1.0 + frequency / 700.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_bank_rows_are_all_nonzero() {
        let mfcc = Mfcc::new(512, 44100, 13).unwrap();

        for (i, filter) in mfcc.filter_bank().iter().enumerate() {
            let sum: f32 = filter.iter().sum();
            assert!(sum > 0.0, "filter {i} is fully zero");
        }
    }

    #[test]
    fn filters_peak_at_their_centre() {
        let mfcc = Mfcc::new(512, 44100, 13).unwrap();

        for filter in mfcc.filter_bank() {
            let max = filter.iter().copied().fold(0.0f32, f32::max);
            assert!((max - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn coefficients_are_finite_for_flat_and_silent_spectra() {
        let mut mfcc = Mfcc::new(512, 44100, 13).unwrap();

        let flat = [1.0f32; 256];
        let out = mfcc.compute(&flat);
        assert_eq!(out.len(), 13);
        assert!(out.iter().all(|c| c.is_finite()));

        // silence goes through log(0 + epsilon), never NaN/-inf
        let silent = [0.0f32; 256];
        let out = mfcc.compute(&silent);
        assert!(out.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn single_coefficient_configuration_is_accepted() {
        let mut mfcc = Mfcc::new(512, 44100, 1).unwrap();
        let out = mfcc.compute(&[1.0f32; 256]);
        assert_eq!(out.len(), 1);
        assert!(out[0].is_finite());
    }
}
