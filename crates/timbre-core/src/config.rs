//! Analyzer configuration and built-in defaults.

use alloc::vec::Vec;

/// Reference sample rate for the built-in defaults, in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Reference frame length the default band edges were laid out for.
pub const DEFAULT_FRAME_LENGTH: usize = 512;

/// Default microphone sensitivity in mV (MAX4466 datasheet, -46 dB at 94 dB SPL).
pub const DEFAULT_SENSITIVITY: f32 = 5.012;

/// Default amplifier gain calibration in dB.
pub const DEFAULT_GAIN_DB: f32 = 75.0;

/// Default spectral rolloff percentile.
pub const DEFAULT_ROLLOFF_PERCENTILE: f32 = 0.85;

/// Default fingerprint band edges (bin-index upper bounds) for the
/// reference frame length. The last entry is the sentinel equal to the
/// bin count; without it the final band absorbs the remaining bins.
pub const DEFAULT_BAND_EDGES: [u32; 6] = [5, 10, 20, 40, 80, 256];

/// Default hash quantization step in Hz.
pub const DEFAULT_FUZZ_FACTOR: u16 = 32;

/// Default number of MFCC coefficients.
pub const DEFAULT_MFCC_COEFFICIENTS: usize = 13;

/// Configuration for the [`Analyzer`](crate::Analyzer).
///
/// Immutable during one analysis cycle, replaceable between cycles via
/// [`Analyzer::configure`](crate::Analyzer::configure). Fields are not
/// validated; the documented zero values switch individual features off.
///
/// Changing `frame_length`, `sample_rate`, the band count, or
/// `mfcc_coefficients` is a structural change and reallocates every
/// working buffer. The remaining fields are reapplied in place.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Sampling frequency in Hz.
    pub sample_rate: u32,
    /// Frame size in samples (power of two). The magnitude spectrum has
    /// `frame_length / 2` bins.
    pub frame_length: usize,
    /// Microphone sensitivity in mV. 0 disables SPL measurement.
    pub sensitivity: f32,
    /// Amplifier gain calibration in dB for SPL conversion.
    pub gain_db: f32,
    /// Spectral rolloff percentile in (0, 1].
    pub rolloff_percentile: f32,
    /// Monotonically increasing bin-index upper bounds for the fingerprint
    /// bands. The band count is the length of this list; empty disables
    /// the fingerprint. The last entry should equal the bin count.
    pub band_edges: Vec<u32>,
    /// Hash quantization step in Hz. 0 disables signature hashing.
    pub fuzz_factor: u16,
    /// Number of MFCC coefficients. 0 disables MFCC extraction.
    pub mfcc_coefficients: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            frame_length: DEFAULT_FRAME_LENGTH,
            sensitivity: DEFAULT_SENSITIVITY,
            gain_db: DEFAULT_GAIN_DB,
            rolloff_percentile: DEFAULT_ROLLOFF_PERCENTILE,
            band_edges: DEFAULT_BAND_EDGES.to_vec(),
            fuzz_factor: DEFAULT_FUZZ_FACTOR,
            mfcc_coefficients: DEFAULT_MFCC_COEFFICIENTS,
        }
    }
}

impl AnalyzerConfig {
    /// Number of magnitude spectrum bins for this frame length.
    pub fn num_bins(&self) -> usize {
        self.frame_length / 2
    }

    /// Frequency resolution in Hz per bin.
    pub fn frequency_resolution(&self) -> f32 {
        self.sample_rate as f32 / self.frame_length as f32
    }

    /// Number of fingerprint bands.
    pub fn num_bands(&self) -> usize {
        self.band_edges.len()
    }

    /// Whether switching to `next` requires buffer reallocation.
    pub(crate) fn structurally_differs(&self, next: &AnalyzerConfig) -> bool {
        self.frame_length != next.frame_length
            || self.sample_rate != next.sample_rate
            || self.band_edges.len() != next.band_edges.len()
            || self.mfcc_coefficients != next.mfcc_coefficients
    }

    /// Rescale the default band-edge table for a non-reference frame length.
    ///
    /// The built-in edges are laid out for [`DEFAULT_FRAME_LENGTH`]. When a
    /// caller keeps them but picks another frame length, the raw edges no
    /// longer cover the bin range, so the engine rescales its own copy (and
    /// the fuzz factor) by `frame_length / DEFAULT_FRAME_LENGTH`. Custom
    /// edge lists are left untouched.
    pub(crate) fn rescale_default_edges(&mut self) {
        if self.frame_length == DEFAULT_FRAME_LENGTH || self.band_edges != DEFAULT_BAND_EDGES {
            return;
        }
        for edge in &mut self.band_edges {
            *edge = *edge * self.frame_length as u32 / DEFAULT_FRAME_LENGTH as u32;
        }
        let fuzz = u32::from(DEFAULT_FUZZ_FACTOR) * self.frame_length as u32
            / DEFAULT_FRAME_LENGTH as u32;
        self.fuzz_factor = fuzz as u16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shape() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(cfg.num_bins(), 256);
        assert_eq!(cfg.num_bands(), 6);
        assert!((cfg.frequency_resolution() - 86.13).abs() < 0.01);
        assert_eq!(*cfg.band_edges.last().unwrap(), cfg.num_bins() as u32);
    }

    #[test]
    fn rescale_applies_only_to_default_edges() {
        let mut cfg = AnalyzerConfig {
            frame_length: 1024,
            ..AnalyzerConfig::default()
        };
        cfg.rescale_default_edges();
        assert_eq!(cfg.band_edges, [10, 20, 40, 80, 160, 512]);
        assert_eq!(cfg.fuzz_factor, 64);

        let mut custom = AnalyzerConfig {
            frame_length: 1024,
            band_edges: alloc::vec![8, 64, 512],
            ..AnalyzerConfig::default()
        };
        custom.rescale_default_edges();
        assert_eq!(custom.band_edges, [8, 64, 512]);
        assert_eq!(custom.fuzz_factor, DEFAULT_FUZZ_FACTOR);
    }

    #[test]
    fn structural_comparison() {
        let base = AnalyzerConfig::default();

        let mut calib = base.clone();
        calib.sensitivity = 0.0;
        calib.gain_db = 60.0;
        calib.rolloff_percentile = 0.9;
        calib.fuzz_factor = 16;
        assert!(!base.structurally_differs(&calib));

        let mut resized = base.clone();
        resized.frame_length = 1024;
        assert!(base.structurally_differs(&resized));

        let mut fewer_bands = base.clone();
        fewer_bands.band_edges.pop();
        assert!(base.structurally_differs(&fewer_bands));

        // Same band count with different edge values stays non-structural.
        let mut moved_edges = base.clone();
        moved_edges.band_edges[0] = 8;
        assert!(!base.structurally_differs(&moved_edges));
    }
}
