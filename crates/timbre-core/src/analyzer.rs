//! The analyzer: buffer lifecycle and the feature-extraction surface.
//!
//! One [`Analyzer`] owns every working buffer (signal copy, magnitude
//! spectrum, signature, feature vector, MFCC engine, Yin state) keyed by
//! its configuration, and reallocates only when a structural parameter
//! changes. All extraction results are borrowed views into those buffers,
//! valid until the next transform or reconfiguration on the same instance.
//!
//! Instances are independent; a single instance is not reentrant because
//! the cached spectrum, feature vector, and Yin state are mutated in place
//! by every call.

use alloc::vec::Vec;
use libm::{fabsf, log10, round, sqrt};

use crate::buffers::try_buffer;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::features::{self, NUM_FEATURES, SpectrumFeature};
use crate::mfcc::Mfcc;
use crate::sample::Sample;
use crate::signature;
use crate::transform::FftEngine;
use crate::yin::Yin;

/// Empirical amplitude scale for the windowed transform, found by
/// comparing the RMS of a DC-free signal against its spectrum. Applies to
/// non-DC bins only and depends on the window in use; treat the derived
/// amplitudes as approximate.
pub const AMPLITUDE_SCALE_FACTOR: f32 = 22.627;

/// Acoustic feature extraction engine over an external FFT backend.
///
/// See the crate docs for the per-cycle call sequence. `F` is the
/// transform backend; samples are converted to `f32` at the boundary and
/// the whole spectral pipeline runs in single precision.
pub struct Analyzer<F: FftEngine> {
    engine: F,
    config: AnalyzerConfig,
    num_bins: usize,
    frequency_resolution: f32,

    // working buffers, reused across cycles
    signal: Vec<f32>,
    spectrum: Vec<f32>,
    signature: Vec<u16>,
    band_peaks: Vec<f32>,
    features: [f32; NUM_FEATURES],
    mfcc: Option<Mfcc>,
    yin: Option<Yin>,

    ready: bool,
}

impl<F: FftEngine> Analyzer<F> {
    /// Create an analyzer with the given transform backend and
    /// configuration. Fails if any working buffer cannot be allocated.
    pub fn new(engine: F, config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let mut analyzer = Self {
            engine,
            config: AnalyzerConfig::default(),
            num_bins: 0,
            frequency_resolution: 0.0,
            signal: Vec::new(),
            spectrum: Vec::new(),
            signature: Vec::new(),
            band_peaks: Vec::new(),
            features: [0.0; NUM_FEATURES],
            mfcc: None,
            yin: None,
            ready: false,
        };
        analyzer.configure(config)?;
        Ok(analyzer)
    }

    /// Create an analyzer with the built-in default configuration.
    pub fn with_defaults(engine: F) -> Result<Self, AnalyzerError> {
        Self::new(engine, AnalyzerConfig::default())
    }

    /// Apply a new configuration.
    ///
    /// Structural changes (frame length, sample rate, band count, MFCC
    /// coefficient count) release every buffer and reallocate; anything
    /// else is applied in place. If the default band edges are kept with a
    /// non-reference frame length, the engine rescales its own copy (see
    /// [`AnalyzerConfig`]). On allocation failure the instance stays
    /// not-ready and every feature operation reports
    /// [`AnalyzerError::NotReady`].
    pub fn configure(&mut self, config: AnalyzerConfig) -> Result<(), AnalyzerError> {
        let mut config = config;
        config.rescale_default_edges();

        let structural = !self.ready || self.config.structurally_differs(&config);

        self.config = config;
        self.num_bins = self.config.num_bins();
        self.frequency_resolution = self.config.frequency_resolution();

        if structural {
            self.release();
            self.allocate()?;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                frame_length = self.config.frame_length,
                sample_rate = self.config.sample_rate,
                num_bins = self.num_bins,
                "analyzer buffers reallocated"
            );
        }

        Ok(())
    }

    /// The active configuration, after any band-edge rescaling.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Whether the working buffers are allocated and valid.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Number of magnitude spectrum bins (`frame_length / 2`).
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// Frequency resolution in Hz per bin.
    pub fn frequency_resolution(&self) -> f32 {
        self.frequency_resolution
    }

    /// Centre frequency of a bin, in Hz.
    pub fn frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.frequency_resolution
    }

    /// Approximate signal amplitude represented by a non-DC bin of the
    /// cached spectrum (see [`AMPLITUDE_SCALE_FACTOR`]).
    ///
    /// `bin` must be below [`num_bins`](Self::num_bins); the back half of
    /// the spectrum buffer holds transform leftovers, not magnitudes.
    ///
    /// # Panics
    ///
    /// Panics if `bin` is out of the magnitude range.
    pub fn amplitude(&self, bin: usize) -> f32 {
        self.amplitude_of(self.spectrum()[bin])
    }

    /// Approximate signal amplitude for a raw magnitude value.
    pub fn amplitude_of(&self, magnitude: f32) -> f32 {
        AMPLITUDE_SCALE_FACTOR * fabsf(magnitude) / self.config.frame_length as f32
    }

    /// The cached magnitude spectrum from the most recent transform.
    ///
    /// All-zero until [`run_transform`](Self::run_transform) has been
    /// called; overwritten by each subsequent transform.
    pub fn spectrum(&self) -> &[f32] {
        &self.spectrum[..self.num_bins.min(self.spectrum.len())]
    }

    /// The feature vector from the most recent extraction, indexed by
    /// [`SpectrumFeature`].
    pub fn features(&self) -> &[f32; NUM_FEATURES] {
        &self.features
    }

    /// The signature from the most recent extraction (0 = suppressed band).
    pub fn signature(&self) -> &[u16] {
        &self.signature
    }

    /// RMS amplitude of a signal slice. Pure function over the input; any
    /// DC bias should have been removed upstream for a meaningful result.
    pub fn rms<S: Sample>(&self, signal: &[S]) -> f32 {
        if signal.is_empty() {
            return 0.0;
        }

        let mut sum = 0.0f64;
        for &sample in signal {
            let amp = f64::from(fabsf(sample.to_f32()));
            sum += amp * amp;
        }
        sum /= signal.len() as f64;
        sqrt(sum) as f32
    }

    /// Sound-pressure level of a signal slice in dB SPL, rounded to the
    /// nearest integer.
    ///
    /// The signal is assumed to be calibrated to mV; RMS is converted to
    /// dBV against the configured microphone sensitivity, then shifted by
    /// the amplifier gain and the 94 dB reference. A zero sensitivity
    /// means SPL is disabled.
    pub fn decibel_spl<S: Sample>(&self, signal: &[S]) -> Result<i32, AnalyzerError> {
        if self.config.sensitivity == 0.0 {
            return Err(AnalyzerError::Disabled { feature: "spl" });
        }

        let v_rms = f64::from(self.rms(signal));
        let dbv = 20.0 * log10(v_rms / f64::from(self.config.sensitivity));
        let db = dbv - f64::from(self.config.gain_db) + 94.0;
        Ok(round(db) as i32)
    }

    /// Estimate the pitch of a full frame in Hz via the Yin estimator.
    ///
    /// The estimate seeds the continuity check of the next call, so pitch
    /// is not stateless per frame.
    pub fn pitch<S: Sample>(&mut self, frame: &[S]) -> Result<f32, AnalyzerError> {
        if !self.ready {
            return Err(AnalyzerError::NotReady);
        }
        if frame.len() != self.config.frame_length {
            return Err(AnalyzerError::FrameLength {
                expected: self.config.frame_length,
                got: frame.len(),
            });
        }

        for (dst, &src) in self.signal.iter_mut().zip(frame) {
            *dst = src.to_f32();
        }
        let Some(yin) = self.yin.as_mut() else {
            return Err(AnalyzerError::NotReady);
        };
        Ok(yin.pitch(&self.signal))
    }

    /// Run the forward transform over one input frame.
    ///
    /// The frame is copied (the window multiplication would otherwise
    /// alter the caller's data) and pushed through the backend: window,
    /// optional DC removal, forward FFT, magnitude conversion. The peak
    /// slots of the feature vector are filled from the backend's peak
    /// query. After DC removal, bin 0 is forced to zero; a residual
    /// negative DC would corrupt every statistic that reads bin 0.
    pub fn run_transform<S: Sample>(
        &mut self,
        frame: &[S],
        remove_dc: bool,
    ) -> Result<(), AnalyzerError> {
        if !self.ready {
            return Err(AnalyzerError::NotReady);
        }
        if frame.len() != self.config.frame_length {
            return Err(AnalyzerError::FrameLength {
                expected: self.config.frame_length,
                got: frame.len(),
            });
        }

        for (dst, &src) in self.signal.iter_mut().zip(frame) {
            *dst = src.to_f32();
        }

        self.engine.apply_window(&mut self.signal);
        if remove_dc {
            self.engine.remove_dc(&mut self.signal);
        }
        self.engine.execute(&mut self.signal, &mut self.spectrum);
        self.engine.to_magnitude(&mut self.signal, &mut self.spectrum);

        let bins = &self.spectrum[..self.num_bins];
        let peak_bin = self.engine.peak_bin(bins);
        self.features[SpectrumFeature::PeakFrequency as usize] =
            peak_bin as f32 * self.frequency_resolution;
        self.features[SpectrumFeature::PeakMagnitude as usize] = self.engine.peak_magnitude(bins);

        if remove_dc {
            self.spectrum[0] = 0.0;
        }

        Ok(())
    }

    /// Compute the 10-slot spectral feature vector.
    ///
    /// Reads the cached spectrum from the most recent transform, or an
    /// external magnitude spectrum when one is supplied. The returned view
    /// is overwritten by the next extraction or transform.
    pub fn extract_features(
        &mut self,
        spectrum: Option<&[f32]>,
    ) -> Result<&[f32; NUM_FEATURES], AnalyzerError> {
        if !self.ready {
            return Err(AnalyzerError::NotReady);
        }

        let bins = match spectrum {
            Some(bins) => bins,
            None => &self.spectrum[..self.num_bins],
        };
        features::extract(
            bins,
            self.frequency_resolution,
            self.config.rolloff_percentile,
            &mut self.features,
        );
        Ok(&self.features)
    }

    /// Compute the Mel-frequency cepstral coefficients.
    ///
    /// Reads the cached spectrum unless an external one is supplied.
    /// Returns [`AnalyzerError::Disabled`] when the configured coefficient
    /// count is zero.
    pub fn extract_mfcc(&mut self, spectrum: Option<&[f32]>) -> Result<&[f32], AnalyzerError> {
        if !self.ready {
            return Err(AnalyzerError::NotReady);
        }
        let Some(mfcc) = self.mfcc.as_mut() else {
            return Err(AnalyzerError::Disabled { feature: "mfcc" });
        };

        let bins = match spectrum {
            Some(bins) => bins,
            None => &self.spectrum[..self.num_bins],
        };
        Ok(mfcc.compute(bins))
    }

    /// Compute the per-band fingerprint signature.
    ///
    /// Reads the cached spectrum unless an external one is supplied.
    /// Returns [`AnalyzerError::Disabled`] when no band edges are
    /// configured.
    pub fn extract_signature(&mut self, spectrum: Option<&[f32]>) -> Result<&[u16], AnalyzerError> {
        if !self.ready {
            return Err(AnalyzerError::NotReady);
        }
        if self.config.band_edges.is_empty() {
            return Err(AnalyzerError::Disabled {
                feature: "signature",
            });
        }

        let bins = match spectrum {
            Some(bins) => bins,
            None => &self.spectrum[..self.num_bins],
        };
        signature::extract(
            bins,
            &self.config.band_edges,
            self.frequency_resolution,
            &mut self.signature,
            &mut self.band_peaks,
        );
        Ok(&self.signature)
    }

    /// Hash the most recent signature (or an external one) with the
    /// configured fuzz factor. Returns [`AnalyzerError::Disabled`] when
    /// the fuzz factor is zero.
    pub fn hash_signature(&self, signature: Option<&[u16]>) -> Result<u32, AnalyzerError> {
        if !self.ready {
            return Err(AnalyzerError::NotReady);
        }
        if self.config.fuzz_factor == 0 {
            return Err(AnalyzerError::Disabled {
                feature: "signature hash",
            });
        }

        let sig = signature.unwrap_or(&self.signature);
        Ok(signature::hash_signature(sig, self.config.fuzz_factor))
    }

    /// Release every working buffer in reverse-allocation order, so
    /// constrained heaps can coalesce the freed blocks.
    fn release(&mut self) {
        self.ready = false;
        self.yin = None;
        self.mfcc = None;
        self.band_peaks = Vec::new();
        self.signature = Vec::new();
        self.spectrum = Vec::new();
        self.signal = Vec::new();
    }

    /// Allocate every working buffer for the current configuration.
    fn allocate(&mut self) -> Result<(), AnalyzerError> {
        let frame_length = self.config.frame_length;

        self.signal = try_buffer("signal", frame_length)?;
        self.spectrum = try_buffer("spectrum", frame_length)?;
        self.signature = try_buffer("signature", self.config.num_bands())?;
        self.band_peaks = try_buffer("band peaks", self.config.num_bands())?;
        self.mfcc = if self.config.mfcc_coefficients > 0 {
            Some(Mfcc::new(
                frame_length,
                self.config.sample_rate,
                self.config.mfcc_coefficients,
            )?)
        } else {
            None
        };
        self.yin = Some(Yin::new(self.config.sample_rate, frame_length)?);

        self.engine.prepare(frame_length);
        self.ready = true;
        Ok(())
    }
}
