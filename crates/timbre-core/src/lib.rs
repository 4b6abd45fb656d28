//! Timbre Core - acoustic feature extraction for embedded targets
//!
//! This crate extracts real-time acoustic features from a fixed-length mono
//! audio frame, sized for resource-constrained devices: one configured
//! [`Analyzer`] owns every working buffer and reuses all of them across
//! analysis cycles.
//!
//! # Feature Set
//!
//! - Sound-pressure level ([`Analyzer::decibel_spl`]) and RMS
//! - Pitch estimation via the Yin algorithm ([`Yin`])
//! - A 10-slot spectral feature vector ([`SpectrumFeature`]): peak, centroid,
//!   spread, skewness, kurtosis, flatness, crest, rolloff
//! - Mel-frequency cepstral coefficients ([`Mfcc`])
//! - A Shazam-style band fingerprint with a deterministic fuzz hash
//!
//! # Transform Backend
//!
//! The forward FFT is external: the analyzer drives any [`FftEngine`]
//! implementation through windowing, optional DC removal, execution, and
//! magnitude conversion. A `rustfft`-backed engine lives in the companion
//! `timbre-fft` crate; embedded builds can wrap a platform FFT instead.
//!
//! # Analysis Cycle
//!
//! ```rust,ignore
//! let mut analyzer = Analyzer::with_defaults(engine)?;
//!
//! analyzer.run_transform(&frame, true)?;
//! let features = analyzer.extract_features(None)?;
//! let mfcc = analyzer.extract_mfcc(None)?;
//! let signature = analyzer.extract_signature(None)?;
//! let hash = analyzer.hash_signature(None)?;
//! ```
//!
//! All extraction results are borrowed views into the analyzer's own
//! buffers and are overwritten by the next transform on the same instance.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (with `alloc`) for embedded audio
//! applications. Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! timbre-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod analyzer;
mod buffers;
pub mod config;
pub mod error;
pub mod features;
pub mod mfcc;
pub mod sample;
pub mod signature;
pub mod transform;
pub mod yin;

// Re-export main types at crate root
pub use analyzer::Analyzer;
pub use config::{
    AnalyzerConfig, DEFAULT_BAND_EDGES, DEFAULT_FRAME_LENGTH, DEFAULT_FUZZ_FACTOR,
    DEFAULT_SAMPLE_RATE,
};
pub use error::AnalyzerError;
pub use features::{FEATURE_NAMES, NUM_FEATURES, SpectrumFeature};
pub use mfcc::Mfcc;
pub use sample::Sample;
pub use signature::hash_signature;
pub use transform::FftEngine;
pub use yin::Yin;
