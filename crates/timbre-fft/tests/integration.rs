//! End-to-end pipeline tests driving the analyzer through the rustfft
//! engine: transform, feature vector, MFCC, signature and pitch on
//! synthetic signals with known spectra.

use std::f32::consts::PI;

use timbre_core::{
    Analyzer, AnalyzerConfig, AnalyzerError, DEFAULT_FRAME_LENGTH, DEFAULT_SAMPLE_RATE,
    SpectrumFeature,
};
use timbre_fft::RustFftEngine;

fn sine(frequency: f32, sample_rate: u32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin())
        .collect()
}

fn default_analyzer() -> Analyzer<RustFftEngine> {
    Analyzer::with_defaults(RustFftEngine::new(DEFAULT_FRAME_LENGTH))
        .unwrap_or_else(|e| panic!("analyzer construction failed: {e}"))
}

#[test]
fn tone_peak_lands_within_one_bin() {
    let mut analyzer = default_analyzer();
    let frame = sine(1000.0, DEFAULT_SAMPLE_RATE, DEFAULT_FRAME_LENGTH);

    analyzer.run_transform(&frame, true).unwrap();
    let resolution = analyzer.frequency_resolution();
    let features = analyzer.extract_features(None).unwrap();

    let peak = features[SpectrumFeature::PeakFrequency as usize];
    assert!(
        (peak - 1000.0).abs() <= resolution,
        "peak {peak} Hz is more than one bin from 1000 Hz"
    );
    assert!(features[SpectrumFeature::PeakMagnitude as usize] > 0.0);

    // a single tone keeps the centroid (in bins) near the tone bin and the
    // spectrum peaky; window leakage drags the centroid upward a little
    let centroid = features[SpectrumFeature::Centroid as usize];
    assert!(centroid > 8.0 && centroid < 60.0, "centroid {centroid}");
    assert!(features[SpectrumFeature::Crest as usize] > 10.0);
    assert!(features[SpectrumFeature::Flatness as usize] < 0.8);
}

#[test]
fn signature_records_tone_frequency() {
    let mut analyzer = default_analyzer();
    let frame = sine(1000.0, DEFAULT_SAMPLE_RATE, DEFAULT_FRAME_LENGTH);

    analyzer.run_transform(&frame, true).unwrap();
    let signature = analyzer.extract_signature(None).unwrap().to_vec();

    // 1000 Hz falls in bin 12 (resolution ~86.13 Hz), inside the third
    // band of the default edges [5, 10, 20, 40, 80, 256]
    let recorded = f32::from(signature[2]);
    assert!(
        (recorded - 1000.0).abs() <= analyzer.frequency_resolution(),
        "band 2 recorded {recorded} Hz"
    );

    let first = analyzer.hash_signature(None).unwrap();
    let second = analyzer.hash_signature(None).unwrap();
    assert_eq!(first, second);
    assert_ne!(first, 5381, "tone signature must perturb the seed");
}

#[test]
fn mfcc_of_tone_is_finite() {
    let mut analyzer = default_analyzer();
    let frame = sine(440.0, DEFAULT_SAMPLE_RATE, DEFAULT_FRAME_LENGTH);

    analyzer.run_transform(&frame, true).unwrap();
    let tone_mfcc = analyzer.extract_mfcc(None).unwrap().to_vec();

    assert_eq!(tone_mfcc.len(), 13);
    assert!(tone_mfcc.iter().all(|c| c.is_finite()));

    // log energies of a real tone sit far above the silence floor
    let silence = vec![0.0f32; DEFAULT_FRAME_LENGTH];
    analyzer.run_transform(&silence, true).unwrap();
    let silence_c0 = analyzer.extract_mfcc(None).unwrap()[0];
    assert!(tone_mfcc[0] > silence_c0);
}

#[test]
fn silence_produces_finite_features() {
    let mut analyzer = default_analyzer();
    let frame = vec![0.0f32; DEFAULT_FRAME_LENGTH];

    analyzer.run_transform(&frame, true).unwrap();
    let features = analyzer.extract_features(None).unwrap();
    assert!(features.iter().all(|f| f.is_finite()));

    let mfcc = analyzer.extract_mfcc(None).unwrap();
    assert!(mfcc.iter().all(|c| c.is_finite()));
}

#[test]
fn pitch_tracks_a_sine_through_the_analyzer() {
    let mut analyzer = default_analyzer();
    // period of exactly 100 samples -> 441 Hz
    let frame = sine(441.0, DEFAULT_SAMPLE_RATE, DEFAULT_FRAME_LENGTH);

    let pitch = analyzer.pitch(&frame).unwrap();
    assert!(
        (pitch - 441.0).abs() / 441.0 < 0.01,
        "estimated {pitch} Hz for a 441 Hz tone"
    );
}

#[test]
fn external_spectrum_matches_cached_spectrum() {
    let mut analyzer = default_analyzer();
    let frame = sine(2500.0, DEFAULT_SAMPLE_RATE, DEFAULT_FRAME_LENGTH);

    analyzer.run_transform(&frame, true).unwrap();
    let cached = analyzer.extract_features(None).unwrap().to_owned();

    let spectrum = analyzer.spectrum().to_vec();
    let external = analyzer.extract_features(Some(&spectrum)).unwrap();
    assert_eq!(&cached, external);
}

#[test]
fn reconfigure_doubles_the_resolution() {
    let mut analyzer = default_analyzer();
    analyzer
        .configure(AnalyzerConfig {
            frame_length: 1024,
            ..AnalyzerConfig::default()
        })
        .unwrap();

    assert_eq!(analyzer.num_bins(), 512);
    let resolution = analyzer.frequency_resolution();
    assert!((resolution - 43.066).abs() < 0.01);

    let frame = sine(1000.0, DEFAULT_SAMPLE_RATE, 1024);
    analyzer.run_transform(&frame, true).unwrap();
    let features = analyzer.extract_features(None).unwrap();
    let peak = features[SpectrumFeature::PeakFrequency as usize];
    assert!((peak - 1000.0).abs() <= resolution, "peak {peak} Hz");
}

#[test]
fn wrong_frame_length_is_rejected() {
    let mut analyzer = default_analyzer();
    let short = vec![0.0f32; 256];

    assert_eq!(
        analyzer.run_transform(&short, true),
        Err(AnalyzerError::FrameLength {
            expected: DEFAULT_FRAME_LENGTH,
            got: 256
        })
    );
}

#[test]
fn spl_rises_with_amplitude() {
    let analyzer = default_analyzer();
    let quiet: Vec<f32> = sine(1000.0, DEFAULT_SAMPLE_RATE, DEFAULT_FRAME_LENGTH)
        .iter()
        .map(|s| s * 0.01)
        .collect();
    let loud = sine(1000.0, DEFAULT_SAMPLE_RATE, DEFAULT_FRAME_LENGTH);

    let low = analyzer.decibel_spl(&quiet).unwrap();
    let high = analyzer.decibel_spl(&loud).unwrap();
    // 100x amplitude is +40 dB; integer rounding may land either side
    assert!((high - low - 40).abs() <= 1);
}
