//! Feature export demo: run one analysis cycle over a synthetic capture
//! and print the results as JSON, the shape a telemetry uplink would send.
//!
//! Run with: cargo run -p timbre-fft --example feature_export

use std::f32::consts::PI;

use serde_json::json;
use timbre_core::{Analyzer, DEFAULT_FRAME_LENGTH, DEFAULT_SAMPLE_RATE, FEATURE_NAMES};
use timbre_fft::RustFftEngine;

fn main() {
    // --- Synthesize one frame: 440 Hz fundamental with two harmonics ---
    let frame: Vec<f32> = (0..DEFAULT_FRAME_LENGTH)
        .map(|i| {
            let t = i as f32 / DEFAULT_SAMPLE_RATE as f32;
            0.6 * (2.0 * PI * 440.0 * t).sin()
                + 0.3 * (2.0 * PI * 880.0 * t).sin()
                + 0.1 * (2.0 * PI * 1320.0 * t).sin()
        })
        .collect();

    let mut analyzer = Analyzer::with_defaults(RustFftEngine::new(DEFAULT_FRAME_LENGTH))
        .unwrap_or_else(|e| panic!("analyzer setup failed: {e}"));

    // --- One full analysis cycle ---
    let spl = analyzer.decibel_spl(&frame).unwrap_or_else(|e| panic!("{e}"));
    let pitch = analyzer.pitch(&frame).unwrap_or_else(|e| panic!("{e}"));

    analyzer
        .run_transform(&frame, true)
        .unwrap_or_else(|e| panic!("{e}"));
    let features = analyzer
        .extract_features(None)
        .unwrap_or_else(|e| panic!("{e}"))
        .to_vec();
    let mfcc = analyzer
        .extract_mfcc(None)
        .unwrap_or_else(|e| panic!("{e}"))
        .to_vec();
    let signature = analyzer
        .extract_signature(None)
        .unwrap_or_else(|e| panic!("{e}"))
        .to_vec();
    let hash = analyzer
        .hash_signature(None)
        .unwrap_or_else(|e| panic!("{e}"));

    // --- Emit the labelled record ---
    let spectral: serde_json::Map<String, serde_json::Value> = FEATURE_NAMES
        .iter()
        .zip(features.iter())
        .map(|(name, value)| ((*name).to_string(), json!(value)))
        .collect();

    let record = json!({
        "sample_rate": analyzer.config().sample_rate,
        "frame_length": analyzer.config().frame_length,
        "spl_db": spl,
        "pitch_hz": pitch,
        "spectral": spectral,
        "mfcc": mfcc,
        "signature": signature,
        "signature_hash": hash,
    });

    println!("{}", serde_json::to_string_pretty(&record).unwrap());
}
