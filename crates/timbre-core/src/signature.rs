//! Shazam-style frequency fingerprint and fuzz hash.
//!
//! The magnitude spectrum is partitioned into contiguous bin bands; each
//! band contributes the frequency of its loudest bin, and bands whose peak
//! falls below the cross-band average are suppressed to 0. The resulting
//! frequency array hashes into a single 32-bit value that tolerates small
//! frequency jitter.

use libm::{fabsf, logf};

/// djb2 seed.
const HASH_SEED: u32 = 5381;

/// Extract the per-band dominant frequencies from a magnitude spectrum.
///
/// `edges` are monotonically increasing bin-index upper bounds: a bin
/// belongs to the first band whose edge exceeds its index, or to the last
/// band when no edge does (guards an edge list missing its final
/// sentinel). Bin 0 is DC and is skipped.
///
/// Per band, the bin with the highest `ln(|magnitude| + 1)` wins and its
/// frequency (not its magnitude) is recorded, truncated to whole Hz. Bands
/// whose peak stays below the cross-band mean are zeroed afterwards: weak,
/// directionless content contributes no fingerprint information.
///
/// `signature` and `band_peaks` must both have one entry per band, and
/// `edges` must be non-empty (the analyzer treats an empty edge list as
/// "fingerprint disabled" before calling here).
pub fn extract(
    bins: &[f32],
    edges: &[u32],
    frequency_resolution: f32,
    signature: &mut [u16],
    band_peaks: &mut [f32],
) {
    let num_bands = edges.len();

    signature.fill(0);
    band_peaks.fill(0.0);

    let band_index = |bin: usize| -> usize {
        for (r, &edge) in edges.iter().enumerate() {
            if edge as usize > bin {
                return r;
            }
        }
        num_bands - 1
    };

    for (i, &raw) in bins.iter().enumerate().skip(1) {
        let r = band_index(i);
        let mag = logf(fabsf(raw) + 1.0);
        if mag > band_peaks[r] {
            signature[r] = (i as f32 * frequency_resolution) as u16;
            band_peaks[r] = mag;
        }
    }

    let avg: f32 = band_peaks.iter().sum::<f32>() / num_bands as f32;
    for (sig, &peak) in signature.iter_mut().zip(band_peaks.iter()) {
        if peak < avg {
            *sig = 0;
        }
    }
}

/// Hash a signature array with djb2, quantized by `fuzz_factor`.
///
/// Each element is reduced to the floor of its `fuzz_factor` bucket
/// (`v - v % fuzz_factor`) before folding, so frequencies that jitter
/// within one bucket hash identically. The fold runs from the last element
/// to the first; the order is part of the observable contract. Arithmetic
/// is 32-bit wrapping.
///
/// A zero `fuzz_factor` skips quantization; the analyzer treats it as
/// "hashing disabled" before calling here.
pub fn hash_signature(signature: &[u16], fuzz_factor: u16) -> u32 {
    let mut hash = HASH_SEED;
    for &value in signature.iter().rev() {
        let quantized = if fuzz_factor == 0 {
            value
        } else {
            value - value % fuzz_factor
        };
        hash = hash.wrapping_mul(33) ^ u32::from(quantized);
    }
    hash
}
