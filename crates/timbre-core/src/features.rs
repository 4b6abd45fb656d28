//! Spectral feature vector: slots, labels, and the single-pass extractor.
//!
//! All ten statistics are computed from one magnitude spectrum in two
//! passes (the second needs the centroid from the first) and written into
//! a fixed array indexed by [`SpectrumFeature`]. Bin 0 is excluded
//! everywhere: it is DC and would bias every weighted statistic.

use libm::{exp, log, powf, sqrtf};

/// Number of slots in the spectral feature vector.
pub const NUM_FEATURES: usize = 10;

/// Index of each statistic in the feature vector.
///
/// The discriminants are the array slots; the order is fixed and shared
/// with [`FEATURE_NAMES`] for telemetry labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum SpectrumFeature {
    /// Frequency of the largest magnitude bin, in Hz.
    PeakFrequency = 0,
    /// Magnitude of the largest bin.
    PeakMagnitude,
    /// Arithmetic mean of the bin magnitudes.
    AverageMagnitude,
    /// Magnitude-weighted standard deviation of the bin index.
    Spread,
    /// Third weighted moment over `spread^3`.
    Skewness,
    /// Magnitude-weighted mean bin index.
    Centroid,
    /// Geometric over arithmetic mean of `1 + magnitude`.
    Flatness,
    /// Peak squared magnitude over mean squared magnitude.
    Crest,
    /// Excess kurtosis of the magnitudes about their mean.
    Kurtosis,
    /// First bin fraction where cumulative magnitude exceeds the
    /// configured percentile of the total.
    Rolloff,
}

impl SpectrumFeature {
    /// Human-readable tag for this slot, for JSON/CSV export.
    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self as usize]
    }
}

/// Human-readable tags, index-aligned with the feature vector slots.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "PeakFreq", "PeakMag", "AvgMag", "Spread", "Skewness", "Centroid", "Flatness", "Crest",
    "Kurtosis", "Rolloff",
];

/// Compute all ten statistics over `bins` and write them into `out`.
///
/// `bins` is a magnitude spectrum whose index 0 is DC; only `[1, len)` is
/// read. `frequency_resolution` maps bin index to Hz for the peak slot.
///
/// Degenerate inputs fall back to defined values instead of NaN: a zero
/// magnitude sum yields centroid, spread, and skewness of 0; a zero power
/// sum yields a crest of 1; zero variance yields a kurtosis of -3. An
/// empty spectrum gets the same fallbacks as an all-zero one.
pub fn extract(
    bins: &[f32],
    frequency_resolution: f32,
    rolloff_percentile: f32,
    out: &mut [f32; NUM_FEATURES],
) {
    let num_bins = bins.len();
    if num_bins == 0 {
        out.fill(0.0);
        out[SpectrumFeature::Crest as usize] = 1.0;
        out[SpectrumFeature::Kurtosis as usize] = -3.0;
        return;
    }

    let mut sum_amplitudes = 0.0f32;
    let mut sum_weighted_amplitudes = 0.0f32;

    let mut peak_freq = 0.0f32;
    let mut peak_mag = 0.0f32;

    // flatness
    let mut sum_f = 0.0f64;
    let mut log_sum_f = 0.0f64;

    // crest
    let mut sum_c = 0.0f32;
    let mut max_c = 0.0f32;

    for (i, &mag) in bins.iter().enumerate().skip(1) {
        // centroid & rolloff
        sum_amplitudes += mag;
        sum_weighted_amplitudes += mag * i as f32;

        let f = f64::from(1.0 + mag);
        log_sum_f += log(f);
        sum_f += f;

        let c = mag * mag;
        sum_c += c;
        if c > max_c {
            max_c = c;
        }

        if mag > peak_mag {
            peak_mag = mag;
            peak_freq = i as f32 * frequency_resolution;
        }
    }

    sum_f /= num_bins as f64;
    log_sum_f /= num_bins as f64;
    let mean = sum_amplitudes / num_bins as f32;
    let mean_c = sum_c / num_bins as f32;

    out[SpectrumFeature::PeakFrequency as usize] = peak_freq;
    out[SpectrumFeature::PeakMagnitude as usize] = peak_mag;
    out[SpectrumFeature::AverageMagnitude as usize] = mean;

    let centroid = if sum_amplitudes > 0.0 {
        sum_weighted_amplitudes / sum_amplitudes
    } else {
        0.0
    };
    out[SpectrumFeature::Centroid as usize] = centroid;
    out[SpectrumFeature::Flatness as usize] = if sum_f > 0.0 {
        (exp(log_sum_f) / sum_f) as f32
    } else {
        0.0
    };
    out[SpectrumFeature::Crest as usize] = if sum_c > 0.0 { max_c / mean_c } else { 1.0 };

    // second pass: spread, skewness, kurtosis moments, rolloff
    let mut spread_sum = 0.0f32;
    let mut skewness_sum = 0.0f32;

    let mut moment2 = 0.0f32;
    let mut moment4 = 0.0f32;

    let mut rolloff = 0.0f32;
    let mut rolloff_sum = 0.0f32;
    let rolloff_threshold = rolloff_percentile * sum_amplitudes;

    for (i, &mag) in bins.iter().enumerate().skip(1) {
        let offset = i as f32 - centroid;
        spread_sum += offset * offset * mag;
        skewness_sum += powf(offset, 3.0) * mag;

        // percentile of cumulative magnitude against the total
        if rolloff == 0.0 {
            if rolloff_sum > rolloff_threshold {
                rolloff = i as f32 / num_bins as f32;
            } else {
                rolloff_sum += mag;
            }
        }

        let difference = mag - mean;
        let squared_difference = difference * difference;
        moment2 += squared_difference;
        moment4 += squared_difference * squared_difference;
    }
    out[SpectrumFeature::Rolloff as usize] = rolloff;

    let spread = if sum_amplitudes > 0.0 {
        sqrtf(spread_sum / sum_amplitudes)
    } else {
        0.0
    };
    out[SpectrumFeature::Spread as usize] = spread;
    out[SpectrumFeature::Skewness as usize] = if sum_amplitudes > 0.0 && spread > 0.0 {
        (skewness_sum / sum_amplitudes) / powf(spread, 3.0)
    } else {
        0.0
    };

    moment2 /= num_bins as f32;
    moment4 /= num_bins as f32;
    out[SpectrumFeature::Kurtosis as usize] = if moment2 == 0.0 {
        -3.0
    } else {
        moment4 / (moment2 * moment2) - 3.0
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_vec(bins: &[f32]) -> [f32; NUM_FEATURES] {
        let mut out = [0.0; NUM_FEATURES];
        extract(bins, 86.1328125, 0.85, &mut out);
        out
    }

    #[test]
    fn single_tone_statistics() {
        // one dominant bin at index 12 over 256 bins
        let mut bins = [0.0f32; 256];
        bins[12] = 100.0;

        let f = extract_vec(&bins);
        assert!((f[SpectrumFeature::PeakFrequency as usize] - 12.0 * 86.1328125).abs() < 1e-3);
        assert_eq!(f[SpectrumFeature::PeakMagnitude as usize], 100.0);
        assert!((f[SpectrumFeature::Centroid as usize] - 12.0).abs() < 1e-4);
        // all energy in one bin: zero weighted variance
        assert!(f[SpectrumFeature::Spread as usize].abs() < 1e-3);
    }

    #[test]
    fn flat_spectrum_is_maximally_flat() {
        let bins = [1.0f32; 256];
        let f = extract_vec(&bins);

        // geometric mean == arithmetic mean for a constant spectrum, up to
        // the DC-exclusion bias in the denominators
        assert!(f[SpectrumFeature::Flatness as usize] > 0.98);
        // every squared magnitude equals the max
        assert!((f[SpectrumFeature::Crest as usize] - 256.0 / 255.0).abs() < 0.02);
        // near-constant deviations collapse the 4th/2nd moment ratio to
        // num_bins/(num_bins - 1)
        assert!((f[SpectrumFeature::Kurtosis as usize] + 1.996).abs() < 0.01);
    }

    #[test]
    fn zero_spectrum_falls_back_without_nan() {
        let bins = [0.0f32; 256];
        let f = extract_vec(&bins);

        assert!(f.iter().all(|v| v.is_finite()));
        assert_eq!(f[SpectrumFeature::AverageMagnitude as usize], 0.0);
        assert_eq!(f[SpectrumFeature::Centroid as usize], 0.0);
        assert_eq!(f[SpectrumFeature::Spread as usize], 0.0);
        assert_eq!(f[SpectrumFeature::Skewness as usize], 0.0);
        assert_eq!(f[SpectrumFeature::Crest as usize], 1.0);
        assert_eq!(f[SpectrumFeature::Kurtosis as usize], -3.0);
    }

    #[test]
    fn empty_spectrum_falls_back_without_nan() {
        // an empty external spectrum must not divide by the bin count
        let f = extract_vec(&[]);

        assert!(f.iter().all(|v| v.is_finite()), "slots: {f:?}");
        assert_eq!(f[SpectrumFeature::AverageMagnitude as usize], 0.0);
        assert_eq!(f[SpectrumFeature::Crest as usize], 1.0);
        assert_eq!(f[SpectrumFeature::Kurtosis as usize], -3.0);
    }

    #[test]
    fn rolloff_tracks_percentile() {
        // magnitude concentrated in the low bins
        let mut bins = [0.0f32; 256];
        for b in bins.iter_mut().take(64).skip(1) {
            *b = 1.0;
        }
        let f = extract_vec(&bins);
        let rolloff = f[SpectrumFeature::Rolloff as usize];
        // 85% of 63 ones is passed just before bin 55
        assert!(rolloff > 0.2 && rolloff < 0.25, "rolloff {rolloff}");
    }

    #[test]
    fn names_align_with_slots() {
        assert_eq!(SpectrumFeature::PeakFrequency.name(), "PeakFreq");
        assert_eq!(SpectrumFeature::Rolloff.name(), "Rolloff");
        assert_eq!(FEATURE_NAMES.len(), NUM_FEATURES);
    }
}
