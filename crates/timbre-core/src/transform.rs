//! Forward-FFT adapter contract.
//!
//! The analyzer does not run its own transform. It drives an external
//! engine through this trait exactly once per analysis cycle, operating in
//! place on the analyzer-owned real/imaginary buffer pair. The companion
//! `timbre-fft` crate provides a `rustfft`-backed implementation; embedded
//! builds can wrap a platform FFT (CMSIS-DSP, ESP-DSP) instead.

/// Minimal operation set the analyzer requires from a forward real FFT.
///
/// Buffer conventions: `frame` is the windowed time-domain copy of the
/// input (length `frame_length`), `spectrum` is the engine's output buffer
/// of the same length. After [`execute`](FftEngine::execute) the two hold
/// the real/imaginary parts of the transform; after
/// [`to_magnitude`](FftEngine::to_magnitude) the first `frame_length / 2`
/// entries of `spectrum` hold magnitudes, bin 0 being DC.
pub trait FftEngine {
    /// Adopt a new frame length, rebuilding any cached plan or window
    /// coefficients. Called on every structural reconfiguration; a no-op
    /// when the length is unchanged.
    fn prepare(&mut self, frame_length: usize);

    /// Multiply the frame by the engine's analysis window in place.
    fn apply_window(&self, frame: &mut [f32]);

    /// Subtract the DC bias from the frame in place.
    fn remove_dc(&self, frame: &mut [f32]);

    /// Run the forward real transform over `frame`, leaving the real parts
    /// in `frame` and the imaginary parts in `spectrum`.
    fn execute(&mut self, frame: &mut [f32], spectrum: &mut [f32]);

    /// Convert the complex output to magnitudes, written into
    /// `spectrum[..frame.len() / 2]`.
    fn to_magnitude(&mut self, frame: &mut [f32], spectrum: &mut [f32]);

    /// Bin index of the global maximum over the non-DC bins `[1, len)` of
    /// a magnitude slice.
    fn peak_bin(&self, bins: &[f32]) -> usize;

    /// Magnitude of the global maximum over the non-DC bins `[1, len)`.
    fn peak_magnitude(&self, bins: &[f32]) -> f32;
}
