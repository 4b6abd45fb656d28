//! Input sample representation.

/// Minimal numeric bound for raw input frames.
///
/// The analyzer accepts whatever sample width the acquisition subsystem
/// produces (ADC counts, calibrated millivolts) and converts to `f32` at
/// the boundary; the internal spectral pipeline is single precision
/// regardless of the input width.
pub trait Sample: Copy {
    /// Convert the sample to `f32`.
    fn to_f32(self) -> f32;
}

impl Sample for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }
}

impl Sample for i16 {
    #[inline]
    fn to_f32(self) -> f32 {
        f32::from(self)
    }
}

impl Sample for i32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }
}
