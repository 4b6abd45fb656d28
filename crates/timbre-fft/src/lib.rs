//! rustfft-backed transform engine for the timbre analyzer.
//!
//! Implements the [`FftEngine`] adapter contract on top of a cached
//! rustfft plan plus a precomputed analysis window. The plan and window
//! coefficients are rebuilt only when the analyzer adopts a new frame
//! length, mirroring the analyzer's own buffer-reuse discipline.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{FftPlanner, num_complex::Complex};
use timbre_core::FftEngine;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    Hann,
    /// Hamming window
    Hamming,
    /// Blackman window
    Blackman,
}

impl Window {
    /// Compute the window coefficients for a frame size.
    pub fn coefficients(self, size: usize) -> Vec<f32> {
        (0..size)
            .map(|i| {
                let x = 2.0 * PI * i as f32 / size as f32;
                match self {
                    Window::Rectangular => 1.0,
                    Window::Hann => 0.5 * (1.0 - x.cos()),
                    Window::Hamming => 0.54 - 0.46 * x.cos(),
                    Window::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
                }
            })
            .collect()
    }
}

/// Forward real FFT engine with plan and window caching.
pub struct RustFftEngine {
    planner: FftPlanner<f32>,
    fft: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
    window: Window,
    coefficients: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl RustFftEngine {
    /// Create an engine for the given frame size with a Hamming window,
    /// the standard choice for the analyzer's single-frame pipeline.
    pub fn new(size: usize) -> Self {
        Self::with_window(size, Window::Hamming)
    }

    /// Create an engine with an explicit window function.
    pub fn with_window(size: usize, window: Window) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);

        Self {
            planner,
            fft,
            size,
            window,
            coefficients: window.coefficients(size),
            scratch: vec![Complex::new(0.0, 0.0); size],
        }
    }

    /// Current frame size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The window function in use.
    pub fn window(&self) -> Window {
        self.window
    }
}

impl FftEngine for RustFftEngine {
    fn prepare(&mut self, frame_length: usize) {
        if frame_length != self.size {
            self.fft = self.planner.plan_fft_forward(frame_length);
            self.coefficients = self.window.coefficients(frame_length);
            self.scratch.resize(frame_length, Complex::new(0.0, 0.0));
            self.size = frame_length;
        }
    }

    fn apply_window(&self, frame: &mut [f32]) {
        for (sample, &coeff) in frame.iter_mut().zip(self.coefficients.iter()) {
            *sample *= coeff;
        }
    }

    fn remove_dc(&self, frame: &mut [f32]) {
        if frame.is_empty() {
            return;
        }
        let mean: f32 = frame.iter().sum::<f32>() / frame.len() as f32;
        for sample in frame.iter_mut() {
            *sample -= mean;
        }
    }

    fn execute(&mut self, frame: &mut [f32], spectrum: &mut [f32]) {
        for (c, &x) in self.scratch.iter_mut().zip(frame.iter()) {
            *c = Complex::new(x, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // split complex back into the caller-owned real/imaginary pair
        for (i, c) in self.scratch.iter().enumerate() {
            frame[i] = c.re;
            spectrum[i] = c.im;
        }
    }

    fn to_magnitude(&mut self, frame: &mut [f32], spectrum: &mut [f32]) {
        let bins = frame.len() / 2;
        for i in 0..bins {
            spectrum[i] = (frame[i] * frame[i] + spectrum[i] * spectrum[i]).sqrt();
        }
    }

    fn peak_bin(&self, bins: &[f32]) -> usize {
        if bins.len() < 2 {
            return 0;
        }
        let mut peak = 1;
        for (i, &mag) in bins.iter().enumerate().skip(2) {
            if mag > bins[peak] {
                peak = i;
            }
        }
        peak
    }

    fn peak_magnitude(&self, bins: &[f32]) -> f32 {
        if bins.len() < 2 {
            return 0.0;
        }
        bins[self.peak_bin(bins)]
    }
}
