//! Fallible working-buffer allocation.
//!
//! Constrained heaps are the normal deployment target, so every buffer the
//! engine owns is acquired through `try_reserve_exact` and a failure is
//! surfaced as [`AnalyzerError::Allocation`] instead of aborting.

use alloc::vec::Vec;

use crate::error::AnalyzerError;

pub(crate) fn try_buffer<T: Clone + Default>(
    buffer: &'static str,
    len: usize,
) -> Result<Vec<T>, AnalyzerError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| AnalyzerError::Allocation { buffer, len })?;
    v.resize(len, T::default());
    Ok(v)
}
