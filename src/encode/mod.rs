//! Final encode: frame sequence plus audio into one video file.

/// External encoder invocation.
pub mod mux;
