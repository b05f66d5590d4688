//! Core types for the QAM BER simulator
//!
//! This module defines the fundamental types shared by the codec, the
//! channel model and the Monte Carlo estimator, particularly the complex
//! I/Q (In-phase/Quadrature) symbol representation.
//!
//! ## Understanding I/Q symbols
//!
//! A QAM symbol is a point in the complex plane:
//! - **I (In-phase)**: the real component
//! - **Q (Quadrature)**: the imaginary component, 90° out of phase
//!
//! ```text
//!            Q (Imaginary)
//!            ^
//!      *     |     *
//!            |
//!   ---------+---------> I (Real)
//!            |
//!      *     |     *      (QPSK: 4 points, 2 bits/symbol)
//! ```

use num_complex::Complex64;

/// A single I/Q symbol in the f64 simulation path
pub type IQSample = Complex64;

/// A batch of I/Q symbols
pub type SymbolBatch = Vec<IQSample>;

/// Raw bits, one 0/1 value per element
pub type BitStream = Vec<u8>;

/// Result type for simulator operations
pub type SimResult<T> = Result<T, SimError>;

/// Errors that can occur in the codec, channel and estimator
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Requested constellation size is not one of the supported orders.
    /// Raised at scheme/codec construction and fatal to that construction.
    #[error("unsupported modulation order: {0}. Must be 4, 16, or 64")]
    UnsupportedOrder(usize),

    /// Bit batch length is not a multiple of the symbol width. Raised by
    /// `modulate`; the caller must pad or reject, the codec never pads.
    #[error("bit count {len} is not a multiple of {bits_per_symbol} bits per symbol")]
    InvalidBitCount { len: usize, bits_per_symbol: usize },

    /// Simulation parameters failed validation.
    #[error("invalid simulation parameters: {0}")]
    InvalidParams(String),

    /// Result sink I/O failure.
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}
