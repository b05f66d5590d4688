//! AWGN channel model
//!
//! Adds independent zero-mean Gaussian noise to each I/Q component of a
//! symbol batch, at a level implied by a target SNR. Signal power is
//! estimated from the batch itself, so the same channel works for any
//! constellation scale.
//!
//! ## Example
//!
//! ```rust
//! use qamsim::awgn::AwgnChannel;
//! use num_complex::Complex64;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let channel = AwgnChannel::new(10.0);
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let clean = vec![Complex64::new(1.0, 1.0); 100];
//! let noisy = channel.add_noise(&clean, &mut rng);
//! assert_eq!(noisy.len(), 100);
//! ```

use rand::Rng;
use rand_distr::StandardNormal;

use crate::types::{IQSample, SymbolBatch};

/// AWGN injector for a fixed target SNR.
///
/// Stateless: the caller supplies the random stream, so each worker owns
/// its own independently seeded generator and calls never share mutable
/// state.
#[derive(Debug, Clone, Copy)]
pub struct AwgnChannel {
    snr_db: f64,
}

impl AwgnChannel {
    /// Create a channel targeting the given SNR in dB.
    pub fn new(snr_db: f64) -> Self {
        Self { snr_db }
    }

    /// Target SNR in dB.
    pub fn snr_db(&self) -> f64 {
        self.snr_db
    }

    /// Per-component noise standard deviation for this batch.
    ///
    /// `sigma = sqrt(N/2)` with `N = P / 10^(snr/10)` and `P` the mean
    /// squared magnitude of the batch. Returns 0.0 when the batch power is
    /// degenerate (empty batch, zero or non-finite power): a batch that
    /// carries no signal gets no noise rather than a NaN cascade.
    pub fn sigma_for(&self, symbols: &[IQSample]) -> f64 {
        if symbols.is_empty() {
            return 0.0;
        }
        let signal_power =
            symbols.iter().map(|s| s.norm_sqr()).sum::<f64>() / symbols.len() as f64;
        if !signal_power.is_finite() || signal_power <= 0.0 {
            return 0.0;
        }
        let snr_linear = 10f64.powf(self.snr_db / 10.0);
        let noise_power = signal_power / snr_linear;
        (noise_power / 2.0).sqrt()
    }

    /// Add AWGN to a symbol batch.
    ///
    /// Draws two independent Gaussian samples per symbol (one per
    /// component) from the caller's RNG. Empty input yields empty output;
    /// degenerate batch power yields the input unchanged (see
    /// [`sigma_for`](Self::sigma_for)).
    pub fn add_noise<R: Rng>(&self, symbols: &[IQSample], rng: &mut R) -> SymbolBatch {
        let sigma = self.sigma_for(symbols);
        if sigma <= 0.0 {
            return symbols.to_vec();
        }

        symbols
            .iter()
            .map(|&s| {
                let n_re: f64 = rng.sample(StandardNormal);
                let n_im: f64 = rng.sample(StandardNormal);
                IQSample::new(s.re + sigma * n_re, s.im + sigma * n_im)
            })
            .collect()
    }
}
