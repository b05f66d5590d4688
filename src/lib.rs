//! # QAM BER Simulator
//!
//! Monte Carlo bit-error-rate estimation for Gray-coded QAM (QPSK, 16-QAM,
//! 64-QAM) over an AWGN channel, swept across a range of SNR points with
//! concurrent workers.
//!
//! ## Signal flow
//!
//! ```text
//! random bits → QamCodec.modulate → AwgnChannel.add_noise
//!             → QamCodec.demodulate_hard → compare → BerAccumulator
//!             → (SNR, BER) per point → CSV sink
//! ```
//!
//! ## Example
//!
//! ```rust
//! use qamsim::{AwgnChannel, ModulationScheme, QamCodec};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let codec = QamCodec::new(ModulationScheme::Qam16, 1.0);
//! let bits = vec![1, 0, 1, 1, 0, 0, 1, 0];
//! let symbols = codec.modulate(&bits).unwrap();
//!
//! let channel = AwgnChannel::new(25.0);
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let noisy = channel.add_noise(&symbols, &mut rng);
//!
//! // At 25 dB the hard decision recovers every bit
//! assert_eq!(codec.demodulate_hard(&noisy), bits);
//! ```

pub mod awgn;
pub mod ber_sweep;
pub mod bit_source;
pub mod csv_sink;
pub mod qam_codec;
pub mod types;

pub use awgn::AwgnChannel;
pub use ber_sweep::{
    pad_to_symbol_multiple, run_all, run_scheme, snr_points, BerAccumulator, BerPoint,
    SimulationParams,
};
pub use bit_source::generate_random_bits;
pub use csv_sink::{BerSink, CsvBerSink, MemorySink};
pub use qam_codec::{ModulationScheme, QamCodec};
pub use types::{BitStream, IQSample, SimError, SimResult, SymbolBatch};
