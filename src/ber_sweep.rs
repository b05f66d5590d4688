//! Concurrent Monte Carlo BER estimator
//!
//! Sweeps a range of SNR points and estimates the bit error rate at each
//! one by repeated independent trials: random bits → modulate → AWGN →
//! hard demodulate → compare.
//!
//! ## Concurrency model
//!
//! A fixed set of worker threads is spawned per scheme run and joined at a
//! single fork/join barrier. Every worker sweeps the *full* SNR list (work
//! is replicated, not partitioned, so total trials per point are
//! `num_workers × iterations_per_snr`). The only shared mutable state is
//! one pair of atomic counters per SNR point; each worker owns its own
//! ChaCha stream seeded from the clock and its worker index.
//!
//! ## Example
//!
//! ```rust
//! use qamsim::ber_sweep::{run_scheme, SimulationParams};
//! use qamsim::csv_sink::MemorySink;
//! use qamsim::qam_codec::ModulationScheme;
//!
//! let params = SimulationParams {
//!     snr_start: 0.0,
//!     snr_end: 4.0,
//!     snr_step: 2.0,
//!     num_workers: 2,
//!     bits_per_worker: 1000,
//!     iterations_per_snr: 1,
//! };
//! let mut sink = MemorySink::new();
//! let points = run_scheme(ModulationScheme::Qpsk, &params, &mut sink).unwrap();
//! assert_eq!(points.len(), 3);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::awgn::AwgnChannel;
use crate::bit_source::generate_random_bits;
use crate::csv_sink::{BerSink, CsvBerSink};
use crate::qam_codec::{ModulationScheme, QamCodec};
use crate::types::{SimError, SimResult};

/// Monte Carlo sweep configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationParams {
    /// First SNR point in dB.
    pub snr_start: f64,
    /// Last SNR point in dB (inclusive).
    pub snr_end: f64,
    /// SNR increment in dB.
    pub snr_step: f64,
    /// Number of parallel workers per scheme run.
    pub num_workers: usize,
    /// Bits generated per worker per trial (padded up to a symbol multiple).
    pub bits_per_worker: usize,
    /// Trials per worker per SNR point.
    pub iterations_per_snr: usize,
}

impl SimulationParams {
    /// Check the parameter set before running.
    pub fn validate(&self) -> SimResult<()> {
        if !self.snr_step.is_finite() || self.snr_step <= 0.0 {
            return Err(SimError::InvalidParams(format!(
                "snr_step must be finite and positive, got {}",
                self.snr_step
            )));
        }
        if !self.snr_start.is_finite() || !self.snr_end.is_finite() {
            return Err(SimError::InvalidParams(
                "snr_start and snr_end must be finite".into(),
            ));
        }
        if self.num_workers == 0 {
            return Err(SimError::InvalidParams("num_workers must be at least 1".into()));
        }
        if self.bits_per_worker == 0 {
            return Err(SimError::InvalidParams(
                "bits_per_worker must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// SNR sweep points: `start, start+step, ...` up to `end` inclusive.
///
/// The upper bound is accepted within `step * 1e-9` so that accumulated
/// floating-point rounding cannot drop the final point.
pub fn snr_points(start: f64, end: f64, step: f64) -> Vec<f64> {
    let mut points = Vec::new();
    if !(step > 0.0) {
        return points;
    }
    let tolerance = step * 1e-9;
    let mut snr = start;
    while snr <= end + tolerance {
        points.push(snr);
        snr += step;
    }
    points
}

/// Round a bit count up to the next multiple of the symbol width.
pub fn pad_to_symbol_multiple(bits: usize, bits_per_symbol: usize) -> usize {
    let rem = bits % bits_per_symbol;
    if rem == 0 {
        bits
    } else {
        bits + (bits_per_symbol - rem)
    }
}

/// Shared per-SNR-point error/bit counters.
///
/// Written by every worker with pure atomic increments; read once after
/// the join barrier.
#[derive(Debug, Default)]
pub struct BerAccumulator {
    errors: AtomicU64,
    bits: AtomicU64,
}

impl BerAccumulator {
    /// Add one trial's error and bit counts.
    pub fn record(&self, errors: u64, bits: u64) {
        self.errors.fetch_add(errors, Ordering::Relaxed);
        self.bits.fetch_add(bits, Ordering::Relaxed);
    }

    /// Total bit errors observed.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Total bits observed.
    pub fn bits(&self) -> u64 {
        self.bits.load(Ordering::Relaxed)
    }

    /// Error rate; 0.0 before any bits were observed.
    pub fn ber(&self) -> f64 {
        let bits = self.bits();
        if bits == 0 {
            return 0.0;
        }
        self.errors() as f64 / bits as f64
    }
}

/// One aggregated sweep result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BerPoint {
    /// SNR in dB.
    pub snr_db: f64,
    /// Measured bit error rate.
    pub ber: f64,
    /// Total bit errors across all workers and trials.
    pub errors: u64,
    /// Total bits across all workers and trials.
    pub bits: u64,
}

/// Run the Monte Carlo sweep for one modulation scheme.
///
/// Reports `(snr_db, ber)` pairs to `sink` in ascending SNR order and
/// returns the full per-point results.
pub fn run_scheme(
    scheme: ModulationScheme,
    params: &SimulationParams,
    sink: &mut dyn BerSink,
) -> SimResult<Vec<BerPoint>> {
    params.validate()?;

    let bps = scheme.bits_per_symbol();
    let bits_per_worker = pad_to_symbol_multiple(params.bits_per_worker, bps);
    if bits_per_worker != params.bits_per_worker {
        tracing::debug!(
            scheme = scheme.name(),
            from = params.bits_per_worker,
            to = bits_per_worker,
            "padded bits_per_worker to a symbol multiple"
        );
    }

    let snrs = snr_points(params.snr_start, params.snr_end, params.snr_step);
    let accumulators: Vec<BerAccumulator> =
        (0..snrs.len()).map(|_| BerAccumulator::default()).collect();

    // Tables are built once and shared read-only across all workers.
    let codec: QamCodec<f64> = QamCodec::new(scheme, 1.0);

    let iterations = params.iterations_per_snr;
    let worker_results: Vec<SimResult<()>> = thread::scope(|s| {
        let handles: Vec<_> = (0..params.num_workers)
            .map(|worker| {
                let codec = &codec;
                let snrs = &snrs;
                let accumulators = &accumulators;
                s.spawn(move || -> SimResult<()> {
                    let mut rng = ChaCha8Rng::seed_from_u64(worker_seed(worker));
                    for (point_idx, &snr_db) in snrs.iter().enumerate() {
                        let channel = AwgnChannel::new(snr_db);
                        for _ in 0..iterations {
                            let bits = generate_random_bits(&mut rng, bits_per_worker);
                            let symbols = codec.modulate(&bits)?;
                            let noisy = channel.add_noise(&symbols, &mut rng);
                            let recovered = codec.demodulate_hard(&noisy);
                            let errors = bits
                                .iter()
                                .zip(recovered.iter())
                                .filter(|(tx, rx)| tx != rx)
                                .count() as u64;
                            accumulators[point_idx].record(errors, bits.len() as u64);
                        }
                    }
                    Ok(())
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("worker thread panicked"))
            .collect()
    });
    for result in worker_results {
        result?;
    }

    let mut points = Vec::with_capacity(snrs.len());
    for (snr_db, acc) in snrs.iter().zip(accumulators.iter()) {
        let point = BerPoint {
            snr_db: *snr_db,
            ber: acc.ber(),
            errors: acc.errors(),
            bits: acc.bits(),
        };
        sink.record(point.snr_db, point.ber)?;
        tracing::info!(
            scheme = scheme.name(),
            snr_db = point.snr_db,
            ber = point.ber,
            errors = point.errors,
            bits = point.bits,
            "snr point complete"
        );
        points.push(point);
    }

    Ok(points)
}

/// Run the sweep for all supported schemes, each into its own
/// `ber_<scheme>.csv` file in the current directory.
pub fn run_all(params: &SimulationParams) -> SimResult<()> {
    for scheme in ModulationScheme::all() {
        tracing::info!(scheme = scheme.name(), "starting scheme sweep");
        let mut sink = CsvBerSink::create(scheme.csv_filename())?;
        run_scheme(scheme, params, &mut sink)?;
        sink.flush()?;
        tracing::info!(
            scheme = scheme.name(),
            file = %scheme.csv_filename(),
            "scheme sweep complete"
        );
    }
    Ok(())
}

/// Per-worker seed: high-resolution clock combined with the worker index,
/// so parallel streams are decorrelated run to run.
fn worker_seed(worker: usize) -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
        .wrapping_add(worker as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_sink::MemorySink;

    fn base_params() -> SimulationParams {
        SimulationParams {
            snr_start: 0.0,
            snr_end: 4.0,
            snr_step: 2.0,
            num_workers: 2,
            bits_per_worker: 600,
            iterations_per_snr: 2,
        }
    }

    #[test]
    fn test_snr_points_basic() {
        assert_eq!(snr_points(0.0, 10.0, 3.0), vec![0.0, 3.0, 6.0, 9.0]);
        assert_eq!(snr_points(5.0, 5.0, 1.0), vec![5.0]);
        assert!(snr_points(5.0, 4.0, 1.0).is_empty());
    }

    #[test]
    fn test_snr_points_inclusive_bound_with_fp_step() {
        // 0.1 is not exactly representable; repeated addition drifts.
        // The tolerance must keep the final point.
        let points = snr_points(0.0, 1.0, 0.1);
        assert_eq!(points.len(), 11);
        assert!((points[10] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pad_to_symbol_multiple() {
        assert_eq!(pad_to_symbol_multiple(12, 6), 12);
        assert_eq!(pad_to_symbol_multiple(10, 6), 12);
        assert_eq!(pad_to_symbol_multiple(1, 2), 2);
        assert_eq!(pad_to_symbol_multiple(0, 4), 0);
    }

    #[test]
    fn test_params_validation() {
        let mut p = base_params();
        assert!(p.validate().is_ok());
        p.snr_step = 0.0;
        assert!(p.validate().is_err());
        p = base_params();
        p.num_workers = 0;
        assert!(p.validate().is_err());
        p = base_params();
        p.bits_per_worker = 0;
        assert!(p.validate().is_err());
        p = base_params();
        p.snr_end = f64::NAN;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_accumulator_concurrent_increments() {
        let acc = BerAccumulator::default();
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        acc.record(1, 10);
                    }
                });
            }
        });
        assert_eq!(acc.errors(), 8_000);
        assert_eq!(acc.bits(), 80_000);
        assert!((acc.ber() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_accumulator_empty_ber() {
        let acc = BerAccumulator::default();
        assert_eq!(acc.ber(), 0.0);
    }

    #[test]
    fn test_counts_independent_of_worker_count() {
        // At 100 dB the noise is negligible: every trial is deterministic
        // (zero errors), so aggregate counts must not depend on how the
        // work is spread across workers.
        let mut totals = Vec::new();
        for workers in [1, 2, 4] {
            let params = SimulationParams {
                snr_start: 100.0,
                snr_end: 100.0,
                snr_step: 1.0,
                num_workers: workers,
                bits_per_worker: 601, // pads to 602 for QPSK
                iterations_per_snr: 3,
            };
            let mut sink = MemorySink::new();
            let points = run_scheme(ModulationScheme::Qpsk, &params, &mut sink).unwrap();
            assert_eq!(points.len(), 1);
            assert_eq!(points[0].errors, 0);
            assert_eq!(points[0].bits, (workers * 3 * 602) as u64);
            totals.push(points[0].bits / workers as u64);
        }
        // Per-worker contribution is identical regardless of worker count
        assert!(totals.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_bits_padded_for_qam64() {
        let params = SimulationParams {
            snr_start: 100.0,
            snr_end: 100.0,
            snr_step: 1.0,
            num_workers: 1,
            bits_per_worker: 10, // pads to 12 for 6 bits/symbol
            iterations_per_snr: 1,
        };
        let mut sink = MemorySink::new();
        let points = run_scheme(ModulationScheme::Qam64, &params, &mut sink).unwrap();
        assert_eq!(points[0].bits, 12);
    }

    #[test]
    fn test_sink_receives_points_in_order() {
        let params = base_params();
        let mut sink = MemorySink::new();
        let points = run_scheme(ModulationScheme::Qam16, &params, &mut sink).unwrap();
        assert_eq!(points.len(), 3);
        let recorded: Vec<f64> = sink.points().iter().map(|(snr, _)| *snr).collect();
        assert_eq!(recorded, vec![0.0, 2.0, 4.0]);
    }
}
