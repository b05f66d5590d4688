//! QAM constellation codec: Gray-coded bit/symbol mapping
//!
//! Deterministic, stateless-after-construction mapping between bit groups
//! and constellation points for QPSK (4-QAM), 16-QAM and 64-QAM, with hard
//! (nearest point) and soft (max-log LLR) recovery.
//!
//! ## Constellation
//!
//! ```text
//! 16-QAM (4 bits per symbol):
//!
//!          Q
//!   ●  ●   │   ●  ●
//!   ●  ●   │   ●  ●
//!   ───────┼───────→ I
//!   ●  ●   │   ●  ●
//!   ●  ●   │   ●  ●
//! ```
//!
//! The square constellations are built separably: the symbol index is split
//! into two halves (upper half selects the I axis, lower half the Q axis),
//! each half is Gray-decoded and looked up in a PAM level table. Adjacent
//! points on either axis therefore differ in exactly one bit.
//!
//! The codec is generic over the point scalar so the same tables can be
//! built in floating point (the simulation path) or in fixed-point integers.
//!
//! ## Example
//!
//! ```rust
//! use qamsim::qam_codec::{ModulationScheme, QamCodec};
//!
//! let codec = QamCodec::new(ModulationScheme::Qpsk, 1.0);
//! let symbols = codec.modulate(&[0, 0]).unwrap();
//! assert_eq!((symbols[0].re, symbols[0].im), (1.0, 1.0));
//! assert_eq!(codec.demodulate_hard(&symbols), vec![0, 0]);
//! ```

use num_complex::Complex;
use num_traits::{Num, NumCast};
use serde::{Deserialize, Serialize};

use crate::types::{BitStream, SimError, SimResult};

/// PAM amplitude levels for 16-QAM (4 levels per axis).
const PAM_16: [i32; 4] = [-3, -1, 1, 3];

/// PAM amplitude levels for 64-QAM (8 levels per axis).
const PAM_64: [i32; 8] = [-7, -5, -3, -1, 1, 3, 5, 7];

/// Supported modulation orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModulationScheme {
    /// 4-QAM, 2 bits/symbol
    Qpsk,
    /// 16-QAM, 4 bits/symbol
    Qam16,
    /// 64-QAM, 6 bits/symbol
    Qam64,
}

impl ModulationScheme {
    /// Resolve a constellation size to a scheme.
    pub fn from_levels(levels: usize) -> SimResult<Self> {
        match levels {
            4 => Ok(ModulationScheme::Qpsk),
            16 => Ok(ModulationScheme::Qam16),
            64 => Ok(ModulationScheme::Qam64),
            other => Err(SimError::UnsupportedOrder(other)),
        }
    }

    /// Number of constellation points.
    pub fn levels(&self) -> usize {
        match self {
            ModulationScheme::Qpsk => 4,
            ModulationScheme::Qam16 => 16,
            ModulationScheme::Qam64 => 64,
        }
    }

    /// Bits encoded per symbol (log2 of the order).
    pub fn bits_per_symbol(&self) -> usize {
        match self {
            ModulationScheme::Qpsk => 2,
            ModulationScheme::Qam16 => 4,
            ModulationScheme::Qam64 => 6,
        }
    }

    /// Short lowercase name used in output file naming.
    pub fn name(&self) -> &'static str {
        match self {
            ModulationScheme::Qpsk => "qpsk",
            ModulationScheme::Qam16 => "qam16",
            ModulationScheme::Qam64 => "qam64",
        }
    }

    /// Name of the per-scheme CSV artifact.
    pub fn csv_filename(&self) -> String {
        format!("ber_{}.csv", self.name())
    }

    /// All supported schemes, in sweep order.
    pub fn all() -> [ModulationScheme; 3] {
        [
            ModulationScheme::Qpsk,
            ModulationScheme::Qam16,
            ModulationScheme::Qam64,
        ]
    }
}

/// Gray-to-binary conversion: iteratively XOR with the right-shifted self.
fn gray_to_binary(mut g: usize) -> usize {
    let mut b = 0;
    while g != 0 {
        b ^= g;
        g >>= 1;
    }
    b
}

/// QAM modulator/demodulator over a fixed Gray-coded constellation.
///
/// The constellation and bit-pattern tables are built once at construction
/// and immutable thereafter; the codec can be shared read-only across
/// worker threads.
#[derive(Debug, Clone)]
pub struct QamCodec<T = f64> {
    scheme: ModulationScheme,
    scale_factor: T,
    /// Constellation points; index `i` holds the Gray-coded point for the
    /// binary bit group `i`.
    constellation: Vec<Complex<T>>,
    /// Bit pattern per constellation index, MSB first.
    bit_patterns: Vec<Vec<u8>>,
    /// Mean squared magnitude over the constellation.
    average_power: f64,
}

impl<T: Copy + Num + NumCast> QamCodec<T> {
    /// Create a codec for the given scheme and amplitude scale factor.
    pub fn new(scheme: ModulationScheme, scale_factor: T) -> Self {
        let constellation = Self::build_constellation(scheme, scale_factor);
        let bit_patterns = Self::build_bit_patterns(scheme);
        let average_power = constellation
            .iter()
            .map(|p| {
                let re = to_f64(p.re);
                let im = to_f64(p.im);
                re * re + im * im
            })
            .sum::<f64>()
            / scheme.levels() as f64;

        Self {
            scheme,
            scale_factor,
            constellation,
            bit_patterns,
            average_power,
        }
    }

    /// Create a codec from a raw constellation size.
    pub fn from_levels(levels: usize, scale_factor: T) -> SimResult<Self> {
        Ok(Self::new(ModulationScheme::from_levels(levels)?, scale_factor))
    }

    fn build_constellation(scheme: ModulationScheme, scale: T) -> Vec<Complex<T>> {
        let point = |i: i32, q: i32| Complex::new(scale * cast::<T>(i), scale * cast::<T>(q));

        match scheme {
            // Hand-enumerated Gray cycle: adjacent quadrants differ in one bit.
            ModulationScheme::Qpsk => {
                vec![point(1, 1), point(-1, 1), point(-1, -1), point(1, -1)]
            }
            ModulationScheme::Qam16 => Self::square_constellation(scheme, &PAM_16, point),
            ModulationScheme::Qam64 => Self::square_constellation(scheme, &PAM_64, point),
        }
    }

    /// Separable square constellation: upper index half selects the I level,
    /// lower half the Q level, each half Gray-decoded into the PAM table.
    fn square_constellation(
        scheme: ModulationScheme,
        pam: &[i32],
        point: impl Fn(i32, i32) -> Complex<T>,
    ) -> Vec<Complex<T>> {
        let half_bits = scheme.bits_per_symbol() / 2;
        let mask = (1usize << half_bits) - 1;

        (0..scheme.levels())
            .map(|idx| {
                let upper = (idx >> half_bits) & mask;
                let lower = idx & mask;
                let i_level = pam[gray_to_binary(upper)];
                let q_level = pam[gray_to_binary(lower)];
                point(i_level, q_level)
            })
            .collect()
    }

    fn build_bit_patterns(scheme: ModulationScheme) -> Vec<Vec<u8>> {
        let bps = scheme.bits_per_symbol();
        (0..scheme.levels())
            .map(|i| (0..bps).map(|j| ((i >> (bps - 1 - j)) & 1) as u8).collect())
            .collect()
    }

    /// The modulation scheme this codec was built for.
    pub fn scheme(&self) -> ModulationScheme {
        self.scheme
    }

    /// Amplitude scale factor applied to all points.
    pub fn scale_factor(&self) -> T {
        self.scale_factor
    }

    /// Constellation points, indexed by bit-group value.
    pub fn constellation(&self) -> &[Complex<T>] {
        &self.constellation
    }

    /// Bit pattern per constellation index, MSB first.
    pub fn bit_patterns(&self) -> &[Vec<u8>] {
        &self.bit_patterns
    }

    /// Mean squared magnitude of the constellation.
    pub fn average_power(&self) -> f64 {
        self.average_power
    }

    /// Map a bit stream to constellation points.
    ///
    /// Bits are consumed in groups of `bits_per_symbol`, MSB first. The
    /// length must be an exact multiple of the group width; the codec never
    /// pads or truncates. An empty input yields an empty batch.
    pub fn modulate(&self, bits: &[u8]) -> SimResult<Vec<Complex<T>>> {
        let bps = self.scheme.bits_per_symbol();
        if bits.len() % bps != 0 {
            return Err(SimError::InvalidBitCount {
                len: bits.len(),
                bits_per_symbol: bps,
            });
        }

        let symbols = bits
            .chunks_exact(bps)
            .map(|group| {
                let index = group
                    .iter()
                    .fold(0usize, |acc, &bit| (acc << 1) | (bit as usize & 1));
                self.constellation[index]
            })
            .collect();

        Ok(symbols)
    }

    /// Hard-decision demodulation: nearest constellation point by squared
    /// Euclidean distance, ties resolved toward the lowest index.
    pub fn demodulate_hard(&self, symbols: &[Complex<T>]) -> BitStream {
        let bps = self.scheme.bits_per_symbol();
        let mut bits = Vec::with_capacity(symbols.len() * bps);

        for s in symbols {
            let mut best_idx = 0;
            let mut best_dist = distance_sqr(s, &self.constellation[0]);
            for (idx, point) in self.constellation.iter().enumerate().skip(1) {
                let dist = distance_sqr(s, point);
                if dist < best_dist {
                    best_dist = dist;
                    best_idx = idx;
                }
            }
            bits.extend_from_slice(&self.bit_patterns[best_idx]);
        }

        bits
    }

    /// Soft-decision demodulation to max-log LLRs.
    ///
    /// For each received symbol and bit position `j`, computes the minimum
    /// squared distance over points whose bit `j` is 0 (`d0`) and 1 (`d1`)
    /// and emits `(d0 - d1) / (2·sigma²)`. One LLR per bit, in the same
    /// order as the hard-decision stream. `sigma` is the per-component
    /// noise standard deviation.
    ///
    /// `sigma²` is floored at `1e-12`, so a noiseless call (`sigma = 0`)
    /// yields large finite LLRs rather than non-finite ratios.
    pub fn demodulate_soft(&self, symbols: &[Complex<T>], sigma: f64) -> Vec<f64> {
        let bps = self.scheme.bits_per_symbol();
        // Floor keeps zero-sigma calls finite
        let sigma_sq = (sigma * sigma).max(1e-12);
        let mut llrs = Vec::with_capacity(symbols.len() * bps);

        for s in symbols {
            let dists: Vec<f64> = self
                .constellation
                .iter()
                .map(|point| distance_sqr(s, point))
                .collect();

            for j in 0..bps {
                let mut min_d0 = f64::INFINITY;
                let mut min_d1 = f64::INFINITY;
                for (idx, &dist) in dists.iter().enumerate() {
                    if self.bit_patterns[idx][j] == 1 {
                        min_d1 = min_d1.min(dist);
                    } else {
                        min_d0 = min_d0.min(dist);
                    }
                }
                llrs.push((min_d0 - min_d1) / (2.0 * sigma_sq));
            }
        }

        llrs
    }
}

/// Squared Euclidean distance, computed in f64 regardless of the scalar.
fn distance_sqr<T: Copy + NumCast>(a: &Complex<T>, b: &Complex<T>) -> f64 {
    let dr = to_f64(a.re) - to_f64(b.re);
    let di = to_f64(a.im) - to_f64(b.im);
    dr * dr + di * di
}

/// PAM levels are small integers, representable in any practical scalar.
fn cast<T: NumCast>(v: i32) -> T {
    T::from(v).unwrap()
}

fn to_f64<T: NumCast>(v: T) -> f64 {
    num_traits::cast(v).unwrap()
}
