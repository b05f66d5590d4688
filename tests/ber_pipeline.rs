//! End-to-end pipeline tests: bits through codec, channel and estimator.

use qamsim::{
    generate_random_bits, run_scheme, AwgnChannel, MemorySink, ModulationScheme, QamCodec,
    SimulationParams,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn clean_channel_recovers_all_bits() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for scheme in ModulationScheme::all() {
        let codec = QamCodec::new(scheme, 1.0);
        let bits = generate_random_bits(&mut rng, 100 * scheme.bits_per_symbol());
        let symbols = codec.modulate(&bits).unwrap();
        // 60 dB: noise is ~6 orders of magnitude below the signal
        let channel = AwgnChannel::new(60.0);
        let noisy = channel.add_noise(&symbols, &mut rng);
        assert_eq!(
            codec.demodulate_hard(&noisy),
            bits,
            "{} failed clean recovery",
            scheme.name()
        );
    }
}

#[test]
fn soft_decisions_agree_with_hard_at_high_snr() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let codec = QamCodec::new(ModulationScheme::Qam16, 1.0);
    let bits = generate_random_bits(&mut rng, 400);
    let symbols = codec.modulate(&bits).unwrap();

    let channel = AwgnChannel::new(30.0);
    let noisy = channel.add_noise(&symbols, &mut rng);
    let sigma = channel.sigma_for(&symbols);

    let hard = codec.demodulate_hard(&noisy);
    let llrs = codec.demodulate_soft(&noisy, sigma);
    assert_eq!(llrs.len(), hard.len());
    for (llr, &bit) in llrs.iter().zip(hard.iter()) {
        let soft_bit = if *llr > 0.0 { 1 } else { 0 };
        assert_eq!(soft_bit, bit);
    }
}

#[test]
fn ber_decreases_with_snr() {
    // Statistical: enough bits that QPSK BER at 0/4/8 dB symbol SNR
    // separates cleanly (theory: ~1.6e-1, ~5.6e-2, ~6e-3).
    let params = SimulationParams {
        snr_start: 0.0,
        snr_end: 8.0,
        snr_step: 4.0,
        num_workers: 2,
        bits_per_worker: 20_000,
        iterations_per_snr: 2,
    };
    let mut sink = MemorySink::new();
    let points = run_scheme(ModulationScheme::Qpsk, &params, &mut sink).unwrap();
    assert_eq!(points.len(), 3);
    for pair in points.windows(2) {
        assert!(
            pair[1].ber <= pair[0].ber + 0.01,
            "BER rose with SNR: {:?}",
            points
        );
    }
    // Low SNR end really does see errors
    assert!(points[0].ber > 0.02);
    // High SNR end is markedly better than the low end
    assert!(points[2].ber < points[0].ber / 10.0);
}

#[test]
fn higher_order_schemes_have_higher_ber_at_same_snr() {
    // At 8 dB SNR, 64-QAM is far noisier per bit than QPSK.
    let params = SimulationParams {
        snr_start: 8.0,
        snr_end: 8.0,
        snr_step: 1.0,
        num_workers: 2,
        bits_per_worker: 12_000,
        iterations_per_snr: 2,
    };
    let mut qpsk_sink = MemorySink::new();
    let qpsk = run_scheme(ModulationScheme::Qpsk, &params, &mut qpsk_sink).unwrap();
    let mut qam64_sink = MemorySink::new();
    let qam64 = run_scheme(ModulationScheme::Qam64, &params, &mut qam64_sink).unwrap();
    assert!(
        qam64[0].ber > qpsk[0].ber,
        "64-QAM BER {} should exceed QPSK BER {}",
        qam64[0].ber,
        qpsk[0].ber
    );
}

#[test]
fn full_sweep_reports_every_point_once() {
    let params = SimulationParams {
        snr_start: 0.0,
        snr_end: 1.0,
        snr_step: 0.1,
        num_workers: 3,
        bits_per_worker: 120,
        iterations_per_snr: 1,
    };
    let mut sink = MemorySink::new();
    let points = run_scheme(ModulationScheme::Qam16, &params, &mut sink).unwrap();
    // Inclusive floating-point bound: 11 points, not 10
    assert_eq!(points.len(), 11);
    assert_eq!(sink.points().len(), 11);
    for (point, (snr, ber)) in points.iter().zip(sink.points()) {
        assert_eq!(point.snr_db, *snr);
        assert_eq!(point.ber, *ber);
        assert_eq!(point.bits, 3 * 120);
    }
}
