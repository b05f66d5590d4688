//! Command-line entry point for the QAM BER sweep.
//!
//! Usage:
//!
//! ```text
//! qamsim <snr_start> <snr_end> <snr_step> <num_threads> <bits_per_thread> <iterations_per_snr>
//! ```
//!
//! Runs the Monte Carlo sweep for QPSK, 16-QAM and 64-QAM and writes one
//! `ber_<scheme>.csv` per scheme into the current directory.

use std::env;
use std::process::ExitCode;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use qamsim::{run_all, SimulationParams};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let params = match parse_args(&args) {
        Ok(params) => params,
        Err(message) => {
            eprintln!("{message}");
            eprintln!(
                "Usage: {} <snr_start> <snr_end> <snr_step> <num_threads> \
                 <bits_per_thread> <iterations_per_snr>",
                args.first().map(String::as_str).unwrap_or("qamsim")
            );
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run_all(&params) {
        tracing::error!(error = %err, "simulation failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Parse the six required positional arguments.
fn parse_args(args: &[String]) -> Result<SimulationParams, String> {
    if args.len() < 7 {
        return Err("error: expected 6 arguments".into());
    }

    let params = SimulationParams {
        snr_start: parse_field(&args[1], "snr_start")?,
        snr_end: parse_field(&args[2], "snr_end")?,
        snr_step: parse_field(&args[3], "snr_step")?,
        num_workers: parse_field(&args[4], "num_threads")?,
        bits_per_worker: parse_field(&args[5], "bits_per_thread")?,
        iterations_per_snr: parse_field(&args[6], "iterations_per_snr")?,
    };
    params.validate().map_err(|e| format!("error: {e}"))?;
    Ok(params)
}

fn parse_field<T: FromStr>(value: &str, name: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("error: invalid value {value:?} for {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        std::iter::once("qamsim")
            .chain(values.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_valid_args() {
        let params = parse_args(&args(&["0", "10", "0.5", "4", "100000", "10"])).unwrap();
        assert_eq!(params.snr_start, 0.0);
        assert_eq!(params.snr_end, 10.0);
        assert_eq!(params.snr_step, 0.5);
        assert_eq!(params.num_workers, 4);
        assert_eq!(params.bits_per_worker, 100_000);
        assert_eq!(params.iterations_per_snr, 10);
    }

    #[test]
    fn test_missing_args_rejected() {
        assert!(parse_args(&args(&["0", "10", "0.5"])).is_err());
        assert!(parse_args(&args(&[])).is_err());
    }

    #[test]
    fn test_unparseable_args_rejected() {
        assert!(parse_args(&args(&["zero", "10", "0.5", "4", "1000", "10"])).is_err());
        assert!(parse_args(&args(&["0", "10", "0.5", "-4", "1000", "10"])).is_err());
    }

    #[test]
    fn test_invalid_params_rejected() {
        // Parses fine but fails validation (step must be positive)
        assert!(parse_args(&args(&["0", "10", "0", "4", "1000", "10"])).is_err());
    }
}
