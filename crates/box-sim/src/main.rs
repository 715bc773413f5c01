//! box-sim: reads a loudspeaker/enclosure description as JSON, writes the
//! simulated SPL, impedance and power curves as JSON.

mod envelope;
mod units;

use box_core::{DiaphragmRadiation, EngineConfig, Medium, SimError, SimRequest};
use clap::Parser;
use log::{debug, error};
use serde_json::{Map, Value};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sim(#[from] SimError),
}

/// Loudspeaker enclosure response simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON input file (reads stdin when absent)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Number of log-spaced frequency points
    #[arg(long, default_value_t = 957)]
    points: usize,

    /// Lowest frequency (Hz)
    #[arg(long, default_value_t = 20.0)]
    f_min: f64,

    /// Highest frequency (Hz)
    #[arg(long, default_value_t = 20_000.0)]
    f_max: f64,

    /// Highest index kept in the rectangular port series
    #[arg(long, default_value_t = 10)]
    truncation: usize,

    /// Report diaphragm and port SPL separately (ported only)
    #[arg(long)]
    split: bool,

    /// Evaluate the grid on a single thread
    #[arg(long)]
    sequential: bool,

    /// Use the low-frequency approximation for the diaphragm radiation
    #[arg(long)]
    simplified_radiation: bool,

    /// Air temperature (°C); sets speed of sound and density from the
    /// ideal-gas relations instead of the built-in constants
    #[arg(long, allow_negative_numbers = true)]
    temperature: Option<f64>,

    /// Pretty-print the output JSON
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            f_min: self.f_min,
            f_max: self.f_max,
            points: self.points,
            truncation_limit: self.truncation,
            split_contributions: self.split,
            parallel: !self.sequential,
            diaphragm_radiation: if self.simplified_radiation {
                DiaphragmRadiation::Simplified
            } else {
                DiaphragmRadiation::Piston
            },
            ..EngineConfig::default()
        }
    }

    fn medium(&self) -> Medium {
        match self.temperature {
            Some(celsius) => Medium::at_temperature(celsius),
            None => Medium::default(),
        }
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String, CliError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run(args: &Args) -> Result<Value, CliError> {
    let raw = read_input(args.input.as_ref())?;
    let payload: Map<String, Value> = serde_json::from_str(&raw)?;
    let request = SimRequest {
        medium: args.medium(),
        ..units::request_from_payload(&payload, args.engine_config())?
    };
    debug!("request: {request:?}");
    let response = box_core::compute(&request)?;
    Ok(envelope::success(&response))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let (output, code) = match run(&args) {
        Ok(value) => (value, ExitCode::SUCCESS),
        Err(e) => {
            error!("{e}");
            (envelope::failure(&e.to_string()), ExitCode::FAILURE)
        }
    };

    let text = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };
    let mut stdout = io::stdout().lock();
    match text {
        Ok(text) => {
            if writeln!(stdout, "{text}").is_err() {
                return ExitCode::FAILURE;
            }
            code
        }
        Err(e) => {
            error!("failed to encode output: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_defaults() {
        let args = Args::try_parse_from(["box-sim"]).unwrap();
        assert_eq!(args.engine_config(), EngineConfig::default());
        assert_eq!(args.medium(), Medium::default());
    }

    #[test]
    fn test_temperature_sets_medium() {
        let args = Args::try_parse_from(["box-sim", "--temperature", "35"]).unwrap();
        let medium = args.medium();
        assert_eq!(medium, Medium::at_temperature(35.0));
        assert!(medium.speed_of_sound > Medium::at_temperature(20.0).speed_of_sound);

        let args = Args::try_parse_from(["box-sim", "--temperature", "-10"]).unwrap();
        assert!(args.medium().density > Medium::at_temperature(20.0).density);
    }

    #[test]
    fn test_flags_reach_engine_config() {
        let args = Args::try_parse_from([
            "box-sim",
            "--points",
            "64",
            "--sequential",
            "--split",
            "--simplified-radiation",
            "--truncation",
            "6",
        ])
        .unwrap();
        let config = args.engine_config();
        assert_eq!(config.points, 64);
        assert!(!config.parallel);
        assert!(config.split_contributions);
        assert_eq!(config.truncation_limit, 6);
        assert_eq!(config.diaphragm_radiation, DiaphragmRadiation::Simplified);
    }
}
