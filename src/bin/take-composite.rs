//! Build a composite take from several recorded takes
//!
//! Usage:
//!   take-composite [OPTIONS] -o <OUTPUT> <INPUT>...
//!
//! Takes that fail to load are reported and skipped. The averaged hit times and
//! volumes are printed to stdout (`--json` for a machine-readable document).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use take_composite::io::decoder::load_takes;
use take_composite::io::encoder::write_take;
use take_composite::{
    build_composite_loaded, CompositeConfig, CompositeError, OnsetMethod, OutputFormat,
    SampleRatePolicy, VolumeAveraging,
};

#[derive(Parser, Debug)]
#[command(version, about = "Assemble a best-composite take from several takes")]
struct Args {
    /// Input takes, in priority order for volume ties
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output WAV path
    #[arg(short, long)]
    output: PathBuf,

    /// Hit segment length in seconds
    #[arg(long, default_value_t = 0.2)]
    duration: f64,

    /// Lead-in before each detected onset in seconds
    #[arg(long, default_value_t = 0.01)]
    offset: f64,

    /// Volume measurement window in seconds
    #[arg(long, default_value_t = 0.1)]
    window: f64,

    /// Silence after the last hit in seconds
    #[arg(long, default_value_t = 0.5)]
    pad: f64,

    /// Average volumes as linear power instead of dB
    #[arg(long)]
    power_average: bool,

    /// Accept takes with different sample rates (output uses the last take's rate)
    #[arg(long)]
    allow_mixed_rates: bool,

    /// Use the energy flux onset detector
    #[arg(long)]
    energy_flux: bool,

    /// Keep onsets at the strength peak instead of the preceding minimum
    #[arg(long)]
    no_backtrack: bool,

    /// Write 32-bit float samples instead of 16-bit PCM
    #[arg(long)]
    float: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Parallel workers (default: CPU-1)
    #[arg(long)]
    jobs: Option<usize>,
}

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

impl Args {
    fn config(&self) -> CompositeConfig {
        let mut config = CompositeConfig {
            segment_duration: self.duration,
            segment_offset: self.offset,
            volume_window: self.window,
            trailing_pad: self.pad,
            ..CompositeConfig::default()
        };
        if self.power_average {
            config.volume_averaging = VolumeAveraging::Power;
        }
        if self.allow_mixed_rates {
            config.sample_rate_policy = SampleRatePolicy::LastTake;
        }
        if self.energy_flux {
            config.onset.method = OnsetMethod::EnergyFlux;
        }
        config.onset.backtrack = !self.no_backtrack;
        config
    }

    fn format(&self) -> OutputFormat {
        if self.float {
            OutputFormat::Float32
        } else {
            OutputFormat::Pcm16
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let jobs = args.jobs.map(|j| j.max(1)).unwrap_or_else(default_jobs);
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()
    {
        log::warn!("Could not size the worker pool: {}", e);
    }

    let config = args.config();
    eprintln!("Composite: {} takes, jobs={}", args.inputs.len(), jobs);

    let loaded = load_takes(&args.inputs, config.parallel);
    for (path, e) in &loaded.failures {
        eprintln!("Error loading {}: {}", path.display(), e);
    }

    let result = match build_composite_loaded(&loaded, &config) {
        Ok(result) => result,
        Err(e) => {
            let culprit = match &e {
                CompositeError::SampleRateMismatch { take, .. } => args.inputs.get(*take),
                _ => None,
            };
            match culprit {
                Some(path) => eprintln!("ERROR: {} ({})", e, path.display()),
                None => eprintln!("ERROR: {}", e),
            }
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = write_take(&args.output, &result.waveform, args.format()) {
        eprintln!("ERROR: {}", e);
        return ExitCode::FAILURE;
    }

    if args.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", result.report());
        for flag in &result.flags {
            eprintln!("warning: {:?}", flag);
        }
    }

    eprintln!(
        "Wrote {} ({:.2}s at {} Hz)",
        args.output.display(),
        result.metadata.duration_seconds,
        result.metadata.sample_rate
    );

    ExitCode::SUCCESS
}
