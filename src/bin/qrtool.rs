use clap::{Parser, Subcommand};
use log::LevelFilter;
use qr_sieve::input::load_from_memory;
use qr_sieve::variants::Variants;
use qr_sieve::{DecodeError, ScanConfig, Scanner, SearchMode};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "qrtool", version, about = "qr_sieve CLI tools")]
struct Cli {
    /// Log every skipped variant and the winning pair
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode the QR code in a single image
    Decode {
        #[arg(long)]
        image: PathBuf,
        /// Print a JSON envelope instead of the bare payload
        #[arg(long)]
        json: bool,
        /// Decode candidate windows on all cores
        #[arg(long)]
        parallel: bool,
        /// Give up after this many milliseconds
        #[arg(long)]
        budget_ms: Option<u64>,
    },
    /// List the candidate variants generated for an image
    Variants {
        #[arg(long)]
        image: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let ok = match cli.command {
        Command::Decode {
            image,
            json,
            parallel,
            budget_ms,
        } => decode_cmd(&image, json, parallel, budget_ms),
        Command::Variants { image } => variants_cmd(&image),
    };

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn read_image(image: &Path) -> Option<Vec<u8>> {
    match std::fs::read(image) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            eprintln!("Failed to read image {}: {}", image.display(), err);
            None
        }
    }
}

fn decode_cmd(image: &Path, json: bool, parallel: bool, budget_ms: Option<u64>) -> bool {
    let Some(bytes) = read_image(image) else {
        return false;
    };

    let mut config = ScanConfig::from_env();
    if parallel {
        config = config.with_mode(SearchMode::Parallel);
    }
    if let Some(ms) = budget_ms {
        config = config.with_time_budget(Duration::from_millis(ms));
    }

    let start = Instant::now();
    let result = Scanner::with_config(config).scan_bytes(&bytes);
    let elapsed = start.elapsed();

    match result {
        Ok(hit) => {
            if json {
                println!("{}", success_envelope(&hit.payload));
            } else {
                println!("{}", hit.payload);
            }
            log::info!(
                "{}: variant #{} {} / {} in {} attempts, {:.1}ms",
                image.display(),
                hit.variant_index + 1,
                hit.variant_name,
                hit.config_name,
                hit.attempts,
                elapsed.as_secs_f64() * 1000.0
            );
            true
        }
        Err(err) => {
            if json {
                println!("{}", error_envelope(&err));
            } else {
                eprintln!("Failed to decode QR code: {err}");
            }
            false
        }
    }
}

/// JSON payloads are echoed back parsed, anything else as text
fn success_envelope(payload: &str) -> Value {
    match serde_json::from_str::<Value>(payload) {
        Ok(parsed) => json!({
            "success": true,
            "content": payload,
            "format": "json",
            "parsed": parsed,
        }),
        Err(_) => json!({
            "success": true,
            "content": payload,
            "format": "text",
        }),
    }
}

fn error_envelope(err: &DecodeError) -> Value {
    json!({
        "success": false,
        "error": format!("Failed to decode QR code: {err}"),
    })
}

fn variants_cmd(image: &Path) -> bool {
    let Some(bytes) = read_image(image) else {
        return false;
    };
    let config = ScanConfig::from_env();
    let matrix = match load_from_memory(&bytes, config.max_input_bytes) {
        Ok(matrix) => matrix,
        Err(err) => {
            eprintln!("Failed to load image {}: {}", image.display(), err);
            return false;
        }
    };

    println!(
        "Image: {} ({}x{}, {:?})",
        image.display(),
        matrix.width(),
        matrix.height(),
        matrix.channels()
    );
    let variants = Variants::new(matrix, &config);
    println!(
        "{} variants ({} dropped over {} pixels)",
        variants.total(),
        variants.dropped(),
        config.max_pixels
    );
    for variant in variants {
        println!(
            "  #{:<3} {:<45} {}x{}",
            variant.index + 1,
            variant.name,
            variant.matrix.width(),
            variant.matrix.height()
        );
    }
    true
}
