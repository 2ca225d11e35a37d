//! `jton` CLI — encode, decode, and size-check JTON documents.
//!
//! ## Usage
//!
//! ```sh
//! # Encode JSON to JTON (stdin → stdout)
//! echo '{"ids":[1,2,3,4,5,6,7,8,9,10]}' | jton encode
//!
//! # Encode from file to file
//! jton encode -i data.json -o data.jton
//!
//! # Encode the human-readable variant (no base64 binary packers)
//! jton encode --readable -i data.json
//!
//! # Decode JTON back to pretty-printed JSON
//! jton decode -i data.jton
//!
//! # Show compression statistics
//! jton stats -i data.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jton_core::EncodeOptions;
use std::io::{self, Read};

#[derive(Parser)]
#[command(name = "jton", version, about = "JTON lossless JSON re-encoder CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode JSON to JTON format
    Encode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Disable the base64 binary packers (human-readable variant)
        #[arg(long)]
        readable: bool,
    },
    /// Decode JTON back to JSON format
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show encoding statistics (byte sizes, reduction)
    Stats {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            readable,
        } => {
            let json = read_input(input.as_deref())?;
            let value: serde_json::Value =
                serde_json::from_str(&json).context("Input is not valid JSON")?;
            let options = EncodeOptions {
                binary_packing: !readable,
            };
            let packed = jton_core::compress_json_with(&value, &options)
                .context("Failed to encode JSON to JTON")?;
            write_output(output.as_deref(), &packed)?;
        }
        Commands::Decode { input, output } => {
            let packed = read_input(input.as_deref())?;
            let value =
                jton_core::decompress_json(&packed).context("Failed to decode JTON to JSON")?;
            let pretty = serde_json::to_string_pretty(&value)?;
            write_output(output.as_deref(), &pretty)?;
        }
        Commands::Stats { input } => {
            let json = read_input(input.as_deref())?;
            let value: serde_json::Value =
                serde_json::from_str(&json).context("Input is not valid JSON")?;
            let canonical = serde_json::to_string(&value)?;
            let packed =
                jton_core::compress_json(&value).context("Failed to encode JSON to JTON")?;
            let json_bytes = canonical.len();
            let jton_bytes = packed.len();
            let ratio = if json_bytes > 0 {
                (1.0 - (jton_bytes as f64 / json_bytes as f64)) * 100.0
            } else {
                0.0
            };
            println!("JSON size:  {} bytes", json_bytes);
            println!("JTON size:  {} bytes", jton_bytes);
            println!("Reduction:  {:.1}%", ratio);
        }
    }

    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
