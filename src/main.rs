use std::io::Read;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use textcheckr::{analyze_text, ToolDefinition};

#[derive(Parser)]
#[command(
    name = "textcheckr",
    about = "Report character counts, bracket symmetry, JSON depth and Markdown structure",
    version
)]
struct Cli {
    /// File paths to analyze (reads stdin if none provided)
    files: Vec<String>,

    /// Print single-line JSON instead of pretty output
    #[arg(long)]
    compact: bool,

    /// Print the tool definition and exit
    #[arg(long)]
    describe: bool,
}

fn print_json<T: Serialize>(value: &T, compact: bool) {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    match rendered {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("Error serializing output: {e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.describe {
        print_json(&ToolDefinition::analyze_text(), cli.compact);
        return;
    }

    if cli.files.is_empty() {
        let mut input = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut input) {
            eprintln!("Error reading stdin: {e}");
            std::process::exit(1);
        }
        print_json(&analyze_text(&input), cli.compact);
    } else {
        for path in &cli.files {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading {path}: {e}");
                std::process::exit(1);
            });
            print_json(&analyze_text(&text), cli.compact);
        }
    }
}
