//! # Proposely CLI
//!
//! Usage:
//!   proposely input.json -o proposal.pdf
//!   echo '{ ... }' | proposely -o proposal.pdf
//!   proposely --example > proposal.json
//!   proposely input.json --html preview.html

use clap::Parser;
use proposely::ProposalData;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "proposely", about = "Render proposal documents to PDF and HTML", version)]
struct Cli {
    /// Proposal JSON file; reads stdin when omitted.
    input: Option<PathBuf>,

    /// PDF output path. Defaults to the proposal's download filename.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the HTML preview to this path.
    #[arg(long)]
    html: Option<PathBuf>,

    /// Print the sample proposal JSON and exit.
    #[arg(long)]
    example: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.example {
        match serde_json::to_string_pretty(&ProposalData::sample()) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(&format!("failed to serialize example: {}", e)),
        }
        return;
    }

    let input = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .unwrap_or_else(|e| fail(&format!("failed to read {}: {}", path.display(), e))),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .unwrap_or_else(|e| fail(&format!("failed to read stdin: {}", e)));
            buf
        }
    };

    let data: ProposalData = match serde_json::from_str(&input) {
        Ok(data) => data,
        Err(e) => fail(&format!("failed to parse proposal: {}", e)),
    };

    if let Some(html_path) = &cli.html {
        match proposely::render_preview(&data) {
            Ok(html) => {
                fs::write(html_path, html)
                    .unwrap_or_else(|e| fail(&format!("failed to write HTML: {}", e)));
                eprintln!("✓ Written preview to {}", html_path.display());
            }
            Err(e) => fail(&format!("preview rendering failed: {}", e)),
        }
    }

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(proposely::view::export_filename(&data)));
    match proposely::render_pdf(&data) {
        Ok(bytes) => {
            fs::write(&output, &bytes)
                .unwrap_or_else(|e| fail(&format!("failed to write PDF: {}", e)));
            eprintln!("✓ Written {} bytes to {}", bytes.len(), output.display());
        }
        Err(e) => fail(&format!("PDF rendering failed: {}", e)),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("✗ {}", message);
    process::exit(1);
}
