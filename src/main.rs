//! # Reflow CLI
//!
//! Usage:
//!   reflow template.json --input data.json -o adjusted.json
//!   cat template.json | reflow --input data.json
//!   reflow --example > template.json

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "reflow", about = "Reflow a paginated template against bound table data")]
struct Cli {
    /// Template JSON file. Reads stdin when omitted.
    template: Option<PathBuf>,

    /// Bound input JSON: an object of field key to content string.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Reflow options JSON.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Where to write the adjusted template. Writes stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a sample template and exit.
    #[arg(long)]
    example: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if cli.example {
        print!("{}", example_template_json());
        return;
    }

    if let Err(message) = run(&cli) {
        eprintln!("✗ {}", message);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let template = match &cli.template {
        Some(path) => read(path)?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            buf
        }
    };
    let input = cli.input.as_deref().map(read).transpose()?;
    let options = cli.options.as_deref().map(read).transpose()?;

    let adjusted = reflow::reflow_json(&template, input.as_deref(), options.as_deref())
        .map_err(|e| e.to_string())?;

    match &cli.output {
        Some(path) => {
            fs::write(path, &adjusted)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            eprintln!("✓ Written {} bytes to {}", adjusted.len(), path.display());
        }
        None => println!("{}", adjusted),
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn example_template_json() -> &'static str {
    r##"{
  "schemas": [
    {
      "title": {
        "type": "text",
        "position": { "x": 20, "y": 20 },
        "width": 170,
        "height": 12,
        "content": "Invoice #INV-2026-001",
        "fontSize": 20
      },
      "items": {
        "type": "table",
        "position": { "x": 20, "y": 40 },
        "width": 170,
        "height": 40,
        "head": ["Description", "Qty", "Total"],
        "headWidthPercentages": [60, 15, 25],
        "headStyles": {
          "fontSize": 10,
          "fontColor": "#ffffff",
          "backgroundColor": "#2980ba",
          "borderWidth": { "top": 0, "right": 0, "bottom": 0, "left": 0 },
          "padding": { "top": 3, "right": 3, "bottom": 3, "left": 3 }
        },
        "bodyStyles": {
          "fontSize": 10,
          "alternateBackgroundColor": "#f5f5f5",
          "padding": { "top": 3, "right": 3, "bottom": 3, "left": 3 }
        },
        "tableBorderColor": "#000000",
        "tableBorderWidth": 0.3
      },
      "total": {
        "type": "text",
        "position": { "x": 130, "y": 90 },
        "width": 60,
        "height": 10,
        "content": "Total: $9,500.00"
      },
      "terms": {
        "type": "text",
        "position": { "x": 20, "y": 260 },
        "width": 170,
        "height": 20,
        "content": "Payment is due within 15 days of invoice date."
      }
    }
  ],
  "basePdf": { "width": 210, "height": 297, "padding": [20, 20, 20, 20] }
}
"##
}
