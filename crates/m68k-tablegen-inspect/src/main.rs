use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

use m68k_tablegen::emit::render_entry;
use m68k_tablegen::model::load_opcodes;
use m68k_tablegen::{build, Coverage, EmitConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect a 16-bit opcode description", long_about=None)]
struct Cli {
    /// Opcode description (JSON)
    #[arg(value_name = "FILE", default_value = "opcodes.json")]
    input: PathBuf,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the table and report whether the description is consistent
    Check,
    /// Claimed/unclaimed words and the unclaimed ranges
    Coverage {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show which opcode owns a word (hex or dec)
    Lookup { word: String },
    /// Pattern count and parameter arity per opcode
    Opcodes {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

fn parse_word(s: &str) -> Result<u16> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u16::from_str_radix(hex, 16)?)
    } else if let Some(bin) = s.strip_prefix("0b") {
        Ok(u16::from_str_radix(bin, 2)?)
    } else {
        Ok(s.parse::<u16>()?)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let specs = load_opcodes(&cli.input)?;
    let table = build(&specs).with_context(|| format!("building table from {}", cli.input.display()))?;

    match cli.cmd {
        Command::Check => {
            println!("ok: {} opcodes, {} words claimed", specs.len(), table.len());
        }
        Command::Coverage { format } => {
            let cov = Coverage::of(&table);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cov)?),
                OutputFormat::Text => {
                    println!("claimed:   {:>5}", cov.claimed);
                    println!("unclaimed: {:>5}", cov.unclaimed);
                    for gap in &cov.gaps {
                        if gap.start == gap.end {
                            println!("  {:#06x}", gap.start);
                        } else {
                            println!("  {:#06x}..={:#06x} ({} words)", gap.start, gap.end, gap.words());
                        }
                    }
                }
            }
        }
        Command::Lookup { word } => {
            let word = parse_word(&word)?;
            match table.lookup(word) {
                Some(entry) => println!("{:016b} {}", word, render_entry(&EmitConfig::default(), entry)),
                None => println!("{word:016b} {word:#06x}: unclaimed"),
            }
        }
        Command::Opcodes { format } => match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(table.opcodes())?),
            OutputFormat::Text => {
                println!("{:<24} {:>8} {:>6}", "name", "patterns", "arity");
                for op in table.opcodes() {
                    println!("{:<24} {:>8} {:>6}", op.name, op.patterns, op.arity);
                }
            }
        },
    }

    Ok(())
}
