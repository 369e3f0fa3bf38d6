use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use m68k_tablegen::{run, EmitConfig, GenPaths};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate the 16-bit opcode dispatch table from opcodes.json"
)]
struct Opts {
    /// Opcode description (JSON)
    #[arg(long, default_value = "opcodes.json")]
    input: PathBuf,
    /// Generated source fragment
    #[arg(long, default_value = "generated.cpp")]
    output: PathBuf,
    /// Identifier of the table the fragment assigns into
    #[arg(long, default_value = "table")]
    table: String,
}

fn generate(opts: Opts) -> Result<()> {
    let paths = GenPaths { input: opts.input, output: opts.output };
    let cfg = EmitConfig { table: opts.table };
    run(&paths, &cfg)?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    match generate(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
