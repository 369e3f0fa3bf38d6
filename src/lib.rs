pub mod coverage;
pub mod emit;
pub mod enumerate;
pub mod error;
pub mod field;
pub mod model;
pub mod modes;
pub mod params;
pub mod table;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

pub use coverage::Coverage;
pub use emit::EmitConfig;
pub use error::{GenError, Result};
pub use model::{Field, Label, OpcodeSpec};
pub use params::Param;
pub use table::{build, DispatchEntry, DispatchTable};

/// Input and output locations of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenPaths {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Default for GenPaths {
    fn default() -> Self {
        Self {
            input: PathBuf::from("opcodes.json"),
            output: PathBuf::from("generated.cpp"),
        }
    }
}

/// Parses a JSON description and renders the complete table fragment.
pub fn generate(text: &str, cfg: &EmitConfig) -> Result<String> {
    let specs = model::parse_opcodes(text)?;
    let table = build(&specs)?;
    Ok(emit::render_table(cfg, &table))
}

/// Reads `paths.input`, builds the table and writes `paths.output`.
/// Nothing is written unless the whole table was built.
pub fn run(paths: &GenPaths, cfg: &EmitConfig) -> Result<usize> {
    let specs = model::load_opcodes(&paths.input)?;
    let table = build(&specs)?;
    write_output(&paths.output, cfg, &table)?;
    info!(output = %paths.output.display(), entries = table.len(), "table written");
    Ok(table.len())
}

fn write_output(path: &Path, cfg: &EmitConfig, table: &DispatchTable) -> Result<()> {
    let file = File::create(path).map_err(|e| GenError::io(path, e))?;
    let mut out = BufWriter::new(file);
    emit::write_table(&mut out, cfg, table)
        .and_then(|()| out.flush())
        .map_err(|e| GenError::io(path, e))
}
