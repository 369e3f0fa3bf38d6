use std::io;

use serde::{Deserialize, Serialize};

use crate::table::{DispatchEntry, DispatchTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitConfig {
    /// Identifier of the array the generated lines assign into.
    pub table: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self { table: "table".to_string() }
    }
}

/// `table[0x7012] = MOVEQ<0, 18>;`, or `table[0x4e73] = RTE;` without parameters.
pub fn render_entry(cfg: &EmitConfig, entry: &DispatchEntry) -> String {
    if entry.params.is_empty() {
        return format!("{}[{:#06x}] = {};", cfg.table, entry.pattern, entry.handler);
    }
    let params: Vec<String> = entry.params.iter().map(ToString::to_string).collect();
    format!("{}[{:#06x}] = {}<{}>;", cfg.table, entry.pattern, entry.handler, params.join(", "))
}

pub fn render_table(cfg: &EmitConfig, table: &DispatchTable) -> String {
    let mut out = String::new();
    for entry in table.entries() {
        out.push_str(&render_entry(cfg, entry));
        out.push('\n');
    }
    out
}

pub fn write_table<W: io::Write>(w: &mut W, cfg: &EmitConfig, table: &DispatchTable) -> io::Result<()> {
    for entry in table.entries() {
        writeln!(w, "{}", render_entry(cfg, entry))?;
    }
    Ok(())
}
