use serde::Serialize;
use tracing::{debug, info, warn};

use crate::enumerate::patterns;
use crate::error::{GenError, Result};
use crate::field::{resolve, ResolvedOpcode};
use crate::model::OpcodeSpec;
use crate::params::{arity, parameters, Param};

/// Number of distinct 16-bit instruction words.
pub const WORD_SPACE: usize = 1 << 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchEntry {
    pub pattern: u16,
    pub handler: String,
    pub params: Vec<Param>,
}

/// Which entry, and through it which opcode, owns each instruction word.
#[derive(Debug, Clone)]
pub struct Occupancy {
    slots: Vec<Option<u32>>,
}

impl Default for Occupancy {
    fn default() -> Self {
        Self { slots: vec![None; WORD_SPACE] }
    }
}

impl Occupancy {
    /// Index of the entry generated for `pattern`.
    pub fn entry(&self, pattern: u16) -> Option<usize> {
        self.slots[pattern as usize].map(|i| i as usize)
    }

    /// Records `entry` for `pattern`; returns the existing entry if the slot was taken.
    fn claim(&mut self, pattern: u16, entry: usize) -> Option<usize> {
        let slot = &mut self.slots[pattern as usize];
        match *slot {
            Some(prev) => Some(prev as usize),
            None => {
                // at most WORD_SPACE entries
                *slot = Some(entry as u32);
                None
            }
        }
    }

    pub fn claimed(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_claimed(&self, pattern: u16) -> bool {
        self.slots[pattern as usize].is_some()
    }
}

/// Per-opcode summary of a finished table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpcodeSummary {
    pub name: String,
    pub patterns: usize,
    pub arity: usize,
}

/// The finished word to handler assignment of one run.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    entries: Vec<DispatchEntry>,
    occupancy: Occupancy,
    opcodes: Vec<OpcodeSummary>,
}

impl DispatchTable {
    /// Entries in the order they were generated.
    pub fn entries(&self) -> &[DispatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, pattern: u16) -> Option<&DispatchEntry> {
        self.occupancy.entry(pattern).map(|i| &self.entries[i])
    }

    pub fn owner(&self, pattern: u16) -> Option<&str> {
        self.lookup(pattern).map(|e| e.handler.as_str())
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    pub fn opcodes(&self) -> &[OpcodeSummary] {
        &self.opcodes
    }
}

/// Drives resolution, enumeration and parameter extraction over a whole
/// description, failing on the first inconsistency.
#[derive(Debug, Default)]
pub struct TableBuilder {
    entries: Vec<DispatchEntry>,
    occupancy: Occupancy,
    opcodes: Vec<OpcodeSummary>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every word of one opcode. On error the builder must be discarded.
    pub fn add(&mut self, spec: &OpcodeSpec) -> Result<usize> {
        let op = resolve(spec)?;
        self.add_resolved(&op)
    }

    fn add_resolved(&mut self, op: &ResolvedOpcode) -> Result<usize> {
        let mut claimed = 0usize;
        for pattern in patterns(op)? {
            if let Some(prev) = self.occupancy.claim(pattern, self.entries.len()) {
                return Err(GenError::Collision {
                    pattern,
                    opcode: op.name.clone(),
                    previous: self.entries[prev].handler.clone(),
                });
            }
            let params = parameters(op, pattern)?;
            self.entries.push(DispatchEntry { pattern, handler: op.name.clone(), params });
            claimed += 1;
        }
        debug!(opcode = %op.name, patterns = claimed, "opcode enumerated");
        self.opcodes.push(OpcodeSummary {
            name: op.name.clone(),
            patterns: claimed,
            arity: arity(op),
        });
        Ok(claimed)
    }

    pub fn finish(self) -> DispatchTable {
        DispatchTable {
            entries: self.entries,
            occupancy: self.occupancy,
            opcodes: self.opcodes,
        }
    }
}

/// Builds the dispatch table for `specs` in input order.
pub fn build(specs: &[OpcodeSpec]) -> Result<DispatchTable> {
    if specs.is_empty() {
        warn!("opcode description is empty");
    }
    let mut builder = TableBuilder::new();
    for spec in specs {
        builder.add(spec)?;
    }
    let table = builder.finish();
    info!(
        opcodes = specs.len(),
        claimed = table.len(),
        unclaimed = WORD_SPACE - table.len(),
        "dispatch table built"
    );
    Ok(table)
}
