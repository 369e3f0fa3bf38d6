use std::fmt;

use serde::Serialize;

use crate::error::{GenError, Result};
use crate::field::ResolvedOpcode;
use crate::model::Label;

/// One handler specialization argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Raw(u16),
    Mapped(Label),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Raw(v) => write!(f, "{v}"),
            Param::Mapped(label) => write!(f, "{label}"),
        }
    }
}

/// Extracts the specialization parameters of `pattern` for `op`, in field
/// order. `pattern` is expected to be one of the words `op` enumerates.
pub fn parameters(op: &ResolvedOpcode, pattern: u16) -> Result<Vec<Param>> {
    let mut out = Vec::new();
    for field in op.fields.iter().filter(|f| f.is_parameter()) {
        let shift = field.shift().ok_or_else(|| GenError::SpecificationWidth {
            opcode: op.name.clone(),
            bits: op.total_bits(),
        })?;
        let raw = ((u32::from(pattern) >> shift) & field.mask()) as u16;
        let param = match &field.mapping {
            None => Param::Raw(raw),
            Some(map) => match map.get(&raw) {
                Some(label) => Param::Mapped(label.clone()),
                None => {
                    return Err(GenError::MappingGap {
                        opcode: op.name.clone(),
                        field: field.label.clone(),
                        value: raw,
                    })
                }
            },
        };
        out.push(param);
    }
    Ok(out)
}

/// Number of parameters every entry of `op` carries.
pub fn arity(op: &ResolvedOpcode) -> usize {
    op.fields.iter().filter(|f| f.is_parameter()).count()
}
