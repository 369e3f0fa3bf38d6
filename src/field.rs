use std::collections::{BTreeMap, HashSet};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};
use crate::model::{Field, Label, OpcodeSpec};
use crate::modes;

/// Instruction word width in bits.
pub const WORD_BITS: u32 = 16;

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFlags: u8 {
const SWAPPED = 1 << 0; // register-major mode packing
const EXCLUDE_TEMPLATE = 1 << 1;
const FORCE_TEMPLATE = 1 << 2;
}
}

impl From<&Field> for FieldFlags {
    fn from(f: &Field) -> Self {
        let mut flags = FieldFlags::empty();
        flags.set(FieldFlags::SWAPPED, f.swapped);
        flags.set(FieldFlags::EXCLUDE_TEMPLATE, f.exclude_template);
        flags.set(FieldFlags::FORCE_TEMPLATE, f.force_template);
        flags
    }
}

/// A field with its final value domain and position in the word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub label: String,
    pub bits: u32,
    /// Bits consumed by the fields before this one.
    pub offset: u32,
    /// Allowed raw values, deduplicated, in declaration order.
    pub valid: Vec<u16>,
    pub flags: FieldFlags,
    pub mapping: Option<BTreeMap<u16, Label>>,
}

impl ResolvedField {
    /// Right shift that brings this field down to bit 0, or `None` when the
    /// field does not lie inside a 16-bit word.
    pub fn shift(&self) -> Option<u32> {
        WORD_BITS.checked_sub(self.offset + self.bits)
    }

    pub fn mask(&self) -> u32 {
        (1u32 << self.bits) - 1
    }

    /// Exclude wins over force; otherwise any field with a choice surfaces.
    pub fn is_parameter(&self) -> bool {
        if self.flags.contains(FieldFlags::EXCLUDE_TEMPLATE) {
            return false;
        }
        self.valid.len() > 1 || self.flags.contains(FieldFlags::FORCE_TEMPLATE)
    }
}

/// An opcode whose fields have all been resolved once for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOpcode {
    pub name: String,
    pub fields: Vec<ResolvedField>,
}

impl ResolvedOpcode {
    pub fn total_bits(&self) -> u32 {
        self.fields.iter().map(|f| f.bits).sum()
    }
}

fn field_label(index: usize, field: &Field) -> String {
    match &field.name {
        Some(name) => format!("#{index} ({name})"),
        None => format!("#{index}"),
    }
}

/// Resolves every field of `spec`. Pure: the spec itself is left untouched.
pub fn resolve(spec: &OpcodeSpec) -> Result<ResolvedOpcode> {
    let mut fields = Vec::with_capacity(spec.pattern.len());
    let mut offset = 0;
    for (index, field) in spec.pattern.iter().enumerate() {
        let resolved = resolve_field(&spec.name, field_label(index, field), offset, field)?;
        offset += resolved.bits;
        fields.push(resolved);
    }
    Ok(ResolvedOpcode { name: spec.name.clone(), fields })
}

fn resolve_field(opcode: &str, label: String, offset: u32, field: &Field) -> Result<ResolvedField> {
    let bits = field.bits;
    let flags = FieldFlags::from(field);
    if !(1..=WORD_BITS).contains(&bits) {
        return Err(GenError::InvalidWidth { opcode: opcode.into(), field: label, bits });
    }

    let raw: Vec<u32> = match (&field.valid, &field.modes) {
        (Some(_), Some(_)) => {
            return Err(GenError::ConflictingDomain { opcode: opcode.into(), field: label });
        }
        (Some(values), None) => values.clone(),
        (None, Some(selectors)) => {
            if let Some(&mode) = selectors.iter().find(|&&m| m > modes::MAX_SELECTOR) {
                return Err(GenError::InvalidMode { opcode: opcode.into(), field: label, mode });
            }
            modes::expand(selectors, flags.contains(FieldFlags::SWAPPED))
                .into_iter()
                .map(u32::from)
                .collect()
        }
        (None, None) => (0..1u32 << bits).collect(),
    };
    if raw.is_empty() {
        return Err(GenError::EmptyValidSet { opcode: opcode.into(), field: label });
    }

    let limit = 1u32 << bits;
    let mut seen = HashSet::with_capacity(raw.len());
    let mut valid = Vec::with_capacity(raw.len());
    for value in raw {
        if value >= limit {
            return Err(GenError::ValueOutOfRange { opcode: opcode.into(), field: label, value, bits });
        }
        // value < 2^16 here
        let value = value as u16;
        if seen.insert(value) {
            valid.push(value);
        }
    }

    let mapping = match &field.mapping {
        None => None,
        Some(map) => {
            let mut parsed = BTreeMap::new();
            for (key, target) in map {
                let raw_key = key
                    .parse::<u16>()
                    .ok()
                    .filter(|k| k.to_string() == *key)
                    .ok_or_else(|| GenError::InvalidMappingKey {
                        opcode: opcode.into(),
                        field: label.clone(),
                        key: key.clone(),
                    })?;
                parsed.insert(raw_key, target.clone());
            }
            // every reachable value needs a label, parameter or not
            if let Some(&value) = valid.iter().find(|&&v| !parsed.contains_key(&v)) {
                return Err(GenError::MappingGap { opcode: opcode.into(), field: label, value });
            }
            Some(parsed)
        }
    };

    Ok(ResolvedField { label, bits, offset, valid, flags, mapping })
}
