use crate::error::{GenError, Result};
use crate::field::{ResolvedField, ResolvedOpcode, WORD_BITS};

/// Every full instruction word one opcode matches.
///
/// Walks the Cartesian product of the field domains with an index per field,
/// the last field advancing fastest, so words come out in lexicographic order
/// of field values with the first field varying slowest.
#[derive(Debug, Clone)]
pub struct Patterns<'a> {
    fields: &'a [ResolvedField],
    shifts: Vec<u32>,
    indices: Vec<usize>,
    done: bool,
}

/// Starts enumeration for `op`. Fails when its widths do not add up to a word,
/// before any pattern is produced.
pub fn patterns(op: &ResolvedOpcode) -> Result<Patterns<'_>> {
    let bits = op.total_bits();
    if bits != WORD_BITS {
        return Err(GenError::SpecificationWidth { opcode: op.name.clone(), bits });
    }
    let shifts = op
        .fields
        .iter()
        .map(|f| f.shift())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| GenError::SpecificationWidth { opcode: op.name.clone(), bits })?;
    Ok(Patterns {
        fields: &op.fields,
        shifts,
        indices: vec![0; op.fields.len()],
        done: false,
    })
}

/// Number of words `op` claims: the product of its domain sizes.
pub fn pattern_count(op: &ResolvedOpcode) -> usize {
    op.fields.iter().map(|f| f.valid.len()).product()
}

impl Patterns<'_> {
    fn current(&self) -> u16 {
        let mut word = 0u32;
        for ((field, &idx), &shift) in self.fields.iter().zip(&self.indices).zip(&self.shifts) {
            word |= u32::from(field.valid[idx]) << shift;
        }
        word as u16
    }

    fn advance(&mut self) {
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.fields[pos].valid.len() {
                return;
            }
            self.indices[pos] = 0;
        }
        self.done = true;
    }
}

impl Iterator for Patterns<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        if self.done {
            return None;
        }
        let word = self.current();
        self.advance();
        Some(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::resolve;
    use crate::model::{Field, OpcodeSpec};

    fn words(fields: Vec<Field>) -> Result<Vec<u16>> {
        let op = resolve(&OpcodeSpec::new("OP", fields))?;
        Ok(patterns(&op)?.collect())
    }

    #[test]
    fn fixed_byte_plus_free_byte() {
        let got = words(vec![Field::fixed(8, 0xAB), Field::new(8)]).unwrap();
        let want: Vec<u16> = (0xAB00..=0xABFF).collect();
        assert_eq!(got, want);
    }

    #[test]
    fn first_field_varies_slowest() {
        let got = words(vec![Field::new(1), Field::fixed(14, 0), Field::new(1)]).unwrap();
        assert_eq!(got, vec![0x0000, 0x0001, 0x8000, 0x8001]);
    }

    #[test]
    fn declared_value_order_is_kept() {
        let got = words(vec![Field::new(2).valid([2, 0]), Field::fixed(14, 5)]).unwrap();
        assert_eq!(got, vec![0x8005, 0x0005]);
    }

    #[test]
    fn count_matches_product() {
        let op = resolve(&OpcodeSpec::new(
            "ADD",
            vec![
                Field::fixed(4, 0xd),
                Field::new(3),
                Field::new(1),
                Field::new(2).valid([0, 1, 2]),
                Field::new(6).modes([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]),
            ],
        ))
        .unwrap();
        assert_eq!(pattern_count(&op), 8 * 2 * 3 * 61);
        assert_eq!(patterns(&op).unwrap().count(), pattern_count(&op));
    }

    #[test]
    fn short_pattern_is_a_width_error() {
        let err = words(vec![Field::new(8), Field::new(4)]).unwrap_err();
        match err {
            GenError::SpecificationWidth { opcode, bits } => {
                assert_eq!(opcode, "OP");
                assert_eq!(bits, 12);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn long_pattern_is_a_width_error() {
        let err = words(vec![Field::new(8), Field::new(8), Field::new(1)]).unwrap_err();
        assert!(matches!(err, GenError::SpecificationWidth { bits: 17, .. }));
    }

    #[test]
    fn empty_pattern_is_a_width_error() {
        assert!(matches!(words(vec![]), Err(GenError::SpecificationWidth { bits: 0, .. })));
    }

    #[test]
    fn single_full_word() {
        assert_eq!(words(vec![Field::fixed(16, 0x4e73)]).unwrap(), vec![0x4e73]);
    }
}
