use bitvec::prelude::*;
use serde::Serialize;

use crate::table::{DispatchTable, OpcodeSummary, WORD_SPACE};

/// Inclusive run of unclaimed instruction words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gap {
    pub start: u16,
    pub end: u16,
}

impl Gap {
    pub fn words(&self) -> usize {
        (self.end - self.start) as usize + 1
    }
}

/// How much of the word space a table covers. Unclaimed words are the ones
/// an emulator core routes to its fallback handler.
#[derive(Debug, Clone, Serialize)]
pub struct Coverage {
    pub claimed: usize,
    pub unclaimed: usize,
    pub gaps: Vec<Gap>,
    pub opcodes: Vec<OpcodeSummary>,
}

impl Coverage {
    pub fn of(table: &DispatchTable) -> Self {
        let mut used = bitvec![0; WORD_SPACE];
        for entry in table.entries() {
            used.set(entry.pattern as usize, true);
        }
        let claimed = used.count_ones();
        Self {
            claimed,
            unclaimed: WORD_SPACE - claimed,
            gaps: gaps(&used),
            opcodes: table.opcodes().to_vec(),
        }
    }
}

fn gaps(used: &BitSlice) -> Vec<Gap> {
    let mut out: Vec<Gap> = Vec::new();
    for word in used.iter_zeros() {
        let word = word as u16;
        match out.last_mut() {
            Some(gap) if gap.end.wrapping_add(1) == word => gap.end = word,
            _ => out.push(Gap { start: word, end: word }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, OpcodeSpec};
    use crate::table::build;

    #[test]
    fn gaps_collapse_into_ranges() {
        let table = build(&[
            OpcodeSpec::new("LOW", vec![Field::fixed(8, 0x00), Field::new(8)]),
            OpcodeSpec::new("ONE", vec![Field::fixed(16, 0x0200)]),
            OpcodeSpec::new("TOP", vec![Field::fixed(8, 0xff), Field::new(8)]),
        ])
        .unwrap();
        let cov = Coverage::of(&table);
        assert_eq!(cov.claimed, 513);
        assert_eq!(cov.unclaimed, WORD_SPACE - 513);
        assert_eq!(
            cov.gaps,
            vec![Gap { start: 0x0100, end: 0x01ff }, Gap { start: 0x0201, end: 0xfeff }]
        );
        assert_eq!(cov.gaps.iter().map(Gap::words).sum::<usize>(), cov.unclaimed);
        assert_eq!(cov.opcodes.len(), 3);
    }

    #[test]
    fn empty_table_is_one_gap() {
        let cov = Coverage::of(&build(&[]).unwrap());
        assert_eq!(cov.gaps, vec![Gap { start: 0, end: 0xffff }]);
        assert_eq!(cov.gaps[0].words(), WORD_SPACE);
    }
}
