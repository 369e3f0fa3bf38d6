//! Addressing-mode expansion for 68000-style effective-address fields.
//!
//! An effective address is a 3-bit mode plus a 3-bit register. Modes 0..=6
//! take any of the eight registers; mode 7 reuses the register slot as a
//! sub-selector (absolute short/long, PC-relative, immediate, ...). In opcode
//! descriptions a selector above 6 names one of those mode-7 encodings as
//! `7 + sub`.

/// Highest mode that is qualified by a register number.
pub const MAX_REGISTER_MODE: u16 = 6;
/// The mode whose register slot selects an extension encoding.
pub const EXTENSION_MODE: u16 = 7;
/// Registers per register-qualified mode.
pub const REGISTERS: u16 = 8;
/// Highest selector accepted in a `modes` list (`7 + 7`).
pub const MAX_SELECTOR: u16 = EXTENSION_MODE + REGISTERS - 1;

/// Packs a mode and a register into one 6-bit value.
///
/// Most instructions put the mode in the upper three bits; the destination
/// operand of MOVE is stored register-first, which is what `swapped` selects.
#[inline]
pub fn combine(mode: u16, reg: u16, swapped: bool) -> u16 {
    let (mode, reg) = (mode & 0x7, reg & 0x7);
    if swapped {
        (reg << 3) | mode
    } else {
        (mode << 3) | reg
    }
}

/// Expands a list of mode selectors into raw field values, in selector order.
///
/// Selectors must be at most [`MAX_SELECTOR`]; callers validate that first.
pub fn expand(selectors: &[u16], swapped: bool) -> Vec<u16> {
    let mut out = Vec::with_capacity(selectors.len() * REGISTERS as usize);
    for &mode in selectors {
        if mode <= MAX_REGISTER_MODE {
            out.extend((0..REGISTERS).map(|reg| combine(mode, reg, swapped)));
        } else {
            out.push(combine(EXTENSION_MODE, mode - EXTENSION_MODE, swapped));
        }
    }
    out
}
