//! 65C816 disassembler.
//!
//! Shares the decoder table with the executor: rather
//! than a second opcode-to-mnemonic table that could drift from dispatch,
//! this module reads [`crate::cpu::OPCODE_TABLE`] directly and only adds
//! operand-length and operand-formatting rules on top. `Operation`'s enum
//! variants are already named after their WDC mnemonic, so the mnemonic
//! text itself is just the variant's `Debug` form upper-cased rather than a
//! second hand-written string table.
//!
//! # References
//! - WDC W65C816S datasheet, addressing-mode operand encodings
//! - `hunterchen7-ti84ce` `core/src/disasm.rs` (a `DisasmResult{bytes,
//!   mnemonic, length}` product type consumed by trace/debug tooling)

use crate::cpu::{AddressingMode, Operation, OPCODE_TABLE};

/// One disassembled instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisasmResult {
    /// Raw opcode + operand bytes as a space-separated hex string.
    pub bytes: String,
    /// Mnemonic with formatted operand, e.g. `"LDA #$1234"`.
    pub mnemonic: String,
    /// Total instruction length in bytes, including the opcode byte.
    pub length: usize,
}

/// Disassemble the instruction starting at `code[0]`.
///
/// `code` must hold at least as many bytes as the instruction turns out to
/// need (3 is always enough except for `AbsoluteLong` forms and `MVN`/`MVP`,
/// which need 4); bytes beyond what the addressing mode consumes are
/// ignored. `pc_after_opcode` is the value the program counter holds
/// immediately after the opcode byte itself — used only to resolve
/// `PcRelative`/`PcRelativeLong` branch targets to an absolute address for
/// display. `m_width`/`x_width` (8 or 16) select the immediate operand size
/// for accumulator-family and index-family opcodes respectively, mirroring
/// [`crate::cpu::Cpu::a_width`]/[`crate::cpu::Cpu::xy_width`].
pub fn disassemble(code: &[u8], pc_after_opcode: u16, m_width: u32, x_width: u32) -> DisasmResult {
    if code.is_empty() {
        return DisasmResult { bytes: String::new(), mnemonic: "???".to_string(), length: 0 };
    }

    let opcode = code[0];
    let (operation, mode) = OPCODE_TABLE[opcode as usize];
    let operand_len = operand_length(operation, mode, m_width, x_width);
    let length = (1 + operand_len).min(code.len()).max(1);
    let operand_bytes = &code[1..length];

    let mnemonic_name = format!("{operation:?}").to_ascii_uppercase();
    let operand_text = format_operand(mode, operation, operand_bytes, pc_after_opcode);
    let mnemonic = if operand_text.is_empty() {
        mnemonic_name
    } else {
        format!("{mnemonic_name} {operand_text}")
    };

    let bytes = code[..length].iter().map(|b| format!("{b:02X}")).collect::<Vec<_>>().join(" ");

    DisasmResult { bytes, mnemonic, length }
}

/// Number of operand bytes (not counting the opcode itself) this
/// `(operation, mode)` pair consumes at the given register widths.
fn operand_length(operation: Operation, mode: AddressingMode, m_width: u32, x_width: u32) -> usize {
    use AddressingMode as M;
    use Operation as O;
    match mode {
        M::Implied => match operation {
            // BRK/COP fetch a one-byte signature the addressing-mode table
            // doesn't carry (the executor reads it directly); every other
            // Implied opcode is opcode-only.
            O::Brk | O::Cop => 1,
            _ => 0,
        },
        M::Accumulator => 0,
        M::Immediate => match operation {
            O::Rep | O::Sep | O::Wdm => 1,
            O::Ldx | O::Ldy | O::Cpx | O::Cpy => {
                if x_width == 8 {
                    1
                } else {
                    2
                }
            }
            _ => {
                if m_width == 8 {
                    1
                } else {
                    2
                }
            }
        },
        M::DirectPage
        | M::DpIndirect
        | M::DpIndirectLong
        | M::DpIndexedX
        | M::DpIndexedY
        | M::DpIndexedXIndirect
        | M::DpIndirectIndexedY
        | M::DpIndirectLongIndexedY
        | M::StackRelative
        | M::StackRelativeIndirectIndexedY
        | M::PcRelative => 1,
        M::Absolute
        | M::AbsoluteIndexedX
        | M::AbsoluteIndexedY
        | M::PcAbsolute
        | M::PcAbsoluteIndirect
        | M::PcAbsoluteIndexedIndirect
        | M::PcAbsoluteLongIndirect
        | M::PcRelativeLong
        | M::MoveBlock => 2,
        M::AbsoluteLong | M::AbsoluteLongIndexedX => 3,
    }
}

fn word(bytes: &[u8]) -> u16 {
    let lo = *bytes.first().unwrap_or(&0) as u16;
    let hi = *bytes.get(1).unwrap_or(&0) as u16;
    lo | (hi << 8)
}

fn long(bytes: &[u8]) -> u32 {
    let lo = word(bytes) as u32;
    let bank = *bytes.get(2).unwrap_or(&0) as u32;
    (bank << 16) | lo
}

fn format_operand(mode: AddressingMode, operation: Operation, bytes: &[u8], pc_after_opcode: u16) -> String {
    use AddressingMode as M;
    use Operation as O;
    match mode {
        M::Implied => match operation {
            O::Brk | O::Cop => format!("#${:02X}", bytes.first().copied().unwrap_or(0)),
            _ => String::new(),
        },
        M::Accumulator => "A".to_string(),
        M::Immediate => {
            if bytes.len() >= 2 {
                format!("#${:04X}", word(bytes))
            } else {
                format!("#${:02X}", bytes.first().copied().unwrap_or(0))
            }
        }
        M::Absolute => format!("${:04X}", word(bytes)),
        M::AbsoluteLong => format!("${:06X}", long(bytes)),
        M::DirectPage => format!("${:02X}", bytes.first().copied().unwrap_or(0)),
        M::DpIndirect => format!("(${:02X})", bytes.first().copied().unwrap_or(0)),
        M::DpIndirectLong => format!("[${:02X}]", bytes.first().copied().unwrap_or(0)),
        M::AbsoluteIndexedX => format!("${:04X},X", word(bytes)),
        M::AbsoluteLongIndexedX => format!("${:06X},X", long(bytes)),
        M::AbsoluteIndexedY => format!("${:04X},Y", word(bytes)),
        M::DpIndexedX => format!("${:02X},X", bytes.first().copied().unwrap_or(0)),
        M::DpIndexedY => format!("${:02X},Y", bytes.first().copied().unwrap_or(0)),
        M::DpIndexedXIndirect => format!("(${:02X},X)", bytes.first().copied().unwrap_or(0)),
        M::DpIndirectIndexedY => format!("(${:02X}),Y", bytes.first().copied().unwrap_or(0)),
        M::DpIndirectLongIndexedY => format!("[${:02X}],Y", bytes.first().copied().unwrap_or(0)),
        M::PcRelative => {
            let disp = bytes.first().copied().unwrap_or(0) as i8;
            let base = pc_after_opcode.wrapping_add(1);
            let target = base.wrapping_add(disp as i16 as u16);
            format!("${target:04X}")
        }
        M::PcRelativeLong => {
            let disp = word(bytes) as i16;
            let base = pc_after_opcode.wrapping_add(2);
            let target = base.wrapping_add(disp as u16);
            format!("${target:04X}")
        }
        M::PcAbsolute => format!("${:04X}", word(bytes)),
        M::PcAbsoluteIndirect => format!("(${:04X})", word(bytes)),
        M::PcAbsoluteIndexedIndirect => format!("(${:04X},X)", word(bytes)),
        M::PcAbsoluteLongIndirect => format!("[${:04X}]", word(bytes)),
        M::StackRelative => format!("${:02X},S", bytes.first().copied().unwrap_or(0)),
        M::StackRelativeIndirectIndexedY => format!("(${:02X},S),Y", bytes.first().copied().unwrap_or(0)),
        M::MoveBlock => {
            // Encoded destination-bank, source-bank; MVN/MVP both read the
            // bytes in that order (see `AddressingMode::MoveBlock` in
            // `cpu::addressing`), regardless of which mnemonic it is.
            let dst = bytes.first().copied().unwrap_or(0);
            let src = bytes.get(1).copied().unwrap_or(0);
            debug_assert!(matches!(operation, O::Mvn | O::Mvp));
            format!("${src:02X},${dst:02X}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disassembles_immediate_lda_at_16_bit_width() {
        let code = [0xA9, 0x34, 0x12];
        let result = disassemble(&code, 0x0801, 16, 16);
        assert_eq!(result.mnemonic, "LDA #$1234");
        assert_eq!(result.length, 3);
        assert_eq!(result.bytes, "A9 34 12");
    }

    #[test]
    fn disassembles_immediate_lda_at_8_bit_width() {
        let code = [0xA9, 0x34, 0xFF];
        let result = disassemble(&code, 0x0801, 8, 16);
        assert_eq!(result.mnemonic, "LDA #$34");
        assert_eq!(result.length, 2);
    }

    #[test]
    fn ldx_immediate_consults_x_width_not_m_width() {
        let code = [0xA2, 0x05, 0x00];
        let result = disassemble(&code, 0x0801, 16, 8);
        assert_eq!(result.mnemonic, "LDX #$05");
        assert_eq!(result.length, 2);
    }

    #[test]
    fn disassembles_absolute_jsr() {
        let code = [0x20, 0x34, 0x12];
        let result = disassemble(&code, 0x0801, 8, 8);
        assert_eq!(result.mnemonic, "JSR $1234");
        assert_eq!(result.length, 3);
    }

    #[test]
    fn disassembles_absolute_long_jsl() {
        let code = [0x22, 0x78, 0x56, 0x34];
        let result = disassemble(&code, 0x0801, 8, 8);
        assert_eq!(result.mnemonic, "JSL $345678");
        assert_eq!(result.length, 4);
    }

    #[test]
    fn resolves_branch_displacement_to_absolute_target() {
        // BPL +2 from PC=0x0802 (after the opcode byte) lands at 0x0805.
        let code = [0x10, 0x02];
        let result = disassemble(&code, 0x0802, 8, 8);
        assert_eq!(result.mnemonic, "BPL $0805");
    }

    #[test]
    fn implied_opcodes_have_no_operand() {
        let code = [0xEA];
        let result = disassemble(&code, 0x0801, 8, 8);
        assert_eq!(result.mnemonic, "NOP");
        assert_eq!(result.length, 1);
    }

    #[test]
    fn brk_consumes_its_signature_byte() {
        let code = [0x00, 0xAA];
        let result = disassemble(&code, 0x0801, 8, 8);
        assert_eq!(result.mnemonic, "BRK #$AA");
        assert_eq!(result.length, 2);
    }

    #[test]
    fn move_block_formats_source_then_destination() {
        // MVN dst=$01 src=$02, encoded as (dst, src) in the instruction.
        let code = [0x54, 0x01, 0x02];
        let result = disassemble(&code, 0x0801, 8, 8);
        assert_eq!(result.mnemonic, "MVN $02,$01");
    }

    #[test]
    fn empty_input_is_unknown() {
        let result = disassemble(&[], 0, 8, 8);
        assert_eq!(result.mnemonic, "???");
        assert_eq!(result.length, 0);
    }
}
