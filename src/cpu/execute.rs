//! The 256-entry opcode table and instruction dispatch.
//!
//! `OPCODE_TABLE` pairs every opcode byte with an [`Operation`] and an
//! [`AddressingMode`]; [`Cpu::dispatch`] is the single function that
//! interprets that pair, rather than 256 bespoke handlers or one giant
//! `match` duplicating addressing-mode logic inline. Per-opcode "dummy"
//! cycles that the 65816 charges beyond its
//! raw bus accesses (the post-fetch internal cycle on implied/accumulator
//! instructions, the pre-push and pre-pull stack overhead, RMW write-back)
//! are charged explicitly here since [`crate::bus::Bus`] only ever meters
//! real bus accesses.
//!
//! # References
//! - WDC W65C816S datasheet, opcode matrix and cycle-count tables
//! - `hunterchen7-ti84ce` `core/src/cpu/execute.rs` (opcode table driving a
//!   single dispatch method on `Cpu`, with a trailing cycle count returned
//!   per instruction)

use super::addressing::{AddressingMode, Operand};
use super::flags;
use super::Cpu;
use crate::bus::{AccessFlags, Bus};

/// One mnemonic's operation kind. Addressing-mode resolution lives in
/// `addressing.rs`; this enum only names what to do with the resolved
/// operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Bra,
    Brk,
    Brl,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cop,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jml,
    Jmp,
    Jsl,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Mvn,
    Mvp,
    Nop,
    Ora,
    Pea,
    Pei,
    Per,
    Pha,
    Phb,
    Phd,
    Phk,
    Php,
    Phx,
    Phy,
    Pla,
    Plb,
    Pld,
    Plp,
    Plx,
    Ply,
    Rep,
    Rol,
    Ror,
    Rti,
    Rtl,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sep,
    Sta,
    Stp,
    Stx,
    Sty,
    Stz,
    Tax,
    Tay,
    Tcd,
    Tcs,
    Tdc,
    Trb,
    Tsb,
    Tsc,
    Tsx,
    Txa,
    Txs,
    Txy,
    Tya,
    Tyx,
    Wai,
    Wdm,
    Xba,
    Xce,
}

use AddressingMode as M;
use Operation as O;

/// The 256-entry opcode table, indexed by the fetched opcode byte.
pub static OPCODE_TABLE: [(Operation, AddressingMode); 256] = [
    (O::Brk, M::Implied),                       // 00
    (O::Ora, M::DpIndexedXIndirect),            // 01
    (O::Cop, M::Implied),                       // 02
    (O::Ora, M::StackRelative),                 // 03
    (O::Tsb, M::DirectPage),                    // 04
    (O::Ora, M::DirectPage),                    // 05
    (O::Asl, M::DirectPage),                    // 06
    (O::Ora, M::DpIndirectLong),                // 07
    (O::Php, M::Implied),                       // 08
    (O::Ora, M::Immediate),                     // 09
    (O::Asl, M::Accumulator),                   // 0A
    (O::Phd, M::Implied),                       // 0B
    (O::Tsb, M::Absolute),                      // 0C
    (O::Ora, M::Absolute),                      // 0D
    (O::Asl, M::Absolute),                      // 0E
    (O::Ora, M::AbsoluteLong),                  // 0F
    (O::Bpl, M::PcRelative),                    // 10
    (O::Ora, M::DpIndirectIndexedY),            // 11
    (O::Ora, M::DpIndirect),                    // 12
    (O::Ora, M::StackRelativeIndirectIndexedY), // 13
    (O::Trb, M::DirectPage),                    // 14
    (O::Ora, M::DpIndexedX),                    // 15
    (O::Asl, M::DpIndexedX),                    // 16
    (O::Ora, M::DpIndirectLongIndexedY),        // 17
    (O::Clc, M::Implied),                       // 18
    (O::Ora, M::AbsoluteIndexedY),              // 19
    (O::Inc, M::Accumulator),                   // 1A
    (O::Tcs, M::Implied),                       // 1B
    (O::Trb, M::Absolute),                      // 1C
    (O::Ora, M::AbsoluteIndexedX),              // 1D
    (O::Asl, M::AbsoluteIndexedX),              // 1E
    (O::Ora, M::AbsoluteLongIndexedX),          // 1F
    (O::Jsr, M::PcAbsolute),                    // 20
    (O::And, M::DpIndexedXIndirect),            // 21
    (O::Jsl, M::AbsoluteLong),                  // 22
    (O::And, M::StackRelative),                 // 23
    (O::Bit, M::DirectPage),                    // 24
    (O::And, M::DirectPage),                    // 25
    (O::Rol, M::DirectPage),                    // 26
    (O::And, M::DpIndirectLong),                // 27
    (O::Plp, M::Implied),                       // 28
    (O::And, M::Immediate),                     // 29
    (O::Rol, M::Accumulator),                   // 2A
    (O::Pld, M::Implied),                       // 2B
    (O::Bit, M::Absolute),                      // 2C
    (O::And, M::Absolute),                      // 2D
    (O::Rol, M::Absolute),                      // 2E
    (O::And, M::AbsoluteLong),                  // 2F
    (O::Bmi, M::PcRelative),                    // 30
    (O::And, M::DpIndirectIndexedY),            // 31
    (O::And, M::DpIndirect),                    // 32
    (O::And, M::StackRelativeIndirectIndexedY), // 33
    (O::Bit, M::DpIndexedX),                    // 34
    (O::And, M::DpIndexedX),                    // 35
    (O::Rol, M::DpIndexedX),                    // 36
    (O::And, M::DpIndirectLongIndexedY),        // 37
    (O::Sec, M::Implied),                       // 38
    (O::And, M::AbsoluteIndexedY),              // 39
    (O::Dec, M::Accumulator),                   // 3A
    (O::Tsc, M::Implied),                       // 3B
    (O::Bit, M::AbsoluteIndexedX),              // 3C
    (O::And, M::AbsoluteIndexedX),              // 3D
    (O::Rol, M::AbsoluteIndexedX),              // 3E
    (O::And, M::AbsoluteLongIndexedX),          // 3F
    (O::Rti, M::Implied),                       // 40
    (O::Eor, M::DpIndexedXIndirect),            // 41
    (O::Wdm, M::Immediate),                     // 42
    (O::Eor, M::StackRelative),                 // 43
    (O::Mvp, M::MoveBlock),                     // 44
    (O::Eor, M::DirectPage),                    // 45
    (O::Lsr, M::DirectPage),                    // 46
    (O::Eor, M::DpIndirectLong),                // 47
    (O::Pha, M::Implied),                       // 48
    (O::Eor, M::Immediate),                     // 49
    (O::Lsr, M::Accumulator),                   // 4A
    (O::Phk, M::Implied),                       // 4B
    (O::Jmp, M::PcAbsolute),                    // 4C
    (O::Eor, M::Absolute),                      // 4D
    (O::Lsr, M::Absolute),                      // 4E
    (O::Eor, M::AbsoluteLong),                  // 4F
    (O::Bvc, M::PcRelative),                    // 50
    (O::Eor, M::DpIndirectIndexedY),            // 51
    (O::Eor, M::DpIndirect),                    // 52
    (O::Eor, M::StackRelativeIndirectIndexedY), // 53
    (O::Mvn, M::MoveBlock),                     // 54
    (O::Eor, M::DpIndexedX),                    // 55
    (O::Lsr, M::DpIndexedX),                    // 56
    (O::Eor, M::DpIndirectLongIndexedY),        // 57
    (O::Cli, M::Implied),                       // 58
    (O::Eor, M::AbsoluteIndexedY),              // 59
    (O::Phy, M::Implied),                       // 5A
    (O::Tcd, M::Implied),                       // 5B
    (O::Jml, M::AbsoluteLong),                  // 5C
    (O::Eor, M::AbsoluteIndexedX),              // 5D
    (O::Lsr, M::AbsoluteIndexedX),              // 5E
    (O::Eor, M::AbsoluteLongIndexedX),          // 5F
    (O::Rts, M::Implied),                       // 60
    (O::Adc, M::DpIndexedXIndirect),            // 61
    (O::Per, M::PcRelativeLong),                // 62
    (O::Adc, M::StackRelative),                 // 63
    (O::Stz, M::DirectPage),                    // 64
    (O::Adc, M::DirectPage),                    // 65
    (O::Ror, M::DirectPage),                    // 66
    (O::Adc, M::DpIndirectLong),                // 67
    (O::Pla, M::Implied),                       // 68
    (O::Adc, M::Immediate),                     // 69
    (O::Ror, M::Accumulator),                   // 6A
    (O::Rtl, M::Implied),                       // 6B
    (O::Jmp, M::PcAbsoluteIndirect),            // 6C
    (O::Adc, M::Absolute),                      // 6D
    (O::Ror, M::Absolute),                      // 6E
    (O::Adc, M::AbsoluteLong),                  // 6F
    (O::Bvs, M::PcRelative),                    // 70
    (O::Adc, M::DpIndirectIndexedY),            // 71
    (O::Adc, M::DpIndirect),                    // 72
    (O::Adc, M::StackRelativeIndirectIndexedY), // 73
    (O::Stz, M::DpIndexedX),                    // 74
    (O::Adc, M::DpIndexedX),                    // 75
    (O::Ror, M::DpIndexedX),                    // 76
    (O::Adc, M::DpIndirectLongIndexedY),        // 77
    (O::Sei, M::Implied),                       // 78
    (O::Adc, M::AbsoluteIndexedY),              // 79
    (O::Ply, M::Implied),                       // 7A
    (O::Tdc, M::Implied),                       // 7B
    (O::Jmp, M::PcAbsoluteIndexedIndirect),     // 7C
    (O::Adc, M::AbsoluteIndexedX),              // 7D
    (O::Ror, M::AbsoluteIndexedX),              // 7E
    (O::Adc, M::AbsoluteLongIndexedX),          // 7F
    (O::Bra, M::PcRelative),                    // 80
    (O::Sta, M::DpIndexedXIndirect),            // 81
    (O::Brl, M::PcRelativeLong),                // 82
    (O::Sta, M::StackRelative),                 // 83
    (O::Sty, M::DirectPage),                    // 84
    (O::Sta, M::DirectPage),                    // 85
    (O::Stx, M::DirectPage),                    // 86
    (O::Sta, M::DpIndirectLong),                // 87
    (O::Dey, M::Implied),                       // 88
    (O::Bit, M::Immediate),                     // 89
    (O::Txa, M::Implied),                       // 8A
    (O::Phb, M::Implied),                       // 8B
    (O::Sty, M::Absolute),                      // 8C
    (O::Sta, M::Absolute),                      // 8D
    (O::Stx, M::Absolute),                      // 8E
    (O::Sta, M::AbsoluteLong),                  // 8F
    (O::Bcc, M::PcRelative),                    // 90
    (O::Sta, M::DpIndirectIndexedY),            // 91
    (O::Sta, M::DpIndirect),                    // 92
    (O::Sta, M::StackRelativeIndirectIndexedY), // 93
    (O::Sty, M::DpIndexedX),                    // 94
    (O::Sta, M::DpIndexedX),                    // 95
    (O::Stx, M::DpIndexedY),                    // 96
    (O::Sta, M::DpIndirectLongIndexedY),        // 97
    (O::Tya, M::Implied),                       // 98
    (O::Sta, M::AbsoluteIndexedY),              // 99
    (O::Txs, M::Implied),                       // 9A
    (O::Txy, M::Implied),                       // 9B
    (O::Stz, M::Absolute),                      // 9C
    (O::Sta, M::AbsoluteIndexedX),              // 9D
    (O::Stz, M::AbsoluteIndexedX),              // 9E
    (O::Sta, M::AbsoluteLongIndexedX),          // 9F
    (O::Ldy, M::Immediate),                     // A0
    (O::Lda, M::DpIndexedXIndirect),            // A1
    (O::Ldx, M::Immediate),                     // A2
    (O::Lda, M::StackRelative),                 // A3
    (O::Ldy, M::DirectPage),                    // A4
    (O::Lda, M::DirectPage),                    // A5
    (O::Ldx, M::DirectPage),                    // A6
    (O::Lda, M::DpIndirectLong),                // A7
    (O::Tay, M::Implied),                       // A8
    (O::Lda, M::Immediate),                     // A9
    (O::Tax, M::Implied),                       // AA
    (O::Plb, M::Implied),                       // AB
    (O::Ldy, M::Absolute),                      // AC
    (O::Lda, M::Absolute),                      // AD
    (O::Ldx, M::Absolute),                      // AE
    (O::Lda, M::AbsoluteLong),                  // AF
    (O::Bcs, M::PcRelative),                    // B0
    (O::Lda, M::DpIndirectIndexedY),            // B1
    (O::Lda, M::DpIndirect),                    // B2
    (O::Lda, M::StackRelativeIndirectIndexedY), // B3
    (O::Ldy, M::DpIndexedX),                    // B4
    (O::Lda, M::DpIndexedX),                    // B5
    (O::Ldx, M::DpIndexedY),                    // B6
    (O::Lda, M::DpIndirectLongIndexedY),        // B7
    (O::Clv, M::Implied),                       // B8
    (O::Lda, M::AbsoluteIndexedY),              // B9
    (O::Tsx, M::Implied),                       // BA
    (O::Tyx, M::Implied),                       // BB
    (O::Ldy, M::AbsoluteIndexedX),              // BC
    (O::Lda, M::AbsoluteIndexedX),              // BD
    (O::Ldx, M::AbsoluteIndexedY),              // BE
    (O::Lda, M::AbsoluteLongIndexedX),          // BF
    (O::Cpy, M::Immediate),                     // C0
    (O::Cmp, M::DpIndexedXIndirect),            // C1
    (O::Rep, M::Immediate),                     // C2
    (O::Cmp, M::StackRelative),                 // C3
    (O::Cpy, M::DirectPage),                    // C4
    (O::Cmp, M::DirectPage),                    // C5
    (O::Dec, M::DirectPage),                    // C6
    (O::Cmp, M::DpIndirectLong),                // C7
    (O::Iny, M::Implied),                       // C8
    (O::Cmp, M::Immediate),                     // C9
    (O::Dex, M::Implied),                       // CA
    (O::Wai, M::Implied),                       // CB
    (O::Cpy, M::Absolute),                      // CC
    (O::Cmp, M::Absolute),                      // CD
    (O::Dec, M::Absolute),                      // CE
    (O::Cmp, M::AbsoluteLong),                  // CF
    (O::Bne, M::PcRelative),                    // D0
    (O::Cmp, M::DpIndirectIndexedY),            // D1
    (O::Cmp, M::DpIndirect),                    // D2
    (O::Cmp, M::StackRelativeIndirectIndexedY), // D3
    (O::Pei, M::DirectPage),                    // D4
    (O::Cmp, M::DpIndexedX),                    // D5
    (O::Dec, M::DpIndexedX),                    // D6
    (O::Cmp, M::DpIndirectLongIndexedY),        // D7
    (O::Cld, M::Implied),                       // D8
    (O::Cmp, M::AbsoluteIndexedY),              // D9
    (O::Phx, M::Implied),                       // DA
    (O::Stp, M::Implied),                       // DB
    (O::Jml, M::PcAbsoluteLongIndirect),        // DC
    (O::Cmp, M::AbsoluteIndexedX),              // DD
    (O::Dec, M::AbsoluteIndexedX),              // DE
    (O::Cmp, M::AbsoluteLongIndexedX),          // DF
    (O::Cpx, M::Immediate),                     // E0
    (O::Sbc, M::DpIndexedXIndirect),            // E1
    (O::Sep, M::Immediate),                     // E2
    (O::Sbc, M::StackRelative),                 // E3
    (O::Cpx, M::DirectPage),                    // E4
    (O::Sbc, M::DirectPage),                    // E5
    (O::Inc, M::DirectPage),                    // E6
    (O::Sbc, M::DpIndirectLong),                // E7
    (O::Inx, M::Implied),                       // E8
    (O::Sbc, M::Immediate),                     // E9
    (O::Nop, M::Implied),                       // EA
    (O::Xba, M::Implied),                       // EB
    (O::Cpx, M::Absolute),                      // EC
    (O::Sbc, M::Absolute),                      // ED
    (O::Inc, M::Absolute),                      // EE
    (O::Sbc, M::AbsoluteLong),                  // EF
    (O::Beq, M::PcRelative),                    // F0
    (O::Sbc, M::DpIndirectIndexedY),            // F1
    (O::Sbc, M::DpIndirect),                    // F2
    (O::Sbc, M::StackRelativeIndirectIndexedY), // F3
    (O::Pea, M::Immediate),                     // F4
    (O::Sbc, M::DpIndexedX),                    // F5
    (O::Inc, M::DpIndexedX),                    // F6
    (O::Sbc, M::DpIndirectLongIndexedY),        // F7
    (O::Sed, M::Implied),                       // F8
    (O::Sbc, M::AbsoluteIndexedY),              // F9
    (O::Plx, M::Implied),                       // FA
    (O::Xce, M::Implied),                       // FB
    (O::Jsr, M::PcAbsoluteIndexedIndirect),     // FC
    (O::Sbc, M::AbsoluteIndexedX),              // FD
    (O::Inc, M::AbsoluteIndexedX),              // FE
    (O::Sbc, M::AbsoluteLongIndexedX),          // FF
];

impl Cpu {
    /// Interpret one fully-fetched opcode: resolve its addressing mode,
    /// perform the operation, and charge any cycles beyond what the bus
    /// accesses already metered.
    pub(super) fn dispatch(&mut self, bus: &mut Bus, opcode: u8) {
        let (operation, mode) = OPCODE_TABLE[opcode as usize];

        match operation {
            // ---------- Loads / stores ----------
            O::Lda => {
                let w = self.a_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.read_operand(bus, operand, w);
                self.set_nz(v, w);
                self.set_a(v);
            }
            O::Ldx => {
                let w = self.xy_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.read_operand(bus, operand, w);
                self.set_nz(v, w);
                self.set_x(v);
            }
            O::Ldy => {
                let w = self.xy_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.read_operand(bus, operand, w);
                self.set_nz(v, w);
                self.set_y(v);
            }
            O::Sta => {
                let w = self.a_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.get_a();
                self.write_operand(bus, operand, v, w);
            }
            O::Stx => {
                let w = self.xy_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.get_x();
                self.write_operand(bus, operand, v, w);
            }
            O::Sty => {
                let w = self.xy_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.get_y();
                self.write_operand(bus, operand, v, w);
            }
            O::Stz => {
                let w = self.a_width();
                let operand = self.resolve_operand(bus, mode, w);
                self.write_operand(bus, operand, 0, w);
            }

            // ---------- ALU (accumulator width) ----------
            O::Adc => {
                let w = self.a_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.read_operand(bus, operand, w);
                self.adc(v, w);
            }
            O::Sbc => {
                let w = self.a_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.read_operand(bus, operand, w);
                self.sbc(v, w);
            }
            O::And => {
                let w = self.a_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.read_operand(bus, operand, w);
                self.and(v, w);
            }
            O::Ora => {
                let w = self.a_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.read_operand(bus, operand, w);
                self.ora(v, w);
            }
            O::Eor => {
                let w = self.a_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.read_operand(bus, operand, w);
                self.eor(v, w);
            }
            O::Cmp => {
                let w = self.a_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.read_operand(bus, operand, w);
                let a = self.get_a();
                self.compare(a, v, w);
            }
            O::Bit => {
                let w = self.a_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.read_operand(bus, operand, w);
                self.bit(v, w, mode != M::Immediate);
            }

            // ---------- Compares (index width) ----------
            O::Cpx => {
                let w = self.xy_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.read_operand(bus, operand, w);
                let x = self.get_x();
                self.compare(x, v, w);
            }
            O::Cpy => {
                let w = self.xy_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.read_operand(bus, operand, w);
                let y = self.get_y();
                self.compare(y, v, w);
            }

            // ---------- Read-modify-write (accumulator width) ----------
            O::Asl | O::Lsr | O::Rol | O::Ror | O::Inc | O::Dec | O::Tsb | O::Trb => {
                let w = self.a_width();
                let operand = self.resolve_operand(bus, mode, w);
                let v = self.read_operand(bus, operand, w);
                let result = match operation {
                    O::Asl => self.asl(v, w),
                    O::Lsr => self.lsr(v, w),
                    O::Rol => self.rol(v, w),
                    O::Ror => self.ror(v, w),
                    O::Inc => self.inc(v, w),
                    O::Dec => self.dec(v, w),
                    O::Tsb => self.tsb(v, w),
                    O::Trb => self.trb(v, w),
                    _ => unreachable!(),
                };
                self.write_operand(bus, operand, result, w);
                // RMW write-back takes one internal cycle whether the
                // operand sat in the accumulator or in memory.
                bus.charge_internal();
            }

            // ---------- Index increment/decrement (implied, index width) ----------
            O::Inx => {
                let w = self.xy_width();
                self.resolve_operand(bus, mode, w);
                bus.charge_internal();
                let x = self.inc(self.get_x(), w);
                self.set_x(x);
            }
            O::Iny => {
                let w = self.xy_width();
                self.resolve_operand(bus, mode, w);
                bus.charge_internal();
                let y = self.inc(self.get_y(), w);
                self.set_y(y);
            }
            O::Dex => {
                let w = self.xy_width();
                self.resolve_operand(bus, mode, w);
                bus.charge_internal();
                let x = self.dec(self.get_x(), w);
                self.set_x(x);
            }
            O::Dey => {
                let w = self.xy_width();
                self.resolve_operand(bus, mode, w);
                bus.charge_internal();
                let y = self.dec(self.get_y(), w);
                self.set_y(y);
            }

            // ---------- Branches ----------
            O::Bpl | O::Bmi | O::Bvc | O::Bvs | O::Bcc | O::Bcs | O::Bne | O::Beq | O::Bra => {
                let operand = self.resolve_operand(bus, mode, 8);
                let taken = match operation {
                    O::Bpl => !self.flag(flags::N),
                    O::Bmi => self.flag(flags::N),
                    O::Bvc => !self.flag(flags::V),
                    O::Bvs => self.flag(flags::V),
                    O::Bcc => !self.flag(flags::C),
                    O::Bcs => self.flag(flags::C),
                    O::Bne => !self.flag(flags::Z),
                    O::Beq => self.flag(flags::Z),
                    O::Bra => true,
                    _ => unreachable!(),
                };
                if let Operand::Relative { target, page_crossed } = operand {
                    if taken {
                        bus.charge_internal();
                        if self.emulation && page_crossed {
                            bus.charge_internal();
                        }
                        self.pc = target;
                    }
                }
            }
            O::Brl => {
                let operand = self.resolve_operand(bus, mode, 16);
                if let Operand::Relative { target, .. } = operand {
                    bus.charge_internal();
                    self.pc = target;
                }
            }

            // ---------- Control transfer ----------
            O::Jmp => {
                let operand = self.resolve_operand(bus, mode, 16);
                if let Operand::Memory { addr, .. } = operand {
                    self.pc = addr;
                }
            }
            O::Jml => {
                let operand = self.resolve_operand(bus, mode, 16);
                if let Operand::Memory { bank, addr, .. } = operand {
                    self.pbr = bank;
                    self.pc = addr;
                }
            }
            O::Jsr => {
                let operand = self.resolve_operand(bus, mode, 16);
                if let Operand::Memory { addr, .. } = operand {
                    let return_addr = self.pc.wrapping_sub(1);
                    bus.charge_internal();
                    self.push_word(bus, return_addr);
                    self.pc = addr;
                }
            }
            O::Jsl => {
                let operand = self.resolve_operand(bus, mode, 16);
                if let Operand::Memory { bank, addr, .. } = operand {
                    let return_addr = self.pc.wrapping_sub(1);
                    bus.charge_internal();
                    self.push_byte(bus, self.pbr);
                    self.push_word(bus, return_addr);
                    self.pbr = bank;
                    self.pc = addr;
                }
            }
            O::Rts => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal_n(3);
                let addr = self.pull_word(bus);
                self.pc = addr.wrapping_add(1);
            }
            O::Rtl => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal_n(2);
                let addr = self.pull_word(bus);
                self.pc = addr.wrapping_add(1);
                self.pbr = self.pull_byte(bus);
            }
            O::Rti => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal_n(2);
                let status = self.pull_byte(bus);
                self.p = status;
                if self.emulation {
                    self.p |= flags::M | flags::X;
                    self.x &= 0x00FF;
                    self.y &= 0x00FF;
                }
                self.pc = self.pull_word(bus);
                if !self.emulation {
                    self.pbr = self.pull_byte(bus);
                }
            }
            O::Brk => {
                self.fetch_operand_byte(bus);
                self.enter_software_interrupt(bus, true);
            }
            O::Cop => {
                self.fetch_operand_byte(bus);
                self.enter_software_interrupt(bus, false);
            }

            // ---------- Stack: push ----------
            O::Pha => {
                let w = self.a_width();
                self.resolve_operand(bus, mode, w);
                bus.charge_internal();
                let v = self.get_a();
                if w == 8 {
                    self.push_byte(bus, v as u8);
                } else {
                    self.push_word(bus, v);
                }
            }
            O::Phx => {
                let w = self.xy_width();
                self.resolve_operand(bus, mode, w);
                bus.charge_internal();
                let v = self.get_x();
                if w == 8 {
                    self.push_byte(bus, v as u8);
                } else {
                    self.push_word(bus, v);
                }
            }
            O::Phy => {
                let w = self.xy_width();
                self.resolve_operand(bus, mode, w);
                bus.charge_internal();
                let v = self.get_y();
                if w == 8 {
                    self.push_byte(bus, v as u8);
                } else {
                    self.push_word(bus, v);
                }
            }
            O::Php => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                let status = self.status_byte_for_push(false);
                self.push_byte(bus, status);
            }
            O::Phb => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                self.push_byte(bus, self.dbr);
            }
            O::Phd => {
                self.resolve_operand(bus, mode, 16);
                bus.charge_internal();
                self.push_word(bus, self.d);
            }
            O::Phk => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                self.push_byte(bus, self.pbr);
            }

            // ---------- Stack: pull ----------
            O::Pla => {
                let w = self.a_width();
                self.resolve_operand(bus, mode, w);
                bus.charge_internal_n(2);
                let v = if w == 8 { self.pull_byte(bus) as u16 } else { self.pull_word(bus) };
                self.set_nz(v, w);
                self.set_a(v);
            }
            O::Plx => {
                let w = self.xy_width();
                self.resolve_operand(bus, mode, w);
                bus.charge_internal_n(2);
                let v = if w == 8 { self.pull_byte(bus) as u16 } else { self.pull_word(bus) };
                self.set_nz(v, w);
                self.set_x(v);
            }
            O::Ply => {
                let w = self.xy_width();
                self.resolve_operand(bus, mode, w);
                bus.charge_internal_n(2);
                let v = if w == 8 { self.pull_byte(bus) as u16 } else { self.pull_word(bus) };
                self.set_nz(v, w);
                self.set_y(v);
            }
            O::Plp => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal_n(2);
                let status = self.pull_byte(bus);
                self.p = status;
                if self.emulation {
                    self.p |= flags::M | flags::X;
                    self.x &= 0x00FF;
                    self.y &= 0x00FF;
                }
            }
            O::Plb => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal_n(2);
                self.dbr = self.pull_byte(bus);
                self.set_nz(self.dbr as u16, 8);
            }
            O::Pld => {
                self.resolve_operand(bus, mode, 16);
                bus.charge_internal_n(2);
                self.d = self.pull_word(bus);
                self.set_nz(self.d, 16);
            }

            // ---------- Stack-effective-address pushes ----------
            O::Pea => {
                let operand = self.resolve_operand(bus, mode, 16);
                if let Operand::Immediate(v) = operand {
                    self.push_word(bus, v);
                }
            }
            O::Pei => {
                let operand = self.resolve_operand(bus, mode, 16);
                let v = self.read_operand(bus, operand, 16);
                self.push_word(bus, v);
            }
            O::Per => {
                let operand = self.resolve_operand(bus, mode, 16);
                if let Operand::Relative { target, .. } = operand {
                    bus.charge_internal();
                    self.push_word(bus, target);
                }
            }

            // ---------- Transfers ----------
            O::Tax => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                let w = self.xy_width();
                let v = self.get_a();
                self.set_nz(v, w);
                self.set_x(v);
            }
            O::Tay => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                let w = self.xy_width();
                let v = self.get_a();
                self.set_nz(v, w);
                self.set_y(v);
            }
            O::Txa => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                let w = self.a_width();
                let v = self.get_x();
                self.set_nz(v, w);
                self.set_a(v);
            }
            O::Tya => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                let w = self.a_width();
                let v = self.get_y();
                self.set_nz(v, w);
                self.set_a(v);
            }
            O::Txy => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                let w = self.xy_width();
                let v = self.get_x();
                self.set_nz(v, w);
                self.set_y(v);
            }
            O::Tyx => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                let w = self.xy_width();
                let v = self.get_y();
                self.set_nz(v, w);
                self.set_x(v);
            }
            O::Tsx => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                let w = self.xy_width();
                let v = self.s;
                self.set_nz(v, w);
                self.set_x(v);
            }
            O::Txs => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                let v = self.get_x();
                self.s = if self.emulation { 0x0100 | (v & 0x00FF) } else { v };
            }
            O::Tcs => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                let v = self.a;
                self.s = if self.emulation { 0x0100 | (v & 0x00FF) } else { v };
            }
            O::Tsc => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                self.a = self.s;
                self.set_nz(self.a, 16);
            }
            O::Tcd => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                self.d = self.a;
                self.set_nz(self.d, 16);
            }
            O::Tdc => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                self.a = self.d;
                self.set_nz(self.a, 16);
            }
            O::Xba => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal_n(2);
                let lo = self.a as u8;
                let hi = (self.a >> 8) as u8;
                self.a = ((lo as u16) << 8) | hi as u16;
                self.set_nz(hi as u16, 8);
            }

            // ---------- Flags ----------
            O::Clc => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                self.set_flag(flags::C, false);
            }
            O::Sec => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                self.set_flag(flags::C, true);
            }
            O::Cli => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                self.set_flag(flags::I, false);
            }
            O::Sei => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                self.set_flag(flags::I, true);
            }
            O::Cld => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                self.set_flag(flags::D, false);
            }
            O::Sed => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                self.set_flag(flags::D, true);
            }
            O::Clv => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                self.set_flag(flags::V, false);
            }
            O::Rep => {
                let operand = self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                if let Operand::Immediate(mask) = operand {
                    self.apply_status_mask(mask as u8, false);
                }
            }
            O::Sep => {
                let operand = self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                if let Operand::Immediate(mask) = operand {
                    self.apply_status_mask(mask as u8, true);
                }
            }
            O::Xce => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
                self.exchange_carry_emulation();
            }

            // ---------- Block move ----------
            O::Mvn | O::Mvp => {
                let operand = self.resolve_operand(bus, mode, 8);
                if let Operand::Move { dst_bank, src_bank } = operand {
                    self.dbr = dst_bank;
                    // The X status bit does not apply to this instruction:
                    // X, Y, and A are used and updated at their full 16-bit
                    // width regardless of the current index/accumulator
                    // width, per the datasheet note on MVN/MVP.
                    loop {
                        let byte = bus.read(src_bank, self.x, AccessFlags::DATA);
                        bus.write(byte, dst_bank, self.y, AccessFlags::DATA);
                        bus.charge_internal_n(5);
                        self.a = self.a.wrapping_sub(1);
                        if matches!(operation, O::Mvn) {
                            self.x = self.x.wrapping_add(1);
                            self.y = self.y.wrapping_add(1);
                        } else {
                            self.x = self.x.wrapping_sub(1);
                            self.y = self.y.wrapping_sub(1);
                        }
                        if self.a == 0xFFFF {
                            break;
                        }
                    }
                    // Hardware re-enters this opcode with PC rewound for
                    // each byte so an interrupt between bytes resumes the
                    // move; since one `step_one_instruction` call runs the
                    // whole block here, there is nothing left to resume.
                }
            }

            // ---------- Misc ----------
            O::Nop => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal();
            }
            O::Wdm => {
                self.resolve_operand(bus, mode, 8);
            }
            O::Wai => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal_n(2);
                self.ready_out = false;
            }
            O::Stp => {
                self.resolve_operand(bus, mode, 8);
                bus.charge_internal_n(2);
                self.enabled = false;
            }
        }
    }
}
