//! Reset, IRQ, and NMI vector dispatch.
//!
//! All three transitions run to completion in one `step_one_instruction`
//! call — they are never interleaved with an opcode fetch.
//!
//! # References
//! - WDC W65C816S datasheet, interrupt vector table and push sequences

use super::{flags, Cpu};
use crate::bus::{AccessFlags, Bus};

const VECTOR_COP_NATIVE: u16 = 0xFFE4;
const VECTOR_BRK_NATIVE: u16 = 0xFFE6;
const VECTOR_ABORT_NATIVE: u16 = 0xFFE8;
const VECTOR_NMI_NATIVE: u16 = 0xFFEA;
const VECTOR_IRQ_NATIVE: u16 = 0xFFEE;
const VECTOR_COP_EMULATION: u16 = 0xFFF4;
const VECTOR_ABORT_EMULATION: u16 = 0xFFF8;
const VECTOR_NMI_EMULATION: u16 = 0xFFFA;
const VECTOR_RESET: u16 = 0xFFFC;
const VECTOR_IRQ_BRK_EMULATION: u16 = 0xFFFE;

impl Cpu {
    fn read_vector(&self, bus: &mut Bus, vector: u16) -> u16 {
        let lo = bus.read(0x00, vector, AccessFlags::VECTOR_PULL) as u16;
        let hi = bus.read(0x00, vector.wrapping_add(1), AccessFlags::VECTOR_PULL) as u16;
        lo | (hi << 8)
    }

    /// Force the documented reset state and fetch the reset vector. Always
    /// enters emulation mode regardless of the mode active before reset,
    /// per the 65816's hardware reset behavior.
    pub(super) fn enter_reset(&mut self, bus: &mut Bus) {
        self.emulation = true;
        self.p |= flags::M | flags::X | flags::I;
        self.p &= !flags::D;
        self.d = 0;
        self.pbr = 0;
        self.dbr = 0;
        self.s = 0x0100 | (self.s.wrapping_sub(3) & 0x00FF);
        self.x &= 0x00FF;
        self.y &= 0x00FF;
        self.ready_out = true;
        self.enabled = true;

        for _ in 0..7 {
            bus.charge_internal();
        }

        self.pc = self.read_vector(bus, VECTOR_RESET);
        self.state = super::CpuState::Execute;
        log::trace!("cpu: reset vector -> {:02X}:{:04X}", self.pbr, self.pc);
    }

    /// IRQ entered by the `irqb_in` pin (not the BRK instruction, which the
    /// executor handles inline since it also advances PC past the
    /// signature byte first).
    pub(super) fn enter_irq(&mut self, bus: &mut Bus) {
        self.halt_release();
        bus.charge_internal();
        bus.charge_internal();
        if !self.emulation {
            self.push_byte(bus, self.pbr);
        }
        self.push_word(bus, self.pc);
        let status = self.status_byte_for_push(false);
        self.push_byte(bus, status);
        self.set_flag(flags::I, true);
        self.set_flag(flags::D, false);
        self.pbr = 0;
        let vector = if self.emulation { VECTOR_IRQ_BRK_EMULATION } else { VECTOR_IRQ_NATIVE };
        self.pc = self.read_vector(bus, vector);
        log::trace!("cpu: irq vector -> {:02X}:{:04X}", self.pbr, self.pc);
    }

    /// Edge-triggered NMI: identical push sequence to IRQ, distinct vector,
    /// and not maskable by the I flag.
    pub(super) fn enter_nmi(&mut self, bus: &mut Bus) {
        self.halt_release();
        bus.charge_internal();
        bus.charge_internal();
        if !self.emulation {
            self.push_byte(bus, self.pbr);
        }
        self.push_word(bus, self.pc);
        let status = self.status_byte_for_push(false);
        self.push_byte(bus, status);
        self.set_flag(flags::I, true);
        self.set_flag(flags::D, false);
        self.pbr = 0;
        let vector = if self.emulation { VECTOR_NMI_EMULATION } else { VECTOR_NMI_NATIVE };
        self.pc = self.read_vector(bus, vector);
        log::trace!("cpu: nmi vector -> {:02X}:{:04X}", self.pbr, self.pc);
    }

    /// BRK/COP share the push sequence with IRQ/NMI but are triggered by
    /// the executor after it has already advanced PC past the signature
    /// byte, and (BRK only) set the B flag in the pushed status.
    pub(super) fn enter_software_interrupt(&mut self, bus: &mut Bus, is_brk: bool) {
        if !self.emulation {
            self.push_byte(bus, self.pbr);
        }
        self.push_word(bus, self.pc);
        let status = self.status_byte_for_push(is_brk);
        self.push_byte(bus, status);
        self.set_flag(flags::I, true);
        self.set_flag(flags::D, false);
        self.pbr = 0;
        let vector = if is_brk {
            if self.emulation { VECTOR_IRQ_BRK_EMULATION } else { VECTOR_BRK_NATIVE }
        } else if self.emulation {
            VECTOR_COP_EMULATION
        } else {
            VECTOR_COP_NATIVE
        };
        self.pc = self.read_vector(bus, vector);
    }

    /// ABORT entry point, exposed for a host that models the ABORTB pin;
    /// the core itself never raises it internally.
    pub fn enter_abort(&mut self, bus: &mut Bus) {
        self.halt_release();
        bus.charge_internal();
        bus.charge_internal();
        if !self.emulation {
            self.push_byte(bus, self.pbr);
        }
        self.push_word(bus, self.pc);
        let status = self.status_byte_for_push(false);
        self.push_byte(bus, status);
        self.set_flag(flags::I, true);
        self.set_flag(flags::D, false);
        self.pbr = 0;
        let vector = if self.emulation { VECTOR_ABORT_EMULATION } else { VECTOR_ABORT_NATIVE };
        self.pc = self.read_vector(bus, vector);
    }

    fn halt_release(&mut self) {
        self.ready_out = true;
    }
}
