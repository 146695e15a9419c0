//! Machine orchestrator.
//!
//! Owns the CPU and bus pair and exposes the external interface a host
//! embeds against: construction/initialization, reset,
//! single-instruction stepping, interrupt line control, Intel-HEX loading
//! for test programs, and a bank-page inspector. Rendering, disk-image
//! decoding, peripheral devices, save-state serialization, and a debugger
//! UI are a host's concern, not this core's — `Machine` only ever reaches
//! the I/O page through the [`crate::mmio::MmioHost`] the host supplies.
//!
//! # References
//! - `hunterchen7-ti84ce` `core/src/emu.rs` (an `Emu` type gluing `Cpu` +
//!   `Bus` together behind `new`/`reset`/`run_cycles`, holding the one
//!   instance of machine state a host talks to)

use crate::bus::Bus;
use crate::cpu::{Cpu, LastAction};
use crate::disasm;
use crate::error::{HexLoadError, InitError};
use crate::intelhex;
use crate::memory::BankMap;
use crate::mmio::MmioHost;

/// One fetched-and-executed instruction, reported to an installed trace
/// callback. Carries enough to reconstruct a disassembly line without the
/// callback needing its own copy of the opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionTrace {
    /// Program bank the opcode was fetched from.
    pub pbr: u8,
    /// Program counter at the start of the instruction.
    pub pc: u16,
    /// The opcode byte itself.
    pub opcode: u8,
    /// Up to 3 operand bytes, valid for the first `operand_len` entries.
    pub operand: [u8; 3],
    /// How many bytes of `operand` are meaningful (0-3).
    pub operand_len: u8,
    /// Bus/internal cycles this instruction charged.
    pub cycles: u32,
}

/// CPU, bus, and bank map bundled behind the interface a host steps.
pub struct Machine {
    cpu: Cpu,
    bus: Bus,
    trace: Option<Box<dyn FnMut(&InstructionTrace)>>,
}

impl Machine {
    /// Build a fresh, pre-reset machine: a 256-bank address space with ROM
    /// at the top, `fast_ram_bank_count` fast-RAM banks from bank 0, slow
    /// RAM at banks 0xE0/0xE1, and the classic language-card/I/O-gate
    /// window on banks 0x00-0x01. No I/O collaborator is attached; I/O-page
    /// reads return 0 and writes are dropped until [`Machine::set_mmio`] is
    /// called.
    ///
    /// Fails if `rom_image` is empty or `fast_ram_bank_count` is below the
    /// architectural minimum of 4 banks.
    pub fn initialize(
        rom_image: &[u8],
        slow_ram_bank_e0: &[u8],
        slow_ram_bank_e1: &[u8],
        fast_ram_bank_count: usize,
    ) -> Result<Self, InitError> {
        let map = BankMap::new(rom_image, slow_ram_bank_e0, slow_ram_bank_e1, fast_ram_bank_count)
            .inspect_err(|err| log::error!("machine: initialize failed: {err}"))?;
        Ok(Self { cpu: Cpu::new(), bus: Bus::new(map), trace: None })
    }

    /// Attach (or replace) the I/O-page collaborator.
    pub fn set_mmio(&mut self, mmio: Box<dyn MmioHost>) {
        self.bus.set_mmio(mmio);
    }

    /// Install a callback invoked once per fetched opcode (not per
    /// interrupt/reset transition — see [`LastAction`]). Replaces any
    /// previously installed callback.
    pub fn set_trace_callback(&mut self, callback: impl FnMut(&InstructionTrace) + 'static) {
        self.trace = Some(Box::new(callback));
    }

    /// Remove any installed trace callback.
    pub fn clear_trace_callback(&mut self) {
        self.trace = None;
    }

    /// Assert `resb_in` low. The reset microcode itself does not run until
    /// the next [`Machine::step_one_instruction`] — two consecutive calls
    /// to `reset()` followed by stepping to completion are equivalent to
    /// one, since this only (re)arms the pending transition.
    pub fn reset(&mut self) {
        self.cpu.assert_reset(0);
        self.bus.reset_clock();
    }

    /// Advance by exactly one instruction or interrupt/reset transition.
    /// Returns the cycles charged. Fires the trace callback, if any, only
    /// when an opcode was actually fetched and executed this call.
    pub fn step_one_instruction(&mut self) -> u32 {
        let cycles = self.cpu.step_one_instruction(&mut self.bus);
        if self.cpu.last_action() == LastAction::FetchedOpcode && self.trace.is_some() {
            let trace = self.build_trace(cycles);
            if let Some(callback) = self.trace.as_mut() {
                callback(&trace);
            }
        }
        cycles
    }

    /// Run instructions until at least `cycle_budget` cycles have been
    /// charged since the call started, or until the CPU enters `STP` and
    /// stays halted (to avoid spinning forever on a stopped core). Returns
    /// the cycles actually charged.
    pub fn step_until(&mut self, cycle_budget: u64) -> u64 {
        let start = self.bus.cycles_spent();
        loop {
            let spent = self.bus.cycles_spent() - start;
            if spent >= cycle_budget {
                return spent;
            }
            self.step_one_instruction();
            if self.cpu.last_action() == LastAction::Stopped {
                return self.bus.cycles_spent() - start;
            }
        }
    }

    /// Raise or lower the level-triggered IRQ line.
    pub fn set_irq(&mut self, level: bool) {
        self.cpu.set_irq(level);
    }

    /// Latch an edge-triggered NMI pulse.
    pub fn set_nmi(&mut self, pulse: bool) {
        self.cpu.set_nmi(pulse);
    }

    /// Parse `text` as Intel-HEX and write its data records into `bank`,
    /// for parking a hand-assembled test program ahead of a run.
    pub fn load_intel_hex(&mut self, text: &str, bank: u8) -> Result<(), HexLoadError> {
        let bus = &mut self.bus;
        intelhex::load_intel_hex(text, bank, |bank, addr, value| {
            bus.write(value, bank, addr, crate::bus::AccessFlags::DATA);
        })
        .inspect_err(|err| log::error!("machine: load_intel_hex failed: {err}"))
    }

    /// Copy `page_count` 256-byte pages starting at `bank:page` into `out`,
    /// for a host's memory inspector. Never charges the clock or triggers
    /// I/O side effects.
    pub fn dump_bank_page(&self, bank: u8, page: u8, page_count: u16, out: &mut [u8]) {
        self.bus.dump_bank_page(bank, page, page_count, out);
    }

    /// Total bus/internal cycles charged since the last [`Machine::reset`].
    pub fn cycles_spent(&self) -> u64 {
        self.bus.cycles_spent()
    }

    /// Read-only access to the CPU register/pin file, for a host's
    /// register inspector.
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    fn build_trace(&self, cycles: u32) -> InstructionTrace {
        let (pbr, pc) = self.cpu.program_counter_of_last_fetch();
        let mut page_buf = [0u8; 512];
        self.bus.dump_bank_page(pbr, (pc >> 8) as u8, 2, &mut page_buf);
        let offset = (pc & 0x00FF) as usize;
        let mut window = [0u8; 4];
        let available = (page_buf.len() - offset).min(4);
        window[..available].copy_from_slice(&page_buf[offset..offset + available]);

        let pc_after_opcode = pc.wrapping_add(1);
        let disasm = disasm::disassemble(&window, pc_after_opcode, self.cpu.a_width(), self.cpu.xy_width());
        let operand_len = disasm.length.saturating_sub(1).min(3);
        let mut operand = [0u8; 3];
        operand[..operand_len].copy_from_slice(&window[1..1 + operand_len]);

        InstructionTrace { pbr, pc, opcode: window[0], operand, operand_len: operand_len as u8, cycles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_with_reset_vector(entry: u16) -> Vec<u8> {
        let mut rom = vec![0u8; 0x10000];
        rom[0xFFFC] = entry as u8;
        rom[0xFFFD] = (entry >> 8) as u8;
        rom
    }

    #[test]
    fn initialize_rejects_empty_rom() {
        let err = Machine::initialize(&[], &[], &[], 8).unwrap_err();
        assert_eq!(err, InitError::MissingRom);
    }

    #[test]
    fn initialize_rejects_insufficient_fast_ram() {
        let rom = rom_with_reset_vector(0x8000);
        let err = Machine::initialize(&rom, &[], &[], 1).unwrap_err();
        assert_eq!(err, InitError::InsufficientFastRam);
    }

    #[test]
    fn reset_then_step_runs_the_reset_microcode() {
        let rom = rom_with_reset_vector(0x8000);
        let mut machine = Machine::initialize(&rom, &[], &[], 8).unwrap();
        machine.reset();
        machine.step_one_instruction();
        assert_eq!(machine.cpu().program_counter_of_last_fetch(), (0x00, 0x8000));
    }

    #[test]
    fn reset_is_idempotent_across_two_full_sequences() {
        let rom = rom_with_reset_vector(0x8000);
        let mut a = Machine::initialize(&rom, &[], &[], 8).unwrap();
        a.reset();
        a.step_one_instruction();
        let pc_after_first = a.cpu().program_counter_of_last_fetch();

        a.reset();
        a.step_one_instruction();
        let pc_after_second = a.cpu().program_counter_of_last_fetch();

        assert_eq!(pc_after_first, pc_after_second);
    }

    #[test]
    fn trace_callback_fires_once_per_fetched_opcode_not_per_reset() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let rom = rom_with_reset_vector(0x8000);
        let mut machine = Machine::initialize(&rom, &[], &[], 8).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        machine.set_trace_callback(move |trace| seen_clone.borrow_mut().push(*trace));

        machine.reset();
        machine.step_one_instruction(); // performs reset, no trace
        machine.step_one_instruction(); // first opcode fetch at $8000 (ROM is all zero -> BRK)

        let traces = seen.borrow();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].pc, 0x8000);
        assert_eq!(traces[0].opcode, 0x00);
    }

    #[test]
    fn load_intel_hex_writes_into_the_requested_bank() {
        let rom = rom_with_reset_vector(0x8000);
        let mut machine = Machine::initialize(&rom, &[], &[], 8).unwrap();
        machine.load_intel_hex(":0300000011223397\n", 0x00).unwrap();
        let mut out = [0u8; 256];
        machine.dump_bank_page(0x00, 0x00, 1, &mut out);
        assert_eq!(&out[0..3], &[0x11, 0x22, 0x33]);
    }

    #[test]
    fn step_until_stops_once_the_budget_is_spent() {
        let rom = rom_with_reset_vector(0x8000);
        let mut machine = Machine::initialize(&rom, &[], &[], 8).unwrap();
        machine.reset();
        machine.step_one_instruction(); // reset microcode, 7 cycles
        let spent = machine.step_until(10);
        assert!(spent >= 10);
    }
}
