//! Shared harness for the opcode/addressing/interrupt test suites below,
//! split across sibling files by concern: addressing modes, instruction
//! semantics, and interrupt/reset dispatch.

mod addressing;
mod interrupt;

use crate::bus::{AccessFlags, Bus};
use crate::cpu::{Cpu, CpuState};
use crate::memory::BankMap;

/// A CPU and bus pair with 8 fast-RAM banks and an all-zero ROM image.
/// Bank 0's language-card window defaults to reading ROM, so tests that
/// care about vectors write them into `rom` before building the pair.
pub(super) fn harness() -> (Cpu, Bus) {
    let rom = vec![0u8; 0x10000];
    let map = BankMap::new(&rom, &[], &[], 8).unwrap();
    (Cpu::new(), Bus::new(map))
}

/// A CPU already past reset, in the given mode, parked at `0000:0800` with
/// the stack at its post-reset default — ready to run a hand-assembled
/// program poked into bank-0 fast RAM via [`load`].
pub(super) fn running(p: u8, emulation: bool) -> (Cpu, Bus) {
    let (mut cpu, bus) = harness();
    cpu.resb_in = false;
    cpu.state = CpuState::Execute;
    cpu.emulation = emulation;
    cpu.p = p;
    cpu.s = if emulation { 0x01FD } else { 0x1FFD };
    cpu.pc = 0x0800;
    (cpu, bus)
}

/// Write `bytes` starting at `bank:addr`.
pub(super) fn load(bus: &mut Bus, bank: u8, addr: u16, bytes: &[u8]) {
    for (i, &b) in bytes.iter().enumerate() {
        bus.write(b, bank, addr.wrapping_add(i as u16), AccessFlags::DATA);
    }
}

/// A fresh pre-reset CPU whose bank-0 language-card window (the default
/// vector source, since `read_ram` starts false) carries the given
/// emulation-mode reset/NMI/IRQ-BRK vectors. Native-mode vectors may be
/// poked in separately afterward with [`load`] against bank 0.
pub(super) fn harness_with_vectors(reset: u16, nmi: u16, irq_brk: u16) -> (Cpu, Bus) {
    let mut rom = vec![0u8; 0x10000];
    rom[0xFFFC] = reset as u8;
    rom[0xFFFD] = (reset >> 8) as u8;
    rom[0xFFFA] = nmi as u8;
    rom[0xFFFB] = (nmi >> 8) as u8;
    rom[0xFFFE] = irq_brk as u8;
    rom[0xFFFF] = (irq_brk >> 8) as u8;
    let map = BankMap::new(&rom, &[], &[], 8).unwrap();
    (Cpu::new(), Bus::new(map))
}
