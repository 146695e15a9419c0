//! WDC 65C816 emulator core for the Apple IIgs.
//!
//! This crate provides a platform-agnostic CPU/bus core with a stable C
//! ABI. No OS APIs are used — all I/O beyond the emulated address space is
//! done through byte buffers and the host-supplied [`mmio::MmioHost`].
//!
//! # Architecture
//!
//! - `memory`: the 256-bank address space (fast RAM, slow RAM, ROM, the
//!   language-card window, the I/O gate)
//! - `bus`: address decoding, cycle charging, I/O-gate forwarding
//! - `cpu`: the 65C816 register file, addressing modes, and opcode dispatch
//! - `clock`: fast/slow cycle accounting
//! - `mmio`: the trait the host implements for devices behind the I/O page
//! - `intelhex`: Intel-HEX loader for parking a test program into memory
//! - `disasm`: a disassembler built on the CPU's own opcode table
//! - `emu`: `Machine`, the orchestrator a host embeds against
//!
//! # Scope
//!
//! Peripheral devices, disk-image decoding, host rendering/audio, a
//! save-state serializer, a CLI front-end, and a debugger UI are explicitly
//! out of scope — this crate is the CPU and memory-bus core only.
//!
//! # Memory Map (24-bit 65C816 address space)
//!
//! | Address Range (bank:offset) | Region                                   |
//! |------------------------------|-------------------------------------------|
//! | `00:0000`-`00:BFFF`          | Fast RAM (bank 0)                         |
//! | `00:C000`-`00:C0FF`          | I/O gate                                  |
//! | `00:D000`-`00:FFFF`          | Language-card window (RAM or ROM)         |
//! | `01..`                       | Further fast-RAM banks                    |
//! | `E0`-`E1`                    | Slow RAM (1 MHz clock domain)             |
//! | top of bank space            | ROM, wrapping downward from bank 0xFF     |

pub mod bus;
mod clock;
pub mod cpu;
pub mod disasm;
mod emu;
pub mod error;
pub mod intelhex;
pub mod memory;
pub mod mmio;

#[cfg(feature = "wasm")]
mod wasm;

use std::ptr;
use std::slice;

pub use emu::{InstructionTrace, Machine};

/// Define a C-ABI export, and — under the `ios_prefixed` feature — a second
/// `rust_`-prefixed export that forwards to it. Some iOS build pipelines
/// link two copies of this core under different symbol prefixes; rather
/// than hand-duplicate every shim, each one is written once and aliased.
macro_rules! dual_export {
    ($plain:ident, $prefixed:ident, fn($($arg:ident : $ty:ty),* $(,)?) -> $ret:ty $body:block) => {
        #[no_mangle]
        pub extern "C" fn $plain($($arg: $ty),*) -> $ret $body

        #[cfg(feature = "ios_prefixed")]
        #[no_mangle]
        pub extern "C" fn $prefixed($($arg: $ty),*) -> $ret {
            $plain($($arg),*)
        }
    };
}

dual_export!(machine_create, rust_machine_create, fn(
    rom: *const u8,
    rom_len: usize,
    slow_ram_e0: *const u8,
    slow_ram_e0_len: usize,
    slow_ram_e1: *const u8,
    slow_ram_e1_len: usize,
    fast_ram_bank_count: usize,
    out_error: *mut i32
) -> *mut Machine {
    if rom.is_null() {
        if !out_error.is_null() {
            unsafe { *out_error = error::InitError::MissingRom.code() };
        }
        return ptr::null_mut();
    }

    let rom_image = unsafe { slice::from_raw_parts(rom, rom_len) };
    let e0 = if slow_ram_e0.is_null() { &[][..] } else { unsafe { slice::from_raw_parts(slow_ram_e0, slow_ram_e0_len) } };
    let e1 = if slow_ram_e1.is_null() { &[][..] } else { unsafe { slice::from_raw_parts(slow_ram_e1, slow_ram_e1_len) } };

    match Machine::initialize(rom_image, e0, e1, fast_ram_bank_count) {
        Ok(machine) => {
            if !out_error.is_null() {
                unsafe { *out_error = 0 };
            }
            Box::into_raw(Box::new(machine))
        }
        Err(err) => {
            if !out_error.is_null() {
                unsafe { *out_error = err.code() };
            }
            ptr::null_mut()
        }
    }
});

dual_export!(machine_destroy, rust_machine_destroy, fn(machine: *mut Machine) -> () {
    if !machine.is_null() {
        unsafe {
            drop(Box::from_raw(machine));
        }
    }
});

dual_export!(machine_reset, rust_machine_reset, fn(machine: *mut Machine) -> () {
    if machine.is_null() {
        return;
    }
    let machine = unsafe { &mut *machine };
    machine.reset();
});

/// Advance by exactly one instruction or interrupt/reset transition.
/// Returns the cycles charged.
dual_export!(machine_step_one_instruction, rust_machine_step_one_instruction, fn(machine: *mut Machine) -> u32 {
    if machine.is_null() {
        return 0;
    }
    let machine = unsafe { &mut *machine };
    machine.step_one_instruction()
});

/// Run until at least `cycle_budget` cycles have been charged. Returns the
/// cycles actually charged.
dual_export!(machine_step_until, rust_machine_step_until, fn(machine: *mut Machine, cycle_budget: u64) -> u64 {
    if machine.is_null() {
        return 0;
    }
    let machine = unsafe { &mut *machine };
    machine.step_until(cycle_budget)
});

dual_export!(machine_set_irq, rust_machine_set_irq, fn(machine: *mut Machine, level: i32) -> () {
    if machine.is_null() {
        return;
    }
    let machine = unsafe { &mut *machine };
    machine.set_irq(level != 0);
});

dual_export!(machine_set_nmi, rust_machine_set_nmi, fn(machine: *mut Machine, pulse: i32) -> () {
    if machine.is_null() {
        return;
    }
    let machine = unsafe { &mut *machine };
    machine.set_nmi(pulse != 0);
});

/// Parse `text` (`text_len` bytes, assumed UTF-8) as Intel-HEX and write its
/// data records into `bank`. Returns 0 on success, a negative
/// [`error::HexLoadError::code`] on failure.
dual_export!(machine_load_intel_hex, rust_machine_load_intel_hex, fn(
    machine: *mut Machine,
    text: *const u8,
    text_len: usize,
    bank: u8
) -> i32 {
    if machine.is_null() || text.is_null() {
        return -1;
    }
    let machine = unsafe { &mut *machine };
    let bytes = unsafe { slice::from_raw_parts(text, text_len) };
    let Ok(text) = std::str::from_utf8(bytes) else {
        return error::HexLoadError::Malformed.code();
    };

    match machine.load_intel_hex(text, bank) {
        Ok(()) => 0,
        Err(err) => err.code(),
    }
});

/// Copy `page_count` 256-byte pages starting at `bank:page` into `out`
/// (which must be at least `page_count * 256` bytes).
dual_export!(machine_dump_bank_page, rust_machine_dump_bank_page, fn(
    machine: *const Machine,
    bank: u8,
    page: u8,
    page_count: u16,
    out: *mut u8,
    out_len: usize
) -> () {
    if machine.is_null() || out.is_null() {
        return;
    }
    let machine = unsafe { &*machine };
    let out = unsafe { slice::from_raw_parts_mut(out, out_len) };
    machine.dump_bank_page(bank, page, page_count, out);
});

dual_export!(machine_cycles_spent, rust_machine_cycles_spent, fn(machine: *const Machine) -> u64 {
    if machine.is_null() {
        return 0;
    }
    let machine = unsafe { &*machine };
    machine.cycles_spent()
});
