//! WebAssembly bindings for the 65C816 core.
//!
//! This module provides JavaScript-friendly APIs using wasm-bindgen. Unlike
//! the C FFI in `lib.rs`, this owns the `Machine` directly without a raw
//! pointer since WASM is single-threaded. It exposes only what's in scope
//! for this crate — CPU stepping, interrupt lines, memory inspection, and
//! Intel-HEX loading — not rendering or peripheral state, which belong to
//! the host.

use wasm_bindgen::prelude::*;

use crate::emu::Machine;

/// WASM-friendly wrapper around a [`Machine`].
#[wasm_bindgen]
pub struct WasmMachine {
    inner: Machine,
}

#[wasm_bindgen]
impl WasmMachine {
    /// Build a fresh machine. See [`Machine::initialize`] for the bank-map
    /// layout this produces. Rejects an empty ROM or fewer than 4 fast-RAM
    /// banks.
    #[wasm_bindgen(constructor)]
    pub fn new(
        rom: &[u8],
        slow_ram_e0: &[u8],
        slow_ram_e1: &[u8],
        fast_ram_bank_count: usize,
    ) -> Result<WasmMachine, JsValue> {
        console_error_panic_hook::set_once();
        Machine::initialize(rom, slow_ram_e0, slow_ram_e1, fast_ram_bank_count)
            .map(|inner| WasmMachine { inner })
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Assert `resb_in` low; the reset microcode runs on the next step.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Advance by exactly one instruction or interrupt/reset transition.
    /// Returns the cycles charged.
    #[wasm_bindgen]
    pub fn step_one_instruction(&mut self) -> u32 {
        self.inner.step_one_instruction()
    }

    /// Run until at least `cycle_budget` cycles have been charged. Returns
    /// the cycles actually charged.
    #[wasm_bindgen]
    pub fn step_until(&mut self, cycle_budget: u64) -> u64 {
        self.inner.step_until(cycle_budget)
    }

    /// Raise or lower the level-triggered IRQ line.
    #[wasm_bindgen]
    pub fn set_irq(&mut self, level: bool) {
        self.inner.set_irq(level);
    }

    /// Latch an edge-triggered NMI pulse.
    #[wasm_bindgen]
    pub fn set_nmi(&mut self, pulse: bool) {
        self.inner.set_nmi(pulse);
    }

    /// Parse `text` as Intel-HEX and write its data records into `bank`.
    /// Returns `null` on success, an error message on failure.
    #[wasm_bindgen]
    pub fn load_intel_hex(&mut self, text: &str, bank: u8) -> Option<String> {
        self.inner.load_intel_hex(text, bank).err().map(|err| err.to_string())
    }

    /// Copy `page_count` 256-byte pages starting at `bank:page`.
    #[wasm_bindgen]
    pub fn dump_bank_page(&self, bank: u8, page: u8, page_count: u16) -> Vec<u8> {
        let mut out = vec![0u8; page_count as usize * 256];
        self.inner.dump_bank_page(bank, page, page_count, &mut out);
        out
    }

    /// Total bus/internal cycles charged since the last reset.
    #[wasm_bindgen]
    pub fn cycles_spent(&self) -> u64 {
        self.inner.cycles_spent()
    }
}
