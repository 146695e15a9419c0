//! Interface to the memory-mapped-I/O collaborator.
//!
//! The devices behind the I/O page (real-time clock, timers, keyboard and
//! mouse controller, audio synth, floppy and serial controllers, SmartPort
//! bus, video generator) are out of scope for this core — they are owned by
//! the host and reached only through this trait. The bus forwards any
//! access that lands on an I/O page here; everything else is served
//! straight out of RAM/ROM pages owned by the [`crate::memory::BankMap`].

use crate::bus::AccessFlags;

/// Host-provided collaborator for the I/O page window.
///
/// Implementations must be total: a read or write here must never panic or
/// otherwise abort the call. If emulated hardware needs to signal a fault,
/// it does so by raising an interrupt line, not by failing this call.
pub trait MmioHost {
    /// Read one byte from an I/O page.
    ///
    /// `flags` carries the access kind so devices can distinguish an
    /// opcode fetch, a vector pull, or a `NoOp` probe (which must suppress
    /// read side effects on read-sensitive registers) from an ordinary
    /// data read.
    fn mmio_read(&mut self, bank: u8, addr: u16, flags: AccessFlags) -> u8;

    /// Write one byte to an I/O page.
    fn mmio_write(&mut self, bank: u8, addr: u16, value: u8);

    /// Called after any I/O write that may have altered the bank/page
    /// mapping (language-card switches, shadowing, aux-bank selects, ...).
    /// `soft_switch_state` is an opaque, host-defined snapshot of whatever
    /// soft-switch bits the host tracks; the bank map only needs to see it
    /// change, not interpret every bit itself.
    fn refresh_bank_map(&mut self, soft_switch_state: u32);
}

/// An [`MmioHost`] that answers every read with zero and ignores writes.
///
/// Used whenever a `Bus` is constructed without a real I/O collaborator —
/// unit tests exercising the CPU/bus in isolation, or a host that has not
/// yet wired up its peripheral emulators.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMmio;

impl MmioHost for NullMmio {
    fn mmio_read(&mut self, _bank: u8, _addr: u16, _flags: AccessFlags) -> u8 {
        0
    }

    fn mmio_write(&mut self, _bank: u8, _addr: u16, _value: u8) {}

    fn refresh_bank_map(&mut self, _soft_switch_state: u32) {}
}
