//! Error types for the core's fallible entry points.
//!
//! Kept as small `Copy` enums in the style the rest of this crate already
//! uses for hardware-level faults (see `memory::FlashError`), rather than
//! reaching for a heavier error-handling crate.

use std::fmt;

/// Failure returned from [`crate::Machine::initialize`].
///
/// The magnitude of [`InitError::code`] is the negative integer a C-ABI
/// caller sees; all other entry points are infallible once initialization
/// has succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// No ROM image was supplied.
    MissingRom,
    /// Fewer than 4 fast-RAM banks were requested.
    InsufficientFastRam,
}

impl InitError {
    /// Negative error code for the C-ABI boundary.
    pub fn code(self) -> i32 {
        match self {
            InitError::MissingRom => -1,
            InitError::InsufficientFastRam => -2,
        }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::MissingRom => write!(f, "no ROM image supplied"),
            InitError::InsufficientFastRam => write!(f, "fast-RAM bank count below minimum of 4"),
        }
    }
}

impl std::error::Error for InitError {}

/// Failure returned from [`crate::intelhex::load_intel_hex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexLoadError {
    /// A record used a type other than 00 (data) or 01 (EOF).
    UnknownRecordType(u8),
    /// The trailing checksum byte did not match the computed checksum.
    ChecksumMismatch,
    /// A record line was shorter than its declared byte count implied.
    Truncated,
    /// A line did not start with the `:` record marker or had odd hex digits.
    Malformed,
}

impl HexLoadError {
    /// Negative error code for the C-ABI boundary.
    pub fn code(self) -> i32 {
        match self {
            HexLoadError::UnknownRecordType(_) => -10,
            HexLoadError::ChecksumMismatch => -11,
            HexLoadError::Truncated => -12,
            HexLoadError::Malformed => -13,
        }
    }
}

impl fmt::Display for HexLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexLoadError::UnknownRecordType(t) => write!(f, "unsupported Intel-HEX record type {t:02X}"),
            HexLoadError::ChecksumMismatch => write!(f, "Intel-HEX checksum mismatch"),
            HexLoadError::Truncated => write!(f, "Intel-HEX record shorter than its declared length"),
            HexLoadError::Malformed => write!(f, "malformed Intel-HEX line"),
        }
    }
}

impl std::error::Error for HexLoadError {}
