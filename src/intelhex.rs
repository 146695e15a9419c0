//! Intel-HEX loader for parking a test program into one bank of memory
//! ahead of a run, independent of any particular host front-end.
//!
//! Only the two record types a bring-up ROM actually needs are accepted:
//! `00` (data) and `01` (end-of-file). Anything else — extended segment or
//! linear address records included — is a parse failure, since this loader
//! targets single-bank 64 KiB images, not the multi-megabyte images those
//! records exist to address.
//!
//! # References
//! - Intel HEX8 record format (`:LLAAAATT[DD...]CC`)

use crate::error::HexLoadError;

const RECORD_DATA: u8 = 0x00;
const RECORD_EOF: u8 = 0x01;

/// Parse `text` as Intel-HEX and call `write_byte(bank, address, value)` for
/// every data byte in order. Stops at the first `01` (EOF) record or the
/// end of input, whichever comes first. Blank lines are skipped; every
/// non-blank line must be a well-formed record.
pub fn load_intel_hex(
    text: &str,
    bank: u8,
    mut write_byte: impl FnMut(u8, u16, u8),
) -> Result<(), HexLoadError> {
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = parse_record(line)?;
        match record.kind {
            RECORD_EOF => return Ok(()),
            RECORD_DATA => {
                for (i, byte) in record.data.iter().enumerate() {
                    write_byte(bank, record.address.wrapping_add(i as u16), *byte);
                }
            }
            other => return Err(HexLoadError::UnknownRecordType(other)),
        }
    }
    Ok(())
}

struct Record {
    address: u16,
    kind: u8,
    data: Vec<u8>,
}

fn parse_record(line: &str) -> Result<Record, HexLoadError> {
    let hex = line.strip_prefix(':').ok_or(HexLoadError::Malformed)?;
    let bytes = hex_decode(hex)?;
    if bytes.len() < 5 {
        return Err(HexLoadError::Truncated);
    }

    let len = bytes[0] as usize;
    let address = ((bytes[1] as u16) << 8) | bytes[2] as u16;
    let kind = bytes[3];
    if bytes.len() != len + 5 {
        return Err(HexLoadError::Truncated);
    }
    let data = bytes[4..4 + len].to_vec();
    let checksum = bytes[4 + len];

    let sum = bytes[..4 + len].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    let expected = (!sum).wrapping_add(1);
    if checksum != expected {
        return Err(HexLoadError::ChecksumMismatch);
    }

    Ok(Record { address, kind, data })
}

fn hex_decode(hex: &str) -> Result<Vec<u8>, HexLoadError> {
    let hex = hex.as_bytes();
    if hex.len() % 2 != 0 {
        return Err(HexLoadError::Malformed);
    }
    hex.chunks(2)
        .map(|pair| {
            let hi = hex_digit(pair[0])?;
            let lo = hex_digit(pair[1])?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

fn hex_digit(c: u8) -> Result<u8, HexLoadError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(HexLoadError::Malformed),
    }
}
