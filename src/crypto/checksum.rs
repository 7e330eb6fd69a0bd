//! Content checksum obfuscation.
//!
//! Listings may carry each file's MD5 in an obfuscated wire form: every nibble
//! XORed with its position, the nibble at position 9 written as a letter
//! (`'g' + n`), and the four 8-char blocks swapped pairwise. Servers that already
//! send the plain digest are passed through.

use crate::error::{Result, ShareError};

const LEN: usize = 32;

/// Position whose nibble travels as a letter in `g..=v`.
const LETTER_POS: usize = 9;

/// Convert a wire checksum to its canonical hex digest.
///
/// Input that already parses as hex is returned unchanged.
///
/// # Errors
/// Returns [`ShareError::Checksum`] if the input is neither hex nor a 32-char
/// obfuscated checksum.
///
/// # Examples
/// ```
/// use panshare::crypto::decode_checksum;
///
/// let md5 = decode_checksum("8e23f7635tb64136eddb0719602bc477").unwrap();
/// assert_eq!(md5, "d41d8cd98f00b204e9800998ecf8427e");
/// ```
pub fn decode_checksum(wire: &str) -> Result<String> {
    if is_hex(wire) {
        return Ok(wire.to_string());
    }
    if wire.len() != LEN || !wire.is_ascii() {
        return Err(invalid(wire, "expected 32 ASCII characters"));
    }

    let mut out = [0u8; LEN];
    for (i, c) in wire.bytes().enumerate() {
        let n = if i == LETTER_POS {
            let c = c.to_ascii_lowercase();
            if !(b'g'..=b'v').contains(&c) {
                return Err(invalid(wire, "position 9 must be a letter in g..=v"));
            }
            c - b'g'
        } else {
            hex_value(c).ok_or_else(|| invalid(wire, "non-hex character"))?
        };
        out[i] = hex_digit(n ^ (15 & i as u8));
    }

    Ok(swap_blocks(&out))
}

/// Convert a canonical hex digest to its wire form. Inverse of [`decode_checksum`].
///
/// # Errors
/// Returns [`ShareError::Checksum`] unless the input is 32 hex characters.
pub fn encode_checksum(canonical: &str) -> Result<String> {
    if canonical.len() != LEN || !is_hex(canonical) {
        return Err(invalid(canonical, "expected 32 hex characters"));
    }

    let unswapped = swap_blocks(canonical.as_bytes());
    let mut out = String::with_capacity(LEN);
    for (i, c) in unswapped.bytes().enumerate() {
        let n = hex_value(c).ok_or_else(|| invalid(canonical, "non-hex character"))? ^ (15 & i as u8);
        if i == LETTER_POS {
            out.push((b'g' + n) as char);
        } else {
            out.push(hex_digit(n) as char);
        }
    }
    Ok(out)
}

/// Reorder blocks `B1 B2 B3 B4` into `B2 B1 B4 B3`. Self-inverse.
fn swap_blocks(buf: &[u8]) -> String {
    [&buf[8..16], &buf[..8], &buf[24..32], &buf[16..24]]
        .concat()
        .into_iter()
        .map(char::from)
        .collect()
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && hex::decode(s).is_ok()
}

fn hex_value(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

fn hex_digit(n: u8) -> u8 {
    b"0123456789abcdef"[(n & 0x0f) as usize]
}

fn invalid(value: &str, reason: &'static str) -> ShareError {
    ShareError::Checksum {
        value: value.to_string(),
        reason,
    }
}
