//! Hex transport encoding for file contents.
//!
//! The host value channel cannot carry arbitrary binary safely, so every byte
//! that crosses it travels as two lowercase hex digits.

use serde::{Deserialize, Serialize};

use crate::error::FsResult;

/// How `write` treats characters outside `0-9a-fA-F`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HexDecodeMode {
    /// Reject the whole input with `InvalidEncoding`
    #[default]
    Strict,
    /// Decode unknown characters as the nibble `0`
    Lenient,
}

impl HexDecodeMode {
    pub fn decode(self, input: &str) -> FsResult<Vec<u8>> {
        match self {
            HexDecodeMode::Strict => decode(input),
            HexDecodeMode::Lenient => decode_lenient(input),
        }
    }
}

pub fn encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a hex string, failing on odd length or any non-hex character.
pub fn decode(input: &str) -> FsResult<Vec<u8>> {
    Ok(hex::decode(input)?)
}

/// Decode a hex string with a permissive digit table.
///
/// Odd-length input is still rejected.
pub fn decode_lenient(input: &str) -> FsResult<Vec<u8>> {
    let digits = input.as_bytes();
    if digits.len() % 2 != 0 {
        return Err(hex::FromHexError::OddLength.into());
    }
    Ok(digits
        .chunks_exact(2)
        .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
        .collect())
}

fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}
