//! Character encodings used to decode line bytes.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Encoding applied to the bytes of each extracted line.
///
/// Only ASCII-compatible encodings are supported: line terminators are found
/// on raw bytes before decoding, which is sound only when `\n` and `\r` can
/// never appear inside a multi-byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Charset {
    /// UTF-8; invalid sequences fail the poll
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// UTF-8 with invalid sequences replaced by U+FFFD
    #[serde(rename = "utf-8-lossy", alias = "utf8-lossy")]
    Utf8Lossy,
    /// ISO-8859-1, one byte per char
    #[serde(rename = "iso-8859-1", alias = "latin1", alias = "latin-1")]
    Latin1,
}

impl Charset {
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Utf8Lossy => "utf-8-lossy",
            Charset::Latin1 => "iso-8859-1",
        }
    }

    /// Decode `bytes`, returning `None` if they are invalid for this charset.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            Charset::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            Charset::Utf8Lossy => Some(String::from_utf8_lossy(bytes)),
            Charset::Latin1 => Some(Cow::Owned(bytes.iter().map(|&b| b as char).collect())),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "utf-8-lossy" | "utf8-lossy" => Ok(Charset::Utf8Lossy),
            "iso-8859-1" | "latin1" | "latin-1" => Ok(Charset::Latin1),
            other => Err(format!("unsupported charset: {other}")),
        }
    }
}
