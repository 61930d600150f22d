//! Coded character set handling (dataset 1:90).
//!
//! Documents without a 1:90 dataset are legacy single-byte text, read as
//! ISO-8859-1 unless the caller supplies another input encoding. The ISO 2022
//! escape `ESC % G` declares UTF-8, and `ESC - F` designations select the
//! ISO-8859 part named by the final byte `F`. Declarations are kept verbatim
//! so they can be written back untouched.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::Encoding;

/// ISO 2022 escape sequence declaring UTF-8.
pub const UTF8_MARKER: &[u8] = b"\x1b%G";

/// Other escape spellings that also select UTF-8 (ISO-IR 190/191/192).
const UTF8_MARKER_VARIANTS: &[&[u8]] = &[b"\x1b%/G", b"\x1b%/H", b"\x1b%/I"];

/// The text encoding in force for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Charset {
    /// No declaration; single-byte ISO-8859-1.
    #[default]
    Legacy,
    /// No declaration; read with an encoding chosen by the caller.
    Assumed(&'static Encoding),
    /// Declared UTF-8.
    Utf8,
    /// Some other declaration, kept as the raw escape bytes.
    Declared(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoder {
    Latin1,
    Utf8,
    Other(&'static Encoding),
}

impl Charset {
    /// Interpret the value of a 1:90 dataset.
    pub fn from_marker(marker: &[u8]) -> Self {
        if marker == UTF8_MARKER || UTF8_MARKER_VARIANTS.contains(&marker) {
            Charset::Utf8
        } else {
            Charset::Declared(marker.to_vec())
        }
    }

    /// Charset of a document with no 1:90 dataset.
    pub fn undeclared(input: Option<&'static Encoding>) -> Self {
        input.map_or(Charset::Legacy, Charset::Assumed)
    }

    /// Bytes to write into 1:90, or `None` when no declaration is needed.
    pub fn marker(&self) -> Option<&[u8]> {
        match self {
            Charset::Legacy | Charset::Assumed(_) => None,
            Charset::Utf8 => Some(UTF8_MARKER),
            Charset::Declared(bytes) => Some(bytes),
        }
    }

    pub fn is_utf8(&self) -> bool {
        matches!(self, Charset::Utf8)
    }

    /// Whether stored text can be decoded faithfully, and therefore
    /// transcoded to UTF-8.
    pub fn is_decodable(&self) -> bool {
        self.decoder().is_some()
    }

    fn decoder(&self) -> Option<Decoder> {
        match self {
            Charset::Legacy => Some(Decoder::Latin1),
            Charset::Utf8 => Some(Decoder::Utf8),
            Charset::Assumed(encoding) if *encoding == encoding_rs::UTF_8 => Some(Decoder::Utf8),
            Charset::Assumed(encoding) => Some(Decoder::Other(*encoding)),
            Charset::Declared(marker) => declared_decoder(marker),
        }
    }

    /// Decode a stored value to text.
    ///
    /// Invalid sequences are replaced rather than rejected. Declarations with
    /// no known decoder fall back to ISO-8859-1, which maps every byte.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self.decoder().unwrap_or(Decoder::Latin1) {
            Decoder::Utf8 => String::from_utf8_lossy(bytes),
            Decoder::Latin1 => latin1_to_string(bytes),
            Decoder::Other(encoding) => encoding.decode_without_bom_handling(bytes).0,
        }
    }

    /// Re-encode a value stored under this charset as UTF-8 bytes.
    ///
    /// Callers check [`Charset::is_decodable`] first; an unknown declaration
    /// would otherwise be read as ISO-8859-1.
    pub fn transcode_to_utf8(&self, bytes: &[u8]) -> Vec<u8> {
        match self {
            Charset::Utf8 => bytes.to_vec(),
            _ => self.decode(bytes).into_owned().into_bytes(),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.decoder()) {
            (Charset::Legacy, _) => f.write_str("ISO-8859-1 (undeclared)"),
            (Charset::Assumed(encoding), _) => write!(f, "{} (undeclared)", encoding.name()),
            (_, Some(Decoder::Utf8)) => f.write_str("UTF-8"),
            (_, Some(Decoder::Latin1)) => f.write_str("ISO-8859-1"),
            (_, Some(Decoder::Other(encoding))) => f.write_str(encoding.name()),
            (_, None) => {
                let marker = self.marker().unwrap_or_default();
                let hex: Vec<String> = marker.iter().map(|b| format!("{b:02X}")).collect();
                write!(f, "unknown ({})", hex.join(" "))
            }
        }
    }
}

/// Decoder for a 1:90 declaration other than UTF-8.
fn declared_decoder(marker: &[u8]) -> Option<Decoder> {
    let designation = marker.windows(3).find_map(|w| match w {
        [0x1B, b'-', final_byte] => Some(*final_byte),
        _ => None,
    });
    match designation {
        Some(b'A') => Some(Decoder::Latin1),
        Some(final_byte) => iso_8859_part(final_byte).map(Decoder::Other),
        // G0 ASCII only
        None if marker == b"\x1b(B" => Some(Decoder::Latin1),
        None => None,
    }
}

/// ISO-8859 right-hand parts by ISO 2022 `ESC -` final byte.
fn iso_8859_part(final_byte: u8) -> Option<&'static Encoding> {
    let encoding = match final_byte {
        b'B' => encoding_rs::ISO_8859_2,
        b'C' => encoding_rs::ISO_8859_3,
        b'D' => encoding_rs::ISO_8859_4,
        b'L' => encoding_rs::ISO_8859_5,
        b'G' => encoding_rs::ISO_8859_6,
        b'F' => encoding_rs::ISO_8859_7,
        b'H' => encoding_rs::ISO_8859_8,
        // ISO-8859-9 is decoded by its windows-1254 superset
        b'M' => encoding_rs::WINDOWS_1254,
        b'V' => encoding_rs::ISO_8859_10,
        b'T' => encoding_rs::WINDOWS_874,
        b'Y' => encoding_rs::ISO_8859_13,
        b'_' => encoding_rs::ISO_8859_14,
        b'b' => encoding_rs::ISO_8859_15,
        b'f' => encoding_rs::ISO_8859_16,
        _ => return None,
    };
    Some(encoding)
}

fn latin1_to_string(bytes: &[u8]) -> Cow<'_, str> {
    if bytes.is_ascii() {
        // ASCII is valid UTF-8, no copy needed
        return Cow::Borrowed(std::str::from_utf8(bytes).unwrap_or_default());
    }
    Cow::Owned(bytes.iter().map(|&b| b as char).collect())
}
