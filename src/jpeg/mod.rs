//! JPEG container handling: segment scanning, Photoshop image resources,
//! and writing new APP13 segments back.

pub mod resource;
pub mod scanner;
pub mod writer;

pub use scanner::{JpegParts, scan};

pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const APP13: u8 = 0xED;

/// Whether `data` starts with the JPEG start-of-image marker.
pub fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, SOI])
}

/// Hand-built segments for unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::resource::PHOTOSHOP_TAG;
    use super::{APP13, EOI, SOI, SOS};

    /// A raw marker segment with a length field.
    pub fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0xFF, marker];
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    /// A Photoshop APP13 segment around a resource stream.
    pub fn app13(resources: &[u8]) -> Vec<u8> {
        segment(APP13, &[PHOTOSHOP_TAG, resources].concat())
    }

    /// SOI, `segments`, a DQT, then SOS, a little scan data and EOI.
    pub fn minimal_jpeg(segments: &[Vec<u8>]) -> Vec<u8> {
        let mut out = vec![0xFF, SOI];
        for s in segments {
            out.extend_from_slice(s);
        }
        out.extend(segment(0xDB, &[0; 65]));
        out.extend(segment(SOS, &[0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]));
        out.extend_from_slice(&[0x12, 0x34, 0xFF, 0x00, 0x56]);
        out.extend_from_slice(&[0xFF, EOI]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg_signature() {
        assert!(is_jpeg(&[0xFF, 0xD8]));
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0xFF]));
        assert!(!is_jpeg(&[]));
        assert!(!is_jpeg(b"\x89PNG\r\n\x1a\n"));
        assert!(!is_jpeg(&[0xD8, 0xFF]));
    }
}
