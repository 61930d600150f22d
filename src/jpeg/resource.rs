//! Photoshop image resource blocks.
//!
//! ```text
//! signature(4)  id(2)  name_len(1) name  [pad to even]  data_len(4)  data  [pad if odd]
//! ```

use std::ops::Range;

use crate::config::Options;
use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Prefix of every Photoshop APP13 payload.
pub const PHOTOSHOP_TAG: &[u8] = b"Photoshop 3.0\0";
/// Resource signature written by this crate.
pub const SIGNATURE: [u8; 4] = *b"8BIM";
/// Resource id of the IPTC-NAA record.
pub const IPTC_RESOURCE_ID: u16 = 0x0404;

/// Signatures found in the wild besides `8BIM`.
const OTHER_SIGNATURES: &[[u8; 4]] = &[*b"PHUT", *b"AgHg", *b"DCSR", *b"MeSa"];

/// One parsed resource block. Ranges index into the resource stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub signature: [u8; 4],
    pub id: u16,
    pub name: Vec<u8>,
    /// The whole block, trailing pad byte included.
    pub span: Range<usize>,
    /// The data bytes only.
    pub data: Range<usize>,
}

impl Block {
    pub fn is_iptc(&self) -> bool {
        self.signature == SIGNATURE && self.id == IPTC_RESOURCE_ID
    }
}

/// Split a resource stream into blocks.
///
/// Trailing zero padding ends the stream. When lenient, an unknown signature
/// or a truncated block stops parsing and the blocks read so far are kept.
pub fn parse_blocks(stream: &[u8], options: &Options) -> Result<Vec<Block>> {
    let mut cursor = Cursor::new(stream, "image resource");
    let mut blocks = Vec::new();

    while !cursor.is_empty() {
        if cursor.rest().iter().all(|&b| b == 0) {
            log::trace!("{} bytes of zero padding after resources", cursor.remaining());
            break;
        }
        match read_block(&mut cursor) {
            Ok(block) => {
                log::trace!(
                    "Resource {} {:#06x}: {} data bytes",
                    String::from_utf8_lossy(&block.signature),
                    block.id,
                    block.data.len()
                );
                blocks.push(block);
            }
            Err(e) if !options.strict => {
                log::warn!("Ignoring the rest of the image resources: {e}");
                break;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(blocks)
}

fn read_block(cursor: &mut Cursor<'_>) -> Result<Block> {
    let start = cursor.position();
    let signature = cursor.read_magic()?;
    if signature != SIGNATURE && !OTHER_SIGNATURES.contains(&signature) {
        return Err(Error::Malformed {
            offset: start,
            context: "image resource",
            message: format!(
                "unknown signature {:?}",
                String::from_utf8_lossy(&signature)
            ),
        });
    }

    let id = cursor.read_u16_be()?;
    let name_len = cursor.read_u8()?;
    let name = cursor.read_bytes(usize::from(name_len))?.to_vec();
    if name_len % 2 == 0 {
        cursor.skip(1)?;
    }

    let len = cursor.read_u32_be()? as usize;
    let data_start = cursor.position();
    cursor.read_bytes(len)?;
    // some writers drop the pad byte of the final block
    if len % 2 == 1 && !cursor.is_empty() {
        cursor.skip(1)?;
    }

    Ok(Block {
        signature,
        id,
        name,
        span: start..cursor.position(),
        data: data_start..data_start + len,
    })
}

/// Serialize one `8BIM` resource block.
pub fn build_block(id: u16, name: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let data_len = u32::try_from(data.len())
        .map_err(|_| Error::ResourceTooLarge { len: data.len() })?;
    let name = &name[..name.len().min(usize::from(u8::MAX))];

    let mut out = Vec::with_capacity(12 + name.len() + data.len() + 1);
    out.extend_from_slice(&SIGNATURE);
    out.extend_from_slice(&id.to_be_bytes());
    out.push(name.len() as u8);
    out.extend_from_slice(name);
    if name.len() % 2 == 0 {
        out.push(0);
    }
    out.extend_from_slice(&data_len.to_be_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
    Ok(out)
}

/// Serialize the IPTC-NAA block around an encoded IIM stream.
pub fn build_iptc_block(iim: &[u8]) -> Result<Vec<u8>> {
    build_block(IPTC_RESOURCE_ID, b"", iim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_padded_to_even() {
        let block = build_iptc_block(b"ab").unwrap();
        assert_eq!(block, b"8BIM\x04\x04\x00\x00\x00\x00\x00\x02ab");
    }

    #[test]
    fn odd_data_gets_a_pad_byte() {
        let block = build_iptc_block(b"abc").unwrap();
        assert_eq!(block.len(), 4 + 2 + 2 + 4 + 3 + 1);
        assert_eq!(block.last(), Some(&0));
    }

    #[test]
    fn odd_name_needs_no_pad() {
        let block = build_block(0x03ED, b"r", b"xy").unwrap();
        assert_eq!(&block[6..8], &[1, b'r']);
        assert_eq!(&block[8..12], &[0, 0, 0, 2]);
    }

    #[test]
    fn parse_what_we_build() {
        let mut stream = build_block(0x03ED, b"res", b"12345").unwrap();
        stream.extend(build_iptc_block(b"iim").unwrap());

        let blocks = parse_blocks(&stream, &Options::default()).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].id, 0x03ED);
        assert_eq!(blocks[0].name, b"res");
        assert_eq!(&stream[blocks[0].data.clone()], b"12345");
        assert!(!blocks[0].is_iptc());
        assert!(blocks[1].is_iptc());
        assert_eq!(&stream[blocks[1].data.clone()], b"iim");
        assert_eq!(blocks[1].span.end, stream.len());
        assert_eq!(blocks[0].span.end, blocks[1].span.start);
    }

    #[test]
    fn missing_final_pad_is_tolerated() {
        let mut stream = build_iptc_block(b"odd").unwrap();
        stream.pop();
        let blocks = parse_blocks(&stream, &Options::default()).unwrap();
        assert_eq!(&stream[blocks[0].data.clone()], b"odd");
    }

    #[test]
    fn zero_padding_ends_the_stream() {
        let mut stream = build_iptc_block(b"iim!").unwrap();
        stream.extend_from_slice(&[0; 6]);
        let blocks = parse_blocks(&stream, &Options::default()).unwrap();
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn unknown_signature_strict_and_lenient() {
        let mut stream = build_iptc_block(b"iim!").unwrap();
        stream.extend_from_slice(b"XXXX\x04\x04\x00\x00\x00\x00\x00\x00");

        let err = parse_blocks(&stream, &Options::default()).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));

        let blocks = parse_blocks(&stream, &Options::lenient()).unwrap();
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn truncated_block_strict_and_lenient() {
        let mut stream = build_block(0x03ED, b"", b"keep").unwrap();
        let iptc = build_iptc_block(b"0123456789").unwrap();
        stream.extend_from_slice(&iptc[..iptc.len() - 4]);

        let err = parse_blocks(&stream, &Options::default()).unwrap_err();
        assert!(err.is_end_of_data());

        let blocks = parse_blocks(&stream, &Options::lenient()).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].id, 0x03ED);
    }

    #[test]
    fn other_photoshop_signatures_are_accepted() {
        let mut stream = build_block(0x0BB7, b"", b"ph").unwrap();
        stream[..4].copy_from_slice(b"PHUT");
        let blocks = parse_blocks(&stream, &Options::default()).unwrap();
        assert_eq!(blocks[0].signature, *b"PHUT");
        assert!(!blocks[0].is_iptc());
    }
}
