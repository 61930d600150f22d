use std::ops::Range;

use super::resource::{self, Block, PHOTOSHOP_TAG};
use super::{APP13, EOI, SOS};
use crate::config::Options;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::hex::hex_dump;

/// One JPEG file split around its IPTC metadata.
///
/// `prefix + region + suffix` is always the original file. Writing never
/// touches these buffers; it builds a new file from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JpegParts {
    /// Everything before the metadata region, starting with SOI.
    pub prefix: Vec<u8>,
    /// Original bytes from the first IPTC-bearing APP13 up to SOS.
    pub region: Vec<u8>,
    /// Raw non-Photoshop segments found inside the region, in order.
    pub pass_through: Vec<u8>,
    /// Raw non-IPTC resource blocks from the region's Photoshop segments.
    pub retained_resources: Vec<u8>,
    /// Concatenated data of every IPTC resource block.
    pub iptc: Vec<u8>,
    /// SOS (or EOI) to end of file.
    pub suffix: Vec<u8>,
}

impl JpegParts {
    /// Whether an IPTC resource was found.
    pub fn has_iptc(&self) -> bool {
        !self.region.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Segment {
    marker: u8,
    /// Offset of the first `FF`, fill bytes included.
    start: usize,
    payload: Range<usize>,
}

impl Segment {
    fn end(&self) -> usize {
        self.payload.end
    }
}

/// A Photoshop segment's share of the concatenated resource stream.
struct Chunk {
    segment: usize,
    stream_start: usize,
}

/// Split `data` into [`JpegParts`].
pub fn scan(data: &[u8], options: &Options) -> Result<JpegParts> {
    if !super::is_jpeg(data) {
        return Err(Error::NotJpeg);
    }

    let (segments, sos) = walk_segments(data, options)?;
    log::debug!("Found {} segment(s) before offset {sos:#x}", segments.len());

    let mut stream = Vec::new();
    let mut chunks = Vec::new();
    for (index, segment) in segments.iter().enumerate() {
        let payload = &data[segment.payload.clone()];
        if segment.marker == APP13 && payload.starts_with(PHOTOSHOP_TAG) {
            chunks.push(Chunk {
                segment: index,
                stream_start: stream.len(),
            });
            stream.extend_from_slice(&payload[PHOTOSHOP_TAG.len()..]);
        }
    }
    if chunks.is_empty() {
        log::debug!("No Photoshop APP13 segment");
        return Ok(without_iptc(data, sos));
    }
    if options.trace_hex {
        log::trace!(
            "Photoshop resources ({} bytes in {} segment(s)):\n{}",
            stream.len(),
            chunks.len(),
            hex_dump(&stream)
        );
    }

    let blocks = resource::parse_blocks(&stream, options)?;
    for block in blocks.iter().filter(|b| b.is_iptc() && b.data.is_empty()) {
        if options.strict {
            return Err(Error::Malformed {
                offset: block.span.start,
                context: "image resource",
                message: "IPTC resource block has no data".into(),
            });
        }
        log::warn!("Skipping empty IPTC resource block");
    }

    let Some(first_iptc) = blocks.iter().find(|b| b.is_iptc()) else {
        log::debug!("Photoshop resources carry no IPTC block");
        return Ok(without_iptc(data, sos));
    };

    let first_chunk = region_chunk(&chunks, &blocks, first_iptc);
    let region_start = segments[chunks[first_chunk].segment].start;
    let region_stream_start = chunks[first_chunk].stream_start;

    let mut parts = JpegParts {
        prefix: data[..region_start].to_vec(),
        region: data[region_start..sos].to_vec(),
        suffix: data[sos..].to_vec(),
        ..JpegParts::default()
    };

    for block in blocks.iter().filter(|b| b.span.start >= region_stream_start) {
        if block.is_iptc() {
            parts.iptc.extend_from_slice(&stream[block.data.clone()]);
        } else {
            parts
                .retained_resources
                .extend_from_slice(&stream[block.span.clone()]);
        }
    }
    for segment in segments.iter().filter(|s| s.start >= region_start) {
        let payload = &data[segment.payload.clone()];
        if segment.marker != APP13 || !payload.starts_with(PHOTOSHOP_TAG) {
            parts
                .pass_through
                .extend_from_slice(&data[segment.start..segment.end()]);
        }
    }

    log::debug!(
        "IPTC region {region_start:#x}..{sos:#x}: {} IIM bytes, {} retained resource bytes, {} pass-through bytes",
        parts.iptc.len(),
        parts.retained_resources.len(),
        parts.pass_through.len()
    );
    Ok(parts)
}

fn without_iptc(data: &[u8], sos: usize) -> JpegParts {
    JpegParts {
        prefix: data[..sos].to_vec(),
        suffix: data[sos..].to_vec(),
        ..JpegParts::default()
    }
}

/// Index of the chunk the region starts at: the one holding the first IPTC
/// block, moved back while an earlier block straddles into it.
fn region_chunk(chunks: &[Chunk], blocks: &[Block], first_iptc: &Block) -> usize {
    let owner = |offset: usize| {
        chunks
            .iter()
            .rposition(|c| c.stream_start <= offset)
            .unwrap_or(0)
    };

    let mut chunk = owner(first_iptc.span.start);
    loop {
        let boundary = chunks[chunk].stream_start;
        match blocks
            .iter()
            .find(|b| b.span.start < boundary && b.span.end > boundary)
        {
            Some(straddler) => chunk = owner(straddler.span.start),
            None => return chunk,
        }
    }
}

/// Walk marker segments from just after SOI. Returns the segments and the
/// offset where the suffix starts.
fn walk_segments(data: &[u8], options: &Options) -> Result<(Vec<Segment>, usize)> {
    let mut cursor = Cursor::at(data, 2, "JPEG segment");
    let mut segments = Vec::new();

    loop {
        let start = cursor.position();
        match read_segment(&mut cursor) {
            Ok(Some(segment)) => {
                log::trace!(
                    "Segment FF{:02X} at {start:#x}, {} payload bytes",
                    segment.marker,
                    segment.payload.len()
                );
                segments.push(segment);
            }
            Ok(None) => return Ok((segments, start)),
            Err(e) if !options.strict => {
                log::warn!("Treating the rest of the file as image data: {e}");
                return Ok((segments, start));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Read one segment. `Ok(None)` means SOS or EOI was reached.
fn read_segment(cursor: &mut Cursor<'_>) -> Result<Option<Segment>> {
    let start = cursor.position();
    let byte = cursor.read_u8()?;
    if byte != 0xFF {
        return Err(Error::Malformed {
            offset: start,
            context: "JPEG segment",
            message: format!("expected a marker, found {byte:#04x}"),
        });
    }
    let mut marker = cursor.read_u8()?;
    while marker == 0xFF {
        marker = cursor.read_u8()?;
    }

    match marker {
        SOS | EOI => Ok(None),
        0x01 | 0xD0..=0xD8 => {
            let at = cursor.position();
            Ok(Some(Segment {
                marker,
                start,
                payload: at..at,
            }))
        }
        _ => {
            let len_offset = cursor.position();
            let len = usize::from(cursor.read_u16_be()?);
            if len < 2 {
                return Err(Error::Malformed {
                    offset: len_offset,
                    context: "JPEG segment",
                    message: format!("FF{marker:02X} declares length {len}"),
                });
            }
            let payload_start = cursor.position();
            cursor.read_bytes(len - 2)?;
            Ok(Some(Segment {
                marker,
                start,
                payload: payload_start..cursor.position(),
            }))
        }
    }
}
