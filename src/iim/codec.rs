//! IIM tagged-record stream codec.
//!
//! Dataset layout:
//!
//! ```text
//! 0x1C  record(1)  dataset(1)  length(2)          value
//! 0x1C  record(1)  dataset(1)  0x80|n(2) len(n)   value   (extended form, n <= 4)
//! ```

use super::charset::Charset;
use super::model::{Model, Value};
use super::{CODED_CHARACTER_SET, IIM_VERSION, MODEL_VERSION, RECORD_VERSION, Tag};
use crate::config::Options;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::hex::hex_dump;

/// Start-of-dataset marker.
pub const TAG_MARKER: u8 = 0x1C;
/// Largest value that fits the short length form.
pub const MAX_SHORT_LEN: usize = 0x7FFF;
const EXTENDED_FLAG: u16 = 0x8000;
const MAX_LENGTH_BYTES: usize = 4;

/// Decode an IIM stream into a model.
///
/// In lenient mode a truncated or unparseable tail stops decoding and the
/// datasets read so far are returned.
pub fn decode(payload: &[u8], options: &Options) -> Result<Model> {
    if options.trace_hex {
        log::trace!("IIM stream ({} bytes):\n{}", payload.len(), hex_dump(payload));
    }

    let mut model = Model::new();
    model.set_charset(Charset::undeclared(options.input_charset));
    let mut cursor = Cursor::new(payload, "IIM dataset");

    while !cursor.is_empty() {
        match read_dataset(&mut cursor) {
            Ok(Some((tag, value))) => apply_dataset(&mut model, tag, value),
            Ok(None) => break,
            Err(e) if !options.strict => {
                log::warn!("Stopping IIM decode early: {e}");
                break;
            }
            Err(e) => return Err(e),
        }
    }

    log::debug!("Decoded {} IPTC attribute(s)", model.len());
    Ok(model)
}

/// Read one dataset. `Ok(None)` marks the end of the stream (zero padding).
fn read_dataset<'a>(cursor: &mut Cursor<'a>) -> Result<Option<(Tag, &'a [u8])>> {
    let offset = cursor.position();
    let marker = cursor.peek_u8()?;
    if marker != TAG_MARKER {
        if cursor.rest().iter().all(|&b| b == 0) {
            return Ok(None);
        }
        return Err(Error::Malformed {
            offset,
            context: "IIM dataset",
            message: format!("expected tag marker 0x1C, found {marker:#04x}"),
        });
    }
    cursor.skip(1)?;
    let record = cursor.read_u8()?;
    let dataset = cursor.read_u8()?;
    let tag = Tag::new(record, dataset);

    let len = read_length(cursor, tag)?;
    let value = cursor.read_bytes(len)?;
    log::trace!("Dataset {tag}: {len} bytes at {offset:#x}");
    Ok(Some((tag, value)))
}

fn read_length(cursor: &mut Cursor<'_>, tag: Tag) -> Result<usize> {
    let offset = cursor.position();
    let short = cursor.read_u16_be()?;
    if short & EXTENDED_FLAG == 0 {
        return Ok(usize::from(short));
    }

    let count = usize::from(short & !EXTENDED_FLAG);
    if count == 0 || count > MAX_LENGTH_BYTES {
        return Err(Error::Malformed {
            offset,
            context: "IIM extended length",
            message: format!("dataset {tag} declares {count} length bytes"),
        });
    }
    let bytes = cursor.read_bytes(count)?;
    let len = bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    usize::try_from(len).map_err(|_| Error::UnsupportedSize {
        tag,
        len: usize::MAX,
    })
}

fn apply_dataset(model: &mut Model, tag: Tag, value: &[u8]) {
    match tag {
        MODEL_VERSION | RECORD_VERSION => {
            log::trace!("Skipping structural dataset {tag}");
        }
        CODED_CHARACTER_SET => {
            let charset = Charset::from_marker(value);
            log::debug!("Coded character set: {charset:?}");
            model.set_charset(charset);
        }
        _ => model.insert_decoded(tag, value.to_vec()),
    }
}

/// Encode a model as an IIM stream.
///
/// Order: 1:00, 1:90 (when a charset is declared), remaining envelope
/// datasets, 2:00, then every other dataset by ascending tag. Fails with
/// [`Error::UnsupportedSize`] before producing output if any value is too
/// long for the extended length form.
pub fn encode(model: &Model) -> Result<Vec<u8>> {
    for (tag, value) in model.iter() {
        if let Some(len) = value.items().map(<[u8]>::len).find(|&len| !fits_extended(len)) {
            return Err(Error::UnsupportedSize { tag, len });
        }
    }

    let mut out = Vec::new();
    let version = IIM_VERSION.to_be_bytes();
    write_dataset(&mut out, MODEL_VERSION, &version);
    if let Some(marker) = model.charset().marker() {
        write_dataset(&mut out, CODED_CHARACTER_SET, marker);
    }

    let mut record_version_written = false;
    for (tag, value) in model.iter() {
        if tag.record >= RECORD_VERSION.record && !record_version_written {
            write_dataset(&mut out, RECORD_VERSION, &version);
            record_version_written = true;
        }
        match value {
            Value::Scalar(bytes) => write_dataset(&mut out, tag, bytes),
            Value::Sequence(items) => {
                for bytes in items {
                    write_dataset(&mut out, tag, bytes);
                }
            }
        }
    }
    if !record_version_written {
        write_dataset(&mut out, RECORD_VERSION, &version);
    }

    Ok(out)
}

fn fits_extended(len: usize) -> bool {
    u32::try_from(len).is_ok()
}

fn write_dataset(out: &mut Vec<u8>, tag: Tag, value: &[u8]) {
    out.extend_from_slice(&[TAG_MARKER, tag.record, tag.dataset]);
    if value.len() <= MAX_SHORT_LEN {
        out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    } else {
        out.extend_from_slice(&(EXTENDED_FLAG | MAX_LENGTH_BYTES as u16).to_be_bytes());
        out.extend_from_slice(&(value.len() as u32).to_be_bytes());
    }
    out.extend_from_slice(value);
}
