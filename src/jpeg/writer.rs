use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::APP13;
use super::resource::{PHOTOSHOP_TAG, build_iptc_block};
use super::scanner::JpegParts;
use crate::error::Result;

/// Largest segment payload: the 16-bit length field counts itself.
pub const MAX_SEGMENT_PAYLOAD: usize = u16::MAX as usize - 2;

/// Resource bytes that fit in one segment after the Photoshop tag.
const RESOURCE_BYTES_PER_SEGMENT: usize = MAX_SEGMENT_PAYLOAD - PHOTOSHOP_TAG.len();

/// Build the APP13 segment(s) carrying `retained` resources followed by an
/// IPTC block around `iim`.
///
/// Payloads that do not fit one segment are split across consecutive
/// segments, each starting with the Photoshop tag.
pub fn build_app13_segments(retained: &[u8], iim: &[u8]) -> Result<Vec<u8>> {
    let mut resources = Vec::with_capacity(retained.len() + iim.len() + 16);
    resources.extend_from_slice(retained);
    resources.extend_from_slice(&build_iptc_block(iim)?);

    let count = resources.len().div_ceil(RESOURCE_BYTES_PER_SEGMENT);
    let mut out = Vec::with_capacity(resources.len() + count * (4 + PHOTOSHOP_TAG.len()));
    for chunk in resources.chunks(RESOURCE_BYTES_PER_SEGMENT) {
        let len = (2 + PHOTOSHOP_TAG.len() + chunk.len()) as u16;
        out.extend_from_slice(&[0xFF, APP13]);
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(PHOTOSHOP_TAG);
        out.extend_from_slice(chunk);
    }
    if count > 1 {
        log::debug!("IPTC resources split across {count} APP13 segments");
    }
    Ok(out)
}

/// Lay out a new file: prefix, new APP13 segment(s), pass-through, suffix.
pub fn assemble(parts: &JpegParts, segments: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        parts.prefix.len() + segments.len() + parts.pass_through.len() + parts.suffix.len(),
    );
    out.extend_from_slice(&parts.prefix);
    out.extend_from_slice(segments);
    out.extend_from_slice(&parts.pass_through);
    out.extend_from_slice(&parts.suffix);
    out
}

/// Replace `path` with `bytes` through a temporary file in the same
/// directory. The original is untouched if anything fails.
pub fn commit(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    if let Ok(metadata) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }
    tmp.persist(path).map_err(|e| e.error)?;

    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
