use std::io;
use std::path::{Path, PathBuf};

use crate::config::Options;
use crate::error::Result;
use crate::iim::{Model, codec};
use crate::jpeg::{JpegParts, scan, writer};

/// IPTC metadata of one JPEG file, with everything needed to write it back.
///
/// ```rust,no_run
/// use iptc_info::IptcInfo;
///
/// let mut info = IptcInfo::open("photo.jpg", false)?;
/// println!("{:?}", info.model().keywords());
///
/// info.model_mut().set_text("caption", "Sunset over the harbour")?;
/// info.model_mut().push_text("keywords", "harbour")?;
/// info.save()?;
/// # Ok::<(), iptc_info::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct IptcInfo {
    path: Option<PathBuf>,
    options: Options,
    parts: JpegParts,
    model: Model,
}

impl IptcInfo {
    /// Read `path`. `force` selects the lenient mode, which recovers what it
    /// can from damaged metadata instead of failing.
    pub fn open(path: impl AsRef<Path>, force: bool) -> Result<Self> {
        Self::open_with(path, Options::from_force(force))
    }

    pub fn open_with(path: impl AsRef<Path>, options: Options) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading {}", path.display());
        let data = std::fs::read(path)?;
        let mut info = Self::from_bytes(&data, options)?;
        info.path = Some(path.to_path_buf());
        Ok(info)
    }

    /// Parse an in-memory file. The result has no path, so only
    /// [`IptcInfo::save_as`] and [`IptcInfo::to_bytes`] can write it.
    pub fn from_bytes(data: &[u8], options: Options) -> Result<Self> {
        let parts = scan(data, &options)?;
        let model = if parts.iptc.is_empty() {
            Model::new()
        } else {
            codec::decode(&parts.iptc, &options)?
        };
        if !parts.has_iptc() {
            log::debug!("No IPTC metadata found");
        }
        Ok(Self {
            path: None,
            options,
            parts,
            model,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn parts(&self) -> &JpegParts {
        &self.parts
    }

    /// Whether the file carried an IPTC resource when it was read.
    pub fn has_metadata(&self) -> bool {
        self.parts.has_iptc()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The complete new file with the current model written in.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let iim = codec::encode(&self.model)?;
        let segments = writer::build_app13_segments(&self.parts.retained_resources, &iim)?;
        Ok(writer::assemble(&self.parts, &segments))
    }

    /// Replace the file this session was opened from.
    pub fn save(&self) -> Result<()> {
        let path = self.path.as_deref().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "session was not opened from a file; use save_as",
            )
        })?;
        self.save_as(path)
    }

    /// Write the new file to `path`. The source file is not touched unless
    /// `path` names it.
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        writer::commit(path.as_ref(), &bytes)
    }
}
