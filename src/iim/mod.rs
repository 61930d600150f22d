//! IPTC-IIM datasets: registry, attribute model, charset policy and codec.
//!
//! - [`registry`] : the static table of known datasets
//! - [`Model`] : validated key/value container built from the registry
//! - [`codec`] : tagged-record stream decoding and encoding
//! - [`Charset`] : coded character set handling (1:90)

pub mod charset;
pub mod codec;
mod model;
pub mod registry;

pub use charset::Charset;
pub use model::{Key, Model, Value};
pub use registry::{Entry, Kind};

use std::fmt;

/// A dataset address: record number and dataset number.
///
/// Orders by record first, which is the order datasets are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    pub record: u8,
    pub dataset: u8,
}

impl Tag {
    pub const fn new(record: u8, dataset: u8) -> Self {
        Self { record, dataset }
    }

    /// A dataset in the application record (record 2).
    pub const fn application(dataset: u8) -> Self {
        Self::new(2, dataset)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.record, self.dataset)
    }
}

/// Envelope record: model version.
pub const MODEL_VERSION: Tag = Tag::new(1, 0);
/// Envelope record: coded character set.
pub const CODED_CHARACTER_SET: Tag = Tag::new(1, 90);
/// Application record: record version.
pub const RECORD_VERSION: Tag = Tag::new(2, 0);

/// Version number written into 1:00 and 2:00.
pub const IIM_VERSION: u16 = 4;
