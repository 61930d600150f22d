use thiserror::Error;

use crate::iim::Tag;

/// Errors produced while scanning, decoding, encoding or saving.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not a JPEG file: missing start-of-image marker")]
    NotJpeg,

    #[error(
        "unexpected end of data at offset {offset:#x} while reading {context} (need {needed} bytes, have {available})"
    )]
    EndOfData {
        offset: usize,
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("malformed {context} at offset {offset:#x}: {message}")]
    Malformed {
        offset: usize,
        context: &'static str,
        message: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("dataset {tag} holds {len} bytes, more than an extended length field can describe")]
    UnsupportedSize { tag: Tag, len: usize },

    #[error("image resource of {len} bytes does not fit a 32-bit length field")]
    ResourceTooLarge { len: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error came from data running out before a declared length.
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Error::EndOfData { .. })
    }
}

/// Rejected model mutation. The model is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown attribute {0:?}")]
    UnknownKey(String),

    #[error("{name} is repeatable and only accepts a sequence")]
    ExpectedSequence { name: &'static str },

    #[error("{name} is not repeatable and only accepts a single value")]
    ExpectedScalar { name: &'static str },

    #[error("{0} is managed by the codec and cannot be set")]
    Reserved(String),

    #[error("text declared as {0} cannot be converted to UTF-8; use raw byte values instead")]
    UndecodableCharset(String),
}

pub type Result<T> = std::result::Result<T, Error>;
