use std::collections::BTreeMap;
use std::fmt;

use super::charset::Charset;
use super::registry::{self, Entry, Kind};
use super::{CODED_CHARACTER_SET, MODEL_VERSION, RECORD_VERSION, Tag};
use crate::error::{Result, ValidationError};

/// A way of naming an attribute.
///
/// Numeric ids address the application record (record 2). Names are the
/// registry's canonical names or aliases, or the `nonstandard_<id>` escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    Id(u8),
    Name(&'a str),
    Tag(Tag),
}

impl From<u8> for Key<'_> {
    fn from(id: u8) -> Self {
        Key::Id(id)
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(name: &'a str) -> Self {
        Key::Name(name)
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(name: &'a String) -> Self {
        Key::Name(name)
    }
}

impl From<Tag> for Key<'_> {
    fn from(tag: Tag) -> Self {
        Key::Tag(tag)
    }
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Id(id) => write!(f, "{id}"),
            Key::Name(name) => f.write_str(name),
            Key::Tag(tag) => write!(f, "{tag}"),
        }
    }
}

/// A stored attribute value. Bytes are kept exactly as read or assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Value of a non-repeatable dataset.
    Scalar(Vec<u8>),
    /// Values of a repeatable dataset, in file order.
    Sequence(Vec<Vec<u8>>),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&[u8]> {
        match self {
            Value::Scalar(bytes) => Some(bytes),
            Value::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Vec<u8>]> {
        match self {
            Value::Scalar(_) => None,
            Value::Sequence(items) => Some(items),
        }
    }

    /// Every stored byte string: one for a scalar, each element for a sequence.
    pub fn items(&self) -> impl Iterator<Item = &[u8]> {
        let items: &[Vec<u8>] = match self {
            Value::Scalar(bytes) => std::slice::from_ref(bytes),
            Value::Sequence(items) => items,
        };
        items.iter().map(Vec::as_slice)
    }

    fn items_mut(&mut self) -> impl Iterator<Item = &mut Vec<u8>> {
        let items: &mut [Vec<u8>] = match self {
            Value::Scalar(bytes) => std::slice::from_mut(bytes),
            Value::Sequence(items) => items,
        };
        items.iter_mut()
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Scalar(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Scalar(bytes.to_vec())
    }
}

impl From<Vec<Vec<u8>>> for Value {
    fn from(items: Vec<Vec<u8>>) -> Self {
        Value::Sequence(items)
    }
}

/// Where a write lands: a catalogued entry, or a verbatim uncatalogued tag.
#[derive(Clone, Copy)]
enum Slot {
    Known(&'static Entry),
    Free(Tag),
}

impl Slot {
    fn tag(self) -> Tag {
        match self {
            Slot::Known(entry) => entry.tag,
            Slot::Free(tag) => tag,
        }
    }
}

/// The IPTC attributes of one document.
///
/// Every key form (`25u8`, `"keywords"`, `"Keywords"`, `Tag::new(2, 25)`)
/// reaches the same slot. Mutations are validated against the registry at
/// [`Model::set`]; a rejected mutation leaves the model untouched.
///
/// ```rust
/// use iptc_info::iim::{Model, Value};
///
/// let mut model = Model::new();
/// model.set_texts("keywords", &["lenna", "test"]).unwrap();
/// model.set_text("caption/abstract", "I am a caption").unwrap();
///
/// assert_eq!(model.keywords(), vec!["lenna", "test"]);
/// assert_eq!(model.text(120u8).as_deref(), Some("I am a caption"));
/// assert!(model.set("keywords", Value::Scalar(b"bare".to_vec())).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    values: BTreeMap<Tag, Value>,
    charset: Charset,
    /// 1:90 as a value, kept in step with `charset`.
    declaration: Option<Value>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// The charset stored values are encoded in.
    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    /// Replace the charset, returning the previous one. Stored bytes are not
    /// touched.
    pub(crate) fn set_charset(&mut self, charset: Charset) -> Charset {
        self.declaration = charset.marker().map(|m| Value::Scalar(m.to_vec()));
        std::mem::replace(&mut self.charset, charset)
    }

    /// Number of populated attributes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Populated attributes in ascending tag order.
    pub fn iter(&self) -> impl Iterator<Item = (Tag, &Value)> {
        self.values.iter().map(|(tag, value)| (*tag, value))
    }

    /// Look up an attribute. The coded character set (1:90) reads back the
    /// document's charset declaration, if any.
    pub fn get<'k>(&self, key: impl Into<Key<'k>>) -> Option<&Value> {
        let tag = lookup_tag(key.into())?;
        if tag == CODED_CHARACTER_SET {
            return self.declaration.as_ref();
        }
        self.values.get(&tag)
    }

    pub fn contains<'k>(&self, key: impl Into<Key<'k>>) -> bool {
        self.get(key).is_some()
    }

    /// Remove an attribute, returning its previous value. Reserved datasets
    /// are never removed.
    pub fn delete<'k>(&mut self, key: impl Into<Key<'k>>) -> Option<Value> {
        let tag = lookup_tag(key.into())?;
        self.values.remove(&tag)
    }

    /// Store raw bytes under `key`.
    ///
    /// Repeatable attributes only accept [`Value::Sequence`] and the others
    /// only [`Value::Scalar`]. Uncatalogued datasets take either, but a
    /// one-element sequence is stored as a scalar, the shape it reads back as.
    /// An empty sequence clears the attribute. The charset is left alone: the
    /// bytes are taken to already be in it.
    pub fn set<'k>(&mut self, key: impl Into<Key<'k>>, value: Value) -> Result<()> {
        let slot = resolve_for_write(key.into())?;
        validate(slot, &value)?;
        self.store(slot, value);
        Ok(())
    }

    /// Decode a scalar attribute with the document charset.
    pub fn text<'k>(&self, key: impl Into<Key<'k>>) -> Option<String> {
        let bytes = self.get(key)?.as_scalar()?;
        Some(self.charset.decode(bytes).into_owned())
    }

    /// Decode every stored value of an attribute with the document charset.
    pub fn texts<'k>(&self, key: impl Into<Key<'k>>) -> Vec<String> {
        self.get(key)
            .map(|value| {
                value
                    .items()
                    .map(|bytes| self.charset.decode(bytes).into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set a non-repeatable attribute from text. Switches the document to UTF-8.
    ///
    /// Fails with [`ValidationError::UndecodableCharset`] when the document
    /// declares a charset whose stored text cannot be converted.
    pub fn set_text<'k>(&mut self, key: impl Into<Key<'k>>, text: &str) -> Result<()> {
        let slot = resolve_for_write(key.into())?;
        let value = Value::Scalar(text.as_bytes().to_vec());
        validate(slot, &value)?;
        self.promote_to_utf8()?;
        self.store(slot, value);
        Ok(())
    }

    /// Set a repeatable attribute from text. Switches the document to UTF-8.
    pub fn set_texts<'k, S: AsRef<str>>(
        &mut self,
        key: impl Into<Key<'k>>,
        texts: &[S],
    ) -> Result<()> {
        let slot = resolve_for_write(key.into())?;
        let value = Value::Sequence(
            texts
                .iter()
                .map(|t| t.as_ref().as_bytes().to_vec())
                .collect(),
        );
        validate(slot, &value)?;
        self.promote_to_utf8()?;
        self.store(slot, value);
        Ok(())
    }

    /// Append one text value to a repeatable attribute.
    pub fn push_text<'k>(&mut self, key: impl Into<Key<'k>>, text: &str) -> Result<()> {
        let slot = resolve_for_write(key.into())?;
        if let Slot::Known(entry) = slot {
            if !entry.repeatable {
                return Err(ValidationError::ExpectedScalar { name: entry.name }.into());
            }
        }
        self.promote_to_utf8()?;
        self.append(slot.tag(), text.as_bytes().to_vec());
        Ok(())
    }

    /// Keywords (2:25) as text.
    pub fn keywords(&self) -> Vec<String> {
        self.texts(Key::Id(25))
    }

    /// Supplemental categories (2:20) as text.
    pub fn supplemental_categories(&self) -> Vec<String> {
        self.texts(Key::Id(20))
    }

    /// Contacts (2:118) as text.
    pub fn contacts(&self) -> Vec<String> {
        self.texts(Key::Id(118))
    }

    /// Record a dataset read from a file.
    ///
    /// Repeatable and uncatalogued datasets accumulate in file order; a
    /// repeated non-repeatable dataset keeps the last occurrence.
    pub(crate) fn insert_decoded(&mut self, tag: Tag, bytes: Vec<u8>) {
        match registry::by_tag(tag) {
            Some(entry) if entry.repeatable => self.append(tag, bytes),
            Some(entry) => {
                if self.values.insert(tag, Value::Scalar(bytes)).is_some() {
                    log::warn!("Dataset {tag} ({}) repeated; keeping the last value", entry.name);
                }
            }
            None => self.append(tag, bytes),
        }
    }

    fn append(&mut self, tag: Tag, bytes: Vec<u8>) {
        let repeatable = registry::by_tag(tag).is_some_and(|e| e.repeatable);
        match self.values.remove(&tag) {
            None if repeatable => {
                self.values.insert(tag, Value::Sequence(vec![bytes]));
            }
            None => {
                self.values.insert(tag, Value::Scalar(bytes));
            }
            Some(Value::Scalar(first)) => {
                self.values.insert(tag, Value::Sequence(vec![first, bytes]));
            }
            Some(Value::Sequence(mut items)) => {
                items.push(bytes);
                self.values.insert(tag, Value::Sequence(items));
            }
        }
    }

    fn store(&mut self, slot: Slot, value: Value) {
        if let Slot::Known(entry) = slot {
            if let Some(max) = entry.max_len {
                if value.items().any(|bytes| bytes.len() > max) {
                    log::warn!(
                        "{} ({}) exceeds its {max}-byte limit; storing anyway",
                        entry.name,
                        entry.tag
                    );
                }
            }
        }
        let tag = slot.tag();
        let value = match value {
            Value::Sequence(mut items) if matches!(slot, Slot::Free(_)) && items.len() == 1 => {
                Value::Scalar(items.swap_remove(0))
            }
            value => value,
        };
        match value {
            Value::Sequence(items) if items.is_empty() => {
                self.values.remove(&tag);
            }
            value => {
                self.values.insert(tag, value);
            }
        }
    }

    /// Re-encode all stored text as UTF-8 and declare UTF-8.
    ///
    /// Uncatalogued values count as text unless they hold control bytes.
    fn promote_to_utf8(&mut self) -> std::result::Result<(), ValidationError> {
        if self.charset.is_utf8() {
            return Ok(());
        }
        if !self.charset.is_decodable() {
            return Err(ValidationError::UndecodableCharset(self.charset.to_string()));
        }
        log::debug!("Text edit: transcoding stored text from {} to UTF-8", self.charset);
        let from = self.set_charset(Charset::Utf8);
        for (tag, value) in self.values.iter_mut() {
            let is_text = match registry::by_tag(*tag) {
                Some(entry) => entry.kind == Kind::Text,
                None => value.items().all(looks_like_text),
            };
            if !is_text {
                log::debug!("Leaving {tag} as stored bytes");
                continue;
            }
            for bytes in value.items_mut() {
                *bytes = from.transcode_to_utf8(bytes);
            }
        }
        Ok(())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "charset: {}", self.charset)?;
        for (tag, value) in self.iter() {
            let binary = registry::by_tag(tag).is_some_and(|e| e.kind == Kind::Binary);
            let rendered: Vec<String> = value
                .items()
                .map(|bytes| {
                    if binary {
                        format!("<{} bytes>", bytes.len())
                    } else {
                        format!("{:?}", self.charset.decode(bytes))
                    }
                })
                .collect();
            match value {
                Value::Scalar(_) => writeln!(
                    f,
                    "{} ({tag}): {}",
                    registry::display_name(tag),
                    rendered.join("")
                )?,
                Value::Sequence(_) => writeln!(
                    f,
                    "{} ({tag}): [{}]",
                    registry::display_name(tag),
                    rendered.join(", ")
                )?,
            }
        }
        Ok(())
    }
}

fn looks_like_text(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|&b| b >= 0x20 || matches!(b, b'\t' | b'\n' | b'\r'))
}

/// Map a key to its storage slot for reads. Never fails: unknown keys miss.
fn lookup_tag(key: Key<'_>) -> Option<Tag> {
    match key {
        Key::Id(id) => Some(Tag::application(id)),
        Key::Tag(tag) => Some(tag),
        Key::Name(name) => registry::by_name(name)
            .map(|e| e.tag)
            .or_else(|| registry::nonstandard_id(name).map(Tag::application)),
    }
}

fn resolve_for_write(key: Key<'_>) -> std::result::Result<Slot, ValidationError> {
    let slot = match key {
        Key::Id(id) => registry::by_tag(Tag::application(id))
            .map(Slot::Known)
            .ok_or_else(|| ValidationError::UnknownKey(id.to_string()))?,
        Key::Tag(tag) => registry::by_tag(tag).map_or(Slot::Free(tag), Slot::Known),
        Key::Name(name) => match registry::by_name(name) {
            Some(entry) => Slot::Known(entry),
            None => {
                let id = registry::nonstandard_id(name)
                    .ok_or_else(|| ValidationError::UnknownKey(name.to_string()))?;
                let tag = Tag::application(id);
                registry::by_tag(tag).map_or(Slot::Free(tag), Slot::Known)
            }
        },
    };
    let tag = slot.tag();
    if tag == CODED_CHARACTER_SET || tag == MODEL_VERSION || tag == RECORD_VERSION {
        return Err(ValidationError::Reserved(registry::display_name(tag)));
    }
    Ok(slot)
}

fn validate(slot: Slot, value: &Value) -> std::result::Result<(), ValidationError> {
    let Slot::Known(entry) = slot else {
        return Ok(());
    };
    match value {
        Value::Scalar(_) if entry.repeatable => {
            Err(ValidationError::ExpectedSequence { name: entry.name })
        }
        Value::Sequence(_) if !entry.repeatable => {
            Err(ValidationError::ExpectedScalar { name: entry.name })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn seq(items: &[&str]) -> Value {
        Value::Sequence(items.iter().map(|s| s.as_bytes().to_vec()).collect())
    }

    #[test]
    fn id_and_name_reach_the_same_slot() {
        let mut model = Model::new();
        model.set("Caption/Abstract", b"hello".to_vec().into()).unwrap();
        assert_eq!(model.get(120u8), model.get("caption"));
        assert!(model.contains(Tag::application(120)));
        assert!(model.contains("CAPTION-ABSTRACT"));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn repeatable_rejects_scalar() {
        let mut model = Model::new();
        let err = model.set("keywords", b"one".to_vec().into()).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::ExpectedSequence { name: "keywords" })
        ));
        assert!(model.is_empty());
    }

    #[test]
    fn singular_rejects_sequence() {
        let mut model = Model::new();
        let err = model.set("headline", seq(&["a", "b"])).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::ExpectedScalar { name: "headline" })
        ));
    }

    #[test]
    fn one_element_sequence_stays_a_sequence() {
        let mut model = Model::new();
        model.set("supplemental category", seq(&["only"])).unwrap();
        assert_eq!(
            model.get(20u8),
            Some(&Value::Sequence(vec![b"only".to_vec()]))
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut model = Model::new();
        let err = model.set("favourite colour", b"x".to_vec().into()).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::UnknownKey(_))));
        let err = model.set(123u8, b"x".to_vec().into()).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::UnknownKey(_))));
    }

    #[test]
    fn nonstandard_escape_stores_verbatim() {
        let mut model = Model::new();
        model.set("nonstandard_123", b"n123".to_vec().into()).unwrap();
        // no cardinality rule for uncatalogued ids
        model.set("nonstandard_124", seq(&["a", "b"])).unwrap();

        assert_eq!(model.get(123u8).and_then(Value::as_scalar), Some(&b"n123"[..]));
        assert!(model.contains("nonstandard_124"));
        assert!(model.contains(Tag::application(124)));
    }

    #[test]
    fn nonstandard_escape_for_catalogued_id_is_validated() {
        let mut model = Model::new();
        assert!(model.set("nonstandard_25", b"x".to_vec().into()).is_err());
        model.set("nonstandard_25", seq(&["x"])).unwrap();
        assert_eq!(model.keywords(), vec!["x"]);
    }

    #[test]
    fn reserved_datasets_cannot_be_set() {
        let mut model = Model::new();
        for key in [
            Key::Name("coded character set"),
            Key::Tag(RECORD_VERSION),
            Key::Tag(MODEL_VERSION),
            Key::Name("nonstandard_0"),
        ] {
            let err = model.set(key, b"x".to_vec().into()).unwrap_err();
            assert!(matches!(err, Error::Validation(ValidationError::Reserved(_))), "{key}");
        }
    }

    #[test]
    fn empty_sequence_clears() {
        let mut model = Model::new();
        model.set_texts("keywords", &["a"]).unwrap();
        model.set("keywords", Value::Sequence(Vec::new())).unwrap();
        assert!(!model.contains("keywords"));
        assert!(model.is_empty());
    }

    #[test]
    fn delete_by_any_form() {
        let mut model = Model::new();
        model.set_text("headline", "Big news").unwrap();
        assert!(model.delete("HEADLINE").is_some());
        assert!(model.delete(105u8).is_none());
        assert!(model.delete("no such thing").is_none());
    }

    #[test]
    fn failed_text_set_keeps_charset_and_values() {
        let mut model = Model::new();
        model.set("caption", b"caf\xe9".to_vec().into()).unwrap();
        assert!(model.set_text("keywords", "scalar").is_err());
        assert_eq!(model.charset(), &Charset::Legacy);
        assert_eq!(model.get("caption").and_then(Value::as_scalar), Some(&b"caf\xe9"[..]));
    }

    #[test]
    fn text_edit_promotes_to_utf8() {
        let mut model = Model::new();
        model.set("caption", b"caf\xe9".to_vec().into()).unwrap();
        model.set("rasterized caption", vec![0xe9u8, 0x00].into()).unwrap();
        model.set_text("headline", "tükör").unwrap();

        assert_eq!(model.charset(), &Charset::Utf8);
        assert_eq!(model.get("caption").and_then(Value::as_scalar), Some("café".as_bytes()));
        assert_eq!(model.text("headline").as_deref(), Some("tükör"));
        // binary values are not touched
        assert_eq!(
            model.get("rasterized caption").and_then(Value::as_scalar),
            Some(&[0xe9, 0x00][..])
        );
    }

    #[test]
    fn raw_set_keeps_charset() {
        let mut model = Model::new();
        model.set("caption", b"abc".to_vec().into()).unwrap();
        assert_eq!(model.charset(), &Charset::Legacy);
    }

    #[test]
    fn push_text_appends() {
        let mut model = Model::new();
        model.push_text("keywords", "a").unwrap();
        model.push_text("keywords", "b").unwrap();
        assert_eq!(model.keywords(), vec!["a", "b"]);
        assert!(model.push_text("headline", "x").is_err());
    }

    #[test]
    fn decoded_datasets_accumulate() {
        let mut model = Model::new();
        model.insert_decoded(Tag::application(25), b"one".to_vec());
        model.insert_decoded(Tag::application(25), b"two".to_vec());
        model.insert_decoded(Tag::application(105), b"first".to_vec());
        model.insert_decoded(Tag::application(105), b"second".to_vec());
        model.insert_decoded(Tag::application(199), b"x".to_vec());
        model.insert_decoded(Tag::application(199), b"y".to_vec());

        assert_eq!(model.keywords(), vec!["one", "two"]);
        assert_eq!(model.text("headline").as_deref(), Some("second"));
        assert_eq!(model.texts("nonstandard_199"), vec!["x", "y"]);
    }

    #[test]
    fn single_decoded_keyword_is_a_sequence() {
        let mut model = Model::new();
        model.insert_decoded(Tag::application(25), b"solo".to_vec());
        assert!(model.get("keywords").unwrap().as_sequence().is_some());
    }

    #[test]
    fn display_lists_attributes() {
        let mut model = Model::new();
        model.set_texts("keywords", &["lenna", "test"]).unwrap();
        model.set_text("caption", "I am a caption").unwrap();
        let shown = model.to_string();
        assert!(shown.contains("keywords (2:25): [\"lenna\", \"test\"]"));
        assert!(shown.contains("caption/abstract (2:120): \"I am a caption\""));
    }

    #[test]
    fn free_one_element_sequence_is_stored_as_scalar() {
        let mut model = Model::new();
        model.set("nonstandard_199", seq(&["only"])).unwrap();
        assert_eq!(
            model.get("nonstandard_199"),
            Some(&Value::Scalar(b"only".to_vec()))
        );

        model.set_texts("nonstandard_198", &["a"]).unwrap();
        assert_eq!(model.get(Tag::application(198)), Some(&Value::Scalar(b"a".to_vec())));
        // catalogued repeatable slots keep their sequence shape
        model.set_texts("keywords", &["a"]).unwrap();
        assert!(model.get("keywords").unwrap().as_sequence().is_some());
    }

    #[test]
    fn undecodable_charset_refuses_text_edits() {
        let mut model = Model::new();
        model.set_charset(Charset::from_marker(b"\x1b$B"));
        model.insert_decoded(Tag::application(120), b"\x30\x21".to_vec());

        let err = model.set_text("headline", "x").unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::UndecodableCharset(_))
        ));
        assert!(model.push_text("keywords", "x").is_err());
        assert_eq!(model.charset(), &Charset::Declared(b"\x1b$B".to_vec()));
        assert!(!model.contains("headline"));

        // raw bytes are still accepted
        model.set("headline", b"raw".to_vec().into()).unwrap();
        assert_eq!(model.get("headline").and_then(Value::as_scalar), Some(&b"raw"[..]));
    }

    #[test]
    fn promotion_transcodes_textual_free_slots() {
        let mut model = Model::new();
        model.insert_decoded(Tag::application(199), b"caf\xe9".to_vec());
        model.insert_decoded(Tag::new(7, 10), vec![0x00, 0xe9]);
        model.set_text("headline", "x").unwrap();

        assert_eq!(model.text("nonstandard_199").as_deref(), Some("café"));
        assert_eq!(
            model.get(Tag::new(7, 10)).and_then(Value::as_scalar),
            Some(&[0x00, 0xe9][..])
        );
    }

    #[test]
    fn charset_reads_back_through_the_registry() {
        let mut model = Model::new();
        assert!(model.get("charset").is_none());

        model.set_charset(Charset::from_marker(b"\x1b-B"));
        assert_eq!(model.get("charset"), Some(&Value::Scalar(b"\x1b-B".to_vec())));
        assert_eq!(model.get("coded character set"), model.get("charset"));

        model.set_text("headline", "x").unwrap();
        assert_eq!(
            model.get(CODED_CHARACTER_SET).and_then(Value::as_scalar),
            Some(crate::iim::charset::UTF8_MARKER)
        );
        // attribute count and iteration cover stored attributes only
        assert_eq!(model.len(), 1);
        assert!(model.delete("charset").is_none());
        assert!(model.contains("charset"));
    }
}
