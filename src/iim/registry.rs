//! Static table of known IIM datasets.
//!
//! Covers the application record (record 2) as defined by IIM 4.2 plus the
//! common 2:221..=2:231 application extensions, and the envelope's coded
//! character set marker (1:90). Names are matched case-insensitively and
//! ignoring punctuation, so `"Caption-Abstract"`, `"caption/abstract"` and
//! `"CAPTION ABSTRACT"` all resolve to 2:120.

use super::{Key, Tag};

/// How a dataset's bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Character data, subject to the document charset.
    Text,
    /// Opaque bytes; never transcoded.
    Binary,
}

/// A registry entry describing one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub tag: Tag,
    /// Canonical lowercase name.
    pub name: &'static str,
    /// Whether the dataset may occur more than once.
    pub repeatable: bool,
    /// Maximum value length in bytes, if bounded.
    pub max_len: Option<usize>,
    pub kind: Kind,
}

const fn text(dataset: u8, name: &'static str, max: usize) -> Entry {
    Entry {
        tag: Tag::application(dataset),
        name,
        repeatable: false,
        max_len: Some(max),
        kind: Kind::Text,
    }
}

const fn list(dataset: u8, name: &'static str, max: usize) -> Entry {
    Entry {
        repeatable: true,
        ..text(dataset, name, max)
    }
}

const fn binary(dataset: u8, name: &'static str, max: usize) -> Entry {
    Entry {
        kind: Kind::Binary,
        ..text(dataset, name, max)
    }
}

static ENTRIES: &[Entry] = &[
    Entry {
        tag: super::CODED_CHARACTER_SET,
        name: "coded character set",
        repeatable: false,
        max_len: Some(32),
        kind: Kind::Binary,
    },
    text(3, "object type reference", 67),
    list(4, "object attribute reference", 68),
    text(5, "object name", 64),
    text(7, "edit status", 64),
    text(8, "editorial update", 2),
    text(10, "urgency", 1),
    list(12, "subject reference", 236),
    text(15, "category", 3),
    list(20, "supplemental category", 32),
    text(22, "fixture identifier", 32),
    list(25, "keywords", 64),
    list(26, "content location code", 3),
    list(27, "content location name", 64),
    text(30, "release date", 8),
    text(35, "release time", 11),
    text(37, "expiration date", 8),
    text(38, "expiration time", 11),
    text(40, "special instructions", 256),
    text(42, "action advised", 2),
    list(45, "reference service", 10),
    list(47, "reference date", 8),
    list(50, "reference number", 8),
    text(55, "date created", 8),
    text(60, "time created", 11),
    text(62, "digital creation date", 8),
    text(63, "digital creation time", 11),
    text(65, "originating program", 32),
    text(70, "program version", 10),
    text(75, "object cycle", 1),
    list(80, "by-line", 32),
    list(85, "by-line title", 32),
    text(90, "city", 32),
    text(92, "sub-location", 32),
    text(95, "province/state", 32),
    text(100, "country/primary location code", 3),
    text(101, "country/primary location name", 64),
    text(103, "original transmission reference", 32),
    text(105, "headline", 256),
    text(110, "credit", 32),
    text(115, "source", 32),
    text(116, "copyright notice", 128),
    list(118, "contact", 128),
    text(120, "caption/abstract", 2000),
    text(121, "local caption", 256),
    list(122, "writer/editor", 32),
    binary(125, "rasterized caption", 7360),
    text(130, "image type", 2),
    text(131, "image orientation", 1),
    text(135, "language identifier", 3),
    text(150, "audio type", 2),
    text(151, "audio sampling rate", 6),
    text(152, "audio sampling resolution", 2),
    text(153, "audio duration", 6),
    text(154, "audio outcue", 64),
    binary(200, "objectdata preview file format", 2),
    binary(201, "objectdata preview file format version", 2),
    binary(202, "objectdata preview data", 256_000),
    text(221, "prefs", 64),
    text(225, "classify state", 64),
    text(228, "similarity index", 32),
    text(230, "document notes", 1024),
    Entry {
        max_len: None,
        ..text(231, "document history", 0)
    },
];

/// Alternate spellings, already normalized.
static ALIASES: &[(&str, Tag)] = &[
    ("caption", Tag::application(120)),
    ("description", Tag::application(120)),
    ("contacts", Tag::application(118)),
    ("supplementalcategories", Tag::application(20)),
    ("keyword", Tag::application(25)),
    ("title", Tag::application(5)),
    ("author", Tag::application(80)),
    ("copyright", Tag::application(116)),
    ("charset", super::CODED_CHARACTER_SET),
];

/// Prefix of the escape spelling for uncatalogued record 2 datasets.
pub const NONSTANDARD_PREFIX: &str = "nonstandard_";

/// All known entries, in registry order.
pub fn entries() -> &'static [Entry] {
    ENTRIES
}

/// Look up an entry by dataset address.
pub fn by_tag(tag: Tag) -> Option<&'static Entry> {
    ENTRIES.iter().find(|e| e.tag == tag)
}

/// Look up an entry by canonical name or alias.
pub fn by_name(name: &str) -> Option<&'static Entry> {
    let wanted = normalize(name);
    if wanted.is_empty() {
        return None;
    }
    if let Some(entry) = ENTRIES.iter().find(|e| normalize(e.name) == wanted) {
        return Some(entry);
    }
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == wanted)
        .and_then(|(_, tag)| by_tag(*tag))
}

/// Resolve any key form to its registry entry.
///
/// Numeric ids address record 2. A `nonstandard_<id>` name resolves only if
/// `<id>` happens to be catalogued.
pub fn resolve(key: Key<'_>) -> Option<&'static Entry> {
    match key {
        Key::Id(id) => by_tag(Tag::application(id)),
        Key::Tag(tag) => by_tag(tag),
        Key::Name(name) => {
            by_name(name).or_else(|| nonstandard_id(name).and_then(|id| by_tag(Tag::application(id))))
        }
    }
}

/// Parse the `nonstandard_<id>` escape spelling.
pub fn nonstandard_id(name: &str) -> Option<u8> {
    let lower = name.trim().to_ascii_lowercase();
    lower.strip_prefix(NONSTANDARD_PREFIX)?.parse().ok()
}

/// Display name for a tag: the canonical name, or the escape spelling.
pub fn display_name(tag: Tag) -> String {
    match by_tag(tag) {
        Some(entry) => entry.name.to_string(),
        None if tag.record == 2 => format!("{NONSTANDARD_PREFIX}{}", tag.dataset),
        None => format!("{NONSTANDARD_PREFIX}{}_{}", tag.record, tag.dataset),
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tags_and_names_are_unique() {
        let mut tags = HashSet::new();
        let mut names = HashSet::new();
        for entry in entries() {
            assert!(tags.insert(entry.tag), "duplicate tag {}", entry.tag);
            assert!(names.insert(normalize(entry.name)), "duplicate name {}", entry.name);
        }
    }

    #[test]
    fn aliases_are_normalized_and_point_at_entries() {
        for (alias, tag) in ALIASES {
            assert!(by_tag(*tag).is_some(), "alias {alias} points nowhere");
            assert_eq!(normalize(alias), *alias);
        }
    }

    #[test]
    fn record_two_ids_are_in_range() {
        for entry in entries().iter().filter(|e| e.tag.record == 2) {
            assert!((1..=231).contains(&entry.tag.dataset));
        }
    }

    #[test]
    fn name_lookup_ignores_case_and_punctuation() {
        assert_eq!(by_name("Caption-Abstract").unwrap().tag, Tag::application(120));
        assert_eq!(by_name("caption/abstract").unwrap().tag, Tag::application(120));
        assert_eq!(by_name("KEYWORDS").unwrap().tag, Tag::application(25));
        assert_eq!(by_name("by-line title").unwrap().tag, Tag::application(85));
        assert_eq!(by_name("Province State").unwrap().tag, Tag::application(95));
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(by_name("caption").unwrap().tag, Tag::application(120));
        assert_eq!(by_name("Contacts").unwrap().tag, Tag::application(118));
        assert_eq!(by_name("supplemental categories").unwrap().tag, Tag::application(20));
        assert_eq!(by_name("charset").unwrap().tag, crate::iim::CODED_CHARACTER_SET);
    }

    #[test]
    fn unknown_names_miss() {
        assert!(by_name("favourite colour").is_none());
        assert!(by_name("").is_none());
        assert!(by_name("--").is_none());
    }

    #[test]
    fn resolve_by_every_key_form() {
        let by_id = resolve(Key::Id(25)).unwrap();
        let by_name = resolve(Key::Name("keywords")).unwrap();
        let by_tag = resolve(Key::Tag(Tag::new(2, 25))).unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_name, by_tag);
        assert!(by_id.repeatable);
        assert!(resolve(Key::Id(123)).is_none());
    }

    #[test]
    fn nonstandard_escape() {
        assert_eq!(nonstandard_id("nonstandard_123"), Some(123));
        assert_eq!(nonstandard_id("NonStandard_7"), Some(7));
        assert_eq!(nonstandard_id("nonstandard_300"), None);
        assert_eq!(nonstandard_id("nonstandard_"), None);
        assert_eq!(nonstandard_id("keywords"), None);
        // a catalogued id behind the escape resolves to the real entry
        assert_eq!(resolve(Key::Name("nonstandard_25")).unwrap().name, "keywords");
        assert!(resolve(Key::Name("nonstandard_123")).is_none());
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name(Tag::application(120)), "caption/abstract");
        assert_eq!(display_name(Tag::application(123)), "nonstandard_123");
        assert_eq!(display_name(Tag::new(1, 20)), "nonstandard_1_20");
    }

    #[test]
    fn repeatable_set_includes_the_list_fields() {
        for name in ["keywords", "supplemental category", "contact"] {
            assert!(by_name(name).unwrap().repeatable, "{name}");
        }
        for name in ["caption/abstract", "headline", "credit", "object name"] {
            assert!(!by_name(name).unwrap().repeatable, "{name}");
        }
    }
}
