use anyhow::{Context, Result, bail};
use serde_json::{Map, Value as JsonValue};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::iim::{Key, Kind, Model, Value, registry};
use crate::info::IptcInfo;

/// Extensions of files the pipeline will touch.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Attribute edits applied to every file of a batch.
///
/// Order of application: `clear`, then `set`, then `add`.
///
/// # Example
///
/// ```rust
/// use iptc_info::pipeline::EditSet;
///
/// let mut edits = EditSet::default();
/// edits.set.push(EditSet::parse_assignment("headline=Storm warning").unwrap());
/// edits.add.push(EditSet::parse_assignment("keywords = weather").unwrap());
/// edits.clear.push("special instructions".into());
/// assert!(!edits.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSet {
    /// Replace an attribute. A repeatable attribute ends up with one value.
    pub set: Vec<(String, String)>,
    /// Append to a repeatable attribute.
    pub add: Vec<(String, String)>,
    /// Remove attributes.
    pub clear: Vec<String>,
}

impl EditSet {
    /// Parse `NAME=VALUE`. Whitespace around the name is ignored; the value
    /// is kept as given apart from a single leading space after `=`.
    pub fn parse_assignment(input: &str) -> Result<(String, String)> {
        let Some((name, value)) = input.split_once('=') else {
            bail!("expected NAME=VALUE, got {input:?}");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("missing attribute name in {input:?}");
        }
        let value = value.strip_prefix(' ').unwrap_or(value);
        Ok((name.to_string(), value.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.add.is_empty() && self.clear.is_empty()
    }
}

/// The outcome of editing one file.
#[derive(Debug, Default)]
pub struct ProcessResult {
    pub path: PathBuf,
    /// Whether the file carried IPTC metadata before editing.
    pub had_metadata: bool,
    /// Attribute names that were changed, as given in the edit set.
    pub changed: Vec<String>,
    pub backup_path: Option<PathBuf>,
    /// Whether the file on disk was rewritten.
    pub written: bool,
    pub error: Option<String>,
}

/// Collect JPEG files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks).
///
/// # Example
///
/// ```rust,no_run
/// use iptc_info::pipeline::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(&[
///     PathBuf::from("photo.jpg"),       // single file
///     PathBuf::from("./photos/"),       // entire directory
/// ]);
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a JPEG extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Create a backup of the original file, once.
fn backup_file(path: &Path) -> Result<PathBuf> {
    let backup_path = path.with_extension(format!(
        "{}.bak",
        path.extension().unwrap_or_default().to_string_lossy()
    ));

    if !backup_path.exists() {
        std::fs::copy(path, &backup_path).context("Failed to create backup")?;
        log::debug!("Backup created: {}", backup_path.display());
    }

    Ok(backup_path)
}

/// Apply `edits` to `model` and return the names that changed.
///
/// Stops at the first rejected edit; earlier edits stay applied to the
/// model, so callers should drop it rather than save.
pub fn apply_edits(model: &mut Model, edits: &EditSet) -> Result<Vec<String>> {
    let mut changed = Vec::new();

    for name in &edits.clear {
        if model.delete(name.as_str()).is_some() {
            note_change(&mut changed, name);
        } else {
            log::debug!("Nothing to clear for {name}");
        }
    }

    for (name, value) in &edits.set {
        let repeatable =
            registry::resolve(Key::Name(name)).is_some_and(|entry| entry.repeatable);
        let outcome = if repeatable {
            model.set_texts(name.as_str(), &[value])
        } else {
            model.set_text(name.as_str(), value)
        };
        outcome.with_context(|| format!("Cannot set {name}"))?;
        note_change(&mut changed, name);
    }

    for (name, value) in &edits.add {
        model
            .push_text(name.as_str(), value)
            .with_context(|| format!("Cannot add to {name}"))?;
        note_change(&mut changed, name);
    }

    Ok(changed)
}

fn note_change(changed: &mut Vec<String>, name: &str) {
    if !changed.iter().any(|n| n == name) {
        changed.push(name.to_string());
    }
}

/// Render a model as a JSON object keyed by attribute name.
///
/// Text comes out decoded; binary values as lowercase hex.
pub fn model_to_json(model: &Model) -> JsonValue {
    let mut fields = Map::new();
    for (tag, value) in model.iter() {
        let binary = registry::by_tag(tag).is_some_and(|e| e.kind == Kind::Binary);
        let render = |bytes: &[u8]| -> JsonValue {
            if binary {
                JsonValue::String(bytes.iter().map(|b| format!("{b:02x}")).collect())
            } else {
                JsonValue::String(model.charset().decode(bytes).into_owned())
            }
        };
        let rendered = match value {
            Value::Scalar(bytes) => render(bytes.as_slice()),
            Value::Sequence(items) => {
                JsonValue::Array(items.iter().map(|b| render(b.as_slice())).collect())
            }
        };
        fields.insert(registry::display_name(tag), rendered);
    }
    JsonValue::Object(fields)
}

/// Open one file, apply `edits`, back it up and save it.
///
/// Errors are reported in [`ProcessResult::error`] rather than returned so a
/// batch can carry on past a bad file.
///
/// # Example
///
/// ```rust,no_run
/// use iptc_info::config::Config;
/// use iptc_info::pipeline::{EditSet, process_image};
/// use std::path::Path;
///
/// let config = Config::default();
/// let mut edits = EditSet::default();
/// edits.set.push(("credit".into(), "Photo Desk".into()));
///
/// let result = process_image(Path::new("photo.jpg"), &edits, &config);
/// if result.error.is_none() {
///     println!("Changed: {:?}", result.changed);
/// }
/// ```
pub fn process_image(path: &Path, edits: &EditSet, config: &Config) -> ProcessResult {
    let mut result = ProcessResult {
        path: path.to_path_buf(),
        ..ProcessResult::default()
    };

    let mut info = match IptcInfo::open_with(path, config.options) {
        Ok(info) => info,
        Err(e) => {
            result.error = Some(format!("Failed to read metadata: {e}"));
            return result;
        }
    };
    result.had_metadata = info.has_metadata();

    match apply_edits(info.model_mut(), edits) {
        Ok(changed) => result.changed = changed,
        Err(e) => {
            result.error = Some(format!("{e:#}"));
            return result;
        }
    }

    if result.changed.is_empty() {
        log::info!("  No changes for {}", path.display());
        return result;
    }

    if config.output.dry_run {
        log::info!("  [dry run] Would update: {}", result.changed.join(", "));
        return result;
    }

    if config.output.backup_originals {
        match backup_file(path) {
            Ok(backup) => result.backup_path = Some(backup),
            Err(e) => log::warn!("Failed to backup {}: {e}", path.display()),
        }
    }

    match info.save() {
        Ok(()) => result.written = true,
        Err(e) => result.error = Some(format!("Failed to write metadata: {e}")),
    }

    result
}
