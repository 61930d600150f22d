//! # iptc-info
//!
//! Read and write IPTC-IIM metadata (captions, keywords, credits...) stored in
//! the Photoshop APP13 segment of JPEG files. Only the metadata segments are
//! rewritten; image data and every other segment are copied byte for byte.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use iptc_info::IptcInfo;
//!
//! fn main() -> iptc_info::Result<()> {
//!     // `false`: fail on damaged metadata instead of recovering what we can
//!     let mut info = IptcInfo::open("photo.jpg", false)?;
//!
//!     if !info.has_metadata() {
//!         println!("No IPTC data yet");
//!     }
//!     println!("Keywords: {:?}", info.model().keywords());
//!     println!("Caption:  {:?}", info.model().text("caption/abstract"));
//!
//!     // Attributes are addressed by id (120u8), name, or alias
//!     info.model_mut().set_text("caption", "Harbour at dusk")?;
//!     info.model_mut().set_texts("keywords", &["harbour", "dusk"])?;
//!
//!     // Atomic in-place save, or write a copy
//!     info.save()?;
//!     info.save_as("copy.jpg")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Batch Editing
//!
//! The pipeline applies the same edits to many files, with backups:
//!
//! ```rust,no_run
//! use iptc_info::config::Config;
//! use iptc_info::pipeline::{EditSet, collect_images, process_image};
//! use std::path::PathBuf;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!     let mut edits = EditSet::default();
//!     edits.set.push(EditSet::parse_assignment("credit=Photo Desk")?);
//!     edits.add.push(EditSet::parse_assignment("keywords=archive")?);
//!
//!     for path in collect_images(&[PathBuf::from("./photos")]) {
//!         let result = process_image(&path, &edits, &config);
//!         if let Some(ref err) = result.error {
//!             eprintln!("Error processing {}: {err}", path.display());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`info`]: [`IptcInfo`], one file's metadata session
//! - [`iim`]: dataset registry, attribute model, charset and codec
//! - [`jpeg`]: segment scanner, Photoshop resources, APP13 writer
//! - [`config`]: read options and the JSON config file
//! - [`pipeline`]: batch editing over files and directories
//! - [`hex`]: hex dumps for diagnostics

pub mod config;
pub mod cursor;
pub mod error;
pub mod hex;
pub mod iim;
pub mod info;
pub mod jpeg;
pub mod pipeline;

pub use config::Options;
pub use error::{Error, Result, ValidationError};
pub use info::IptcInfo;
pub use jpeg::is_jpeg;
