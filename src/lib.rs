#![forbid(unsafe_code)]
//! Gettext PO catalog toolkit for Rust.
//!
//! Parses PO text into structured messages, writes them back with correct
//! escaping and line splitting, and evaluates `Plural-Forms` rules.
//!
//! # Quick Start
//!
//! ```rust
//! use pocodec::{File, Parser};
//!
//! let catalog = File::from_str(r#"
//! msgid ""
//! msgstr "Plural-Forms: nplurals=2; plural=(n != 1);\n"
//!
//! msgid "%d apple"
//! msgid_plural "%d apples"
//! msgstr[0] "%d Apfel"
//! msgstr[1] "%d Äpfel"
//! "#)?;
//!
//! assert_eq!(catalog.nget_text("%d apple", "%d apples", 3, &[&3]), "3 Äpfel");
//! assert_eq!(catalog.get_text("missing", &[]), "missing");
//!
//! let mut out = Vec::new();
//! catalog.to_writer(&mut out)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Layout
//!
//! - [`escape`]: quoted-string escape codec
//! - [`plural_rules`]: `Plural-Forms` compiler and language fallbacks
//! - [`scanner`]: line scanner behind [`File`] parsing
//! - [`writer`]: PO serialization
//! - [`catalog`]: `get_text` / `nget_text` lookups

pub mod catalog;
pub mod error;
pub mod escape;
pub mod header;
pub mod options;
pub mod plural_rules;
pub mod po;
pub mod scanner;
pub mod traits;
pub mod types;
pub mod writer;

// Re-export most used types for easy consumption
pub use crate::{
    catalog::format_message,
    error::Error,
    header::Header,
    options::{ParseOptions, WriteOptions},
    plural_rules::{PluralSelector, lookup_plural_selector},
    po::File,
    traits::Parser,
    types::{Comment, Message},
};
