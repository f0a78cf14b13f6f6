//! Tolerant loading of bibliographic XML fragment dumps.
//!
//! Source files are sequences of sibling `<pub>` fragments without a single
//! root element and frequently with broken markup. The loader wraps the raw
//! bytes in a synthetic [`WRAPPER`] element and parses them with a recovering
//! tree builder: malformed spans are dropped or repaired rather than aborting
//! the parse. Every such intervention is returned alongside the tree as a
//! [`Recovery`], so data loss stays observable.
#![forbid(unsafe_code)]

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

mod builder;
mod tree;

pub use builder::WRAPPER;
pub use tree::{Descendants, Element};

/// A recovered tree plus the record of what had to be repaired or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    root: Element,
    recoveries: Vec<Recovery>,
}

impl LoadedDocument {
    /// The synthetic wrapper element holding every parsed fragment.
    #[must_use]
    pub const fn root(&self) -> &Element {
        &self.root
    }

    /// Interventions made while parsing, in input order.
    #[must_use]
    pub fn recoveries(&self) -> &[Recovery] {
        &self.recoveries
    }

    /// Every `pub` element in depth-first document order.
    pub fn publications(&self) -> impl Iterator<Item = &Element> {
        self.root.descendants("pub")
    }
}

/// A single repair or omission performed by the recovering parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    /// Byte offset into the source file where the problem was detected.
    pub position: u64,
    /// What happened at that offset.
    pub kind: RecoveryKind,
}

/// Classification of a [`Recovery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryKind {
    /// Markup the tokenizer could not read was skipped.
    SyntaxError {
        /// Tokenizer diagnostic.
        message: String,
    },
    /// A closing tag without a matching open element was ignored.
    UnmatchedEndTag {
        /// Name in the closing tag.
        name: String,
    },
    /// An element was closed by an ancestor's closing tag or by end of input.
    ImplicitlyClosed {
        /// Name of the element that was closed.
        name: String,
    },
    /// Character data with an unknown entity or invalid UTF-8 was kept
    /// undecoded.
    UndecodableText,
    /// Parsing stopped before end of input because the tokenizer could not
    /// advance.
    Truncated,
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let offset = self.position;
        match &self.kind {
            RecoveryKind::SyntaxError { message } => {
                write!(f, "skipped malformed markup at byte {offset}: {message}")
            }
            RecoveryKind::UnmatchedEndTag { name } => {
                write!(f, "ignored unmatched </{name}> at byte {offset}")
            }
            RecoveryKind::ImplicitlyClosed { name } => {
                write!(f, "closed unterminated <{name}> at byte {offset}")
            }
            RecoveryKind::UndecodableText => {
                write!(f, "kept undecodable text at byte {offset} verbatim")
            }
            RecoveryKind::Truncated => {
                write!(f, "abandoned input from byte {offset}")
            }
        }
    }
}

/// Errors returned when the source file cannot be loaded at all.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the source file failed.
    #[error("failed to read source file {path:?}")]
    Read {
        /// Path of the source file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Read and parse the fragment file at `path`.
///
/// Only I/O failures are errors; malformed markup is recovered and reported
/// through [`LoadedDocument::recoveries`].
///
/// # Examples
/// ```
/// use camino::Utf8PathBuf;
/// use pubdb_data::loader::load_document;
/// use tempfile::NamedTempFile;
///
/// let file = NamedTempFile::new().expect("create temp file");
/// std::fs::write(file.path(), "<pub><ID>1</ID></pub><pub><ID>2</ID></pub>")
///     .expect("write fragments");
/// let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).expect("utf-8 path");
///
/// let document = load_document(&path).expect("load fragments");
/// assert_eq!(document.publications().count(), 2);
/// assert!(document.recoveries().is_empty());
/// ```
pub fn load_document(path: &Utf8Path) -> Result<LoadedDocument, LoadError> {
    let bytes = pubdb_fs::read_bytes(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_fragments(&bytes))
}

/// Parse in-memory fragments. Never fails.
///
/// # Examples
/// ```
/// use pubdb_data::loader::parse_fragments;
///
/// let document = parse_fragments(b"<pub><ID>1</ID><title>Open</pub><pub><ID>2</ID></pub>");
/// let ids: Vec<_> = document
///     .publications()
///     .filter_map(|publication| publication.child_text("ID"))
///     .collect();
/// assert_eq!(ids, vec!["1", "2"]);
/// assert!(!document.recoveries().is_empty());
/// ```
#[must_use]
pub fn parse_fragments(source: &[u8]) -> LoadedDocument {
    let (root, recoveries) = builder::parse_wrapped(source);
    LoadedDocument { root, recoveries }
}
