//! Core domain types for the pubdb bibliography store.
//!
//! A [`Publication`] is one bibliographic entry keyed by its `pub_id`. An
//! [`Author`] is a name attached to exactly one publication by value: it
//! carries the publication's key, never a handle to the publication itself.
//! Authors are not deduplicated; the same name appearing on two entries yields
//! two independent rows.

use std::num::ParseIntError;

use thiserror::Error;

/// Primary key of a [`Publication`].
pub type PubId = i64;

/// One bibliographic entry.
///
/// Optional fields hold the source text verbatim. `year` stays textual here;
/// the store's column affinity decides how it is persisted.
///
/// # Examples
///
/// ```
/// use pubdb_core::Publication;
///
/// let mut publication = Publication::new(7);
/// publication.title = Some("Dataflow Analysis".into());
/// assert_eq!(publication.pub_id, 7);
/// assert!(publication.journal.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    /// Unique identifier sourced from the `ID` field.
    pub pub_id: PubId,
    /// Title of the entry.
    pub title: Option<String>,
    /// Publication year as written in the source.
    pub year: Option<String>,
    /// Venue, sourced from the `booktitle` field.
    pub journal: Option<String>,
    /// Free-form page range.
    pub pages: Option<String>,
}

impl Publication {
    /// Construct a publication with every optional field absent.
    #[must_use]
    pub const fn new(pub_id: PubId) -> Self {
        Self {
            pub_id,
            title: None,
            year: None,
            journal: None,
            pages: None,
        }
    }
}

/// A named contributor to a single publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Key of the publication this author contributed to.
    pub pub_id: PubId,
    /// Author name as written in the source.
    pub name: String,
}

/// A publication together with its author names in source order.
///
/// # Examples
///
/// ```
/// use pubdb_core::{Author, Publication, PublicationRecord};
///
/// let record = PublicationRecord::new(
///     Publication::new(1),
///     vec!["Alice".into(), "Bob".into()],
/// );
/// let authors: Vec<Author> = record.authors().collect();
/// assert_eq!(authors.len(), 2);
/// assert!(authors.iter().all(|author| author.pub_id == 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationRecord {
    /// The publication row.
    pub publication: Publication,
    /// Names of the contributing authors, possibly empty.
    pub author_names: Vec<String>,
}

impl PublicationRecord {
    /// Pair a publication with its author names.
    #[must_use]
    pub const fn new(publication: Publication, author_names: Vec<String>) -> Self {
        Self {
            publication,
            author_names,
        }
    }

    /// Key of the underlying publication.
    #[must_use]
    pub const fn pub_id(&self) -> PubId {
        self.publication.pub_id
    }

    /// Fan the author names out into [`Author`] rows keyed by this record.
    pub fn authors(&self) -> impl Iterator<Item = Author> + '_ {
        let pub_id = self.pub_id();
        self.author_names.iter().map(move |name| Author {
            pub_id,
            name: name.clone(),
        })
    }
}

/// Reasons a `pub` element cannot become a [`PublicationRecord`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The element has no `ID` child or the child carries no text.
    #[error("publication has no ID")]
    MissingId,
    /// The `ID` text is not a 64-bit integer.
    #[error("publication ID {raw:?} is not an integer")]
    InvalidId {
        /// Text found in the `ID` field.
        raw: String,
        /// Integer parsing failure.
        #[source]
        source: ParseIntError,
    },
    /// An author entry has no name.
    #[error("author #{index} of publication {pub_id} has no name")]
    MissingAuthorName {
        /// Publication the author belongs to.
        pub_id: PubId,
        /// Zero-based position among the publication's authors.
        index: usize,
    },
}

/// Parse the text of an `ID` field into a [`PubId`].
///
/// Surrounding ASCII whitespace is ignored; anything else must be a signed
/// decimal integer.
///
/// # Examples
///
/// ```
/// use pubdb_core::{RecordError, parse_pub_id};
///
/// assert_eq!(parse_pub_id(Some(" 42\n")), Ok(42));
/// assert_eq!(parse_pub_id(None), Err(RecordError::MissingId));
/// assert!(matches!(
///     parse_pub_id(Some("forty-two")),
///     Err(RecordError::InvalidId { .. })
/// ));
/// ```
pub fn parse_pub_id(raw: Option<&str>) -> Result<PubId, RecordError> {
    let text = raw.ok_or(RecordError::MissingId)?;
    text.trim_ascii()
        .parse()
        .map_err(|source| RecordError::InvalidId {
            raw: text.to_owned(),
            source,
        })
}
