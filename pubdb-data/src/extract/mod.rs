//! Mapping from recovered `pub` elements to publication records.
//!
//! Fields are looked up by exact tag name among the element's direct children
//! and copied verbatim. A missing optional field becomes `None`; a missing or
//! non-integer `ID` and a nameless author are record errors, left to the
//! materializer's policy to abort on or skip.
#![forbid(unsafe_code)]

use pubdb_core::{Publication, PublicationRecord, RecordError, parse_pub_id};

use crate::loader::{Element, LoadedDocument};

const ID_FIELD: &str = "ID";
const TITLE_FIELD: &str = "title";
const YEAR_FIELD: &str = "year";
const JOURNAL_FIELD: &str = "booktitle";
const PAGES_FIELD: &str = "pages";
const AUTHORS_FIELD: &str = "authors";

/// Build a [`PublicationRecord`] from a single `pub` element.
///
/// # Examples
/// ```
/// use pubdb_data::extract::extract_record;
/// use pubdb_data::loader::parse_fragments;
///
/// let document = parse_fragments(
///     b"<pub><ID>9</ID><booktitle>VLDB</booktitle><authors><a>Eve</a></authors></pub>",
/// );
/// let element = document.publications().next().expect("one pub element");
/// let record = extract_record(element).expect("valid record");
///
/// assert_eq!(record.pub_id(), 9);
/// assert_eq!(record.publication.journal.as_deref(), Some("VLDB"));
/// assert_eq!(record.author_names, vec!["Eve"]);
/// ```
pub fn extract_record(element: &Element) -> Result<PublicationRecord, RecordError> {
    let pub_id = parse_pub_id(element.child_text(ID_FIELD))?;
    let field = |name: &str| element.child_text(name).map(str::to_owned);

    let publication = Publication {
        pub_id,
        title: field(TITLE_FIELD),
        year: field(YEAR_FIELD),
        journal: field(JOURNAL_FIELD),
        pages: field(PAGES_FIELD),
    };

    let author_names = element
        .child(AUTHORS_FIELD)
        .map(Element::children)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(index, author)| {
            author
                .text()
                .map(str::to_owned)
                .ok_or(RecordError::MissingAuthorName { pub_id, index })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PublicationRecord::new(publication, author_names))
}

/// Extract one result per `pub` element, in document order.
pub fn extract_records(
    document: &LoadedDocument,
) -> impl Iterator<Item = Result<PublicationRecord, RecordError>> + '_ {
    document.publications().map(extract_record)
}
