//! Streaming parser for `<Collection>` exports.
//!
//! One `ExportEntry` per `<DVD>`; cast and crew come from `<Actor>` and
//! `<Credit>` attributes.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::ExportError;

/// Root element of a collection export.
pub const ROOT_ELEMENT: &str = "Collection";
/// The repeating element, one per catalog entry.
pub const ENTRY_ELEMENT: &str = "DVD";

/// A parsed collection export.
///
/// Every repeating element is normalized to a `Vec` here, so consumers never
/// have to care whether the source held one child or many.
#[derive(Debug, Clone, Default)]
pub struct ExportDocument {
    pub entries: Vec<ExportEntry>,
}

/// A single `<DVD>` entry from the export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportEntry {
    /// Batch-local identifier used to resolve box-set relations.
    pub external_id: Option<String>,
    /// Candidate primary key for the catalog row.
    pub internal_key: Option<i64>,
    pub title: Option<String>,
    pub release_year: Option<i32>,
    pub genres: Vec<String>,
    /// Runtime in minutes.
    pub runtime: Option<i32>,
    /// Rating text as found in the source, e.g. "FSK 12" or "PG-13".
    pub rating: Option<String>,
    pub overview: Option<String>,
    pub collection_kind: Option<String>,
    /// External identifiers of box-set children.
    pub contents: Vec<String>,
    pub people: Vec<ExportPerson>,
}

/// A cast or crew descriptor attached to an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPerson {
    /// Full display name ("First Middle Last"), possibly empty.
    pub name: String,
    /// Character name for cast, credit subtype for crew.
    pub role: Option<String>,
    pub order: Option<i64>,
    pub birth_year: Option<i32>,
    pub kind: PersonKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonKind {
    Cast,
    Crew,
}

/// Parse a collection export from XML.
///
/// The only structural requirement is the `<Collection>` root; entries with
/// missing or malformed fields are kept with those fields unset.
pub fn parse_document<R: BufRead>(reader: R) -> Result<ExportDocument, ExportError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut doc = ExportDocument::default();

    let mut saw_root = false;
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<ExportEntry> = None;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag = tag_name(e);
                if stack.is_empty() {
                    check_root(&tag)?;
                    saw_root = true;
                } else if stack.len() == 1 && tag == ENTRY_ELEMENT {
                    current = Some(ExportEntry::default());
                } else if let Some(ref mut entry) = current {
                    if let Some(person) = parse_person(e, &tag)? {
                        entry.people.push(person);
                    }
                }
                stack.push(tag);
            }
            Event::Empty(ref e) => {
                let tag = tag_name(e);
                if stack.is_empty() {
                    check_root(&tag)?;
                    saw_root = true;
                } else if let Some(ref mut entry) = current {
                    if let Some(person) = parse_person(e, &tag)? {
                        entry.people.push(person);
                    }
                }
            }
            Event::Text(ref e) => {
                if let Some(ref mut entry) = current {
                    let text = e.unescape()?;
                    apply_text(entry, entry_path(&stack), text.trim());
                }
            }
            Event::CData(ref e) => {
                if let Some(ref mut entry) = current {
                    let text = String::from_utf8_lossy(e);
                    apply_text(entry, entry_path(&stack), text.trim());
                }
            }
            Event::End(_) => {
                let tag = stack.pop();
                if stack.len() == 1 && tag.as_deref() == Some(ENTRY_ELEMENT) {
                    if let Some(entry) = current.take() {
                        doc.entries.push(entry);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(ExportError::MissingRoot(ROOT_ELEMENT));
    }
    if let Some(open) = stack.first() {
        log::debug!("Export ended inside <{}>", stack.join("/"));
        return Err(ExportError::UnclosedElement(open.clone()));
    }

    Ok(doc)
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

fn check_root(tag: &str) -> Result<(), ExportError> {
    if tag == ROOT_ELEMENT {
        Ok(())
    } else {
        log::debug!("Unexpected root element <{}>", tag);
        Err(ExportError::MissingRoot(ROOT_ELEMENT))
    }
}

/// Element path below the current `<DVD>`, e.g. `["Genres", "Genre"]`.
fn entry_path(stack: &[String]) -> &[String] {
    stack.get(2..).unwrap_or(&[])
}

fn apply_text(entry: &mut ExportEntry, path: &[String], text: &str) {
    if text.is_empty() {
        return;
    }
    let path: Vec<&str> = path.iter().map(String::as_str).collect();
    match path.as_slice() {
        ["ID"] => entry.external_id = Some(text.to_string()),
        ["CollectionNumber"] => entry.internal_key = parse_number(text, "CollectionNumber"),
        ["Title"] => entry.title = Some(text.to_string()),
        ["ProductionYear"] => entry.release_year = parse_number(text, "ProductionYear"),
        ["Genres", "Genre"] => entry.genres.push(text.to_string()),
        ["RunningTime"] => entry.runtime = parse_number(text, "RunningTime"),
        ["Rating"] => entry.rating = Some(text.to_string()),
        ["Overview"] => match entry.overview {
            Some(ref mut existing) => {
                existing.push(' ');
                existing.push_str(text);
            }
            None => entry.overview = Some(text.to_string()),
        },
        ["CollectionType"] => entry.collection_kind = Some(text.to_string()),
        ["BoxSet", "Contents", "Contents"] => entry.contents.push(text.to_string()),
        _ => {}
    }
}

fn parse_number<T: std::str::FromStr>(text: &str, field: &str) -> Option<T> {
    match text.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            log::debug!("Ignoring non-numeric {}: {:?}", field, text);
            None
        }
    }
}

/// Parse an `<Actor>` or `<Credit>` element. Other tags yield `None`.
fn parse_person(e: &BytesStart<'_>, tag: &str) -> Result<Option<ExportPerson>, ExportError> {
    let kind = match tag {
        "Actor" => PersonKind::Cast,
        "Credit" => PersonKind::Crew,
        _ => return Ok(None),
    };

    let mut first = String::new();
    let mut middle = String::new();
    let mut last = String::new();
    let mut full = String::new();
    let mut role = None;
    let mut credit_type = None;
    let mut order = None;
    let mut birth_year = None;

    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.trim().to_string();
        match attr.key.as_ref() {
            b"FirstName" => first = value,
            b"MiddleName" => middle = value,
            b"LastName" => last = value,
            b"Name" => full = value,
            b"Role" | b"CreditSubtype" if !value.is_empty() => role = Some(value),
            b"CreditType" if !value.is_empty() => credit_type = Some(value),
            b"Order" => order = value.parse().ok(),
            b"BirthYear" => birth_year = value.parse().ok().filter(|y: &i32| *y > 0),
            _ => {}
        }
    }

    let name = if full.is_empty() {
        [first, middle, last]
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        full
    };

    if role.is_none() {
        role = credit_type;
    }

    Ok(Some(ExportPerson {
        name,
        role,
        order,
        birth_year,
        kind,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Collection>
    <DVD>
        <ID>025192079422.4</ID>
        <CollectionNumber>12</CollectionNumber>
        <Title>Indiana Jones &amp; the Temple of Doom</Title>
        <ProductionYear>1984</ProductionYear>
        <Genres>
            <Genre>Action</Genre>
            <Genre>Adventure</Genre>
        </Genres>
        <RunningTime>118</RunningTime>
        <Rating>FSK 16</Rating>
        <Overview><![CDATA[Indy heads to India.]]></Overview>
        <CollectionType>Owned</CollectionType>
        <Actors>
            <Actor FirstName="Harrison" MiddleName="" LastName="Ford" Role="Indiana Jones" BirthYear="1942"/>
            <Divider Caption="Supporting"/>
            <Actor FirstName="Kate" LastName="Capshaw" Role="Willie Scott"/>
        </Actors>
        <Credits>
            <Credit FirstName="Steven" LastName="Spielberg" CreditType="Direction" CreditSubtype="Director"/>
        </Credits>
    </DVD>
    <DVD>
        <ID>BOX.1</ID>
        <CollectionNumber>10</CollectionNumber>
        <Title>Indiana Jones Box</Title>
        <BoxSet>
            <Parent/>
            <Contents>
                <Contents>025192079422.4</Contents>
                <Contents></Contents>
            </Contents>
        </BoxSet>
    </DVD>
</Collection>"#;

    #[test]
    fn parses_entry_fields() {
        let doc = parse_document(SAMPLE_EXPORT.as_bytes()).unwrap();
        assert_eq!(doc.entries.len(), 2);

        let indy = &doc.entries[0];
        assert_eq!(indy.external_id.as_deref(), Some("025192079422.4"));
        assert_eq!(indy.internal_key, Some(12));
        assert_eq!(
            indy.title.as_deref(),
            Some("Indiana Jones & the Temple of Doom")
        );
        assert_eq!(indy.release_year, Some(1984));
        assert_eq!(indy.genres, vec!["Action", "Adventure"]);
        assert_eq!(indy.runtime, Some(118));
        assert_eq!(indy.rating.as_deref(), Some("FSK 16"));
        assert_eq!(indy.overview.as_deref(), Some("Indy heads to India."));
        assert_eq!(indy.collection_kind.as_deref(), Some("Owned"));
        assert!(indy.contents.is_empty());
    }

    #[test]
    fn parses_people_and_skips_dividers() {
        let doc = parse_document(SAMPLE_EXPORT.as_bytes()).unwrap();
        let people = &doc.entries[0].people;
        assert_eq!(people.len(), 3);

        assert_eq!(people[0].name, "Harrison Ford");
        assert_eq!(people[0].role.as_deref(), Some("Indiana Jones"));
        assert_eq!(people[0].birth_year, Some(1942));
        assert_eq!(people[0].kind, PersonKind::Cast);

        assert_eq!(people[2].name, "Steven Spielberg");
        assert_eq!(people[2].role.as_deref(), Some("Director"));
        assert_eq!(people[2].kind, PersonKind::Crew);
    }

    #[test]
    fn box_set_contents_are_a_list() {
        let doc = parse_document(SAMPLE_EXPORT.as_bytes()).unwrap();
        let boxset = &doc.entries[1];
        assert_eq!(boxset.contents, vec!["025192079422.4"]);
        assert!(boxset.people.is_empty());
    }

    #[test]
    fn single_child_is_still_a_list() {
        let xml = r#"<Collection><DVD><ID>a</ID><Genres><Genre>Drama</Genre></Genres></DVD></Collection>"#;
        let doc = parse_document(xml.as_bytes()).unwrap();
        assert_eq!(doc.entries[0].genres, vec!["Drama"]);
    }

    #[test]
    fn empty_collection_parses() {
        let doc = parse_document("<Collection/>".as_bytes()).unwrap();
        assert!(doc.entries.is_empty());
    }

    #[test]
    fn wrong_root_is_rejected() {
        let result = parse_document("<datafile><game/></datafile>".as_bytes());
        assert!(matches!(result, Err(ExportError::MissingRoot(_))));
    }

    #[test]
    fn truncated_after_entry_is_rejected() {
        let xml = r#"<Collection><DVD><ID>a</ID><CollectionNumber>1</CollectionNumber><Title>A</Title></DVD>"#;
        let result = parse_document(xml.as_bytes());
        assert!(matches!(
            result,
            Err(ExportError::UnclosedElement(ref tag)) if tag == "Collection"
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        let result = parse_document("".as_bytes());
        assert!(matches!(result, Err(ExportError::MissingRoot(_))));
    }

    #[test]
    fn non_numeric_key_is_unset() {
        let xml = r#"<Collection><DVD><ID>x</ID><CollectionNumber>n/a</CollectionNumber></DVD></Collection>"#;
        let doc = parse_document(xml.as_bytes()).unwrap();
        assert_eq!(doc.entries[0].internal_key, None);
        assert_eq!(doc.entries[0].external_id.as_deref(), Some("x"));
    }

    #[test]
    fn full_name_attribute_is_accepted() {
        let xml = r#"<Collection><DVD><Actors><Actor Name="Cher" Order="3"/></Actors></DVD></Collection>"#;
        let doc = parse_document(xml.as_bytes()).unwrap();
        let person = &doc.entries[0].people[0];
        assert_eq!(person.name, "Cher");
        assert_eq!(person.order, Some(3));
        assert_eq!(person.role, None);
    }
}
