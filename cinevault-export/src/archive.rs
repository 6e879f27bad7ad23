//! Payload resolution: raw XML or a zip archive holding one document.

use std::io::{Cursor, Read};
use std::path::Path;

use zip::ZipArchive;

use crate::document::{ExportDocument, parse_document};
use crate::error::ExportError;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// How an uploaded payload is packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Xml,
    Zip,
}

impl PayloadKind {
    /// Sniff the payload by its leading bytes.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) {
            Self::Zip
        } else {
            Self::Xml
        }
    }

    /// File extension used when archiving a copy of the payload.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Zip => "zip",
        }
    }
}

/// Resolve an in-memory payload to a parsed export.
pub fn load_payload(bytes: &[u8]) -> Result<ExportDocument, ExportError> {
    match PayloadKind::detect(bytes) {
        PayloadKind::Xml => parse_document(bytes),
        PayloadKind::Zip => {
            let document = extract_single_document(bytes)?;
            parse_document(document.as_slice())
        }
    }
}

/// Read a file fully into memory and resolve it.
pub fn load_path(path: &Path) -> Result<ExportDocument, ExportError> {
    let bytes = std::fs::read(path)?;
    load_payload(&bytes)
}

/// Pull the one document out of a zip archive.
///
/// Directories and macOS resource-fork entries are ignored. When several
/// files remain, a single `.xml` file among them is still accepted.
pub fn extract_single_document(bytes: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut candidates = Vec::new();
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        if file.is_dir() || file.name().starts_with("__MACOSX/") {
            continue;
        }
        candidates.push((i, file.name().to_string()));
    }

    let index = match candidates.as_slice() {
        [(i, _)] => *i,
        _ => {
            let xml: Vec<usize> = candidates
                .iter()
                .filter(|(_, name)| name.to_lowercase().ends_with(".xml"))
                .map(|(i, _)| *i)
                .collect();
            match xml.as_slice() {
                [i] => *i,
                _ => return Err(ExportError::ArchiveDocumentCount(candidates.len())),
            }
        }
    };

    let mut file = archive.by_index(index)?;
    log::debug!("Extracting {} from archive", file.name());
    let mut document = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut document)?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const DOC: &str = r#"<Collection><DVD><ID>a</ID><CollectionNumber>1</CollectionNumber><Title>Alien</Title></DVD></Collection>"#;

    fn make_zip(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn raw_xml_payload() {
        assert_eq!(PayloadKind::detect(DOC.as_bytes()), PayloadKind::Xml);
        let doc = load_payload(DOC.as_bytes()).unwrap();
        assert_eq!(doc.entries.len(), 1);
    }

    #[test]
    fn zip_with_one_document() {
        let bytes = make_zip(&[("Collection.xml", DOC)]);
        assert_eq!(PayloadKind::detect(&bytes), PayloadKind::Zip);
        let doc = load_payload(&bytes).unwrap();
        assert_eq!(doc.entries[0].title.as_deref(), Some("Alien"));
    }

    #[test]
    fn zip_prefers_single_xml_among_files() {
        let bytes = make_zip(&[("readme.txt", "hello"), ("export.XML", DOC)]);
        let doc = load_payload(&bytes).unwrap();
        assert_eq!(doc.entries.len(), 1);
    }

    #[test]
    fn zip_with_two_documents_is_rejected() {
        let bytes = make_zip(&[("a.xml", DOC), ("b.xml", DOC)]);
        let result = load_payload(&bytes);
        assert!(matches!(result, Err(ExportError::ArchiveDocumentCount(2))));
    }

    #[test]
    fn load_path_reads_xml_and_zip_files() {
        let dir = tempfile::tempdir().unwrap();
        let xml_path = dir.path().join("collection.xml");
        let zip_path = dir.path().join("collection.zip");
        std::fs::write(&xml_path, DOC).unwrap();
        std::fs::write(&zip_path, make_zip(&[("Collection.xml", DOC)])).unwrap();

        assert_eq!(load_path(&xml_path).unwrap().entries.len(), 1);
        assert_eq!(load_path(&zip_path).unwrap().entries.len(), 1);
        assert!(matches!(
            load_path(&dir.path().join("missing.xml")),
            Err(ExportError::Io(_))
        ));
    }

    #[test]
    fn empty_zip_is_rejected() {
        let bytes = make_zip(&[]);
        let result = load_payload(&bytes);
        assert!(matches!(result, Err(ExportError::ArchiveDocumentCount(0))));
    }
}
