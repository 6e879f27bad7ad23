/// Errors that can occur while loading a collection export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Missing <{0}> root element")]
    MissingRoot(&'static str),

    #[error("Export is truncated: <{0}> is never closed")]
    UnclosedElement(String),

    #[error("Archive must contain exactly one document, found {0}")]
    ArchiveDocumentCount(usize),
}
