use thiserror::Error;

/// Errors raised when a response is not well-formed XML.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The XML reader rejected the input.
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// An entity or character reference could not be expanded.
    #[error("invalid escape sequence: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    /// Names or character data were not valid UTF-8.
    #[error("XML content is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// An element or attribute used a prefix with no namespace declaration.
    #[error("undeclared namespace prefix {prefix:?}")]
    UnknownPrefix { prefix: String },
    /// A closing tag appeared with no element open.
    #[error("closing tag without a matching opening tag")]
    UnbalancedEnd,
    /// The document contained no element at all.
    #[error("document has no root element")]
    MissingRoot,
    /// The input ended inside an element.
    #[error("document ended with {open} unclosed element(s)")]
    UnexpectedEof { open: usize },
}
