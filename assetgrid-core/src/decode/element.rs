//! Namespace-aware XML parsing into a plain element tree.

use std::io::BufRead;

use quick_xml::{
    NsReader,
    events::{BytesStart, Event},
    name::ResolveResult,
};

use super::DecodeError;

/// One parsed XML element.
///
/// Names are written in Clark notation (`{namespace}local`) when the element
/// or attribute is bound to a namespace, and as the bare local name
/// otherwise. Namespace declarations are not kept as attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Qualified element name.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// All character data directly inside this element.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// Create an empty element called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Append character data.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text.push_str(text);
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Parse the root element of an XML document.
    ///
    /// Anything after the root element closes is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] for syntax errors, mismatched tags, undeclared
    /// namespace prefixes, invalid UTF-8 and documents without a root.
    pub fn parse<R: BufRead>(source: R) -> Result<Self, DecodeError> {
        let mut reader = NsReader::from_reader(source);
        let mut buf = Vec::new();
        let mut open: Vec<Self> = Vec::new();
        loop {
            let closed = match reader.read_event_into(&mut buf)? {
                Event::Start(start) => {
                    open.push(open_element(&reader, &start)?);
                    None
                }
                Event::Empty(start) => Some(open_element(&reader, &start)?),
                Event::End(_) => Some(open.pop().ok_or(DecodeError::UnbalancedEnd)?),
                Event::Text(text) => {
                    if let Some(current) = open.last_mut() {
                        current.text.push_str(&text.unescape()?);
                    }
                    None
                }
                Event::CData(data) => {
                    if let Some(current) = open.last_mut() {
                        current.text.push_str(std::str::from_utf8(&data)?);
                    }
                    None
                }
                Event::Eof if open.is_empty() => return Err(DecodeError::MissingRoot),
                Event::Eof => return Err(DecodeError::UnexpectedEof { open: open.len() }),
                _ => None,
            };
            if let Some(element) = closed {
                match open.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            buf.clear();
        }
    }
}

fn open_element<R>(reader: &NsReader<R>, start: &BytesStart<'_>) -> Result<Element, DecodeError> {
    let (namespace, local) = reader.resolve_element(start.name());
    let mut element = Element::new(qualified_name(namespace, local.as_ref())?);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        if attribute.key.as_namespace_binding().is_some() {
            continue;
        }
        let (namespace, local) = reader.resolve_attribute(attribute.key);
        let key = qualified_name(namespace, local.as_ref())?;
        let value = attribute.unescape_value()?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn qualified_name(namespace: ResolveResult<'_>, local: &[u8]) -> Result<String, DecodeError> {
    let local = std::str::from_utf8(local)?;
    match namespace {
        ResolveResult::Bound(namespace) => {
            let uri = std::str::from_utf8(namespace.into_inner())?;
            Ok(format!("{{{uri}}}{local}"))
        }
        ResolveResult::Unbound => Ok(local.to_owned()),
        ResolveResult::Unknown(prefix) => Err(DecodeError::UnknownPrefix {
            prefix: String::from_utf8_lossy(&prefix).into_owned(),
        }),
    }
}
