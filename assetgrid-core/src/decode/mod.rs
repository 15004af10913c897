//! Generic conversion of XML responses into [`Mapping`]s.
//!
//! The service answers with deeply nested, self-describing XML whose exact
//! shape varies between deployments, so responses are decoded without a
//! schema. Every element becomes a mapping keyed by its own name:
//!
//! - a leaf maps to its text, or [`Value::Null`] when it has none;
//! - a single child collapses into that child's mapping;
//! - several children are sorted by name and merged into one mapping when
//!   their names are distinct and they carry nothing but their own value,
//!   otherwise they stay an ordered [`Value::List`];
//! - attributes appear as sibling keys prefixed with `@`, and text mixed
//!   with child elements is kept under [`TEXT_KEY`].
//!
//! Decoding never fails on an unexpected shape. Only malformed XML is an
//! error.

mod element;
mod error;

use std::io::BufRead;

pub use element::Element;
pub use error::DecodeError;

use crate::value::{Mapping, Value};

/// Prefix that distinguishes attribute keys from element keys.
pub const ATTRIBUTE_PREFIX: char = '@';
/// Key holding character data that sits alongside child elements.
pub const TEXT_KEY: &str = "text";

/// Parse and decode a whole XML document.
///
/// # Errors
///
/// Returns [`DecodeError`] when the input is not well-formed XML.
///
/// # Examples
/// ```
/// use assetgrid_core::{Value, decode_document};
///
/// let xml = b"<Asset><FeatureId>7</FeatureId><WKT>POINT (1 2)</WKT></Asset>";
/// let decoded = decode_document(&xml[..])?;
/// let asset = decoded.get("Asset").and_then(Value::as_map).expect("merged mapping");
/// assert_eq!(asset.get("FeatureId").and_then(Value::as_text), Some("7"));
/// # Ok::<(), assetgrid_core::DecodeError>(())
/// ```
pub fn decode_document<R: BufRead>(source: R) -> Result<Mapping, DecodeError> {
    Element::parse(source).map(|root| decode(&root))
}

/// Decode one element and everything below it.
#[must_use]
pub fn decode(element: &Element) -> Mapping {
    let mut mapping = Mapping::new();
    mapping.insert(element.name.clone(), decode_children(element));
    for (key, value) in &element.attributes {
        mapping.insert(
            format!("{ATTRIBUTE_PREFIX}{key}"),
            Value::Text(value.clone()),
        );
    }
    if !element.children.is_empty() && !element.text.trim().is_empty() {
        mapping.insert(TEXT_KEY, Value::Text(element.text.clone()));
    }
    mapping
}

fn decode_children(element: &Element) -> Value {
    let mut children: Vec<Mapping> = element.children.iter().map(decode).collect();
    if children.len() > 1 {
        children.sort_by(|left, right| tag_of(left).cmp(tag_of(right)));
        return merge_distinct(children);
    }
    match children.pop() {
        Some(only) => Value::Map(only),
        None if element.text.is_empty() => Value::Null,
        None => Value::Text(element.text.clone()),
    }
}

fn tag_of(mapping: &Mapping) -> &str {
    mapping.first().map_or("", |(tag, _)| tag)
}

/// Merge sibling mappings into one when doing so loses nothing.
///
/// Expects `children` sorted by tag, so repeated tags are adjacent.
fn merge_distinct(children: Vec<Mapping>) -> Value {
    let bare = children.iter().all(|child| child.len() == 1);
    let repeated = children
        .windows(2)
        .any(|pair| matches!(pair, [left, right] if tag_of(left) == tag_of(right)));
    if !bare || repeated {
        return Value::List(children);
    }
    Value::Map(children.into_iter().flatten().collect())
}
