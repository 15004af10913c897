//! Core of the assetgrid asset fetcher.
//!
//! The crate turns a bounding box into a complete stream of asset features
//! from a Confirm-style asset-management service, even though the service
//! silently truncates every search at [`RESULT_CAP`] records:
//!
//! - [`Transport`] delivers SOAP requests and hands back raw bodies;
//! - [`decode_document`] converts any well-formed XML reply into a generic
//!   [`Mapping`];
//! - [`ConfirmSearch`] runs one box search and extracts [`Feature`]s;
//! - [`enumerate`] subdivides the region adaptively until no search is full.
//!
//! HTTP, configuration and output formats live in the `assetgrid-data` and
//! `assetgrid-cli` crates.

mod bbox;
pub mod decode;
mod envelope;
mod feature;
mod query;
mod retry;
mod source;
#[doc(hidden)]
pub mod test_support;
mod tiler;
mod transport;
mod value;

pub use bbox::{BoundingBox, BoundingBoxParseError};
pub use decode::{DecodeError, Element, decode, decode_document};
pub use envelope::{CONNECTOR_NS, CONTENT_TYPE, SOAP_ACTION, SOAP_ENVELOPE_NS, build_envelope};
pub use feature::{BRITISH_NATIONAL_GRID, Feature, Geometry, GeometryError, UNKNOWN_FEATURE_ID};
pub use query::{
    AssetSearch, ConfirmSearch, ID_KEY, QueryError, RESULT_CAP, WKT_KEY, asset_search_operation,
    features_from_response,
};
pub use retry::{DEFAULT_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryPolicy};
pub use source::Source;
pub use tiler::{EDGE_PADDING, Enumeration, MIN_TILE_SIZE, enumerate};
pub use transport::{Transport, TransportError};
pub use value::{Iter, Mapping, Value};
