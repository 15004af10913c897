//! Facade crate for the assetgrid asset fetcher.
//!
//! This crate re-exports the core search, decoding and tiling types, and the
//! HTTP transport, MapIt lookup and GeoJSON writer behind the `http` feature.

#![forbid(unsafe_code)]

pub use assetgrid_core::{
    AssetSearch, BoundingBox, BoundingBoxParseError, ConfirmSearch, DecodeError, Enumeration,
    Feature, Geometry, GeometryError, Mapping, QueryError, RESULT_CAP, RetryPolicy, Source,
    Transport, TransportError, Value, decode_document, enumerate,
};

#[cfg(feature = "http")]
pub use assetgrid_data::{
    AreaLookup, AreaLookupError, HttpTransport, HttpTransportConfig, MapitClient,
    WriteFeaturesError, write_feature_collection,
};
