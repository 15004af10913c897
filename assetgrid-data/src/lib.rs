//! Network and file adapters for assetgrid.
//!
//! Responsibilities:
//! - Deliver SOAP requests to the asset-management service over HTTP.
//! - Resolve administrative areas to bounding boxes through MapIt.
//! - Persist enumerated features as GeoJSON.
//!
//! Boundaries:
//! - Do not encode search or decoding rules (live in `assetgrid-core`).
//! - Keep the blocking interfaces of the core traits; async clients are
//!   driven internally.

mod http;
pub mod mapit;
pub mod output;
mod transport;

pub use http::ProviderBuildError;
pub use mapit::{AreaLookup, AreaLookupError, DEFAULT_MAPIT_URL, MapitClient};
pub use output::{WriteFeaturesError, to_geojson, write_feature_collection};
pub use transport::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpTransport, HttpTransportConfig};
