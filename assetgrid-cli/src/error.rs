//! Error types emitted by the assetgrid CLI.

use std::sync::Arc;

use assetgrid_core::BoundingBoxParseError;
use assetgrid_data::{AreaLookupError, ProviderBuildError, WriteFeaturesError};
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors emitted by the assetgrid CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// An option was set to a value outside its accepted range.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: &'static str,
    },
    /// The layers file could not be read.
    #[error("failed to read layers file {path:?}: {source}")]
    ReadLayers {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The layers file is not valid TOML or has the wrong shape.
    #[error("failed to parse layers file {path:?}: {source}")]
    ParseLayers {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// `--layer` named an output that no layer writes.
    #[error("no layer writes {output:?}")]
    UnknownLayer { output: String },
    /// A layer references a source missing from `[sources]`.
    #[error("layer {output:?} references unknown source {source_name:?}")]
    UnknownSource { output: String, source_name: String },
    /// A layer names neither a bounding box nor a MapIt area.
    #[error("layer {output:?} needs either `bbox` or `mapit_id`")]
    MissingExtent { output: String },
    /// A layer's `bbox` is not `"west,south,east,north"`.
    #[error("layer {output:?} has an invalid bbox: {source}")]
    InvalidBbox {
        output: String,
        #[source]
        source: BoundingBoxParseError,
    },
    /// Building an HTTP client failed.
    #[error("failed to build HTTP client: {0}")]
    BuildHttpClient(#[from] ProviderBuildError),
    /// Resolving a MapIt area failed.
    #[error("failed to resolve area for layer {output:?}: {source}")]
    AreaLookup {
        output: String,
        #[source]
        source: AreaLookupError,
    },
    /// Enumerating or writing a layer failed.
    #[error("failed to save layer {output:?}: {source}")]
    WriteLayer {
        output: String,
        #[source]
        source: WriteFeaturesError,
    },
}
