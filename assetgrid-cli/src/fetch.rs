//! Fetch command implementation for the assetgrid CLI.

use std::time::Duration;

use assetgrid_core::{AssetSearch, ConfirmSearch, enumerate};
use assetgrid_data::{
    AreaLookup, DEFAULT_TIMEOUT_SECS, HttpTransport, HttpTransportConfig, MapitClient,
    write_feature_collection,
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_FETCH_CONFIG, ARG_FETCH_LAYER, ARG_FETCH_OUTPUT_PREFIX, ARG_FETCH_TIMEOUT_SECS, CliError,
    layers::{Layer, LayersFile},
};

/// Layers file read when none is given.
pub(crate) const DEFAULT_LAYERS_FILE: &str = "general.toml";

/// CLI arguments for the `fetch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Fetch every layer described in the layers file from its \
                 asset-management service, subdividing each region until no \
                 search is truncated, and write one GeoJSON file per layer.",
    about = "Fetch asset layers into GeoJSON files"
)]
#[ortho_config(prefix = "ASSETGRID")]
pub(crate) struct FetchArgs {
    /// Path to the TOML layers file (defaults to `general.toml`).
    #[arg(long = ARG_FETCH_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) layers_file: Option<Utf8PathBuf>,
    /// Directory prepended to every layer's output path.
    #[arg(long = ARG_FETCH_OUTPUT_PREFIX, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_prefix: Option<Utf8PathBuf>,
    /// Only fetch the layer writing this output.
    #[arg(long = ARG_FETCH_LAYER, value_name = "output")]
    #[serde(default)]
    pub(crate) layer: Option<String>,
    /// Per-request timeout for the asset service, in seconds.
    #[arg(long = ARG_FETCH_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl FetchArgs {
    pub(crate) fn into_config(self) -> Result<FetchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FetchConfig::try_from(merged)
    }
}

/// Resolved `fetch` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchConfig {
    pub(crate) layers_file: Utf8PathBuf,
    pub(crate) output_prefix: Utf8PathBuf,
    pub(crate) layer: Option<String>,
    pub(crate) timeout: Duration,
}

impl TryFrom<FetchArgs> for FetchConfig {
    type Error = CliError;

    fn try_from(args: FetchArgs) -> Result<Self, Self::Error> {
        let timeout_secs = args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(CliError::InvalidArgument {
                field: ARG_FETCH_TIMEOUT_SECS,
                reason: "must be at least one second",
            });
        }
        Ok(Self {
            layers_file: args
                .layers_file
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_LAYERS_FILE)),
            output_prefix: args.output_prefix.unwrap_or_else(|| Utf8PathBuf::from(".")),
            layer: args.layer,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

pub(crate) fn run_fetch(args: FetchArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    let layers = LayersFile::load(&config.layers_file)?;

    let transport =
        HttpTransport::with_config(HttpTransportConfig::default().with_timeout(config.timeout))?;
    let search = ConfirmSearch::new(transport);
    let areas = MapitClient::new(layers.mapit.url())?;
    fetch_layers(&config, &layers, &search, &areas)
}

/// Fetch the selected layers one after another, stopping at the first failure.
///
/// Only the selected layers are validated, and all of them are validated
/// before the first search.
pub(crate) fn fetch_layers(
    config: &FetchConfig,
    layers: &LayersFile,
    search: &dyn AssetSearch,
    areas: &dyn AreaLookup,
) -> Result<(), CliError> {
    let selected = layers.selected(config.layer.as_deref())?;
    layers.validate(&selected)?;
    for layer in selected {
        process_layer(layer, layers, &config.output_prefix, search, areas)?;
    }
    Ok(())
}

fn process_layer(
    layer: &Layer,
    layers: &LayersFile,
    output_prefix: &Utf8Path,
    search: &dyn AssetSearch,
    areas: &dyn AreaLookup,
) -> Result<u64, CliError> {
    let bbox = layers.bbox_for(layer, areas)?;
    info!("Saving layer {}", layer.output);

    let source = layers.source_for(layer)?;
    let features = enumerate(search, source, bbox, &layer.feature_types, layer.box_size);
    let path = output_prefix.join(&layer.output);
    let written =
        write_feature_collection(&path, features).map_err(|source| CliError::WriteLayer {
            output: layer.output.clone(),
            source,
        })?;
    info!("done.");
    Ok(written)
}
