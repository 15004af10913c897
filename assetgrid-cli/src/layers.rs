//! The layers file: service tenants and the layers fetched from them.
//!
//! ```toml
//! [sources.confirm]
//! url = "https://confirm.example/connector"
//! user = "svc"
//! password = "secret"
//! tenant = "LIVE"
//!
//! [mapit]
//! api_key = "..."
//!
//! [[layers]]
//! output = "lights.geojson"
//! source = "confirm"
//! bbox = "530000,180000,540000,190000"
//! feature_types = ["SL", "LB"]
//! box_size = 2000
//! ```

use std::{collections::BTreeMap, num::NonZeroU32};

use assetgrid_core::{BoundingBox, Source};
use assetgrid_data::{AreaLookup, DEFAULT_MAPIT_URL};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use serde::Deserialize;

use crate::CliError;

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct LayersFile {
    #[serde(default)]
    pub(crate) sources: BTreeMap<String, Source>,
    #[serde(default)]
    pub(crate) mapit: MapitSettings,
    #[serde(default)]
    pub(crate) layers: Vec<Layer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MapitSettings {
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    #[serde(default)]
    pub(crate) url: Option<String>,
}

impl MapitSettings {
    pub(crate) fn url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_MAPIT_URL)
    }
}

/// One output file and the search that fills it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Layer {
    pub(crate) output: String,
    pub(crate) source: String,
    #[serde(default)]
    pub(crate) bbox: Option<String>,
    #[serde(default)]
    pub(crate) mapit_id: Option<u64>,
    #[serde(default)]
    pub(crate) feature_types: Vec<String>,
    #[serde(default)]
    pub(crate) box_size: Option<NonZeroU32>,
}

/// Where a layer's search region comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Extent {
    Literal(BoundingBox),
    Area(u64),
}

impl Layer {
    /// The layer's region, preferring a MapIt area over a literal box.
    pub(crate) fn extent(&self) -> Result<Extent, CliError> {
        if let Some(area_id) = self.mapit_id {
            return Ok(Extent::Area(area_id));
        }
        let text = self.bbox.as_deref().ok_or_else(|| CliError::MissingExtent {
            output: self.output.clone(),
        })?;
        text.parse()
            .map(Extent::Literal)
            .map_err(|source| CliError::InvalidBbox {
                output: self.output.clone(),
                source,
            })
    }
}

impl LayersFile {
    /// Parse a layers file from TOML text.
    pub(crate) fn parse(path: &Utf8Path, text: &str) -> Result<Self, CliError> {
        toml::from_str(text).map_err(|source| CliError::ParseLayers {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse the layers file at `path`.
    pub(crate) fn load(path: &Utf8Path) -> Result<Self, CliError> {
        let text = read_utf8(path).map_err(|source| CliError::ReadLayers {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Check the references of `layers` before any network traffic.
    pub(crate) fn validate(&self, layers: &[&Layer]) -> Result<(), CliError> {
        for layer in layers {
            self.source_for(layer)?;
            layer.extent()?;
        }
        Ok(())
    }

    /// Layers to fetch, optionally restricted to the one writing `output`.
    pub(crate) fn selected(&self, output: Option<&str>) -> Result<Vec<&Layer>, CliError> {
        let Some(wanted) = output else {
            return Ok(self.layers.iter().collect());
        };
        let matching: Vec<&Layer> = self
            .layers
            .iter()
            .filter(|layer| layer.output == wanted)
            .collect();
        if matching.is_empty() {
            return Err(CliError::UnknownLayer {
                output: wanted.to_owned(),
            });
        }
        Ok(matching)
    }

    pub(crate) fn source_for(&self, layer: &Layer) -> Result<&Source, CliError> {
        self.sources
            .get(&layer.source)
            .ok_or_else(|| CliError::UnknownSource {
                output: layer.output.clone(),
                source_name: layer.source.clone(),
            })
    }

    /// Resolve a layer's region to a concrete box.
    pub(crate) fn bbox_for(
        &self,
        layer: &Layer,
        areas: &dyn AreaLookup,
    ) -> Result<BoundingBox, CliError> {
        match layer.extent()? {
            Extent::Literal(bbox) => Ok(bbox),
            Extent::Area(area_id) => areas
                .bbox(area_id, self.mapit.api_key.as_deref())
                .map_err(|source| CliError::AreaLookup {
                    output: layer.output.clone(),
                    source,
                }),
        }
    }
}

fn read_utf8(path: &Utf8Path) -> std::io::Result<String> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| std::io::Error::other("layers path should include a file name"))?;
    let dir = fs_utf8::Dir::open_ambient_dir(&parent, ambient_authority())?;
    dir.read_to_string(name)
}
