//! Streaming GeoJSON output for enumerated features.

use std::io::{self, BufWriter, Write};

use assetgrid_core::{BRITISH_NATIONAL_GRID, Feature, QueryError};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use log::info;
use thiserror::Error;

/// Extensions written as GeoJSON.
pub const GEOJSON_EXTENSIONS: [&str; 2] = ["geojson", "json"];

/// Errors returned by [`write_feature_collection`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteFeaturesError {
    /// The output path names a format that is not written.
    #[error("unsupported output format for {path}: expected a .geojson or .json file")]
    UnsupportedFormat {
        /// Requested output path.
        path: Utf8PathBuf,
    },
    /// Creating or writing the file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Output path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A feature could not be serialised.
    #[error("failed to serialise feature {id}: {source}")]
    Serialize {
        /// Identifier of the offending feature.
        id: String,
        /// Serialiser error.
        #[source]
        source: serde_json::Error,
    },
    /// Enumerating the features failed part-way through.
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Stream `features` into a GeoJSON `FeatureCollection` at `path`.
///
/// Parent directories are created as needed and each feature is written as
/// soon as it arrives. If the iterator yields an error, writing stops, the
/// partial file is left in place and the error is returned. On success the
/// number of features written is returned.
///
/// The collection carries a named CRS for British National Grid, matching
/// the coordinates the service reports.
///
/// # Errors
///
/// Returns [`WriteFeaturesError`] for unsupported extensions, I/O failures,
/// serialisation failures, and enumeration errors.
pub fn write_feature_collection<I>(path: &Utf8Path, features: I) -> Result<u64, WriteFeaturesError>
where
    I: IntoIterator<Item = Result<Feature, QueryError>>,
{
    let supported = path.extension().is_some_and(|ext| {
        GEOJSON_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    });
    if !supported {
        return Err(WriteFeaturesError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    let io_error = |source: io::Error| WriteFeaturesError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = create_file(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);

    write!(
        writer,
        r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::{BRITISH_NATIONAL_GRID}"}}}},"features":["#
    )
    .map_err(io_error)?;

    let mut written: u64 = 0;
    for feature in features {
        let feature = match feature {
            Ok(feature) => feature,
            Err(err) => {
                writer.flush().map_err(io_error)?;
                return Err(err.into());
            }
        };
        if written > 0 {
            writer.write_all(b",").map_err(io_error)?;
        }
        writer.write_all(b"\n").map_err(io_error)?;
        serde_json::to_writer(&mut writer, &to_geojson(&feature)).map_err(|source| {
            WriteFeaturesError::Serialize {
                id: feature.id.clone(),
                source,
            }
        })?;
        written += 1;
    }
    writer.write_all(b"\n]}\n").map_err(io_error)?;
    writer.flush().map_err(io_error)?;

    info!("wrote {written} feature(s) to {path}");
    Ok(written)
}

/// Convert a feature to its GeoJSON representation.
#[must_use]
pub fn to_geojson(feature: &Feature) -> geojson::Feature {
    geojson::Feature {
        bbox: None,
        geometry: feature
            .geometry
            .as_ref()
            .map(|geometry| geojson::Geometry::new(geojson::Value::from(&geometry.shape))),
        id: Some(geojson::feature::Id::String(feature.id.clone())),
        properties: Some((&feature.properties).into()),
        foreign_members: None,
    }
}

fn create_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other("output path should include a file name"))?;
    fs_utf8::Dir::create_ambient_dir_all(parent, ambient_authority())?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.create(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetgrid_core::{Geometry, Mapping, TransportError, Value};
    use geo::point;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("temporary directory")
    }

    fn utf8(dir: &TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("temp paths are UTF-8")
    }

    fn lamp(id: &str) -> Feature {
        let properties = Mapping::from_iter([
            ("CentralAssetId".to_owned(), Value::Text(id.to_owned())),
            ("Notes".to_owned(), Value::Null),
        ]);
        Feature::new(id, properties).with_geometry(Geometry {
            srid: BRITISH_NATIONAL_GRID,
            shape: geo::Geometry::Point(point!(x: 530_000.0, y: 180_000.0)),
        })
    }

    fn read_json(path: &Utf8Path) -> serde_json::Value {
        let text = std::fs::read_to_string(path).expect("output should exist");
        serde_json::from_str(&text).expect("output should be valid JSON")
    }

    #[rstest]
    fn writes_collection_with_crs(temp_dir: TempDir) {
        let path = utf8(&temp_dir, "nested/dir/lamps.geojson");
        let count = write_feature_collection(
            &path,
            vec![Ok(lamp("1")), Ok(Feature::new("-1", Mapping::new()))],
        )
        .expect("write should succeed");

        assert_eq!(count, 2);
        let json = read_json(&path);
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(
            json["crs"]["properties"]["name"],
            "urn:ogc:def:crs:EPSG::27700"
        );
        let features = json["features"].as_array().expect("features array");
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["id"], "1");
        assert_eq!(features[0]["geometry"]["type"], "Point");
        assert_eq!(features[0]["properties"]["Notes"], serde_json::Value::Null);
        assert_eq!(features[1]["geometry"], serde_json::Value::Null);
    }

    #[rstest]
    fn empty_input_writes_empty_collection(temp_dir: TempDir) {
        let path = utf8(&temp_dir, "empty.json");
        let count = write_feature_collection(&path, Vec::new()).expect("write should succeed");
        assert_eq!(count, 0);
        assert_eq!(read_json(&path)["features"], serde_json::json!([]));
    }

    #[rstest]
    #[case("lamps.gpkg")]
    #[case("lamps.shp")]
    #[case("lamps")]
    fn rejects_other_formats(temp_dir: TempDir, #[case] name: &str) {
        let path = utf8(&temp_dir, name);
        let err = write_feature_collection(&path, Vec::new()).expect_err("format unsupported");
        assert!(matches!(err, WriteFeaturesError::UnsupportedFormat { .. }));
        assert!(!path.exists());
    }

    #[rstest]
    fn enumeration_error_is_returned_and_file_kept(temp_dir: TempDir) {
        let path = utf8(&temp_dir, "partial.geojson");
        let failure = QueryError::Transport(TransportError::Network {
            url: "https://confirm.example".to_owned(),
            message: "reset".to_owned(),
        });
        let err = write_feature_collection(&path, vec![Ok(lamp("1")), Err(failure)])
            .expect_err("enumeration failed");

        assert!(matches!(err, WriteFeaturesError::Query(_)));
        let partial = std::fs::read_to_string(&path).expect("partial output is kept");
        assert!(partial.contains("\"FeatureCollection\""));
    }
}
