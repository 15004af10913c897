//! Shared fixtures for CLI tests.

use std::cell::RefCell;

use assetgrid_core::BoundingBox;
use assetgrid_data::{AreaLookup, AreaLookupError};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

pub(super) const LAYERS_TOML: &str = r#"
[sources.confirm]
url = "https://confirm.example/connector"
user = "svc"
password = "s3cret"
tenant = "LIVE"

[mapit]
api_key = "key123"

[[layers]]
output = "lights.geojson"
source = "confirm"
bbox = "0,0,20,20"
feature_types = ["SL"]
box_size = 20

[[layers]]
output = "ward/signs.geojson"
source = "confirm"
mapit_id = 2514
feature_types = ["SG", "SP"]
"#;

/// A temporary directory addressed through UTF-8 paths.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    pub(super) fn read_json(&self, name: &str) -> serde_json::Value {
        let text = std::fs::read_to_string(self.root.join(name)).expect("output should exist");
        serde_json::from_str(&text).expect("output should be JSON")
    }
}

/// Area lookup answering every request with the same box.
pub(super) struct FixedArea {
    bbox: BoundingBox,
    requests: RefCell<Vec<(u64, Option<String>)>>,
}

impl FixedArea {
    pub(super) const fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub(super) fn requests(&self) -> Vec<(u64, Option<String>)> {
        self.requests.borrow().clone()
    }
}

impl AreaLookup for FixedArea {
    fn bbox(&self, area_id: u64, api_key: Option<&str>) -> Result<BoundingBox, AreaLookupError> {
        self.requests
            .borrow_mut()
            .push((area_id, api_key.map(str::to_owned)));
        Ok(self.bbox)
    }
}

/// Area lookup that always fails.
pub(super) struct FailingArea;

impl AreaLookup for FailingArea {
    fn bbox(&self, area_id: u64, _api_key: Option<&str>) -> Result<BoundingBox, AreaLookupError> {
        Err(AreaLookupError::Http {
            url: format!("https://mapit.example/area/{area_id}/geometry"),
            status: 404,
            message: "not found".to_owned(),
        })
    }
}
