//! MapIt `area/{id}/geometry` response types.
//!
//! See: <https://mapit.mysociety.org/docs/#api-by_area_id>

use assetgrid_core::BoundingBox;
use serde::Deserialize;

/// Geometry summary of one administrative area.
///
/// Only the British National Grid extent is read; MapIt also reports the
/// centroid and area, which are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AreaGeometry {
    /// Minimum easting.
    pub min_e: f64,
    /// Minimum northing.
    pub min_n: f64,
    /// Maximum easting.
    pub max_e: f64,
    /// Maximum northing.
    pub max_n: f64,
}

impl AreaGeometry {
    /// The extent as an integer box, truncating each edge towards zero.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(
            truncate(self.min_e),
            truncate(self.min_n),
            truncate(self.max_e),
            truncate(self.max_n),
        )
    }
}

/// Saturating truncation; JSON numbers are always finite.
fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}
