//! Geographic feature records produced by asset searches.

use thiserror::Error;
use wkt::TryFromWkt;

use crate::Mapping;

/// Spatial reference identifier of British National Grid.
pub const BRITISH_NATIONAL_GRID: u32 = 27700;

/// Identifier given to features whose asset carries no central id.
pub const UNKNOWN_FEATURE_ID: &str = "-1";

/// Failure to interpret a well-known-text attribute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid well-known text {wkt:?}: {message}")]
pub struct GeometryError {
    /// The text that failed to parse.
    pub wkt: String,
    /// Parser diagnostic.
    pub message: String,
}

/// A parsed shape tagged with its spatial reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Spatial reference identifier of the coordinates.
    pub srid: u32,
    /// The shape itself.
    pub shape: geo::Geometry<f64>,
}

impl Geometry {
    /// Parse well-known text and tag it with `srid`.
    ///
    /// An `SRID=<n>;` prefix is accepted only when it repeats `srid`; the
    /// coordinates are never reinterpreted.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] when the text is not valid WKT or carries a
    /// prefix naming any other reference system.
    ///
    /// # Examples
    /// ```
    /// use assetgrid_core::{BRITISH_NATIONAL_GRID, Geometry};
    ///
    /// let point = Geometry::from_wkt("POINT (530000 180000)", BRITISH_NATIONAL_GRID)?;
    /// assert_eq!(point.srid, 27700);
    /// assert!(Geometry::from_wkt("SRID=4326;POINT (0 51)", BRITISH_NATIONAL_GRID).is_err());
    /// # Ok::<(), assetgrid_core::GeometryError>(())
    /// ```
    pub fn from_wkt(text: &str, srid: u32) -> Result<Self, GeometryError> {
        let invalid = |message: String| GeometryError {
            wkt: text.to_owned(),
            message,
        };
        let trimmed = text.trim();
        let body = match trimmed.strip_prefix("SRID=") {
            Some(rest) => {
                let (code, body) = rest
                    .split_once(';')
                    .ok_or_else(|| invalid("SRID prefix is not terminated by ';'".to_owned()))?;
                let found = code
                    .trim()
                    .parse::<u32>()
                    .map_err(|err| invalid(format!("bad SRID {code:?}: {err}")))?;
                if found != srid {
                    return Err(invalid(format!("expected SRID {srid}, found {found}")));
                }
                body
            }
            None => trimmed,
        };
        let shape = geo::Geometry::<f64>::try_from_wkt_str(body.trim())
            .map_err(|err| invalid(err.to_string()))?;
        Ok(Self { srid, shape })
    }
}

/// One asset returned by a search.
///
/// Assets without a `WKT` attribute have no geometry but keep their
/// properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Asset identifier, or [`UNKNOWN_FEATURE_ID`].
    pub id: String,
    /// Location of the asset, if it has one.
    pub geometry: Option<Geometry>,
    /// Every non-geometry attribute, verbatim and in response order.
    pub properties: Mapping,
}

impl Feature {
    /// Construct a feature with no geometry.
    #[must_use]
    pub fn new(id: impl Into<String>, properties: Mapping) -> Self {
        Self {
            id: id.into(),
            geometry: None,
            properties,
        }
    }

    /// Attach a geometry.
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Point, point};
    use rstest::rstest;

    #[rstest]
    fn parses_plain_wkt_with_default_srid() {
        let geometry = Geometry::from_wkt("POINT (530000 180000)", BRITISH_NATIONAL_GRID)
            .expect("valid point");
        assert_eq!(geometry.srid, BRITISH_NATIONAL_GRID);
        assert_eq!(
            geometry.shape,
            geo::Geometry::Point(point!(x: 530_000.0, y: 180_000.0))
        );
    }

    #[rstest]
    fn matching_srid_prefix_is_accepted() {
        let geometry =
            Geometry::from_wkt("SRID=27700;POINT(530000 180000)", BRITISH_NATIONAL_GRID)
                .expect("valid extended wkt");
        assert_eq!(geometry.srid, BRITISH_NATIONAL_GRID);
        assert_eq!(
            geometry.shape,
            geo::Geometry::Point(Point::new(530_000.0, 180_000.0))
        );
    }

    #[rstest]
    fn parses_lines() {
        let geometry = Geometry::from_wkt(
            "LINESTRING (0 0, 10 0, 10 10)",
            BRITISH_NATIONAL_GRID,
        )
        .expect("valid line");
        assert!(matches!(geometry.shape, geo::Geometry::LineString(ref line) if line.0.len() == 3));
    }

    #[rstest]
    #[case::garbage("not wkt")]
    #[case::unterminated_srid("SRID=27700 POINT (1 2)")]
    #[case::bad_srid("SRID=abc;POINT (1 2)")]
    #[case::foreign_srid("SRID=4326;POINT(-0.1 51.5)")]
    fn rejects_invalid_text(#[case] text: &str) {
        let err = Geometry::from_wkt(text, BRITISH_NATIONAL_GRID).expect_err("should fail");
        assert_eq!(err.wkt, text);
    }
}
