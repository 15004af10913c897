//! Integer bounding boxes in the service's projected coordinate system.

use std::{fmt, num::NonZeroU32, num::ParseIntError, str::FromStr};

use thiserror::Error;

/// An axis-aligned rectangle in British National Grid metres.
///
/// Boxes are plain values: splitting and padding always return new boxes.
/// Inverted or zero-area boxes are representable; callers are expected to
/// supply normalised input.
///
/// # Examples
/// ```
/// use assetgrid_core::BoundingBox;
///
/// let bbox: BoundingBox = "0,0,20,20".parse()?;
/// assert_eq!(bbox.padded(1), BoundingBox::new(-1, -1, 21, 21));
/// # Ok::<(), assetgrid_core::BoundingBoxParseError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// Minimum easting.
    pub west: i64,
    /// Minimum northing.
    pub south: i64,
    /// Maximum easting.
    pub east: i64,
    /// Maximum northing.
    pub north: i64,
}

impl BoundingBox {
    /// Construct a box from its four edges.
    #[must_use]
    pub const fn new(west: i64, south: i64, east: i64, north: i64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Extent along the x axis.
    #[must_use]
    pub const fn width(&self) -> i64 {
        self.east - self.west
    }

    /// Extent along the y axis.
    #[must_use]
    pub const fn height(&self) -> i64 {
        self.north - self.south
    }

    /// The longer of the two sides.
    #[must_use]
    pub fn longest_side(&self) -> i64 {
        self.width().max(self.height())
    }

    /// Grow the box outward by `margin` on every side.
    #[must_use]
    pub const fn padded(self, margin: i64) -> Self {
        Self::new(
            self.west - margin,
            self.south - margin,
            self.east + margin,
            self.north + margin,
        )
    }

    /// Partition the box into a regular grid of `tile_size` cells.
    ///
    /// Cells are produced column by column (west to east, then south to north
    /// within each column). The last row and column hold whatever remainder
    /// is left, so the cells always cover the box exactly. An inverted or
    /// zero-width box yields no cells.
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroU32;
    /// use assetgrid_core::BoundingBox;
    ///
    /// let size = NonZeroU32::new(10).expect("non-zero");
    /// let cells = BoundingBox::new(0, 0, 25, 10).grid(size);
    /// assert_eq!(
    ///     cells,
    ///     vec![
    ///         BoundingBox::new(0, 0, 10, 10),
    ///         BoundingBox::new(10, 0, 20, 10),
    ///         BoundingBox::new(20, 0, 25, 10),
    ///     ]
    /// );
    /// ```
    #[must_use]
    pub fn grid(self, tile_size: NonZeroU32) -> Vec<Self> {
        let step = i64::from(tile_size.get());
        let xs = edges(self.west, self.east, step);
        let ys = edges(self.south, self.north, step);
        xs.windows(2)
            .flat_map(|x| {
                ys.windows(2).filter_map(move |y| match (x, y) {
                    ([west, east], [south, north]) => Some(Self::new(*west, *south, *east, *north)),
                    _ => None,
                })
            })
            .collect()
    }
}

/// Grid line positions from `start` towards `end`, always closed by `end`.
fn edges(start: i64, end: i64, step: i64) -> Vec<i64> {
    let mut edges = Vec::new();
    let mut edge = start;
    while edge < end {
        edges.push(edge);
        edge = edge.saturating_add(step);
    }
    edges.push(end);
    edges
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// Errors returned when parsing a `"west,south,east,north"` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundingBoxParseError {
    /// The string did not hold exactly four comma-separated values.
    #[error("expected four comma-separated coordinates, found {found}")]
    Arity {
        /// Number of values present.
        found: usize,
    },
    /// One of the values was not an integer.
    #[error("invalid coordinate {value:?}: {source}")]
    Coordinate {
        /// The offending value.
        value: String,
        /// Integer parse failure.
        #[source]
        source: ParseIntError,
    },
}

impl FromStr for BoundingBox {
    type Err = BoundingBoxParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| {
                let trimmed = part.trim();
                trimmed
                    .parse::<i64>()
                    .map_err(|source| BoundingBoxParseError::Coordinate {
                        value: trimmed.to_owned(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        match values.as_slice() {
            [west, south, east, north] => Ok(Self::new(*west, *south, *east, *north)),
            other => Err(BoundingBoxParseError::Arity { found: other.len() }),
        }
    }
}
