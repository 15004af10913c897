//! Complete enumeration of a region despite the service's result cap.
//!
//! The service returns at most [`RESULT_CAP`] records per search and gives no
//! sign that it has truncated a reply. [`enumerate`] therefore splits the
//! region into a grid, queries each cell, and whenever a cell comes back
//! exactly full it replaces that cell with a finer grid of its own, down to
//! [`MIN_TILE_SIZE`].
//!
//! The pending cells live in an explicit worklist, so arbitrarily deep
//! subdivision needs no recursion and features stream out one query at a
//! time.

use std::{collections::VecDeque, iter::FusedIterator, num::NonZeroU32, vec};

use log::info;

use crate::{AssetSearch, BoundingBox, Feature, QueryError, RESULT_CAP, Source};

/// Tile size at or below which a full page is accepted as-is.
pub const MIN_TILE_SIZE: u32 = 10;
/// Margin added around every grid cell so that assets on a shared edge are
/// seen by both neighbours.
pub const EDGE_PADDING: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tile {
    /// Grid cell, used when the tile has to be split.
    core: BoundingBox,
    /// Box actually sent to the service.
    query: BoundingBox,
    size: u32,
    depth: usize,
}

impl Tile {
    fn whole(bbox: BoundingBox) -> Self {
        Self {
            core: bbox,
            query: bbox,
            size: side(bbox),
            depth: 0,
        }
    }

    fn grid(
        bbox: BoundingBox,
        size: NonZeroU32,
        depth: usize,
    ) -> impl DoubleEndedIterator<Item = Self> {
        bbox.grid(size).into_iter().map(move |core| Self {
            core,
            query: core.padded(EDGE_PADDING),
            size: size.get().min(side(core)),
            depth,
        })
    }

    /// Whether a reply of `count` features means this tile must be split.
    const fn is_truncated(&self, count: usize) -> bool {
        count == RESULT_CAP && self.size > MIN_TILE_SIZE
    }
}

/// Longest side of `bbox`; clipped remainder cells are smaller than the step.
fn side(bbox: BoundingBox) -> u32 {
    u32::try_from(bbox.longest_side().max(0)).unwrap_or(u32::MAX)
}

/// Lazily enumerate every feature inside `bbox`.
///
/// With a `tile_size` the box is first cut into a grid of that size and each
/// cell is queried with [`EDGE_PADDING`]; without one the whole box is
/// queried as a single unpadded search whose longer side acts as its tile
/// size. Features are produced in worklist order. Nothing is deduplicated, so
/// assets inside a padding margin may appear twice.
///
/// The returned iterator performs one blocking search per cell as it is
/// driven. The first error ends the enumeration.
///
/// # Examples
/// ```
/// use std::num::NonZeroU32;
/// use assetgrid_core::{BoundingBox, Source, enumerate, test_support::StubSearch};
///
/// let search = StubSearch::new(|_| 3);
/// let source = Source::new("https://confirm.example", "u", "p", "t");
/// let features: Result<Vec<_>, _> = enumerate(
///     &search,
///     &source,
///     BoundingBox::new(0, 0, 20, 20),
///     &[],
///     NonZeroU32::new(20),
/// )
/// .collect();
/// assert_eq!(features?.len(), 3);
/// assert_eq!(search.calls(), vec![BoundingBox::new(-1, -1, 21, 21)]);
/// # Ok::<(), assetgrid_core::QueryError>(())
/// ```
pub fn enumerate<'a, S: AssetSearch>(
    search: S,
    source: &'a Source,
    bbox: BoundingBox,
    feature_types: &'a [String],
    tile_size: Option<NonZeroU32>,
) -> Enumeration<'a, S> {
    let queue = match tile_size {
        Some(size) => Tile::grid(bbox, size, 0).collect(),
        None => VecDeque::from([Tile::whole(bbox)]),
    };
    Enumeration {
        search,
        source,
        feature_types,
        queue,
        ready: Vec::new().into_iter(),
    }
}

/// Iterator returned by [`enumerate`].
#[derive(Debug)]
pub struct Enumeration<'a, S> {
    search: S,
    source: &'a Source,
    feature_types: &'a [String],
    queue: VecDeque<Tile>,
    ready: vec::IntoIter<Feature>,
}

impl<S> Enumeration<'_, S> {
    /// Number of tiles still waiting to be searched.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl<S: AssetSearch> Enumeration<'_, S> {
    fn split(&mut self, tile: Tile) {
        let size = NonZeroU32::new(tile.size.div_ceil(2)).unwrap_or(NonZeroU32::MIN);
        info!("{}Recursing to box size {size}", indent(tile.depth));
        for child in Tile::grid(tile.core, size, tile.depth + 1).rev() {
            self.queue.push_front(child);
        }
    }
}

impl<S: AssetSearch> Iterator for Enumeration<'_, S> {
    type Item = Result<Feature, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(feature) = self.ready.next() {
                return Some(Ok(feature));
            }
            let tile = self.queue.pop_front()?;
            info!(
                "{}Queue size: {}",
                indent(tile.depth),
                self.queue.len() + 1
            );
            match self
                .search
                .query_box(self.source, tile.query, self.feature_types)
            {
                Ok(features) if tile.is_truncated(features.len()) => self.split(tile),
                Ok(features) => self.ready = features.into_iter(),
                Err(err) => {
                    self.queue.clear();
                    return Some(Err(err));
                }
            }
        }
    }
}

impl<S: AssetSearch> FusedIterator for Enumeration<'_, S> {}

fn indent(depth: usize) -> String {
    "\t".repeat(depth)
}
