//! Cell-corner geolocation
//!
//! Swath products only carry pixel centers. Corners are derived on a
//! (rows + 1) x (columns + 1) lattice of vertices shared between cells:
//!
//! - interior vertices are the mean of the four surrounding centers,
//! - edge vertices reflect the nearest interior vertex through the midpoint
//!   of the two adjacent edge centers,
//! - the four outer vertices reflect the diagonal interior vertex through
//!   the corner center.
//!
//! Cell (r, c) takes SW = V[r][c], SE = V[r][c+1], NW = V[r+1][c] and
//! NE = V[r+1][c+1]. Averaging order, the reflection formula and the
//! constants below fix the output bit-for-bit.

use log::debug;
use rayon::prelude::*;

use crate::coordinate::Point;

use super::grid::Grid;

/// Centers closer than this to +/-180 degrees get antimeridian handling
pub const ANTIMERIDIAN_MARGIN: f64 = 1.0;

/// Corner longitudes of antimeridian cells are clamped to +/- this value
pub const ANTIMERIDIAN_LIMIT: f64 = 179.99;

/// Corners further than this many degrees of longitude from the center mark a bad cell
pub const DEGENERATE_LONGITUDE_THRESHOLD: f64 = 3.0;

/// The four corners of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    SW,
    SE,
    NW,
    NE,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::SW, Corner::SE, Corner::NW, Corner::NE];

    fn ordinal(&self) -> usize {
        match self {
            Corner::SW => 0,
            Corner::SE => 1,
            Corner::NW => 2,
            Corner::NE => 3,
        }
    }
}

/// How cells with implausible corners are treated
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DegeneracyPolicy {
    /// Collapse all four corners onto the center when any corner longitude
    /// lies more than [`DEGENERATE_LONGITUDE_THRESHOLD`] from it
    CollapseDistant,
    /// Keep corners as computed and reject, during filtering, any cell with a
    /// corner coinciding with its center or with another corner.
    /// `tolerance` 0.0 means exact floating-point equality.
    RejectCoincident { tolerance: f64 },
}

impl Default for DegeneracyPolicy {
    fn default() -> Self {
        DegeneracyPolicy::CollapseDistant
    }
}

impl DegeneracyPolicy {
    /// Parse "collapse" or "coincident[:tolerance]"
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        if name == "collapse" {
            return Some(DegeneracyPolicy::CollapseDistant);
        }

        let rest = name.strip_prefix("coincident")?;
        if rest.is_empty() {
            return Some(DegeneracyPolicy::RejectCoincident { tolerance: 0.0 });
        }
        let tolerance = rest.strip_prefix(':')?.parse::<f64>().ok()?;
        if tolerance < 0.0 {
            return None;
        }
        Some(DegeneracyPolicy::RejectCoincident { tolerance })
    }
}

/// Corner coordinates of every cell of a grid
#[derive(Debug, Clone, PartialEq)]
pub struct CornerSet {
    rows: usize,
    columns: usize,
    longitudes: [Vec<f64>; 4],
    latitudes: [Vec<f64>; 4],
}

impl CornerSet {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    /// All longitudes of one corner, row-major
    pub fn longitudes(&self, corner: Corner) -> &[f64] {
        &self.longitudes[corner.ordinal()]
    }

    /// All latitudes of one corner, row-major
    pub fn latitudes(&self, corner: Corner) -> &[f64] {
        &self.latitudes[corner.ordinal()]
    }

    #[inline]
    pub fn corner(&self, corner: Corner, index: usize) -> Point {
        Point::new(
            self.longitudes[corner.ordinal()][index],
            self.latitudes[corner.ordinal()][index],
        )
    }

    /// Corner coordinates of one cell in wire order:
    /// SW, SE, NW, NE longitudes then SW, SE, NW, NE latitudes
    #[inline]
    pub fn packed(&self, index: usize) -> [f64; 8] {
        let mut packed = [0.0; 8];
        for ordinal in 0..4 {
            packed[ordinal] = self.longitudes[ordinal][index];
            packed[ordinal + 4] = self.latitudes[ordinal][index];
        }
        packed
    }

    /// Does cell `index` have a corner equal to its center or to another corner
    pub fn has_coincident_corners(&self, index: usize, center: Point, tolerance: f64) -> bool {
        let same = |a: Point, b: Point| {
            (a.lon - b.lon).abs() <= tolerance && (a.lat - b.lat).abs() <= tolerance
        };
        let corners = Corner::ALL.map(|corner| self.corner(corner, index));

        for (i, a) in corners.iter().enumerate() {
            if same(*a, center) {
                return true;
            }
            if corners[i + 1..].iter().any(|b| same(*a, *b)) {
                return true;
            }
        }
        false
    }
}

/// Derives corner sets from center grids
#[derive(Debug, Clone, Copy, Default)]
pub struct CornerInterpolator {
    policy: DegeneracyPolicy,
}

impl CornerInterpolator {
    pub fn new(policy: DegeneracyPolicy) -> Self {
        CornerInterpolator { policy }
    }

    pub fn policy(&self) -> DegeneracyPolicy {
        self.policy
    }

    /// Compute the corners of every cell of `grid`
    pub fn compute(&self, grid: &Grid) -> CornerSet {
        let (rows, columns) = grid.shape();

        let cells: Vec<[Point; 4]> = if rows < 2 || columns < 2 {
            debug!("Grid {}x{} too small to interpolate, corners equal centers", rows, columns);
            (0..grid.len())
                .map(|index| {
                    let center = Point::new(grid.longitude(index), grid.latitude(index));
                    [center; 4]
                })
                .collect()
        } else {
            let vertices = compute_vertices(grid);
            let collapse = self.policy == DegeneracyPolicy::CollapseDistant;
            let vertex_columns = columns + 1;

            (0..grid.len())
                .into_par_iter()
                .map(|index| {
                    let row = index / columns;
                    let column = index % columns;
                    let below = row * vertex_columns + column;
                    let above = below + vertex_columns;
                    let corners = [
                        vertices[below],
                        vertices[below + 1],
                        vertices[above],
                        vertices[above + 1],
                    ];
                    correct_cell(grid.center(row, column), corners, collapse)
                })
                .collect()
        };

        let mut longitudes: [Vec<f64>; 4] = Default::default();
        let mut latitudes: [Vec<f64>; 4] = Default::default();
        for ordinal in 0..4 {
            longitudes[ordinal] = cells.iter().map(|cell| cell[ordinal].lon).collect();
            latitudes[ordinal] = cells.iter().map(|cell| cell[ordinal].lat).collect();
        }

        CornerSet {
            rows,
            columns,
            longitudes,
            latitudes,
        }
    }
}

/// Corners of `grid` under the default degeneracy policy
pub fn compute_corners(grid: &Grid) -> CornerSet {
    CornerInterpolator::default().compute(grid)
}

#[inline]
fn near_antimeridian(lon: f64) -> bool {
    lon.abs() >= 180.0 - ANTIMERIDIAN_MARGIN
}

/// Shift `lon` by 360 degrees onto the side of `reference` when the reference sits at the antimeridian
#[inline]
fn align_longitude(reference: f64, lon: f64) -> f64 {
    if !near_antimeridian(reference) {
        lon
    } else if reference < 0.0 && lon > 0.0 {
        lon - 360.0
    } else if reference > 0.0 && lon < 0.0 {
        lon + 360.0
    } else {
        lon
    }
}

#[inline]
fn aligned(reference: f64, point: Point) -> Point {
    Point::new(align_longitude(reference, point.lon), point.lat)
}

/// Longitude the four centers around a vertex are aligned to
///
/// Falls back to the first center when none is near the antimeridian, in
/// which case alignment leaves every longitude as is.
fn reference_longitude(centers: &[Point; 4]) -> f64 {
    centers
        .iter()
        .map(|center| center.lon)
        .find(|&lon| near_antimeridian(lon))
        .unwrap_or(centers[0].lon)
}

/// Vertex lattice of a grid with at least two rows and columns
fn compute_vertices(grid: &Grid) -> Vec<Point> {
    let (rows, columns) = grid.shape();
    let vertex_columns = columns + 1;
    let mut vertices = vec![Point::new(0.0, 0.0); (rows + 1) * vertex_columns];

    // Interior: mean of the four surrounding centers, referenced to the first
    // of them that sits at the antimeridian
    vertices
        .par_chunks_mut(vertex_columns)
        .enumerate()
        .filter(|(i, _)| *i >= 1 && *i < rows)
        .for_each(|(i, vertex_row)| {
            for (j, vertex) in vertex_row.iter_mut().enumerate().take(columns).skip(1) {
                let centers = [
                    grid.center(i - 1, j - 1),
                    grid.center(i - 1, j),
                    grid.center(i, j - 1),
                    grid.center(i, j),
                ];
                let reference = reference_longitude(&centers);
                let [this, next_column, next_row, next_row_next_column] =
                    centers.map(|center| aligned(reference, center));
                *vertex = Point::new(
                    0.25 * (this.lon + next_column.lon + next_row.lon + next_row_next_column.lon),
                    0.25 * (this.lat + next_column.lat + next_row.lat + next_row_next_column.lat),
                )
                .clamped();
            }
        });

    let at = |i: usize, j: usize| i * vertex_columns + j;

    // Edges: reflect the adjacent interior vertex through the midpoint of the two edge centers
    for j in 1..columns {
        vertices[at(0, j)] = extrapolate(grid.center(0, j - 1), grid.center(0, j), vertices[at(1, j)]);
        vertices[at(rows, j)] = extrapolate(
            grid.center(rows - 1, j - 1),
            grid.center(rows - 1, j),
            vertices[at(rows - 1, j)],
        );
    }
    for i in 1..rows {
        vertices[at(i, 0)] = extrapolate(grid.center(i - 1, 0), grid.center(i, 0), vertices[at(i, 1)]);
        vertices[at(i, columns)] = extrapolate(
            grid.center(i - 1, columns - 1),
            grid.center(i, columns - 1),
            vertices[at(i, columns - 1)],
        );
    }

    // Outer corners: the corner center is its own midpoint
    let outer = [
        (0, 0, grid.center(0, 0), at(1, 1)),
        (0, columns, grid.center(0, columns - 1), at(1, columns - 1)),
        (rows, 0, grid.center(rows - 1, 0), at(rows - 1, 1)),
        (rows, columns, grid.center(rows - 1, columns - 1), at(rows - 1, columns - 1)),
    ];
    for (i, j, center, inner) in outer {
        vertices[at(i, j)] = extrapolate(center, center, vertices[inner]);
    }

    vertices
}

/// `midpoint + (midpoint - interpolated)` with antimeridian alignment to `a`
fn extrapolate(a: Point, b: Point, interpolated: Point) -> Point {
    let midpoint = a.midpoint(&aligned(a.lon, b));
    midpoint.reflect(&aligned(a.lon, interpolated)).clamped()
}

/// Per-cell antimeridian sign forcing and degenerate-cell collapse
fn correct_cell(center: Point, mut corners: [Point; 4], collapse: bool) -> [Point; 4] {
    if near_antimeridian(center.lon) {
        for corner in corners.iter_mut() {
            let mut lon = align_longitude(center.lon, corner.lon);
            if (lon < 0.0) != (center.lon < 0.0) {
                lon = -lon;
            }
            corner.lon = lon.clamp(-ANTIMERIDIAN_LIMIT, ANTIMERIDIAN_LIMIT);
        }
    }

    if collapse
        && corners
            .iter()
            .any(|corner| (corner.lon - center.lon).abs() > DEGENERATE_LONGITUDE_THRESHOLD)
    {
        return [center; 4];
    }

    corners
}
