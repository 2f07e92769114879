//! Tests for corner interpolation

extern crate std;

use super::test_utils::{grid_from, regular_grid, Lcg};
use crate::swath::corners::{ANTIMERIDIAN_LIMIT, DEGENERATE_LONGITUDE_THRESHOLD};
use crate::coordinate::Point;
use crate::swath::{compute_corners, Corner, CornerInterpolator, DegeneracyPolicy};

const TOLERANCE: f64 = 1e-12;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE
}

#[test]
fn test_two_by_two_grid() {
    let grid = grid_from(2, 2, &[10.0, 11.0, 10.0, 11.0], &[10.0, 10.0, 11.0, 11.0]);
    let corners = compute_corners(&grid);

    // The single interior vertex is shared by all four cells
    let shared = [
        corners.corner(Corner::NE, 0),
        corners.corner(Corner::NW, 1),
        corners.corner(Corner::SE, 2),
        corners.corner(Corner::SW, 3),
    ];
    for point in shared {
        std::assert!(close(point.lon, 10.5) && close(point.lat, 10.5), "{:?}", point);
    }

    // Outer vertices come from reflection, e.g. the SW corner of cell 0
    let sw = corners.corner(Corner::SW, 0);
    std::assert!(close(sw.lon, 9.5) && close(sw.lat, 9.5));
    let se = corners.corner(Corner::SE, 0);
    std::assert!(close(se.lon, 10.5) && close(se.lat, 9.5));

    for index in 0..4 {
        for corner in Corner::ALL {
            let point = corners.corner(corner, index);
            let near = |v: f64| (v - 10.0).abs() <= 0.6 || (v - 11.0).abs() <= 0.6;
            std::assert!(near(point.lon) && near(point.lat), "{:?}", point);
        }
    }
}

#[test]
fn test_interior_continuity() {
    let mut rng = Lcg::new(7);
    let rows = 6;
    let columns = 7;
    let mut longitudes = Vec::new();
    let mut latitudes = Vec::new();
    for row in 0..rows {
        for column in 0..columns {
            longitudes.push(-120.0 + column as f64 * 0.1 + rng.next() * 0.02);
            latitudes.push(45.0 + row as f64 * 0.1 + rng.next() * 0.02);
        }
    }
    let grid = grid_from(rows, columns, &longitudes, &latitudes);
    let corners = compute_corners(&grid);

    for row in 0..rows - 1 {
        for column in 0..columns - 1 {
            let here = grid.index(row, column);
            let ne = corners.corner(Corner::NE, here);
            let nw = corners.corner(Corner::NW, grid.index(row, column + 1));
            let se = corners.corner(Corner::SE, grid.index(row + 1, column));
            let sw = corners.corner(Corner::SW, grid.index(row + 1, column + 1));
            for other in [nw, se, sw] {
                std::assert!(close(ne.lon, other.lon) && close(ne.lat, other.lat));
            }
        }
    }
}

#[test]
fn test_degenerate_grid_copies_centers() {
    let grid = regular_grid(1, 5, 20.0, -10.0, 0.5);
    let corners = compute_corners(&grid);
    for index in 0..5 {
        for corner in Corner::ALL {
            std::assert_eq!(corners.corner(corner, index), grid.center(0, index));
        }
    }

    let column = regular_grid(4, 1, 20.0, -10.0, 0.5);
    let corners = compute_corners(&column);
    std::assert_eq!(corners.shape(), (4, 1));
    std::assert_eq!(corners.corner(Corner::NE, 3), column.center(3, 0));
}

#[test]
fn test_antimeridian_sign_invariant() {
    let lons = [178.6, 179.2, 179.8, -179.6, -179.0];
    let rows = 3;
    let columns = lons.len();
    let mut longitudes = Vec::new();
    let mut latitudes = Vec::new();
    for row in 0..rows {
        for lon in lons {
            longitudes.push(lon);
            latitudes.push(60.0 + row as f64 * 0.4);
        }
    }
    let grid = grid_from(rows, columns, &longitudes, &latitudes);
    let corners = compute_corners(&grid);

    for index in 0..grid.len() {
        let center = grid.longitude(index);
        if center.abs() <= 179.0 {
            continue;
        }
        for corner in Corner::ALL {
            let lon = corners.corner(corner, index).lon;
            std::assert_eq!(lon < 0.0, center < 0.0, "center {} corner {}", center, lon);
            std::assert!(lon.abs() <= ANTIMERIDIAN_LIMIT);
        }
    }

    // Averaging across the line stays on the near side instead of collapsing to ~0
    let cell = grid.index(1, 2);
    let ne = corners.corner(Corner::NE, cell).lon;
    std::assert!(ne > 179.0, "{}", ne);
}

#[test]
fn test_coarse_grid_straddling_antimeridian() {
    // Two degree spacing: the lower-left center of the interior vertex sits
    // outside the margin while its eastern neighbours are inside it
    let grid = grid_from(2, 2, &[178.5, -179.5, 178.5, -179.5], &[0.0, 0.0, 2.0, 2.0]);
    let corners = compute_corners(&grid);

    let east = grid.index(0, 1);
    std::assert_eq!(corners.corner(Corner::NW, east), Point::new(-ANTIMERIDIAN_LIMIT, 1.0));
    for corner in Corner::ALL {
        let lon = corners.corner(corner, east).lon;
        std::assert!(lon <= -179.0, "{:?} {}", corner, lon);
    }
}

#[test]
fn test_distant_corners_collapse_to_center() {
    // A 10 degree jump in the middle column mimics a projection artifact
    let lons = [0.0, 0.1, 10.0, 0.3];
    let mut longitudes = Vec::new();
    let mut latitudes = Vec::new();
    for row in 0..3 {
        for lon in lons {
            longitudes.push(lon);
            latitudes.push(row as f64 * 0.1);
        }
    }
    let grid = grid_from(3, 4, &longitudes, &latitudes);

    let collapsed = compute_corners(&grid);
    let index = grid.index(1, 2);
    for corner in Corner::ALL {
        std::assert_eq!(collapsed.corner(corner, index), grid.center(1, 2));
    }

    // Every surviving corner stays within the threshold of its center
    for index in 0..grid.len() {
        for corner in Corner::ALL {
            let lon = collapsed.corner(corner, index).lon;
            std::assert!((lon - grid.longitude(index)).abs() <= DEGENERATE_LONGITUDE_THRESHOLD);
        }
    }

    let kept = CornerInterpolator::new(DegeneracyPolicy::RejectCoincident { tolerance: 0.0 }).compute(&grid);
    std::assert!(kept.corner(Corner::SW, index) != grid.center(1, 2));
}

#[test]
fn test_results_are_clamped() {
    let grid = grid_from(2, 2, &[0.0, 1.0, 0.0, 1.0], &[89.6, 89.6, 89.9, 89.9]);
    let corners = compute_corners(&grid);
    for index in 0..4 {
        for corner in Corner::ALL {
            let point = corners.corner(corner, index);
            std::assert!(point.lat <= 90.0 && point.lat >= -90.0);
        }
    }
    std::assert_eq!(corners.corner(Corner::NE, 3).lat, 90.0);
}

#[test]
fn test_policy_names() {
    std::assert_eq!(DegeneracyPolicy::from_name("collapse"), Some(DegeneracyPolicy::CollapseDistant));
    std::assert_eq!(
        DegeneracyPolicy::from_name("Coincident"),
        Some(DegeneracyPolicy::RejectCoincident { tolerance: 0.0 })
    );
    std::assert_eq!(
        DegeneracyPolicy::from_name("coincident:1e-9"),
        Some(DegeneracyPolicy::RejectCoincident { tolerance: 1e-9 })
    );
    std::assert_eq!(DegeneracyPolicy::from_name("coincident:-1"), None);
    std::assert_eq!(DegeneracyPolicy::from_name("other"), None);
}
