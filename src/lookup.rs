//! Collision lookup grid: a uniform 2D cell grid over the XZ footprint of
//! the collision set, mapping each cell to the polyhedra that may touch it.
//!
//! The grid is a derived acceleration structure: it is never supplied by a
//! user and must be rebuilt deterministically on every export. Within one
//! cell, polyhedron indices keep their input order so that re-running the
//! builder on the same input produces a byte-identical index stream.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{EncodeError, CELL_SIZE_MAX, CELL_SIZE_MIN};
use crate::geom::Rect;

/// Historical default cell edge length, world units.
pub const DEFAULT_CELL_SIZE: f32 = 1024.0;

/// Ceiling on `cols * rows`, checked before the cell array is allocated so
/// a tiny cell size over a huge footprint cannot exhaust memory.
const MAX_CELLS: u64 = 1 << 22;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LookupGrid {
    pub origin_x: f32,
    pub origin_z: f32,
    pub cols: u32,
    pub rows: u32,
    pub cell_size: f32,
    /// Row-major, `cols * rows` entries; each cell lists polyhedron
    /// indices in input order.
    pub cells: Vec<Vec<u32>>,
}

impl LookupGrid {
    pub fn cell(&self, col: u32, row: u32) -> &[u32] {
        &self.cells[(row * self.cols + col) as usize]
    }
}

/// Builds the grid from per-polyhedron XZ footprints.
///
/// An empty footprint (a polyhedron whose corners could not be derived)
/// is clamped to the cell nearest the grid origin rather than rejected,
/// and a footprint reaching outside the grid is clamped to the border
/// cells. An empty input yields a one-cell grid with no entries.
pub fn build_grid(footprints: &[Rect], cell_size: f32) -> Result<LookupGrid, EncodeError> {
    if !cell_size.is_finite() || cell_size < CELL_SIZE_MIN || cell_size > CELL_SIZE_MAX {
        return Err(EncodeError::CellSizeOutOfRange(cell_size));
    }

    let bounds = footprints
        .iter()
        .fold(Rect::empty(), |acc, fp| acc.union(fp));
    let (origin_x, origin_z) = if bounds.is_empty() {
        (0.0, 0.0)
    } else {
        (bounds.min_x, bounds.min_z)
    };

    let cols = ((bounds.width() / cell_size).ceil() as u64).max(1);
    let rows = ((bounds.depth() / cell_size).ceil() as u64).max(1);
    if cols * rows > MAX_CELLS {
        return Err(EncodeError::GridTooLarge {
            cols: cols.min(u32::MAX as u64) as u32,
            rows: rows.min(u32::MAX as u64) as u32,
        });
    }
    let (cols, rows) = (cols as u32, rows as u32);

    let mut cells = vec![Vec::new(); (cols * rows) as usize];
    for (index, fp) in footprints.iter().enumerate() {
        let (c0, c1, r0, r1) = if fp.is_empty() {
            (0, 0, 0, 0)
        } else {
            (
                cell_coord(fp.min_x - origin_x, cell_size, cols),
                cell_coord(fp.max_x - origin_x, cell_size, cols),
                cell_coord(fp.min_z - origin_z, cell_size, rows),
                cell_coord(fp.max_z - origin_z, cell_size, rows),
            )
        };
        for row in r0..=r1 {
            for col in c0..=c1 {
                cells[(row * cols + col) as usize].push(index as u32);
            }
        }
    }

    debug!(
        "lookup grid: {}x{} cells of {} units for {} footprints",
        cols,
        rows,
        cell_size,
        footprints.len()
    );

    Ok(LookupGrid {
        origin_x,
        origin_z,
        cols,
        rows,
        cell_size,
        cells,
    })
}

/// Maps a grid-relative coordinate to a cell index, clamped to the grid.
fn cell_coord(offset: f32, cell_size: f32, limit: u32) -> u32 {
    let cell = (offset / cell_size).floor();
    if cell <= 0.0 {
        0
    } else {
        (cell as u32).min(limit - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(min_x: f32, min_z: f32, max_x: f32, max_z: f32) -> Rect {
        Rect {
            min_x,
            min_z,
            max_x,
            max_z,
        }
    }

    #[test]
    fn covers_every_overlapped_cell() {
        let footprints = vec![
            rect(0.0, 0.0, 2047.0, 1023.0),   // spans 2x1 cells
            rect(100.0, 100.0, 200.0, 200.0), // inside cell (0, 0)
            rect(0.0, 0.0, 2047.0, 2047.0),   // spans all four cells
        ];
        let grid = build_grid(&footprints, 1024.0).unwrap();
        assert_eq!((grid.cols, grid.rows), (2, 2));
        assert_eq!(grid.cell(0, 0), &[0, 1, 2]);
        assert_eq!(grid.cell(1, 0), &[0, 2]);
        assert_eq!(grid.cell(0, 1), &[2]);
        assert_eq!(grid.cell(1, 1), &[2]);
    }

    #[test]
    fn no_cell_lists_a_non_overlapping_polyhedron() {
        let footprints = vec![
            rect(0.0, 0.0, 500.0, 500.0),
            rect(3000.0, 3000.0, 3500.0, 3500.0),
        ];
        let grid = build_grid(&footprints, 1024.0).unwrap();
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let cell_min_x = grid.origin_x + col as f32 * grid.cell_size;
                let cell_min_z = grid.origin_z + row as f32 * grid.cell_size;
                for &idx in grid.cell(col, row) {
                    let fp = &footprints[idx as usize];
                    assert!(
                        fp.min_x <= cell_min_x + grid.cell_size
                            && fp.max_x >= cell_min_x
                            && fp.min_z <= cell_min_z + grid.cell_size
                            && fp.max_z >= cell_min_z,
                        "cell ({col},{row}) lists non-overlapping footprint {idx}"
                    );
                }
            }
        }
    }

    #[test]
    fn deterministic_across_runs() {
        let footprints: Vec<Rect> = (0..50)
            .map(|i| {
                let x = (i as f32 * 137.0) % 5000.0;
                let z = (i as f32 * 211.0) % 5000.0;
                rect(x, z, x + 700.0, z + 300.0)
            })
            .collect();
        let a = build_grid(&footprints, 512.0).unwrap();
        let b = build_grid(&footprints, 512.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_input_yields_empty_single_cell() {
        let grid = build_grid(&[], DEFAULT_CELL_SIZE).unwrap();
        assert_eq!((grid.cols, grid.rows), (1, 1));
        assert!(grid.cell(0, 0).is_empty());
    }

    #[test]
    fn degenerate_footprint_is_clamped() {
        let footprints = vec![rect(5000.0, 5000.0, 5000.0, 5000.0), Rect::empty()];
        let grid = build_grid(&footprints, 1024.0).unwrap();
        // Point footprint lands in a cell, empty footprint clamps to (0,0).
        assert_eq!(grid.cell(0, 0), &[0, 1]);
    }

    #[test]
    fn cell_size_range_is_enforced() {
        assert_eq!(
            build_grid(&[], 100.0).unwrap_err(),
            EncodeError::CellSizeOutOfRange(100.0)
        );
        assert_eq!(
            build_grid(&[], 10000.0).unwrap_err(),
            EncodeError::CellSizeOutOfRange(10000.0)
        );
    }

    #[test]
    fn pathological_ratio_is_rejected_before_allocation() {
        let footprints = vec![rect(0.0, 0.0, 5.0e9, 5.0e9)];
        let err = build_grid(&footprints, 512.0).unwrap_err();
        assert!(matches!(err, EncodeError::GridTooLarge { .. }));
    }
}
