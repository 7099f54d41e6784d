#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Request-scoped grid of cells covering a bounding box.

use uhi_greening_core::{
    BoundingBox, Cell, CellBounds, CellId, EngineError, InputError, MAX_GRID_SIZE,
};

/// Ordered set of cells tiling a bounding box without gaps or overlaps.
///
/// Cells are stored in identifier order, so `cells()[i].id().index() == i`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    bounding_box: BoundingBox,
    grid_size: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Subdivides `bounding_box` into `grid_size × grid_size` equal cells.
    ///
    /// `grid_size` must lie in `1..=MAX_GRID_SIZE`.
    ///
    /// The outer loop walks the x intervals and the inner loop the y
    /// intervals, so the cell at x interval `i` and y interval `j` receives
    /// identifier `i * grid_size + j`. Signal arrays rely on this order.
    pub fn build(bounding_box: BoundingBox, grid_size: u32) -> Result<Self, EngineError> {
        if grid_size < 1 {
            return Err(InputError::GridSizeTooSmall { grid_size }.into());
        }
        if grid_size > MAX_GRID_SIZE {
            return Err(InputError::GridSizeTooLarge {
                grid_size,
                max_grid_size: MAX_GRID_SIZE,
            }
            .into());
        }
        let cell_count = grid_size * grid_size;

        let xs = axis_edges(bounding_box.min_x(), bounding_box.max_x(), grid_size);
        let ys = axis_edges(bounding_box.min_y(), bounding_box.max_y(), grid_size);

        let mut cells = Vec::with_capacity(cell_count as usize);
        for x_index in 0..grid_size {
            let (x0, x1) = (xs[x_index as usize], xs[x_index as usize + 1]);
            for y_index in 0..grid_size {
                let (y0, y1) = (ys[y_index as usize], ys[y_index as usize + 1]);
                let id = CellId::new(x_index * grid_size + y_index);
                cells.push(Cell::new(id, CellBounds::new(x0, y0, x1, y1)));
            }
        }

        log::debug!(
            "built {grid_size}x{grid_size} grid ({} cells) over [{}, {}, {}, {}]",
            cells.len(),
            bounding_box.min_x(),
            bounding_box.min_y(),
            bounding_box.max_x(),
            bounding_box.max_y(),
        );

        Ok(Self {
            bounding_box,
            grid_size,
            cells,
        })
    }

    /// Area of interest the grid covers.
    #[must_use]
    pub const fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Number of cells along each axis.
    #[must_use]
    pub const fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Cells in identifier order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid holds no cells. Built grids always hold at least one.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Evenly spaced interval edges from `min` to `max`, ending exactly at `max`.
fn axis_edges(min: f64, max: f64, divisions: u32) -> Vec<f64> {
    let step = (max - min) / f64::from(divisions);
    let mut edges: Vec<f64> = (0..divisions)
        .map(|index| min + f64::from(index) * step)
        .collect();
    edges.push(max);
    edges
}

/// Read-only helpers over a built [`Grid`].
pub mod query {
    use uhi_greening_core::{Cell, CellId, GeoPoint};

    use super::Grid;

    /// Looks up a cell by identifier.
    #[must_use]
    pub fn cell(grid: &Grid, id: CellId) -> Option<&Cell> {
        grid.cells.get(id.index())
    }

    /// Centroid of every cell, index-aligned with the grid.
    #[must_use]
    pub fn centroids(grid: &Grid) -> Vec<GeoPoint> {
        grid.cells.iter().map(Cell::centroid).collect()
    }

    /// Sum of every cell's planar area in square degrees.
    #[must_use]
    pub fn covered_area(grid: &Grid) -> f64 {
        grid.cells.iter().map(|cell| cell.bounds().area()).sum()
    }
}
