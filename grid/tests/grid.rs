use uhi_greening_core::{
    BoundingBox, CellBounds, CellId, EngineError, GeoPoint, InputError, MAX_GRID_SIZE,
};
use uhi_greening_grid::{query, Grid};

fn unit_square() -> BoundingBox {
    BoundingBox::new(0.0, 0.0, 1.0, 1.0).expect("unit square is valid")
}

#[test]
fn unit_square_splits_into_four_half_degree_cells() {
    let grid = Grid::build(unit_square(), 2).expect("grid builds");

    let ids: Vec<u32> = grid.cells().iter().map(|cell| cell.id().get()).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);

    let bounds: Vec<CellBounds> = grid.cells().iter().map(|cell| cell.bounds()).collect();
    assert_eq!(
        bounds,
        vec![
            CellBounds::new(0.0, 0.0, 0.5, 0.5),
            CellBounds::new(0.0, 0.5, 0.5, 1.0),
            CellBounds::new(0.5, 0.0, 1.0, 0.5),
            CellBounds::new(0.5, 0.5, 1.0, 1.0),
        ],
        "identifiers must follow the x-outer, y-inner scan",
    );

    for cell in grid.cells() {
        assert!((cell.bounds().area() - 0.25).abs() < f64::EPSILON);
    }
    assert!((query::covered_area(&grid) - 1.0).abs() < 1e-12);
}

#[test]
fn cell_count_is_grid_size_squared() {
    let bbox = BoundingBox::new(-74.02, 40.70, -73.93, 40.80).expect("valid bbox");
    for grid_size in [1, 3, 7, 20] {
        let grid = Grid::build(bbox, grid_size).expect("grid builds");
        assert_eq!(grid.len(), (grid_size * grid_size) as usize);
        assert_eq!(grid.grid_size(), grid_size);
    }
}

#[test]
fn cells_tile_the_bounding_box() {
    let bbox = BoundingBox::new(-74.02, 40.70, -73.93, 40.80).expect("valid bbox");
    let grid = Grid::build(bbox, 13).expect("grid builds");

    let relative_error = (query::covered_area(&grid) - bbox.area()).abs() / bbox.area();
    assert!(relative_error < 1e-9, "area mismatch: {relative_error}");

    let size = grid.grid_size() as usize;
    for (index, cell) in grid.cells().iter().enumerate() {
        let bounds = cell.bounds();
        assert!(bounds.min_x < bounds.max_x && bounds.min_y < bounds.max_y);
        assert!(bounds.min_x >= bbox.min_x() && bounds.max_x <= bbox.max_x());
        assert!(bounds.min_y >= bbox.min_y() && bounds.max_y <= bbox.max_y());

        let y_index = index % size;
        if y_index + 1 < size {
            let above = grid.cells()[index + 1].bounds();
            assert_eq!(bounds.max_y, above.min_y, "gap or overlap along y");
            assert_eq!(bounds.min_x, above.min_x);
        }
        if index + size < grid.len() {
            let east = grid.cells()[index + size].bounds();
            assert_eq!(bounds.max_x, east.min_x, "gap or overlap along x");
            assert_eq!(bounds.min_y, east.min_y);
        }
    }

    let last = grid.cells()[grid.len() - 1].bounds();
    assert_eq!(last.max_x, bbox.max_x());
    assert_eq!(last.max_y, bbox.max_y());
}

#[test]
fn identifiers_are_stable_across_builds() {
    let bbox = BoundingBox::new(10.0, 20.0, 10.5, 20.25).expect("valid bbox");
    let first = Grid::build(bbox, 9).expect("grid builds");
    let second = Grid::build(bbox, 9).expect("grid builds");
    assert_eq!(first, second);

    for (index, cell) in first.cells().iter().enumerate() {
        assert_eq!(cell.id().index(), index);
    }
}

#[test]
fn zero_grid_size_is_rejected() {
    let error = Grid::build(unit_square(), 0).expect_err("zero cells per axis must fail");
    assert_eq!(
        error,
        EngineError::InvalidInput(InputError::GridSizeTooSmall { grid_size: 0 })
    );
}

#[test]
fn oversized_grid_is_rejected_before_allocating() {
    for grid_size in [MAX_GRID_SIZE + 1, 60_000, u32::MAX] {
        let error = Grid::build(unit_square(), grid_size).expect_err("oversized grid must fail");
        assert_eq!(
            error,
            EngineError::InvalidInput(InputError::GridSizeTooLarge {
                grid_size,
                max_grid_size: MAX_GRID_SIZE,
            })
        );
    }
}

#[test]
fn largest_grid_size_is_accepted() {
    let grid = Grid::build(unit_square(), MAX_GRID_SIZE).expect("maximum grid builds");
    assert_eq!(grid.len(), (MAX_GRID_SIZE * MAX_GRID_SIZE) as usize);
}

#[test]
fn query_helpers_expose_cells_and_centroids() {
    let grid = Grid::build(unit_square(), 2).expect("grid builds");

    let cell = query::cell(&grid, CellId::new(2)).expect("cell 2 exists");
    assert_eq!(cell.centroid(), GeoPoint::new(0.75, 0.25));
    assert!(query::cell(&grid, CellId::new(4)).is_none());

    let centroids = query::centroids(&grid);
    assert_eq!(
        centroids,
        vec![
            GeoPoint::new(0.25, 0.25),
            GeoPoint::new(0.25, 0.75),
            GeoPoint::new(0.75, 0.25),
            GeoPoint::new(0.75, 0.75),
        ]
    );
}
