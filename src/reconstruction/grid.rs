//! Uniform rectangular grid fragmentation
//!
//! Requested row and column counts snap to the nearest divisors of the
//! source height and width, so cells tile the canvas exactly.

use crate::color::argb::Argb;
use crate::io::error::{Result, invalid_parameter};
use crate::matching::tile::Fragment;
use crate::raster::canvas;
use crate::reconstruction::reconstructor::{Reconstructor, percent_of};
use image::RgbaImage;
use ndarray::Array2;

/// Divisor of `value` closest to `wanted`, preferring the larger one on ties
///
/// `wanted` is clamped to `1..=value` first. Returns 0 only for `value == 0`.
pub fn nearest_divisor(value: u32, wanted: u32) -> u32 {
    if value == 0 {
        return 0;
    }
    let wanted = wanted.clamp(1, value);
    for offset in 0..value {
        if let Some(above) = wanted.checked_add(offset).filter(|&above| above <= value) {
            if value % above == 0 {
                return above;
            }
        }
        if let Some(below) = wanted.checked_sub(offset).filter(|&below| below >= 1) {
            if value % below == 0 {
                return below;
            }
        }
    }
    1
}

/// Cell geometry of a source image with precomputed cell averages
#[derive(Debug, Clone)]
pub struct RectGrid {
    rows: u32,
    columns: u32,
    cell_width: u32,
    cell_height: u32,
    averages: Array2<Argb>,
}

impl RectGrid {
    /// Split `source` into roughly `rows` by `columns` equal cells
    ///
    /// # Errors
    ///
    /// Returns an error if `rows` or `columns` is zero or the source is empty.
    pub fn new(source: &RgbaImage, rows: u32, columns: u32) -> Result<Self> {
        if rows == 0 {
            return Err(invalid_parameter("rows", &rows, &"must be positive"));
        }
        if columns == 0 {
            return Err(invalid_parameter("columns", &columns, &"must be positive"));
        }
        if source.width() == 0 || source.height() == 0 {
            return Err(invalid_parameter(
                "source",
                &format!("{}x{}", source.width(), source.height()),
                &"source image must not be empty",
            ));
        }

        let actual_rows = nearest_divisor(source.height(), rows);
        let actual_columns = nearest_divisor(source.width(), columns);
        let cell_width = source.width() / actual_columns;
        let cell_height = source.height() / actual_rows;

        let averages = Array2::from_shape_fn(
            (actual_rows as usize, actual_columns as usize),
            |(row, column)| {
                canvas::region_average(
                    source,
                    column as u32 * cell_width,
                    row as u32 * cell_height,
                    cell_width,
                    cell_height,
                )
                .unwrap_or(0)
            },
        );

        tracing::debug!(
            requested_rows = rows,
            requested_columns = columns,
            rows = actual_rows,
            columns = actual_columns,
            cell_width,
            cell_height,
            "grid geometry"
        );

        Ok(Self {
            rows: actual_rows,
            columns: actual_columns,
            cell_width,
            cell_height,
            averages,
        })
    }

    /// Actual number of rows
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Actual number of columns
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Cell width in pixels
    pub const fn cell_width(&self) -> u32 {
        self.cell_width
    }

    /// Cell height in pixels
    pub const fn cell_height(&self) -> u32 {
        self.cell_height
    }

    /// Canvas width in pixels
    pub const fn width(&self) -> u32 {
        self.columns * self.cell_width
    }

    /// Canvas height in pixels
    pub const fn height(&self) -> u32 {
        self.rows * self.cell_height
    }

    /// Total number of cells
    pub const fn cell_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Average colour of a cell
    pub fn average(&self, row: u32, column: u32) -> Option<Argb> {
        self.averages.get((row as usize, column as usize)).copied()
    }

    /// Row and column of the cell at a row-major index
    pub const fn position(&self, index: usize) -> (u32, u32) {
        let columns = self.columns as usize;
        ((index / columns) as u32, (index % columns) as u32)
    }

    /// Top-left pixel of a cell
    pub const fn origin(&self, row: u32, column: u32) -> (u32, u32) {
        (column * self.cell_width, row * self.cell_height)
    }

    /// Cell fragment in the given colour
    pub const fn cell_fragment(&self, color: Argb) -> Fragment {
        Fragment::new(self.cell_width, self.cell_height, color)
    }
}

/// Row-major fill cursor over a grid, owning the result canvas
///
/// Shared by every reconstructor that supplies one image per grid cell.
#[derive(Debug)]
pub struct GridFill {
    grid: RectGrid,
    canvas: Option<RgbaImage>,
    filled: usize,
}

impl GridFill {
    /// Start filling an empty canvas covering the grid
    pub fn new(grid: RectGrid) -> Self {
        let canvas = RgbaImage::new(grid.width(), grid.height());
        Self::with_canvas(grid, canvas)
    }

    /// Start filling over an existing background
    pub fn with_canvas(grid: RectGrid, canvas: RgbaImage) -> Self {
        Self {
            grid,
            canvas: Some(canvas),
            filled: 0,
        }
    }

    /// Underlying grid
    pub const fn grid(&self) -> &RectGrid {
        &self.grid
    }

    /// Cell waiting for an image
    pub fn pending_cell(&self) -> Option<(u32, u32)> {
        (self.filled < self.grid.cell_count()).then(|| self.grid.position(self.filled))
    }

    /// Number of cells filled so far
    pub const fn filled(&self) -> usize {
        self.filled
    }

    /// Let `draw` paint the pending cell onto the canvas, then advance
    ///
    /// Returns false without drawing when no cell is pending or the canvas
    /// was already taken.
    pub fn fill_with<F>(&mut self, draw: F) -> bool
    where
        F: FnOnce(&RectGrid, &mut RgbaImage, u32, u32),
    {
        let Some((row, column)) = self.pending_cell() else {
            return false;
        };
        let Some(canvas) = self.canvas.as_mut() else {
            return false;
        };
        draw(&self.grid, canvas, row, column);
        self.filled += 1;
        true
    }

    /// Whether every cell was filled
    pub const fn has_all(&self) -> bool {
        self.filled >= self.grid.cell_count()
    }

    /// Hand over the canvas once complete
    pub fn take(&mut self) -> Option<RgbaImage> {
        if self.has_all() { self.canvas.take() } else { None }
    }

    /// Completion estimate
    pub fn percent(&self) -> u8 {
        percent_of(self.filled, self.grid.cell_count())
    }
}

/// Pastes one supplied image per grid cell, row by row
#[derive(Debug)]
pub struct RectReconstructor {
    fill: GridFill,
}

impl RectReconstructor {
    /// Grid reconstructor over `source` with roughly `rows` by `columns` cells
    ///
    /// # Errors
    ///
    /// Returns an error if the grid parameters are invalid.
    pub fn new(source: &RgbaImage, rows: u32, columns: u32) -> Result<Self> {
        Ok(Self {
            fill: GridFill::new(RectGrid::new(source, rows, columns)?),
        })
    }

    /// Underlying grid
    pub const fn grid(&self) -> &RectGrid {
        self.fill.grid()
    }
}

impl Reconstructor for RectReconstructor {
    fn next_fragment(&mut self) -> Result<Option<Fragment>> {
        let grid = self.fill.grid();
        Ok(self.fill.pending_cell().map(|(row, column)| {
            grid.cell_fragment(grid.average(row, column).unwrap_or(0))
        }))
    }

    fn give_next(&mut self, image: &RgbaImage) -> bool {
        let grid = self.fill.grid();
        if image.width() != grid.cell_width() || image.height() != grid.cell_height() {
            return false;
        }
        self.fill.fill_with(|grid, canvas, row, column| {
            let (x, y) = grid.origin(row, column);
            canvas::paste(canvas, image, i64::from(x), i64::from(y));
        })
    }

    fn has_all(&self) -> bool {
        self.fill.has_all()
    }

    fn take_reconstructed(&mut self) -> Option<RgbaImage> {
        self.fill.take()
    }

    fn estimated_progress_percent(&self) -> u8 {
        self.fill.percent()
    }
}
