//! Jigsaw reconstruction with interlocking pieces
//!
//! Every interior edge carries a half-elliptic nose that belongs to exactly
//! one of the two pieces sharing it. A piece with a convex edge asks for a
//! larger image covering its nose; pixels are only ever painted by the
//! piece that owns them, so drawing order does not matter.

use crate::io::configuration::PUZZLE_NOSE_FRACTION;
use crate::io::error::Result;
use crate::math::sampling::RandomSelector;
use crate::matching::tile::Fragment;
use crate::raster::canvas;
use crate::reconstruction::grid::{GridFill, RectGrid};
use crate::reconstruction::reconstructor::Reconstructor;
use image::RgbaImage;
use ndarray::Array2;

/// Edge order inside [`PieceShapes::edges`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Upper edge
    Top = 0,
    /// Right edge
    Right = 1,
    /// Lower edge
    Bottom = 2,
    /// Left edge
    Left = 3,
}

/// Pixel rectangle `(x, y, width, height)` covered by a piece's image
pub type PieceBounds = (u32, u32, u32, u32);

fn set_gender(edges: &mut Array2<[i8; 4]>, cell: (usize, usize), side: Side, gender: i8) {
    if let Some(slot) = edges
        .get_mut(cell)
        .and_then(|piece| piece.get_mut(side as usize))
    {
        *slot = gender;
    }
}

/// Edge genders and nose geometry of every piece
///
/// Edge genders are `+1` for a convex nose, `-1` for a concave socket and
/// `0` on the canvas border.
#[derive(Debug, Clone)]
pub struct PieceShapes {
    edges: Array2<[i8; 4]>,
    cell_width: u32,
    cell_height: u32,
    nose_x: u32,
    nose_y: u32,
}

impl PieceShapes {
    /// Random genders for a grid, opposite across every shared edge
    pub fn random(grid: &RectGrid, selector: &mut RandomSelector) -> Self {
        let (row_count, column_count) = (grid.rows() as usize, grid.columns() as usize);
        let mut edges = Array2::from_elem((row_count, column_count), [0_i8; 4]);
        for row in 0..row_count {
            for column in 0..column_count {
                if column + 1 < column_count {
                    let gender = selector.sign();
                    set_gender(&mut edges, (row, column), Side::Right, gender);
                    set_gender(&mut edges, (row, column + 1), Side::Left, -gender);
                }
                if row + 1 < row_count {
                    let gender = selector.sign();
                    set_gender(&mut edges, (row, column), Side::Bottom, gender);
                    set_gender(&mut edges, (row + 1, column), Side::Top, -gender);
                }
            }
        }

        Self {
            edges,
            cell_width: grid.cell_width(),
            cell_height: grid.cell_height(),
            nose_x: (f64::from(grid.cell_width()) * PUZZLE_NOSE_FRACTION).round() as u32,
            nose_y: (f64::from(grid.cell_height()) * PUZZLE_NOSE_FRACTION).round() as u32,
        }
    }

    /// Edge genders of a piece in top, right, bottom, left order
    pub fn edges(&self, row: u32, column: u32) -> Option<[i8; 4]> {
        self.edges.get((row as usize, column as usize)).copied()
    }

    /// Nose depth in pixels, horizontally and vertically
    pub const fn nose_size(&self) -> (u32, u32) {
        (self.nose_x, self.nose_y)
    }

    fn gender(&self, row: u32, column: u32, side: Side) -> i8 {
        self.edges(row, column)
            .and_then(|edges| edges.get(side as usize).copied())
            .unwrap_or(0)
    }

    const fn origin(&self, row: u32, column: u32) -> (u32, u32) {
        (column * self.cell_width, row * self.cell_height)
    }

    /// Pixel rectangle of a piece including its convex noses
    pub fn bounds(&self, row: u32, column: u32) -> PieceBounds {
        let (x, y) = self.origin(row, column);
        let extend = |side: Side, amount: u32| {
            if self.gender(row, column, side) > 0 { amount } else { 0 }
        };
        let top = extend(Side::Top, self.nose_y);
        let right = extend(Side::Right, self.nose_x);
        let bottom = extend(Side::Bottom, self.nose_y);
        let left = extend(Side::Left, self.nose_x);
        (
            x - left,
            y - top,
            self.cell_width + left + right,
            self.cell_height + top + bottom,
        )
    }

    fn in_nose(&self, row: u32, column: u32, side: Side, px: u32, py: u32) -> bool {
        let (x, y) = self.origin(row, column);
        let (x, y) = (f64::from(x), f64::from(y));
        let (width, height) = (f64::from(self.cell_width), f64::from(self.cell_height));
        let (center_x, center_y) = match side {
            Side::Top => (x + width / 2.0, y),
            Side::Bottom => (x + width / 2.0, y + height),
            Side::Left => (x, y + height / 2.0),
            Side::Right => (x + width, y + height / 2.0),
        };
        canvas::in_ellipse(
            f64::from(px) + 0.5,
            f64::from(py) + 0.5,
            center_x,
            center_y,
            f64::from(self.nose_x),
            f64::from(self.nose_y),
        )
    }

    /// Whether piece `(row, column)` owns the pixel `(px, py)`
    pub fn owns(&self, row: u32, column: u32, px: u32, py: u32) -> bool {
        let (x, y) = self.origin(row, column);
        let inside_cell =
            px >= x && py >= y && px < x + self.cell_width && py < y + self.cell_height;
        let sides = [Side::Top, Side::Right, Side::Bottom, Side::Left];

        if inside_cell {
            // Sockets are covered by the neighbour's nose
            !sides.into_iter().any(|side| {
                self.gender(row, column, side) < 0 && self.in_nose(row, column, side, px, py)
            })
        } else {
            sides.into_iter().any(|side| {
                self.gender(row, column, side) > 0 && self.in_nose(row, column, side, px, py)
            })
        }
    }
}

/// Grid of jigsaw pieces
#[derive(Debug)]
pub struct PuzzleReconstructor {
    fill: GridFill,
    shapes: PieceShapes,
    source: RgbaImage,
}

impl PuzzleReconstructor {
    /// Jigsaw reconstructor over `source` with roughly `rows` by `columns` pieces
    ///
    /// # Errors
    ///
    /// Returns an error if the grid parameters are invalid.
    pub fn new(source: &RgbaImage, rows: u32, columns: u32, seed: u64) -> Result<Self> {
        let grid = RectGrid::new(source, rows, columns)?;
        let shapes = PieceShapes::random(&grid, &mut RandomSelector::new(seed));
        let (nose_x, nose_y) = shapes.nose_size();
        tracing::debug!(nose_x, nose_y, "puzzle nose size");

        Ok(Self {
            fill: GridFill::new(grid),
            shapes,
            source: source.clone(),
        })
    }

    /// Underlying grid
    pub const fn grid(&self) -> &RectGrid {
        self.fill.grid()
    }

    /// Piece geometry
    pub const fn shapes(&self) -> &PieceShapes {
        &self.shapes
    }
}

impl Reconstructor for PuzzleReconstructor {
    fn next_fragment(&mut self) -> Result<Option<Fragment>> {
        let Some((row, column)) = self.fill.pending_cell() else {
            return Ok(None);
        };
        let (x, y, width, height) = self.shapes.bounds(row, column);
        let color = canvas::region_average(&self.source, x, y, width, height).unwrap_or(0);
        Ok(Some(Fragment::new(width, height, color)))
    }

    fn give_next(&mut self, image: &RgbaImage) -> bool {
        let Some((row, column)) = self.fill.pending_cell() else {
            return false;
        };
        let (x, y, width, height) = self.shapes.bounds(row, column);
        if image.width() != width || image.height() != height {
            return false;
        }

        let shapes = &self.shapes;
        self.fill.fill_with(|_, target, row, column| {
            canvas::paste_where(target, image, i64::from(x), i64::from(y), |px, py| {
                shapes.owns(row, column, px, py)
            });
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
