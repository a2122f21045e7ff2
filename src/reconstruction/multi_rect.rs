//! Grid reconstruction that merges similar neighbouring cells into blocks
//!
//! Starting at the first unused base cell, every allowed ratio grows the
//! largest multiple of itself whose cells are unused and pairwise similar.
//! The biggest block across ratios becomes the next fragment.

use crate::color::argb::{Argb, ColorAccumulator};
use crate::color::space::ColorSpace;
use crate::io::error::{Result, invariant_violation};
use crate::matching::tile::Fragment;
use crate::math::remap::similarity_bound;
use crate::raster::canvas;
use crate::reconstruction::grid::RectGrid;
use crate::reconstruction::reconstructor::{Reconstructor, percent_of};
use bitvec::prelude::*;
use image::RgbaImage;

/// A committed rectangle of base cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    /// Top row in base cells
    pub row: u32,
    /// Left column in base cells
    pub column: u32,
    /// Height in base cells
    pub rows: u32,
    /// Width in base cells
    pub columns: u32,
}

impl Block {
    /// Number of base cells covered
    pub const fn area(&self) -> usize {
        self.rows as usize * self.columns as usize
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// Grid reconstructor with adaptive cell merging
#[derive(Debug)]
pub struct MultiRectReconstructor {
    grid: RectGrid,
    space: ColorSpace,
    threshold: u64,
    ratios: Vec<(u32, u32)>,
    used: BitVec,
    pending: Option<(Block, Fragment)>,
    filled: usize,
    blocks: usize,
    canvas: Option<RgbaImage>,
}

impl MultiRectReconstructor {
    /// Adaptive grid over `source` with roughly `rows` by `columns` base cells
    ///
    /// `merge_factor` in `0..=1` controls how different merged cells may be:
    /// 0 merges only identical cells, 1 merges anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid parameters are invalid.
    pub fn new(
        source: &RgbaImage,
        rows: u32,
        columns: u32,
        merge_factor: f64,
        space: ColorSpace,
    ) -> Result<Self> {
        let grid = RectGrid::new(source, rows, columns)?;
        let divisor = gcd(grid.columns(), grid.rows()).max(1);
        let own = (grid.columns() / divisor, grid.rows() / divisor);

        let mut ratios = vec![(1, 1), (2, 3), (3, 2)];
        if !ratios.contains(&own) {
            ratios.push(own);
        }

        let threshold = similarity_bound(merge_factor, space.max_value());
        let canvas = RgbaImage::new(grid.width(), grid.height());
        let cell_count = grid.cell_count();
        Ok(Self {
            grid,
            space,
            threshold,
            ratios,
            used: bitvec![0; cell_count],
            pending: None,
            filled: 0,
            blocks: 0,
            canvas: Some(canvas),
        })
    }

    /// Underlying base grid
    pub const fn grid(&self) -> &RectGrid {
        &self.grid
    }

    /// Allowed block ratios as (columns, rows) in base cells
    pub fn ratios(&self) -> &[(u32, u32)] {
        &self.ratios
    }

    /// Absolute colour distance under which cells may merge
    pub const fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Number of blocks supplied so far
    pub const fn blocks_filled(&self) -> usize {
        self.blocks
    }

    fn index(&self, row: u32, column: u32) -> usize {
        row as usize * self.grid.columns() as usize + column as usize
    }

    fn is_used(&self, row: u32, column: u32) -> bool {
        self.used
            .get(self.index(row, column))
            .is_some_and(|bit| *bit)
    }

    /// Largest multiple of `ratio` anchored at `(row, column)`, in multiples
    fn grow(&self, row: u32, column: u32, (ratio_columns, ratio_rows): (u32, u32)) -> u32 {
        let mut members: Vec<Argb> = Vec::new();
        let mut best = 0;
        let mut multiple = 1;

        loop {
            let block_rows = ratio_rows * multiple;
            let block_columns = ratio_columns * multiple;
            if row + block_rows > self.grid.rows() || column + block_columns > self.grid.columns() {
                return best;
            }

            // Cells added by this step form an L around the previous block
            let previous_rows = ratio_rows * (multiple - 1);
            let previous_columns = ratio_columns * (multiple - 1);
            for r in row..row + block_rows {
                for c in column..column + block_columns {
                    if r < row + previous_rows && c < column + previous_columns {
                        continue;
                    }
                    if self.is_used(r, c) {
                        return best;
                    }
                    let color = self.grid.average(r, c).unwrap_or(0);
                    if members
                        .iter()
                        .any(|&member| self.space.distance(member, color) > self.threshold)
                    {
                        return best;
                    }
                    members.push(color);
                }
            }

            best = multiple;
            multiple += 1;
        }
    }

    fn choose_block(&self, row: u32, column: u32) -> Block {
        let mut chosen = Block {
            row,
            column,
            rows: 1,
            columns: 1,
        };
        for &ratio in &self.ratios {
            let multiple = self.grow(row, column, ratio);
            let candidate = Block {
                row,
                column,
                rows: ratio.1 * multiple,
                columns: ratio.0 * multiple,
            };
            if candidate.area() > chosen.area() {
                chosen = candidate;
            }
        }
        chosen
    }

    fn commit(&mut self, block: Block) -> Result<Fragment> {
        let mut average = ColorAccumulator::new();
        for r in block.row..block.row + block.rows {
            for c in block.column..block.column + block.columns {
                let index = self.index(r, c);
                if self.used.get(index).is_none_or(|bit| *bit) {
                    return Err(invariant_violation(
                        "multi-rect",
                        &format!("base cell ({r}, {c}) is already part of a block"),
                    ));
                }
                self.used.set(index, true);
                average.add(self.grid.average(r, c).unwrap_or(0));
            }
        }
        Ok(Fragment::new(
            block.columns * self.grid.cell_width(),
            block.rows * self.grid.cell_height(),
            average.mean().unwrap_or(0),
        ))
    }
}

impl Reconstructor for MultiRectReconstructor {
    fn next_fragment(&mut self) -> Result<Option<Fragment>> {
        if let Some((_, fragment)) = self.pending {
            return Ok(Some(fragment));
        }
        let Some(first_free) = self.used.first_zero() else {
            return Ok(None);
        };
        let (row, column) = self.grid.position(first_free);
        let block = self.choose_block(row, column);
        let fragment = self.commit(block)?;
        self.pending = Some((block, fragment));
        Ok(Some(fragment))
    }

    fn give_next(&mut self, image: &RgbaImage) -> bool {
        let Some((block, fragment)) = self.pending else {
            return false;
        };
        if !fragment.fits(image) {
            return false;
        }
        let Some(canvas) = self.canvas.as_mut() else {
            return false;
        };
        let (x, y) = self.grid.origin(block.row, block.column);
        canvas::paste(canvas, image, i64::from(x), i64::from(y));
        self.filled += block.area();
        self.blocks += 1;
        self.pending = None;
        true
    }

    fn has_all(&self) -> bool {
        self.pending.is_none() && self.filled >= self.grid.cell_count()
    }

    fn take_reconstructed(&mut self) -> Option<RgbaImage> {
        if self.has_all() { self.canvas.take() } else { None }
    }

    fn estimated_progress_percent(&self) -> u8 {
        percent_of(self.filled, self.grid.cell_count())
    }
}
