//! Grid reconstructors that stamp shapes instead of pasting photographs
//!
//! Both variants reuse [`GridFill`] for fragmentation and progress. They are
//! meant to be driven by the trivial matcher with a solid-colour image
//! source, so the supplied image only carries a colour.

use crate::color::argb::{self, Argb};
use crate::color::space::ColorSpace;
use crate::io::configuration::CIRCLE_CONTRAST_STEEPNESS;
use crate::io::error::Result;
use crate::matching::matcher::TileMatcher;
use crate::matching::tile::{Fragment, Tile};
use crate::math::remap::logistic_contrast;
use crate::raster::canvas;
use crate::reconstruction::grid::{GridFill, RectGrid};
use crate::reconstruction::reconstructor::Reconstructor;
use image::RgbaImage;
use ndarray::Array2;

/// Background behind the halftone dots
pub const CIRCLE_BACKGROUND: Argb = 0xFFFF_FFFF;

/// Classic brick colours used when snapping lego cells to a palette
pub const LEGO_PALETTE: &[Argb] = &[
    0xFFF4_F4F4, // white
    0xFFA0_A5A9, // light bluish grey
    0xFF6C_6E68, // dark bluish grey
    0xFF1B_2A34, // black
    0xFFB4_0000, // red
    0xFF72_0E0F, // dark red
    0xFFFA_C80A, // yellow
    0xFFD6_7923, // orange
    0xFF1E_5AA8, // blue
    0xFF0A_3463, // dark blue
    0xFF00_852B, // green
    0xFF18_4632, // dark green
    0xFFA5_CA18, // lime
    0xFF5F_3109, // reddish brown
    0xFFDE_C69C, // tan
    0xFFC8_70A0, // dark pink
];

fn expect_cell(grid: &RectGrid, image: &RgbaImage) -> bool {
    image.width() == grid.cell_width() && image.height() == grid.cell_height()
}

/// Halftone dots whose size follows the darkness of each cell
///
/// Cell brightness is pushed through a logistic curve centred on the
/// image's average brightness; darker cells get larger dots, reaching the
/// cell's half-diagonal for black.
#[derive(Debug)]
pub struct CircleReconstructor {
    fill: GridFill,
    radii: Array2<f64>,
}

impl CircleReconstructor {
    /// Halftone reconstructor over `source` with roughly `rows` by `columns` cells
    ///
    /// # Errors
    ///
    /// Returns an error if the grid parameters are invalid.
    pub fn new(source: &RgbaImage, rows: u32, columns: u32) -> Result<Self> {
        let grid = RectGrid::new(source, rows, columns)?;
        let center = f64::from(argb::brightness(
            canvas::average_color(source).unwrap_or(0),
        ));
        let half_diagonal = f64::from(grid.cell_width()).hypot(f64::from(grid.cell_height())) / 2.0;

        let radii = Array2::from_shape_fn(
            (grid.rows() as usize, grid.columns() as usize),
            |(row, column)| {
                let brightness = f64::from(argb::brightness(
                    grid.average(row as u32, column as u32).unwrap_or(0),
                ));
                let contrasted = logistic_contrast(brightness, center, CIRCLE_CONTRAST_STEEPNESS);
                let darkness = (1.0 - contrasted / 255.0).clamp(0.0, 1.0);
                darkness.sqrt() * half_diagonal
            },
        );

        let background = canvas::solid(grid.width(), grid.height(), CIRCLE_BACKGROUND);
        Ok(Self {
            fill: GridFill::with_canvas(grid, background),
            radii,
        })
    }

    /// Underlying grid
    pub const fn grid(&self) -> &RectGrid {
        self.fill.grid()
    }

    /// Dot radius of a cell in pixels
    pub fn radius(&self, row: u32, column: u32) -> Option<f64> {
        self.radii.get((row as usize, column as usize)).copied()
    }
}

impl Reconstructor for CircleReconstructor {
    fn next_fragment(&mut self) -> Result<Option<Fragment>> {
        let grid = self.fill.grid();
        Ok(self.fill.pending_cell().map(|(row, column)| {
            grid.cell_fragment(grid.average(row, column).unwrap_or(0))
        }))
    }

    fn give_next(&mut self, image: &RgbaImage) -> bool {
        if !expect_cell(self.fill.grid(), image) {
            return false;
        }
        let color = canvas::average_color(image).unwrap_or(0);
        let radii = &self.radii;
        self.fill.fill_with(|grid, canvas, row, column| {
            let radius = radii
                .get((row as usize, column as usize))
                .copied()
                .unwrap_or(0.0);
            let (x, y) = grid.origin(row, column);
            canvas::fill_circle(
                canvas,
                f64::from(x) + f64::from(grid.cell_width()) / 2.0,
                f64::from(y) + f64::from(grid.cell_height()) / 2.0,
                radius,
                color,
            );
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

/// Grid of shaded bricks, optionally restricted to a palette
#[derive(Debug)]
pub struct LegoReconstructor {
    fill: GridFill,
    colors: Array2<Argb>,
    sprite: RgbaImage,
}

impl LegoReconstructor {
    /// Brick reconstructor over `source` with roughly `rows` by `columns` cells
    ///
    /// With a palette, each cell colour snaps to the closest palette entry
    /// under `space`.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid parameters are invalid.
    pub fn new(
        source: &RgbaImage,
        rows: u32,
        columns: u32,
        palette: Option<&[Argb]>,
        space: ColorSpace,
    ) -> Result<Self> {
        let grid = RectGrid::new(source, rows, columns)?;
        let mut snapper = palette.filter(|colors| !colors.is_empty()).map(|colors| {
            let tiles = colors
                .iter()
                .map(|&color| Tile::without_size(format!("palette:#{color:08X}"), color))
                .collect();
            TileMatcher::linear(tiles, space)
        });

        let colors = Array2::from_shape_fn(
            (grid.rows() as usize, grid.columns() as usize),
            |(row, column)| {
                let average = grid.average(row as u32, column as u32).unwrap_or(0);
                snapper
                    .as_mut()
                    .and_then(|matcher| matcher.best_match(&grid.cell_fragment(average)))
                    .map_or(average, |tile| tile.average_argb)
            },
        );

        let sprite = canvas::brick_sprite(grid.cell_width(), grid.cell_height());
        Ok(Self {
            fill: GridFill::new(grid),
            colors,
            sprite,
        })
    }

    /// Underlying grid
    pub const fn grid(&self) -> &RectGrid {
        self.fill.grid()
    }

    /// Brick colour of a cell
    pub fn color(&self, row: u32, column: u32) -> Option<Argb> {
        self.colors.get((row as usize, column as usize)).copied()
    }
}

impl Reconstructor for LegoReconstructor {
    fn next_fragment(&mut self) -> Result<Option<Fragment>> {
        let grid = self.fill.grid();
        let colors = &self.colors;
        Ok(self.fill.pending_cell().map(|(row, column)| {
            grid.cell_fragment(
                colors
                    .get((row as usize, column as usize))
                    .copied()
                    .unwrap_or(0),
            )
        }))
    }

    fn give_next(&mut self, image: &RgbaImage) -> bool {
        if !expect_cell(self.fill.grid(), image) {
            return false;
        }
        let brick = canvas::multiply_blend(&self.sprite, image);
        self.fill.fill_with(|grid, canvas, row, column| {
            let (x, y) = grid.origin(row, column);
            canvas::paste(canvas, &brick, i64::from(x), i64::from(y));
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
