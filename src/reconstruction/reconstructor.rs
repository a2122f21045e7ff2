//! Common contract of every reconstruction strategy

use crate::io::error::Result;
use crate::matching::tile::Fragment;
use crate::reconstruction::auto_layer::AutoLayerReconstructor;
use crate::reconstruction::fixed_layer::FixedLayerReconstructor;
use crate::reconstruction::grid::RectReconstructor;
use crate::reconstruction::multi_rect::MultiRectReconstructor;
use crate::reconstruction::pattern::{CircleReconstructor, LegoReconstructor};
use crate::reconstruction::puzzle::PuzzleReconstructor;
use image::RgbaImage;

/// State machine that fragments a source image and reassembles it from
/// supplied images
///
/// The protocol is: ask for [`next_fragment`](Self::next_fragment), supply
/// an image of exactly the fragment's size through
/// [`give_next`](Self::give_next), repeat until [`has_all`](Self::has_all),
/// then take the result once.
pub trait Reconstructor {
    /// Fragment waiting to be supplied, `None` once everything was supplied
    ///
    /// Repeated calls return the same fragment until it is supplied.
    ///
    /// # Errors
    ///
    /// Returns an error if the reconstructor's internal bookkeeping is
    /// inconsistent.
    fn next_fragment(&mut self) -> Result<Option<Fragment>>;

    /// Supply the image for the pending fragment
    ///
    /// Returns false, leaving the state untouched, when no fragment is
    /// pending or the image does not have the fragment's dimensions.
    fn give_next(&mut self, image: &RgbaImage) -> bool;

    /// Whether every fragment was supplied; never reverts once true
    fn has_all(&self) -> bool;

    /// Hand over the finished canvas
    ///
    /// Returns `None` before [`has_all`](Self::has_all) and on any call
    /// after the first successful one.
    fn take_reconstructed(&mut self) -> Option<RgbaImage>;

    /// Rough completion estimate in `0..=100`
    fn estimated_progress_percent(&self) -> u8;
}

/// Share of `done` in `total` as a percentage
pub(crate) fn percent_of(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.min(total) * 100 / total) as u8
}

/// Closed set of reconstruction strategies
#[derive(Debug)]
pub enum AnyReconstructor {
    /// Uniform rectangular grid
    Rect(RectReconstructor),
    /// Grid whose similar neighbouring cells merge into larger blocks
    MultiRect(MultiRectReconstructor),
    /// Grid of interlocking jigsaw pieces
    Puzzle(PuzzleReconstructor),
    /// Full-canvas layers grown from chains of similar pixels
    AutoLayer(AutoLayerReconstructor),
    /// Full-canvas or cropped layers from k-means colour clusters
    FixedLayer(FixedLayerReconstructor),
    /// Halftone dots on a grid
    Circle(CircleReconstructor),
    /// Shaded bricks on a grid
    Lego(LegoReconstructor),
}

impl AnyReconstructor {
    /// Short layout name for diagnostics
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rect(_) => "rect",
            Self::MultiRect(_) => "multi-rect",
            Self::Puzzle(_) => "puzzle",
            Self::AutoLayer(_) => "auto-layer",
            Self::FixedLayer(_) => "fixed-layer",
            Self::Circle(_) => "circle",
            Self::Lego(_) => "lego",
        }
    }

    fn as_reconstructor(&self) -> &dyn Reconstructor {
        match self {
            Self::Rect(inner) => inner,
            Self::MultiRect(inner) => inner,
            Self::Puzzle(inner) => inner,
            Self::AutoLayer(inner) => inner,
            Self::FixedLayer(inner) => inner,
            Self::Circle(inner) => inner,
            Self::Lego(inner) => inner,
        }
    }

    fn as_reconstructor_mut(&mut self) -> &mut dyn Reconstructor {
        match self {
            Self::Rect(inner) => inner,
            Self::MultiRect(inner) => inner,
            Self::Puzzle(inner) => inner,
            Self::AutoLayer(inner) => inner,
            Self::FixedLayer(inner) => inner,
            Self::Circle(inner) => inner,
            Self::Lego(inner) => inner,
        }
    }
}

impl Reconstructor for AnyReconstructor {
    fn next_fragment(&mut self) -> Result<Option<Fragment>> {
        self.as_reconstructor_mut().next_fragment()
    }

    fn give_next(&mut self, image: &RgbaImage) -> bool {
        self.as_reconstructor_mut().give_next(image)
    }

    fn has_all(&self) -> bool {
        self.as_reconstructor().has_all()
    }

    fn take_reconstructed(&mut self) -> Option<RgbaImage> {
        self.as_reconstructor_mut().take_reconstructed()
    }

    fn estimated_progress_percent(&self) -> u8 {
        self.as_reconstructor().estimated_progress_percent()
    }
}
