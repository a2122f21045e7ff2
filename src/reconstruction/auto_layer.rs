//! Layered reconstruction from chains of similar pixels
//!
//! Pixels are visited in row-major order. Every pixel not yet part of a
//! chain starts one, and the chain repeatedly links the next unclaimed
//! pixel whose colour is within the chain bound of the chain's first
//! pixel. Chain starts with similar colours are then merged into groups;
//! each group is one full-canvas fragment, and a supplied image is painted
//! only along the chains of its group.

use crate::assembly::progress::ProgressListener;
use crate::color::argb::{self, Argb, ColorAccumulator};
use crate::color::space::ColorSpace;
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::matching::tile::Fragment;
use crate::math::remap::similarity_bound;
use crate::reconstruction::reconstructor::{Reconstructor, percent_of};
use bitvec::prelude::*;
use image::RgbaImage;

/// Chain starts painted together from one supplied image
#[derive(Debug, Clone)]
struct LayerGroup {
    representative: Argb,
    average: ColorAccumulator,
    starts: Vec<usize>,
}

/// Next unclaimed index at or after `index`, compressing skip links
fn next_unclaimed(skip: &mut [usize], index: usize) -> usize {
    let end = skip.len().saturating_sub(1);
    let mut root = index.min(end);
    while let Some(&next) = skip.get(root) {
        if root >= end || next == root {
            break;
        }
        root = next;
    }
    let mut cursor = index.min(end);
    while cursor != root {
        let Some(slot) = skip.get_mut(cursor) else {
            break;
        };
        let next = *slot;
        *slot = root;
        cursor = next;
    }
    root
}

/// Region-growing reconstructor
#[derive(Debug)]
pub struct AutoLayerReconstructor {
    width: u32,
    height: u32,
    successors: Vec<Option<usize>>,
    chain_count: usize,
    groups: Vec<LayerGroup>,
    next_group: usize,
    painted: BitVec,
    canvas: Option<RgbaImage>,
}

impl AutoLayerReconstructor {
    /// Build chains and groups over `source`
    ///
    /// `chain_factor` bounds how far a linked pixel may drift from its
    /// chain's first pixel, `merge_factor` how different merged chain
    /// starts may be; both are `0..=1` similarity factors.
    ///
    /// Every chain start scans all pixels after it that are still
    /// unclaimed. A small `chain_factor` on a noisy image leaves most
    /// pixels as chain starts, so construction approaches quadratic time
    /// in the pixel count. Cancellation is only checked at row starts,
    /// which may be far apart in that case.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is empty or the listener cancels.
    pub fn new<L: ProgressListener + ?Sized>(
        source: &RgbaImage,
        space: ColorSpace,
        chain_factor: f64,
        merge_factor: f64,
        progress: &L,
    ) -> Result<Self> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(invalid_parameter(
                "source",
                &format!("{width}x{height}"),
                &"source image must not be empty",
            ));
        }

        let pixels: Vec<Argb> = source.pixels().map(|pixel| argb::from_rgba(*pixel)).collect();
        let count = pixels.len();
        let row_length = width as usize;
        let chain_bound = similarity_bound(chain_factor, space.max_value());
        let merge_bound = similarity_bound(merge_factor, space.max_value());

        let mut successors = vec![None; count];
        let mut skip: Vec<usize> = (0..=count).collect();
        let mut starts = Vec::new();

        for index in 0..count {
            if index % row_length == 0 {
                if progress.is_cancelled() {
                    return Err(MosaicError::Cancelled);
                }
                progress.on_progress_update(percent_of(index, count));
            }
            if next_unclaimed(&mut skip, index) != index {
                continue;
            }

            let Some(&color) = pixels.get(index) else {
                break;
            };
            if let Some(slot) = skip.get_mut(index) {
                *slot = index + 1;
            }
            starts.push((index, color));
            let mut current = index;
            let mut cursor = next_unclaimed(&mut skip, index + 1);
            while let Some(&candidate) = pixels.get(cursor) {
                if space.distance(candidate, color) <= chain_bound {
                    if let Some(successor) = successors.get_mut(current) {
                        *successor = Some(cursor);
                    }
                    if let Some(slot) = skip.get_mut(cursor) {
                        *slot = cursor + 1;
                    }
                    current = cursor;
                }
                cursor = next_unclaimed(&mut skip, cursor + 1);
            }
        }

        let mut groups: Vec<LayerGroup> = Vec::new();
        for &(start, color) in &starts {
            if let Some(group) = groups
                .iter_mut()
                .find(|group| space.distance(group.representative, color) <= merge_bound)
            {
                group.average.add(color);
                group.starts.push(start);
            } else {
                let mut average = ColorAccumulator::new();
                average.add(color);
                groups.push(LayerGroup {
                    representative: color,
                    average,
                    starts: vec![start],
                });
            }
        }
        progress.on_progress_update(100);

        tracing::debug!(
            chains = starts.len(),
            groups = groups.len(),
            chain_bound,
            merge_bound,
            "auto layer chains built"
        );

        Ok(Self {
            width,
            height,
            successors,
            chain_count: starts.len(),
            groups,
            next_group: 0,
            painted: bitvec![0; count],
            canvas: Some(RgbaImage::new(width, height)),
        })
    }

    /// Number of pixel chains found
    pub const fn chain_count(&self) -> usize {
        self.chain_count
    }

    /// Number of merged groups, one fragment each
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Pixel indices of the chain starting at `start`, in link order
    pub fn chain(&self, start: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut cursor = (start < self.successors.len()).then_some(start);
        while let Some(index) = cursor {
            chain.push(index);
            cursor = self.successors.get(index).copied().flatten();
        }
        chain
    }
}

impl Reconstructor for AutoLayerReconstructor {
    fn next_fragment(&mut self) -> Result<Option<Fragment>> {
        Ok(self.groups.get(self.next_group).map(|group| {
            Fragment::new(self.width, self.height, group.average.mean().unwrap_or(0))
        }))
    }

    fn give_next(&mut self, image: &RgbaImage) -> bool {
        let Some(group) = self.groups.get(self.next_group) else {
            return false;
        };
        if image.dimensions() != (self.width, self.height) {
            return false;
        }
        let Some(canvas) = self.canvas.as_mut() else {
            return false;
        };

        let row_length = self.width as usize;
        for &start in &group.starts {
            let mut cursor = Some(start);
            while let Some(index) = cursor {
                if self.painted.get(index).is_none_or(|bit| *bit) {
                    break;
                }
                self.painted.set(index, true);
                let (x, y) = ((index % row_length) as u32, (index / row_length) as u32);
                canvas.put_pixel(x, y, *image.get_pixel(x, y));
                cursor = self.successors.get(index).copied().flatten();
            }
        }
        self.next_group += 1;
        true
    }

    fn has_all(&self) -> bool {
        self.next_group >= self.groups.len()
    }

    fn take_reconstructed(&mut self) -> Option<RgbaImage> {
        if self.has_all() { self.canvas.take() } else { None }
    }

    fn estimated_progress_percent(&self) -> u8 {
        percent_of(self.next_group, self.groups.len())
    }
}
