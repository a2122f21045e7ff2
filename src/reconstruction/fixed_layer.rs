//! Layered reconstruction from k-means colour clusters
//!
//! Clustering runs over the histogram of distinct colours, so each pass
//! costs one distance evaluation per distinct colour and centre rather than
//! per pixel. Each non-empty cluster becomes one fragment, sized to the
//! whole canvas or cropped to the cluster's bounding box.

use crate::assembly::progress::ProgressListener;
use crate::color::argb::{self, Argb, ColorAccumulator};
use crate::color::space::ColorSpace;
use crate::io::configuration::{KMEANS_BASE_ITERATIONS, KMEANS_ITERATIONS_PER_CLUSTER};
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::matching::tile::Fragment;
use crate::math::sampling::RandomSelector;
use crate::reconstruction::reconstructor::{Reconstructor, percent_of};
use image::RgbaImage;
use std::collections::HashMap;

/// Area a cluster's fragment covers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayerExtent {
    /// Every fragment covers the whole canvas
    #[default]
    Canvas,
    /// Every fragment covers its cluster's bounding box
    Cropped,
}

/// One distinct colour and how many pixels carry it
#[derive(Clone, Copy, Debug)]
struct ColorBin {
    color: Argb,
    count: u64,
}

/// A cluster that owns at least one pixel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layer {
    /// Cluster index
    pub cluster: usize,
    /// Cluster centre
    pub color: Argb,
    /// Left edge of the painted region
    pub x: u32,
    /// Top edge of the painted region
    pub y: u32,
    /// Width of the requested image
    pub width: u32,
    /// Height of the requested image
    pub height: u32,
}

/// Outcome of the clustering passes
#[derive(Debug)]
struct Clustering {
    centers: Vec<Argb>,
    assignments: Vec<usize>,
    iterations: usize,
    last_reassigned: u64,
}

fn closest_center(centers: &[Argb], color: Argb, space: &ColorSpace) -> usize {
    let mut best = (0, u64::MAX);
    for (index, &center) in centers.iter().enumerate() {
        let distance = space.distance(center, color);
        if distance < best.1 {
            best = (index, distance);
        }
    }
    best.0
}

/// Seed centres, each biased toward colours far from the previous centre
fn seed_centers(
    bins: &[ColorBin],
    clusters: usize,
    space: &ColorSpace,
    selector: &mut RandomSelector,
) -> Vec<Argb> {
    let max_value = space.max_value().max(1) as f64;
    let counts: Vec<f64> = bins.iter().map(|bin| bin.count as f64).collect();

    let mut centers = Vec::with_capacity(clusters);
    let Some(first) = bins.get(selector.weighted_choice(&counts)) else {
        return centers;
    };
    centers.push(first.color);

    while centers.len() < clusters {
        let previous = centers.last().copied().unwrap_or(first.color);
        let weights: Vec<f64> = bins
            .iter()
            .map(|bin| space.distance(bin.color, previous) as f64 / max_value * bin.count as f64)
            .collect();
        let Some(next) = bins.get(selector.weighted_choice(&weights)) else {
            break;
        };
        centers.push(next.color);
    }
    centers
}

fn cluster<L: ProgressListener + ?Sized>(
    bins: &[ColorBin],
    clusters: usize,
    space: &ColorSpace,
    selector: &mut RandomSelector,
    progress: &L,
) -> Result<Clustering> {
    let mut centers = seed_centers(bins, clusters, space, selector);
    let mut assignments = vec![0; bins.len()];
    let cap = KMEANS_BASE_ITERATIONS + KMEANS_ITERATIONS_PER_CLUSTER * clusters;
    let mut previous: Option<u64> = None;
    let mut iterations = 0;

    loop {
        if progress.is_cancelled() {
            return Err(MosaicError::Cancelled);
        }

        let mut reassigned = 0;
        for (bin, assignment) in bins.iter().zip(assignments.iter_mut()) {
            let best = closest_center(&centers, bin.color, space);
            if best != *assignment {
                reassigned += bin.count;
                *assignment = best;
            }
        }
        iterations += 1;

        let mut sums = vec![ColorAccumulator::new(); centers.len()];
        for (bin, &assignment) in bins.iter().zip(&assignments) {
            if let Some(sum) = sums.get_mut(assignment) {
                sum.add_weighted(bin.color, bin.count);
            }
        }
        for (center, sum) in centers.iter_mut().zip(&sums) {
            if let Some(mean) = sum.mean() {
                *center = mean;
            }
        }

        progress.on_progress_update(percent_of(iterations, cap));
        let stalled = previous.is_some_and(|previous| reassigned >= previous);
        if reassigned == 0 || stalled || iterations >= cap {
            return Ok(Clustering {
                centers,
                assignments,
                iterations,
                last_reassigned: reassigned,
            });
        }
        previous = Some(reassigned);
    }
}

/// K-means clustering reconstructor
#[derive(Debug)]
pub struct FixedLayerReconstructor {
    width: u32,
    height: u32,
    labels: Vec<usize>,
    layers: Vec<Layer>,
    next_layer: usize,
    iterations: usize,
    last_reassigned: u64,
    canvas: Option<RgbaImage>,
}

impl FixedLayerReconstructor {
    /// Cluster `source` into at most `clusters` layers
    ///
    /// # Errors
    ///
    /// Returns an error if the source is empty, `clusters` is zero, or the
    /// listener cancels.
    pub fn new<L: ProgressListener + ?Sized>(
        source: &RgbaImage,
        clusters: usize,
        extent: LayerExtent,
        space: ColorSpace,
        seed: u64,
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
        if clusters == 0 {
            return Err(invalid_parameter("clusters", &clusters, &"must be positive"));
        }

        let mut bin_of: HashMap<Argb, usize> = HashMap::new();
        let mut bins: Vec<ColorBin> = Vec::new();
        let mut pixel_bins = Vec::with_capacity(width as usize * height as usize);
        for pixel in source.pixels() {
            let color = argb::from_rgba(*pixel);
            let index = *bin_of.entry(color).or_insert_with(|| {
                bins.push(ColorBin { color, count: 0 });
                bins.len() - 1
            });
            if let Some(bin) = bins.get_mut(index) {
                bin.count += 1;
            }
            pixel_bins.push(index);
        }

        let clusters = clusters.min(bins.len());
        let mut selector = RandomSelector::new(seed);
        let clustering = cluster(&bins, clusters, &space, &mut selector, progress)?;

        let labels: Vec<usize> = pixel_bins
            .iter()
            .map(|&bin| clustering.assignments.get(bin).copied().unwrap_or(0))
            .collect();
        let layers = Self::layers(&labels, &clustering.centers, width, height, extent);

        tracing::debug!(
            clusters,
            layers = layers.len(),
            iterations = clustering.iterations,
            reassigned = clustering.last_reassigned,
            "k-means converged"
        );

        Ok(Self {
            width,
            height,
            labels,
            layers,
            next_layer: 0,
            iterations: clustering.iterations,
            last_reassigned: clustering.last_reassigned,
            canvas: Some(RgbaImage::new(width, height)),
        })
    }

    fn layers(
        labels: &[usize],
        centers: &[Argb],
        width: u32,
        height: u32,
        extent: LayerExtent,
    ) -> Vec<Layer> {
        // (min_x, min_y, max_x, max_y) per cluster
        let mut boxes: Vec<Option<(u32, u32, u32, u32)>> = vec![None; centers.len()];
        let row_length = width as usize;
        for (index, &label) in labels.iter().enumerate() {
            let (x, y) = ((index % row_length) as u32, (index / row_length) as u32);
            if let Some(bounds) = boxes.get_mut(label) {
                *bounds = Some(bounds.map_or((x, y, x, y), |(x0, y0, x1, y1)| {
                    (x0.min(x), y0.min(y), x1.max(x), y1.max(y))
                }));
            }
        }

        boxes
            .iter()
            .zip(centers)
            .enumerate()
            .filter_map(|(cluster, (bounds, &color))| {
                let (x0, y0, x1, y1) = (*bounds)?;
                Some(match extent {
                    LayerExtent::Canvas => Layer {
                        cluster,
                        color,
                        x: 0,
                        y: 0,
                        width,
                        height,
                    },
                    LayerExtent::Cropped => Layer {
                        cluster,
                        color,
                        x: x0,
                        y: y0,
                        width: x1 - x0 + 1,
                        height: y1 - y0 + 1,
                    },
                })
            })
            .collect()
    }

    /// Canvas size in pixels
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of redistribution passes run
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Pixels that changed cluster in the final pass
    pub const fn last_reassigned(&self) -> u64 {
        self.last_reassigned
    }

    /// Non-empty clusters in fragment order
    pub fn layers_in_order(&self) -> &[Layer] {
        &self.layers
    }

    /// Cluster index of every pixel in row-major order
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }
}

impl Reconstructor for FixedLayerReconstructor {
    fn next_fragment(&mut self) -> Result<Option<Fragment>> {
        Ok(self
            .layers
            .get(self.next_layer)
            .map(|layer| Fragment::new(layer.width, layer.height, layer.color)))
    }

    fn give_next(&mut self, image: &RgbaImage) -> bool {
        let Some(layer) = self.layers.get(self.next_layer).copied() else {
            return false;
        };
        if image.dimensions() != (layer.width, layer.height) {
            return false;
        }
        let Some(canvas) = self.canvas.as_mut() else {
            return false;
        };

        let row_length = self.width as usize;
        for (index, _) in self
            .labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == layer.cluster)
        {
            let (x, y) = ((index % row_length) as u32, (index / row_length) as u32);
            if let Some(pixel) = image.get_pixel_checked(x - layer.x, y - layer.y) {
                canvas.put_pixel(x, y, *pixel);
            }
        }
        self.next_layer += 1;
        true
    }

    fn has_all(&self) -> bool {
        self.next_layer >= self.layers.len()
    }

    fn take_reconstructed(&mut self) -> Option<RgbaImage> {
        if self.has_all() { self.canvas.take() } else { None }
    }

    fn estimated_progress_percent(&self) -> u8 {
        percent_of(self.next_layer, self.layers.len())
    }
}
