//! Colour spaces and their distance metrics
//!
//! A colour space maps a packed colour onto a small integer point and
//! measures distances between points. Every metric is axis-decomposable:
//! the combined distance is the sum (or, for [`ColorMetric::PerChannel`],
//! the maximum) of independent per-axis terms. Each per-axis term is
//! therefore a lower bound of the combined distance, which is what the
//! k-d tree relies on when pruning.

use crate::color::argb::{self, Argb};

/// Largest number of axes any colour space uses
pub const MAX_DIMENSION: usize = 4;

/// One coordinate extracted from a packed colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Red channel
    Red,
    /// Green channel
    Green,
    /// Blue channel
    Blue,
    /// Alpha channel
    Alpha,
    /// Perceived brightness
    Brightness,
    /// Spread between strongest and weakest channel
    Greyness,
}

impl Axis {
    /// Extract this axis' coordinate from a colour
    pub fn extract(self, color: Argb) -> i32 {
        i32::from(match self {
            Self::Red => argb::red(color),
            Self::Green => argb::green(color),
            Self::Blue => argb::blue(color),
            Self::Alpha => argb::alpha(color),
            Self::Brightness => argb::brightness(color),
            Self::Greyness => argb::greyness(color),
        })
    }

    /// Smallest coordinate this axis produces
    pub const fn min(self) -> i32 {
        0
    }

    /// Largest coordinate this axis produces
    pub const fn max(self) -> i32 {
        255
    }
}

const RGB_AXES: [Axis; 3] = [Axis::Red, Axis::Green, Axis::Blue];
const BRIGHTNESS_AXES: [Axis; 1] = [Axis::Brightness];
const GREYNESS_AXES: [Axis; 1] = [Axis::Greyness];

/// Distance function between colours
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMetric {
    /// Sum of squared channel differences
    #[default]
    SquaredEuclidean,
    /// Sum of absolute channel differences
    AbsoluteSum,
    /// Largest absolute channel difference
    PerChannel,
    /// Absolute brightness difference
    Brightness,
    /// Absolute greyness difference
    Greyness,
}

impl ColorMetric {
    /// Contribution of a single axis difference to the distance
    pub const fn axis_term(self, delta: i32) -> u64 {
        let magnitude = delta.unsigned_abs() as u64;
        match self {
            Self::SquaredEuclidean => magnitude * magnitude,
            _ => magnitude,
        }
    }

    /// Fold one axis term into an accumulated distance
    pub const fn combine(self, accumulated: u64, term: u64) -> u64 {
        match self {
            Self::PerChannel => {
                if term > accumulated {
                    term
                } else {
                    accumulated
                }
            }
            _ => accumulated + term,
        }
    }

    /// Colour axes this metric measures, not counting alpha
    pub const fn channel_axes(self) -> &'static [Axis] {
        match self {
            Self::Brightness => &BRIGHTNESS_AXES,
            Self::Greyness => &GREYNESS_AXES,
            _ => &RGB_AXES,
        }
    }

    /// Distance between two colours
    pub fn distance(self, a: Argb, b: Argb, use_alpha: bool) -> u64 {
        axes(self, use_alpha).fold(0, |accumulated, axis| {
            self.combine(
                accumulated,
                self.axis_term(axis.extract(a) - axis.extract(b)),
            )
        })
    }

    /// Attainable upper bound of [`ColorMetric::distance`]
    pub fn max_value(self, use_alpha: bool) -> u64 {
        axes(self, use_alpha).fold(0, |accumulated, axis| {
            self.combine(accumulated, self.axis_term(axis.max() - axis.min()))
        })
    }

    /// Parse a metric name as used on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "euclidean" | "squared-euclidean" => Some(Self::SquaredEuclidean),
            "absolute" | "absolute-sum" => Some(Self::AbsoluteSum),
            "per-channel" => Some(Self::PerChannel),
            "brightness" => Some(Self::Brightness),
            "greyness" | "grayness" => Some(Self::Greyness),
            _ => None,
        }
    }
}

fn axes(metric: ColorMetric, use_alpha: bool) -> impl Iterator<Item = Axis> {
    metric
        .channel_axes()
        .iter()
        .copied()
        .chain(use_alpha.then_some(Axis::Alpha))
}

/// A colour projected into a colour space
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorPoint {
    coordinates: [i32; MAX_DIMENSION],
    dimension: usize,
}

impl ColorPoint {
    /// Coordinate on the given axis index, zero beyond the dimension
    pub fn coordinate(&self, axis: usize) -> i32 {
        if axis < self.dimension {
            self.coordinates.get(axis).copied().unwrap_or(0)
        } else {
            0
        }
    }

    /// Number of meaningful coordinates
    pub const fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Mapping from packed colours to points plus the metric measuring them
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColorSpace {
    metric: ColorMetric,
    use_alpha: bool,
}

impl ColorSpace {
    /// Create a colour space
    pub const fn new(metric: ColorMetric, use_alpha: bool) -> Self {
        Self { metric, use_alpha }
    }

    /// Metric used for distances
    pub const fn metric(&self) -> ColorMetric {
        self.metric
    }

    /// Whether alpha participates in distances
    pub const fn uses_alpha(&self) -> bool {
        self.use_alpha
    }

    /// Same space with alpha usage switched
    #[must_use]
    pub const fn with_alpha(self, use_alpha: bool) -> Self {
        Self { use_alpha, ..self }
    }

    /// Number of axes
    pub const fn dimension(&self) -> usize {
        self.metric.channel_axes().len() + if self.use_alpha { 1 } else { 0 }
    }

    /// Axis at the given index
    pub fn axis(&self, index: usize) -> Option<Axis> {
        axes(self.metric, self.use_alpha).nth(index)
    }

    /// Iterate over all active axes
    pub fn axes(&self) -> impl Iterator<Item = Axis> {
        axes(self.metric, self.use_alpha)
    }

    /// Project a colour into this space
    pub fn point(&self, color: Argb) -> ColorPoint {
        let mut coordinates = [0; MAX_DIMENSION];
        for (slot, axis) in coordinates.iter_mut().zip(self.axes()) {
            *slot = axis.extract(color);
        }
        ColorPoint {
            coordinates,
            dimension: self.dimension(),
        }
    }

    /// Distance between two colours
    pub fn distance(&self, a: Argb, b: Argb) -> u64 {
        self.metric.distance(a, b, self.use_alpha)
    }

    /// Distance between two colours restricted to one axis
    pub fn axis_distance(&self, a: Argb, b: Argb, axis: usize) -> u64 {
        self.axis(axis).map_or(0, |axis| {
            self.metric.axis_term(axis.extract(a) - axis.extract(b))
        })
    }

    /// Distance between two projected points
    pub fn point_distance(&self, a: &ColorPoint, b: &ColorPoint) -> u64 {
        (0..self.dimension()).fold(0, |accumulated, axis| {
            self.metric.combine(
                accumulated,
                self.metric
                    .axis_term(a.coordinate(axis) - b.coordinate(axis)),
            )
        })
    }

    /// Attainable upper bound of [`ColorSpace::distance`]
    pub fn max_value(&self) -> u64 {
        self.metric.max_value(self.use_alpha)
    }
}
