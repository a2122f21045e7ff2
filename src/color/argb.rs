//! Packed `0xAARRGGBB` colour helpers

use image::Rgba;

/// A colour packed as `0xAARRGGBB`
pub type Argb = u32;

/// Alpha channel of a packed colour
pub const fn alpha(color: Argb) -> u8 {
    (color >> 24) as u8
}

/// Red channel of a packed colour
pub const fn red(color: Argb) -> u8 {
    (color >> 16) as u8
}

/// Green channel of a packed colour
pub const fn green(color: Argb) -> u8 {
    (color >> 8) as u8
}

/// Blue channel of a packed colour
pub const fn blue(color: Argb) -> u8 {
    color as u8
}

/// Pack four channels into a colour
pub const fn pack(alpha: u8, red: u8, green: u8, blue: u8) -> Argb {
    ((alpha as u32) << 24) | ((red as u32) << 16) | ((green as u32) << 8) | blue as u32
}

/// Pack an `image` pixel
pub const fn from_rgba(pixel: Rgba<u8>) -> Argb {
    let [r, g, b, a] = pixel.0;
    pack(a, r, g, b)
}

/// Unpack into an `image` pixel
pub const fn to_rgba(color: Argb) -> Rgba<u8> {
    Rgba([red(color), green(color), blue(color), alpha(color)])
}

/// Perceived brightness (ITU-R BT.601 luma) in `0..=255`
pub const fn brightness(color: Argb) -> u8 {
    let weighted =
        299 * red(color) as u32 + 587 * green(color) as u32 + 114 * blue(color) as u32;
    (weighted / 1000) as u8
}

/// Distance from grey: the spread between the strongest and weakest channel
pub fn greyness(color: Argb) -> u8 {
    let channels = [red(color), green(color), blue(color)];
    let max = channels.iter().copied().max().unwrap_or(0);
    let min = channels.iter().copied().min().unwrap_or(0);
    max - min
}

/// Running per-channel mean of packed colours
#[derive(Clone, Copy, Debug, Default)]
pub struct ColorAccumulator {
    sums: [u64; 4],
    count: u64,
}

impl ColorAccumulator {
    /// Create an empty accumulator
    pub const fn new() -> Self {
        Self {
            sums: [0; 4],
            count: 0,
        }
    }

    /// Add one colour
    pub const fn add(&mut self, color: Argb) {
        self.add_weighted(color, 1);
    }

    /// Add a colour as if it occurred `weight` times
    pub const fn add_weighted(&mut self, color: Argb, weight: u64) {
        self.sums[0] += alpha(color) as u64 * weight;
        self.sums[1] += red(color) as u64 * weight;
        self.sums[2] += green(color) as u64 * weight;
        self.sums[3] += blue(color) as u64 * weight;
        self.count += weight;
    }

    /// Number of colours added so far
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Rounded mean colour, or `None` when nothing was added
    pub fn mean(&self) -> Option<Argb> {
        if self.count == 0 {
            return None;
        }
        let half = self.count / 2;
        let channel = |sum: u64| ((sum + half) / self.count).min(255) as u8;
        Some(pack(
            channel(self.sums[0]),
            channel(self.sums[1]),
            channel(self.sums[2]),
            channel(self.sums[3]),
        ))
    }
}

impl Extend<Argb> for ColorAccumulator {
    fn extend<I: IntoIterator<Item = Argb>>(&mut self, iter: I) {
        for color in iter {
            self.add(color);
        }
    }
}

impl FromIterator<Argb> for ColorAccumulator {
    fn from_iter<I: IntoIterator<Item = Argb>>(iter: I) -> Self {
        let mut accumulator = Self::new();
        accumulator.extend(iter);
        accumulator
    }
}
