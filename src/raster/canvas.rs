//! Bitmap primitives used by reconstructors and image sources
//!
//! All drawing clips silently to the destination bounds.

use crate::color::argb::{self, Argb, ColorAccumulator};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Image of the given size filled with one colour
pub fn solid(width: u32, height: u32, color: Argb) -> RgbaImage {
    RgbaImage::from_pixel(width, height, argb::to_rgba(color))
}

/// Mean colour of every pixel, `None` for an empty image
pub fn average_color(image: &RgbaImage) -> Option<Argb> {
    image
        .pixels()
        .map(|pixel| argb::from_rgba(*pixel))
        .collect::<ColorAccumulator>()
        .mean()
}

/// Mean colour of a rectangle clipped to the image
pub fn region_average(image: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> Option<Argb> {
    let x_end = x.saturating_add(width).min(image.width());
    let y_end = y.saturating_add(height).min(image.height());
    let mut accumulator = ColorAccumulator::new();
    for py in y..y_end {
        for px in x..x_end {
            if let Some(pixel) = image.get_pixel_checked(px, py) {
                accumulator.add(argb::from_rgba(*pixel));
            }
        }
    }
    accumulator.mean()
}

/// Copy `source` onto `destination` with its top-left corner at `(x, y)`
pub fn paste(destination: &mut RgbaImage, source: &RgbaImage, x: i64, y: i64) {
    imageops::replace(destination, source, x, y);
}

/// Resampled copy at the requested size
pub fn resized(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.width() == width && image.height() == height {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Triangle)
}

/// Fill a rectangle
pub fn fill_rect(image: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Argb) {
    let pixel = argb::to_rgba(color);
    let x_end = x.saturating_add(width).min(image.width());
    let y_end = y.saturating_add(height).min(image.height());
    for py in y..y_end {
        for px in x..x_end {
            image.put_pixel(px, py, pixel);
        }
    }
}

/// Fill every pixel whose centre lies within `radius` of `(center_x, center_y)`
pub fn fill_circle(image: &mut RgbaImage, center_x: f64, center_y: f64, radius: f64, color: Argb) {
    if radius <= 0.0 || !radius.is_finite() {
        return;
    }
    let pixel = argb::to_rgba(color);
    let x_start = (center_x - radius).floor().max(0.0) as u32;
    let y_start = (center_y - radius).floor().max(0.0) as u32;
    let x_end = ((center_x + radius).ceil().max(0.0) as u32).min(image.width());
    let y_end = ((center_y + radius).ceil().max(0.0) as u32).min(image.height());
    let radius_squared = radius * radius;

    for py in y_start..y_end {
        for px in x_start..x_end {
            let dx = f64::from(px) + 0.5 - center_x;
            let dy = f64::from(py) + 0.5 - center_y;
            if dx * dx + dy * dy <= radius_squared {
                image.put_pixel(px, py, pixel);
            }
        }
    }
}

/// Whether `(x, y)` lies inside the ellipse with the given centre and semi-axes
pub fn in_ellipse(x: f64, y: f64, center_x: f64, center_y: f64, radius_x: f64, radius_y: f64) -> bool {
    if radius_x <= 0.0 || radius_y <= 0.0 {
        return false;
    }
    let nx = (x - center_x) / radius_x;
    let ny = (y - center_y) / radius_y;
    nx * nx + ny * ny <= 1.0
}

/// Copy pixels of `source`, placed at `(origin_x, origin_y)`, wherever `keep`
/// accepts the destination coordinate
pub fn paste_where<F>(
    destination: &mut RgbaImage,
    source: &RgbaImage,
    origin_x: i64,
    origin_y: i64,
    mut keep: F,
) where
    F: FnMut(u32, u32) -> bool,
{
    for (sx, sy, pixel) in source.enumerate_pixels() {
        let dx = origin_x + i64::from(sx);
        let dy = origin_y + i64::from(sy);
        let (Ok(dx), Ok(dy)) = (u32::try_from(dx), u32::try_from(dy)) else {
            continue;
        };
        if dx < destination.width() && dy < destination.height() && keep(dx, dy) {
            destination.put_pixel(dx, dy, *pixel);
        }
    }
}

/// Channel-wise product of a sprite and an image of the same size
///
/// The sprite is stretched when the sizes differ. White sprite pixels keep
/// the image unchanged, darker ones shade it.
pub fn multiply_blend(sprite: &RgbaImage, image: &RgbaImage) -> RgbaImage {
    let sprite = resized(sprite, image.width(), image.height());
    let mut blended = image.clone();
    for (target, shade) in blended.pixels_mut().zip(sprite.pixels()) {
        let Rgba(channels) = target;
        for (channel, factor) in channels.iter_mut().zip(shade.0) {
            *channel = ((u16::from(*channel) * u16::from(factor) + 127) / 255) as u8;
        }
    }
    blended
}

/// Procedural greyscale brick with a raised stud, meant for [`multiply_blend`]
pub fn brick_sprite(width: u32, height: u32) -> RgbaImage {
    const FACE: Argb = 0xFFE6_E6E6;
    const EDGE: Argb = 0xFF96_9696;
    const STUD_SHADOW: Argb = 0xFFB4_B4B4;
    const STUD: Argb = 0xFFF0_F0F0;
    const HIGHLIGHT: Argb = 0xFFFF_FFFF;

    let mut sprite = solid(width, height, FACE);
    if width == 0 || height == 0 {
        return sprite;
    }

    let border = (width.min(height) / 16).max(1);
    fill_rect(&mut sprite, 0, height.saturating_sub(border), width, border, EDGE);
    fill_rect(&mut sprite, width.saturating_sub(border), 0, border, height, EDGE);

    let center_x = f64::from(width) / 2.0;
    let center_y = f64::from(height) / 2.0;
    let radius = f64::from(width.min(height)) * 0.3;
    let offset = f64::from(border);
    fill_circle(&mut sprite, center_x + offset, center_y + offset, radius, STUD_SHADOW);
    fill_circle(&mut sprite, center_x, center_y, radius, STUD);
    fill_circle(
        &mut sprite,
        center_x - radius * 0.35,
        center_y - radius * 0.35,
        radius * 0.3,
        HIGHLIGHT,
    );
    sprite
}
