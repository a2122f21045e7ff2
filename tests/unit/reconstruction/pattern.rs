//! Tests for the halftone and brick pattern reconstructors

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use tilemosaic::color::space::ColorSpace;
    use tilemosaic::raster::canvas::{fill_rect, solid};
    use tilemosaic::reconstruction::pattern::{
        CIRCLE_BACKGROUND, CircleReconstructor, LEGO_PALETTE, LegoReconstructor,
    };
    use tilemosaic::reconstruction::reconstructor::Reconstructor;

    fn black_and_white() -> RgbaImage {
        let mut image = solid(8, 4, 0xFF00_0000);
        fill_rect(&mut image, 4, 0, 4, 4, 0xFFFF_FFFF);
        image
    }

    fn feed_solid(reconstructor: &mut dyn Reconstructor) -> tilemosaic::Result<()> {
        while let Some(fragment) = reconstructor.next_fragment()? {
            let image = solid(fragment.width, fragment.height, fragment.average_color);
            assert!(reconstructor.give_next(&image));
        }
        Ok(())
    }

    // Tests darker cells get larger dots
    // Verified by using brightness instead of darkness for the radius
    #[test]
    fn test_circle_radii_follow_darkness() -> tilemosaic::Result<()> {
        let reconstructor = CircleReconstructor::new(&black_and_white(), 1, 2)?;
        let dark = reconstructor.radius(0, 0).unwrap_or(0.0);
        let light = reconstructor.radius(0, 1).unwrap_or(f64::MAX);

        assert!(dark > light);
        assert!(dark <= 8.0_f64.sqrt());
        assert!(light >= 0.0);
        assert_eq!(reconstructor.radius(1, 0), None);
        Ok(())
    }

    // Tests dots are painted on a white background
    #[test]
    fn test_circle_painting() -> tilemosaic::Result<()> {
        let mut reconstructor = CircleReconstructor::new(&black_and_white(), 1, 2)?;
        feed_solid(&mut reconstructor)?;

        let result = reconstructor
            .take_reconstructed()
            .expect("circle reconstruction produced no canvas");
        let background = Rgba([255, 255, 255, 255]);
        assert_eq!(CIRCLE_BACKGROUND, 0xFFFF_FFFF);
        assert_eq!(*result.get_pixel(2, 2), Rgba([0, 0, 0, 255]));
        assert_eq!(*result.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*result.get_pixel(6, 2), background);
        Ok(())
    }

    // Tests palette snapping picks the closest brick colour
    #[test]
    fn test_lego_palette_snapping() -> tilemosaic::Result<()> {
        let source = solid(4, 4, 0xFFB1_0101);
        let snapped =
            LegoReconstructor::new(&source, 1, 1, Some(LEGO_PALETTE), ColorSpace::default())?;
        assert_eq!(snapped.color(0, 0), Some(0xFFB4_0000));

        let free = LegoReconstructor::new(&source, 1, 1, None, ColorSpace::default())?;
        assert_eq!(free.color(0, 0), Some(0xFFB1_0101));

        let empty_palette = LegoReconstructor::new(&source, 1, 1, Some(&[]), ColorSpace::default())?;
        assert_eq!(empty_palette.color(0, 0), Some(0xFFB1_0101));
        Ok(())
    }

    // Tests bricks are shaded versions of the supplied colour
    #[test]
    fn test_lego_painting() -> tilemosaic::Result<()> {
        let source = solid(32, 16, 0xFF20_80C0);
        let mut reconstructor = LegoReconstructor::new(&source, 1, 2, None, ColorSpace::default())?;
        assert!(!reconstructor.give_next(&solid(3, 3, 0xFF00_0000)));
        feed_solid(&mut reconstructor)?;

        let result = reconstructor
            .take_reconstructed()
            .expect("brick reconstruction produced no canvas");
        assert_eq!(result.dimensions(), (32, 16));
        let stud = result.get_pixel(8, 8).0;
        let edge = result.get_pixel(15, 15).0;
        assert!(stud[2] > edge[2]);
        assert!(stud[2] < 0xC0);
        assert_eq!(stud[3], 255);
        Ok(())
    }
}
