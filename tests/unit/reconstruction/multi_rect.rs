//! Tests for adaptive block merging on a grid

#[cfg(test)]
mod tests {
    use image::RgbaImage;
    use tilemosaic::color::space::ColorSpace;
    use tilemosaic::raster::canvas::{fill_rect, solid};
    use tilemosaic::reconstruction::multi_rect::{Block, MultiRectReconstructor};
    use tilemosaic::reconstruction::reconstructor::Reconstructor;

    fn checkerboard(cells: u32) -> RgbaImage {
        let mut image = solid(cells, cells, 0xFF00_0000);
        for y in 0..cells {
            for x in 0..cells {
                if (x + y) % 2 == 1 {
                    fill_rect(&mut image, x, y, 1, 1, 0xFFFF_FFFF);
                }
            }
        }
        image
    }

    fn fragment_sizes(reconstructor: &mut MultiRectReconstructor) -> tilemosaic::Result<Vec<(u32, u32)>> {
        let mut sizes = Vec::new();
        while let Some(fragment) = reconstructor.next_fragment()? {
            sizes.push((fragment.width, fragment.height));
            let image = solid(fragment.width, fragment.height, fragment.average_color);
            assert!(reconstructor.give_next(&image));
        }
        Ok(sizes)
    }

    // Tests a uniform image collapses into a single block
    #[test]
    fn test_uniform_image_single_block() -> tilemosaic::Result<()> {
        let source = solid(12, 8, 0xFF40_8040);
        let mut reconstructor =
            MultiRectReconstructor::new(&source, 2, 3, 0.0, ColorSpace::default())?;

        assert_eq!(fragment_sizes(&mut reconstructor)?, vec![(12, 8)]);
        assert!(reconstructor.has_all());
        assert_eq!(reconstructor.blocks_filled(), 1);
        assert_eq!(reconstructor.take_reconstructed(), Some(source));
        Ok(())
    }

    // Tests dissimilar neighbours never merge at factor zero
    // Verified by skipping the pairwise similarity check
    #[test]
    fn test_checkerboard_stays_split() -> tilemosaic::Result<()> {
        let source = checkerboard(4);
        let mut reconstructor =
            MultiRectReconstructor::new(&source, 4, 4, 0.0, ColorSpace::default())?;

        let sizes = fragment_sizes(&mut reconstructor)?;
        assert_eq!(sizes.len(), 16);
        assert!(sizes.iter().all(|&size| size == (1, 1)));
        assert_eq!(reconstructor.take_reconstructed(), Some(source));
        Ok(())
    }

    // Tests a full merge factor joins everything
    #[test]
    fn test_full_merge_factor() -> tilemosaic::Result<()> {
        let source = checkerboard(4);
        let mut reconstructor =
            MultiRectReconstructor::new(&source, 4, 4, 1.0, ColorSpace::default())?;

        assert_eq!(reconstructor.threshold(), ColorSpace::default().max_value());
        assert_eq!(fragment_sizes(&mut reconstructor)?, vec![(4, 4)]);
        Ok(())
    }

    // Tests the largest ratio multiple wins and blocks stop at differing cells
    #[test]
    fn test_blocks_cover_canvas() -> tilemosaic::Result<()> {
        let mut source = solid(6, 6, 0xFF00_0000);
        fill_rect(&mut source, 4, 0, 2, 6, 0xFFFF_FFFF);
        let mut reconstructor =
            MultiRectReconstructor::new(&source, 6, 6, 0.0, ColorSpace::default())?;

        let sizes = fragment_sizes(&mut reconstructor)?;
        let covered: u32 = sizes.iter().map(|(w, h)| w * h).sum();
        assert_eq!(covered, 36);
        assert_eq!(sizes, vec![(4, 6), (2, 3), (2, 3)]);
        assert_eq!(reconstructor.take_reconstructed(), Some(source));
        Ok(())
    }

    // Tests the source ratio joins the default ratios when new
    #[test]
    fn test_ratios() -> tilemosaic::Result<()> {
        let square = MultiRectReconstructor::new(&solid(4, 4, 0), 2, 2, 0.5, ColorSpace::default())?;
        assert_eq!(square.ratios(), &[(1, 1), (2, 3), (3, 2)]);

        let odd = MultiRectReconstructor::new(&solid(7, 5, 0), 5, 7, 0.5, ColorSpace::default())?;
        assert_eq!(odd.ratios(), &[(1, 1), (2, 3), (3, 2), (7, 5)]);
        Ok(())
    }

    // Tests the pending block is repeated and wrong sizes are refused
    #[test]
    fn test_pending_fragment_repeats() -> tilemosaic::Result<()> {
        let mut reconstructor =
            MultiRectReconstructor::new(&checkerboard(2), 2, 2, 0.0, ColorSpace::default())?;
        assert!(!reconstructor.give_next(&solid(1, 1, 0)));

        let first = reconstructor.next_fragment()?;
        assert_eq!(reconstructor.next_fragment()?, first);
        assert!(!reconstructor.give_next(&solid(2, 1, 0)));
        assert_eq!(reconstructor.estimated_progress_percent(), 0);
        assert!(reconstructor.take_reconstructed().is_none());
        Ok(())
    }

    // Tests block area
    #[test]
    fn test_block_area() {
        let block = Block {
            row: 1,
            column: 2,
            rows: 3,
            columns: 2,
        };
        assert_eq!(block.area(), 6);
    }
}
