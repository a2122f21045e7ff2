//! Tests for image loading and export

#[cfg(test)]
mod tests {
    use tilemosaic::MosaicError;
    use tilemosaic::io::image::{export_png, load_image};
    use tilemosaic::raster::canvas;

    // Tests an exported image loads back with identical pixels
    // Verified by exporting a different image than the one compared
    #[test]
    fn test_export_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solid.png");
        let image = canvas::solid(5, 3, 0x80FF_8800);

        export_png(&image, &path).unwrap();
        let loaded = load_image(&path).unwrap();

        assert_eq!(loaded.dimensions(), (5, 3));
        assert_eq!(loaded, image);
    }

    // Tests missing parent directories are created on export
    // Verified by removing the directory creation
    #[test]
    fn test_export_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("out.png");

        export_png(&canvas::solid(2, 2, 0xFF00_0000), &path).unwrap();
        assert!(path.exists());
    }

    // Tests empty images are refused before touching the disk
    // Verified by removing the size check
    #[test]
    fn test_export_empty_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");

        let result = export_png(&image::RgbaImage::new(0, 4), &path);
        assert!(matches!(result, Err(MosaicError::InvalidParameter { .. })));
        assert!(!path.exists());
    }

    // Tests loading a missing file reports its path
    // Verified by mapping to a file system error
    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.png");

        match load_image(&path) {
            Err(MosaicError::ImageLoad { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected an image load error, got {other:?}"),
        }
    }
}
