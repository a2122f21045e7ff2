//! Tests for command-line parsing and command execution

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::path::{Path, PathBuf};
    use tilemosaic::MosaicError;
    use tilemosaic::assembly::progress::SilentProgress;
    use tilemosaic::color::space::ColorMetric;
    use tilemosaic::io::catalog::TileCatalog;
    use tilemosaic::io::cli::{
        BuildArgs, Cli, Command, CommandRunner, Layout, MatcherKind, default_output_path,
    };
    use tilemosaic::io::configuration::{DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_SEED};
    use tilemosaic::matching::matcher::ReuseLimit;
    use tilemosaic::matching::tile::Tile;
    use tilemosaic::raster::canvas;

    fn build_args(args: &[&str]) -> BuildArgs {
        let cli = Cli::try_parse_from(["mosaic", "build"].iter().chain(args)).unwrap();
        match cli.command {
            Command::Build(build) => build,
            Command::Index(_) => panic!("parsed an index command"),
        }
    }

    fn run(args: &[&str]) -> tilemosaic::Result<()> {
        let cli = Cli::try_parse_from(args).unwrap();
        CommandRunner::new(cli).run()
    }

    // Tests build parsing with only the source image
    // Verified by changing default values to ensure defaults are used
    #[test]
    fn test_build_minimal_args() {
        let args = build_args(&["photo.png"]);

        assert_eq!(args.source, PathBuf::from("photo.png"));
        assert_eq!(args.layout, Layout::Rect);
        assert_eq!(args.matcher, MatcherKind::KdTree);
        assert_eq!(args.rows, DEFAULT_ROWS);
        assert_eq!(args.columns, DEFAULT_COLUMNS);
        assert_eq!(args.seed, DEFAULT_SEED);
        assert_eq!(args.metric, ColorMetric::SquaredEuclidean);
        assert_eq!(args.reuse_limit, ReuseLimit::Unlimited);
        assert!(args.catalog.is_none());
        assert!(!args.alpha);
    }

    // Tests build parsing with explicit options
    // Verified by modifying the custom parsers to ensure they're invoked
    #[test]
    fn test_build_all_args() {
        let args = build_args(&[
            "photo.png",
            "--catalog",
            "tiles.json",
            "--layout",
            "multi-rect",
            "--matcher",
            "resolution",
            "--rows",
            "12",
            "--columns",
            "9",
            "--metric",
            "per-channel",
            "--alpha",
            "--reuse-limit",
            "3",
            "--accuracy",
            "0.8",
            "--seed",
            "7",
            "--output",
            "out.png",
        ]);

        assert_eq!(args.catalog, Some(PathBuf::from("tiles.json")));
        assert_eq!(args.layout, Layout::MultiRect);
        assert_eq!(args.matcher, MatcherKind::Resolution);
        assert_eq!((args.rows, args.columns), (12, 9));
        assert_eq!(args.metric, ColorMetric::PerChannel);
        assert_eq!(args.reuse_limit, ReuseLimit::Limited(3));
        assert!((args.accuracy - 0.8).abs() < f64::EPSILON);
        assert_eq!(args.seed, 7);
        assert_eq!(args.output_path(), PathBuf::from("out.png"));

        let space = args.color_space();
        assert_eq!(space.metric(), ColorMetric::PerChannel);
        assert!(space.uses_alpha());
    }

    // Tests unknown metrics and malformed reuse limits are rejected
    // Verified by falling back to defaults in the value parsers
    #[test]
    fn test_build_rejects_invalid_values() {
        assert!(Cli::try_parse_from(["mosaic", "build", "a.png", "--metric", "cosine"]).is_err());
        assert!(
            Cli::try_parse_from(["mosaic", "build", "a.png", "--reuse-limit", "often"]).is_err()
        );
        assert!(Cli::try_parse_from(["mosaic", "build", "a.png", "--layout", "hexagon"]).is_err());
        assert!(Cli::try_parse_from(["mosaic", "index"]).is_err());
    }

    // Tests global flags are accepted after the subcommand
    // Verified by removing global from the verbose flag
    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["mosaic", "index", "a.png", "b.png", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(!cli.quiet);
        match cli.command {
            Command::Index(args) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.output, PathBuf::from("catalog.json"));
            }
            Command::Build(_) => panic!("parsed a build command"),
        }
    }

    // Tests only circle and lego layouts work without tile images
    // Verified by marking rect as a pattern layout
    #[test]
    fn test_layout_is_pattern() {
        assert!(Layout::Circle.is_pattern());
        assert!(Layout::Lego.is_pattern());
        for layout in [
            Layout::Rect,
            Layout::MultiRect,
            Layout::Puzzle,
            Layout::AutoLayer,
            Layout::FixedLayer,
        ] {
            assert!(!layout.is_pattern());
        }
    }

    // Tests default output path generation with suffix
    // Verified by changing the output suffix
    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/images/cat.jpg")),
            PathBuf::from("/images/cat_mosaic.png")
        );
        assert_eq!(
            default_output_path(Path::new("cat.png")),
            PathBuf::from("cat_mosaic.png")
        );
        assert_eq!(
            build_args(&["dir/dog.png"]).output_path(),
            PathBuf::from("dir/dog_mosaic.png")
        );
    }

    // Tests each layout yields its reconstructor
    // Verified by mapping puzzle onto the rect reconstructor
    #[test]
    fn test_reconstructor_per_layout() {
        let source = canvas::solid(8, 8, 0xFF40_8020);
        let cases = [
            ("rect", "rect"),
            ("multi-rect", "multi-rect"),
            ("puzzle", "puzzle"),
            ("auto-layer", "auto-layer"),
            ("fixed-layer", "fixed-layer"),
            ("circle", "circle"),
            ("lego", "lego"),
        ];

        for (flag, name) in cases {
            let args = build_args(&[
                "s.png", "--layout", flag, "--rows", "2", "--columns", "2", "--clusters", "2",
            ]);
            let reconstructor = args.reconstructor(&source, &SilentProgress).unwrap();
            assert_eq!(reconstructor.name(), name);
        }
    }

    // Tests matcher selection and reuse limit wiring
    // Verified by ignoring the reuse limit argument
    #[test]
    fn test_matcher_selection() {
        let tiles = || {
            vec![
                Tile::without_size("a", 0xFF00_0000),
                Tile::without_size("b", 0xFFFF_FFFF),
            ]
        };

        let linear = build_args(&["s.png", "-m", "linear", "--reuse-limit", "none"]).matcher(tiles());
        assert_eq!(linear.tile_reuse_limit(), ReuseLimit::NoReuse);
        assert_eq!(linear.remaining_tiles(), 2);

        let kd = build_args(&["s.png"]).matcher(tiles());
        let random = build_args(&["s.png", "-m", "random"]).matcher(tiles());
        let resolution = build_args(&["s.png", "-m", "resolution"]).matcher(tiles());
        assert_ne!(kd.strategy_name(), linear.strategy_name());
        assert_ne!(random.strategy_name(), kd.strategy_name());
        assert_ne!(resolution.strategy_name(), random.strategy_name());
    }

    // Tests indexing then building a rect mosaic from real tile files
    // Verified by writing the catalog with no tiles
    #[test]
    fn test_index_then_build_rect() {
        let dir = tempfile::tempdir().unwrap();
        let red = dir.path().join("red.png");
        let blue = dir.path().join("blue.png");
        canvas::solid(3, 3, 0xFFFF_0000).save(&red).unwrap();
        canvas::solid(5, 2, 0xFF00_00FF).save(&blue).unwrap();

        let catalog_path = dir.path().join("catalog.json");
        run(&[
            "mosaic",
            "index",
            red.to_str().unwrap(),
            blue.to_str().unwrap(),
            "-o",
            catalog_path.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(TileCatalog::load(&catalog_path).unwrap().len(), 2);

        let mut source = canvas::solid(8, 4, 0xFFF0_0000);
        for y in 0..4 {
            for x in 4..8 {
                source.put_pixel(x, y, image::Rgba([0, 0, 230, 255]));
            }
        }
        let source_path = dir.path().join("source.png");
        source.save(&source_path).unwrap();
        let output = dir.path().join("out").join("mosaic.png");

        run(&[
            "mosaic",
            "build",
            source_path.to_str().unwrap(),
            "-c",
            catalog_path.to_str().unwrap(),
            "-m",
            "linear",
            "--rows",
            "1",
            "--columns",
            "2",
            "-o",
            output.to_str().unwrap(),
            "-q",
        ])
        .unwrap();

        let mosaic = image::open(&output).unwrap().to_rgba8();
        assert_eq!(mosaic.dimensions(), (8, 4));
        let [red, _, blue, _] = mosaic.get_pixel(1, 1).0;
        assert!(red > 250 && blue < 5);
        let [red, _, blue, _] = mosaic.get_pixel(6, 2).0;
        assert!(blue > 250 && red < 5);
    }

    // Tests pattern layouts build without a catalog
    // Verified by requiring a catalog for every layout
    #[test]
    fn test_build_circle_without_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("grey.png");
        canvas::solid(8, 8, 0xFF80_8080).save(&source_path).unwrap();

        run(&[
            "mosaic",
            "build",
            source_path.to_str().unwrap(),
            "-l",
            "circle",
            "--rows",
            "2",
            "--columns",
            "2",
            "-q",
        ])
        .unwrap();

        let output = dir.path().join("grey_mosaic.png");
        assert_eq!(image::open(&output).unwrap().to_rgba8().dimensions(), (8, 8));
    }

    // Tests photo layouts fail without a catalog and write nothing
    // Verified by defaulting to an empty matcher
    #[test]
    fn test_build_rect_without_catalog_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("grey.png");
        canvas::solid(4, 4, 0xFF80_8080).save(&source_path).unwrap();

        let result = run(&["mosaic", "build", source_path.to_str().unwrap(), "-q"]);

        assert!(matches!(
            result,
            Err(MosaicError::InvalidParameter {
                parameter: "catalog",
                ..
            })
        ));
        assert!(!dir.path().join("grey_mosaic.png").exists());
    }
}
