//! Command-line interface for building mosaics and indexing tile images

use crate::assembly::assembler::{Assembler, FileImageSource, SolidColorSource};
use crate::assembly::progress::{
    MultiStepProgress, ProgressListener, SilentProgress, TerminalProgress,
};
use crate::color::space::{ColorMetric, ColorSpace};
use crate::io::catalog::TileCatalog;
use crate::io::configuration::{
    DEFAULT_ASPECT_TOLERANCE_SCALE, DEFAULT_CHAIN_FACTOR, DEFAULT_CLUSTERS, DEFAULT_COLUMNS,
    DEFAULT_MERGE_FACTOR, DEFAULT_PHASE_WEIGHTS, DEFAULT_RESOLUTION_ACCURACY, DEFAULT_ROWS,
    DEFAULT_SEED, OUTPUT_SUFFIX,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::{export_png, load_image};
use crate::matching::matcher::{ReuseLimit, TileMatcher};
use crate::matching::tile::Tile;
use crate::reconstruction::auto_layer::AutoLayerReconstructor;
use crate::reconstruction::fixed_layer::{FixedLayerReconstructor, LayerExtent};
use crate::reconstruction::grid::RectReconstructor;
use crate::reconstruction::multi_rect::MultiRectReconstructor;
use crate::reconstruction::pattern::{CircleReconstructor, LEGO_PALETTE, LegoReconstructor};
use crate::reconstruction::puzzle::PuzzleReconstructor;
use crate::reconstruction::reconstructor::AnyReconstructor;
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::RgbaImage;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "mosaic")]
#[command(
    author,
    version,
    about = "Rebuild images as mosaics of tile images"
)]
/// Command-line arguments of the mosaic tool
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    /// Log matcher and reconstructor diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress progress output and warnings
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconstruct an image from a tile catalog or a pattern
    Build(BuildArgs),
    /// Describe image files in a tile catalog
    Index(IndexArgs),
}

/// How the source image is fragmented
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Uniform grid
    Rect,
    /// Grid with merged similar cells
    MultiRect,
    /// Interlocking jigsaw pieces
    Puzzle,
    /// Layers grown from chains of similar pixels
    AutoLayer,
    /// Layers from k-means colour clusters
    FixedLayer,
    /// Halftone dots, needs no catalog
    Circle,
    /// Shaded bricks, needs no catalog
    Lego,
}

impl Layout {
    /// Whether the layout paints shapes instead of tile images
    pub const fn is_pattern(self) -> bool {
        matches!(self, Self::Circle | Self::Lego)
    }
}

/// Which search strategy picks tiles
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatcherKind {
    /// Exhaustive colour scan
    Linear,
    /// K-d tree nearest neighbour
    KdTree,
    /// Aspect ratio first, then colour
    Resolution,
    /// Random tiles
    Random,
}

fn parse_metric(name: &str) -> std::result::Result<ColorMetric, String> {
    ColorMetric::from_name(name).ok_or_else(|| {
        format!(
            "unknown metric '{name}', expected euclidean, absolute, per-channel, brightness or greyness"
        )
    })
}

fn parse_reuse_limit(name: &str) -> std::result::Result<ReuseLimit, String> {
    ReuseLimit::from_name(name)
        .ok_or_else(|| format!("invalid reuse limit '{name}', expected a number, none or unlimited"))
}

/// Arguments of `mosaic build`
#[derive(Args, Debug)]
// Independent switches of one subcommand
#[allow(clippy::struct_excessive_bools)]
pub struct BuildArgs {
    /// Image to reconstruct
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Tile catalog JSON, required for photo layouts
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Fragmentation strategy
    #[arg(short, long, value_enum, default_value_t = Layout::Rect)]
    pub layout: Layout,

    /// Tile search strategy
    #[arg(short, long, value_enum, default_value_t = MatcherKind::KdTree)]
    pub matcher: MatcherKind,

    /// Requested grid rows
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    pub rows: u32,

    /// Requested grid columns
    #[arg(long, default_value_t = DEFAULT_COLUMNS)]
    pub columns: u32,

    /// Cluster count of the fixed-layer layout
    #[arg(long, default_value_t = DEFAULT_CLUSTERS)]
    pub clusters: usize,

    /// Crop fixed-layer fragments to their cluster's bounding box
    #[arg(long)]
    pub cropped: bool,

    /// Similarity factor for merging cells or chain groups, 0 to 1
    #[arg(long, default_value_t = DEFAULT_MERGE_FACTOR)]
    pub merge_factor: f64,

    /// Similarity factor for auto-layer pixel chains, 0 to 1
    #[arg(long, default_value_t = DEFAULT_CHAIN_FACTOR)]
    pub chain_factor: f64,

    /// Colour distance metric
    #[arg(long, default_value = "euclidean", value_parser = parse_metric)]
    pub metric: ColorMetric,

    /// Include alpha in colour distances
    #[arg(long)]
    pub alpha: bool,

    /// How often a tile may be reused: a number, none or unlimited
    #[arg(long, default_value = "unlimited", value_parser = parse_reuse_limit)]
    pub reuse_limit: ReuseLimit,

    /// Aspect ratio strictness of the resolution matcher, 0 to 1
    #[arg(long, default_value_t = DEFAULT_RESOLUTION_ACCURACY)]
    pub accuracy: f64,

    /// Scaling of the resolution matcher's aspect tolerance
    #[arg(long, default_value_t = DEFAULT_ASPECT_TOLERANCE_SCALE)]
    pub tolerance_scale: f64,

    /// Snap lego bricks to the classic brick palette
    #[arg(long)]
    pub palette: bool,

    /// Random seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Output image, defaults to `<source>_mosaic.png` next to the source
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl BuildArgs {
    /// Colour space selected by `--metric` and `--alpha`
    pub const fn color_space(&self) -> ColorSpace {
        ColorSpace::new(self.metric, self.alpha)
    }

    /// Where the result is written
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.source))
    }

    /// Reconstructor for the selected layout
    ///
    /// # Errors
    ///
    /// Returns an error if the layout parameters are invalid or the
    /// listener cancels preprocessing.
    pub fn reconstructor<L: ProgressListener + ?Sized>(
        &self,
        source: &RgbaImage,
        progress: &L,
    ) -> Result<AnyReconstructor> {
        let space = self.color_space();
        Ok(match self.layout {
            Layout::Rect => {
                AnyReconstructor::Rect(RectReconstructor::new(source, self.rows, self.columns)?)
            }
            Layout::MultiRect => AnyReconstructor::MultiRect(MultiRectReconstructor::new(
                source,
                self.rows,
                self.columns,
                self.merge_factor,
                space,
            )?),
            Layout::Puzzle => AnyReconstructor::Puzzle(PuzzleReconstructor::new(
                source,
                self.rows,
                self.columns,
                self.seed,
            )?),
            Layout::AutoLayer => AnyReconstructor::AutoLayer(AutoLayerReconstructor::new(
                source,
                space,
                self.chain_factor,
                self.merge_factor,
                progress,
            )?),
            Layout::FixedLayer => {
                let extent = if self.cropped {
                    LayerExtent::Cropped
                } else {
                    LayerExtent::Canvas
                };
                AnyReconstructor::FixedLayer(FixedLayerReconstructor::new(
                    source,
                    self.clusters,
                    extent,
                    space,
                    self.seed,
                    progress,
                )?)
            }
            Layout::Circle => {
                AnyReconstructor::Circle(CircleReconstructor::new(source, self.rows, self.columns)?)
            }
            Layout::Lego => AnyReconstructor::Lego(LegoReconstructor::new(
                source,
                self.rows,
                self.columns,
                self.palette.then_some(LEGO_PALETTE),
                space,
            )?),
        })
    }

    /// Matcher over `tiles` for the selected strategy and reuse limit
    pub fn matcher(&self, tiles: Vec<Tile>) -> TileMatcher {
        let space = self.color_space();
        let mut matcher = match self.matcher {
            MatcherKind::Linear => TileMatcher::linear(tiles, space),
            MatcherKind::KdTree => TileMatcher::kd_tree(tiles, space, self.seed),
            MatcherKind::Resolution => {
                let mut matcher = TileMatcher::resolution(tiles, space, self.accuracy);
                matcher.set_aspect_tolerance_scale(self.tolerance_scale);
                matcher
            }
            MatcherKind::Random => TileMatcher::random(tiles, self.seed),
        };
        matcher.set_tile_reuse_limit(self.reuse_limit);
        matcher
    }
}

/// Arguments of `mosaic index`
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Image files to describe
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Catalog file to write
    #[arg(short, long, default_value = "catalog.json")]
    pub output: PathBuf,
}

/// `<stem>_mosaic.png` next to the source
pub fn default_output_path(source: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or_default();
    let output_name = format!("{}{OUTPUT_SUFFIX}.png", stem.to_string_lossy());

    if let Some(parent) = source.parent() {
        parent.join(output_name)
    } else {
        PathBuf::from(output_name)
    }
}

/// Executes a parsed command line
pub struct CommandRunner {
    cli: Cli,
}

impl CommandRunner {
    /// Create a runner for the given arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected subcommand
    ///
    /// # Errors
    ///
    /// Returns an error if loading inputs, reconstruction or writing the
    /// output fails.
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Command::Build(args) => self.build(args),
            Command::Index(args) => Self::index(args),
        }
    }

    fn build(&self, args: &BuildArgs) -> Result<()> {
        let source = load_image(&args.source)?;
        let terminal = (!self.cli.quiet).then(|| {
            TerminalProgress::new(
                args.source
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string(),
            )
        });
        let listener: &dyn ProgressListener = match &terminal {
            Some(terminal) => terminal,
            None => &SilentProgress,
        };

        let outcome = Self::assemble(args, &source, listener);
        if let Some(terminal) = &terminal {
            match &outcome {
                Ok(_) => terminal.finish("done"),
                Err(_) => terminal.clear(),
            }
        }

        let output_path = args.output_path();
        export_png(&outcome?, &output_path)?;
        tracing::info!(output = %output_path.display(), "mosaic written");
        Ok(())
    }

    fn assemble(
        args: &BuildArgs,
        source: &RgbaImage,
        listener: &dyn ProgressListener,
    ) -> Result<RgbaImage> {
        let phases = MultiStepProgress::new(listener, &DEFAULT_PHASE_WEIGHTS)?;
        let mut reconstructor = args.reconstructor(source, &phases)?;
        phases.next_phase();

        if args.layout.is_pattern() {
            let mut assembler = Assembler::new(TileMatcher::trivial(), SolidColorSource);
            return assembler.run(&mut reconstructor, &phases);
        }

        let catalog_path = args.catalog.as_deref().ok_or_else(|| {
            invalid_parameter(
                "catalog",
                &"<none>",
                &format!("layout '{}' needs a tile catalog", reconstructor.name()),
            )
        })?;
        let catalog = TileCatalog::load(catalog_path)?;
        if catalog.is_empty() {
            return Err(invalid_parameter(
                "catalog",
                &catalog_path.display(),
                &"catalog contains no tiles",
            ));
        }

        let mut assembler = Assembler::new(args.matcher(catalog.tiles), FileImageSource::default());
        let image = assembler.run(&mut reconstructor, &phases)?;
        let stats = assembler.stats();
        tracing::debug!(
            layout = reconstructor.name(),
            matcher = assembler.matcher().strategy_name(),
            fragments = stats.fragments,
            evicted = stats.evicted_tiles,
            used_tiles = assembler.matcher().used_tiles_count(),
            "assembly finished"
        );
        Ok(image)
    }

    fn index(args: &IndexArgs) -> Result<()> {
        let catalog = TileCatalog::from_image_paths(&args.files)?;
        catalog.save(&args.output)?;
        tracing::info!(
            tiles = catalog.len(),
            output = %args.output.display(),
            "catalog written"
        );
        Ok(())
    }
}
