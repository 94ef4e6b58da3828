use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use shellmesh::{
  Consolidate, Envelope, GeometryStrip, HalfEdge, Noise, ObjWriter,
  Operation, Solidify, TriangleSoup,
};

#[derive(Parser)]
#[command(version, author = "Ryan G.")]
#[command(about = "Welds, solidifies and exports triangle sheets")]
struct Opts {
  /// Log level (trace, debug, info, warn, error)
  #[arg(short, long, default_value = "info")]
  log_level: String,

  #[command(subcommand)]
  method: Methods,
}

#[derive(Subcommand)]
enum Methods {
  /// load an OBJ file, weld it and export it
  Build(BuildOpts),
  /// generate two glued strips, weld them and export them
  Strip(StripOpts),
}

#[derive(Args)]
struct BuildOpts {
  /// Input mesh file
  infile: PathBuf,
  /// Output mesh file
  outfile: PathBuf,

  #[command(flatten)]
  pipeline: PipelineOpts,
}

#[derive(Args)]
struct StripOpts {
  /// Output mesh file
  outfile: PathBuf,

  /// Vertices across each strip
  #[arg(long, default_value_t = 8)]
  columns: usize,
  /// Vertices along each strip
  #[arg(long, default_value_t = 40)]
  rows: usize,
  #[arg(long, default_value_t = 4.0)]
  width: f32,
  #[arg(long, default_value_t = 20.0)]
  length: f32,

  #[command(flatten)]
  noise: Noise,

  #[command(flatten)]
  pipeline: PipelineOpts,
}

#[derive(Args)]
struct PipelineOpts {
  #[command(flatten)]
  consolidate: Consolidate,

  /// Turn the welded sheet into a closed shell this thick
  #[arg(long)]
  separation: Option<f32>,

  /// Write vertex positions as well as faces
  #[arg(long)]
  positions: bool,
}

fn main() -> anyhow::Result<()> {
  let opts: Opts = Opts::parse();

  let level = match opts.log_level.to_lowercase().as_str() {
    "trace" => Level::TRACE,
    "debug" => Level::DEBUG,
    "info" => Level::INFO,
    "warn" => Level::WARN,
    "error" => Level::ERROR,
    _ => Level::INFO,
  };

  let subscriber = FmtSubscriber::builder()
    .with_max_level(level)
    .with_target(false)
    .finish();
  tracing::subscriber::set_global_default(subscriber)?;

  match opts.method {
    Methods::Build(build) => {
      let soup = TriangleSoup::load_obj(&build.infile)?;
      let mesh = soup
        .build()
        .with_context(|| format!("building {}", build.infile.display()))?;
      run_pipeline(mesh, &build.pipeline, &build.outfile)
    }
    Methods::Strip(strip) => {
      let mesh = build_strips(&strip)?;
      run_pipeline(mesh, &strip.pipeline, &strip.outfile)
    }
  }
}

fn build_strips(opts: &StripOpts) -> anyhow::Result<HalfEdge> {
  let half_width = opts.width / 2.0;

  let left = GeometryStrip::sheet(
    opts.columns,
    opts.rows,
    half_width,
    opts.length,
    -0.5,
    Some(&Envelope::new(0.0, 0.85, 0.95, 1.0)),
  );
  let mut right = GeometryStrip::sheet(
    opts.columns,
    opts.rows,
    half_width,
    opts.length,
    0.5,
    Some(&Envelope::new(0.0, 0.1, 0.9, 1.0)),
  );
  right.glue_left(left)?;

  info!(
    "generated strip {} vertices wide and {} long",
    right.width(),
    right.height()
  );

  let mut mesh = TriangleSoup::from(&right).build()?;
  opts.noise.apply(&mut mesh)?;
  Ok(mesh)
}

fn run_pipeline(
  mut mesh: HalfEdge,
  opts: &PipelineOpts,
  outfile: &Path,
) -> anyhow::Result<()> {
  log_measurements("built", &mesh);

  opts.consolidate.apply(&mut mesh)?;
  log_measurements("consolidated", &mesh);

  if let Some(separation) = opts.separation {
    Solidify::new(separation)
      .apply(&mut mesh)
      .context("solidifying the welded sheet")?;
    log_measurements("solidified", &mesh);
  }

  let dir = outfile.parent().unwrap_or_else(|| Path::new(""));
  let name = outfile
    .file_stem()
    .and_then(|stem| stem.to_str())
    .context("output file needs a name")?;

  let path = ObjWriter::new(opts.positions).save(&mesh, dir, name)?;
  info!("saved {}", path.display());

  Ok(())
}

fn log_measurements(phase: &str, mesh: &HalfEdge) {
  info!(
    "{}: {} vertices, {} faces, area {}, perimeter {}",
    phase,
    mesh.num_vertices(),
    mesh.num_faces(),
    mesh.surface_area(),
    mesh.perimeter()
  );
}
