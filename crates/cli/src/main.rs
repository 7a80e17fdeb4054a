//! Quasigeoid CLI - quasigeoid refinement by least-squares collocation

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use quasigeoid_algorithms::collocation::{
    prognosis, prognosis_nodes, CollocationParams, CovType, EmpiricalCov, EmpiricalCovParams,
    PolynomialTrend, RegressionTrend, SignalRms, TrendModel, TrigonometricTrend,
};
use quasigeoid_algorithms::gravity::{GeoidSynthesis, GravityFieldModel, GravityModel};
use quasigeoid_core::io::{
    read_control_records, read_grid_text, write_grid_text, write_predictions, RowOrder,
};
use quasigeoid_core::{
    BilinearInterpolator, ControlPoint, Grid, GridSpec, ModelSurface, Observation, RefSystem,
};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "quasigeoid")]
#[command(author, version, about = "Quasigeoid refinement by least-squares collocation", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a model grid from gravity field coefficients
    Model {
        /// Coefficient file (ICGEM .gfc)
        coefficients: PathBuf,
        /// Model grid output file
        output: PathBuf,
        /// Gravity field model: egm2008, eigen6c4
        #[arg(short, long, default_value = "egm2008")]
        gravity_model: String,
        /// Truncation degree (full model degree by default)
        #[arg(long)]
        max_degree: Option<u32>,
        /// Reference system: grs80, wgs84
        #[arg(short, long, default_value = "grs80")]
        ref_system: String,
        #[command(flatten)]
        geometry: GridArgs,
    },
    /// Show information about a model grid
    Info {
        /// Model grid text file (lon lat value)
        grid: PathBuf,
        #[command(flatten)]
        geometry: GridArgs,
    },
    /// Fit a covariance function to the control-point signals
    Empirical {
        /// Model grid text file (lon lat value)
        grid: PathBuf,
        /// Control points file (id lat lon normal geodetic normal_err geodetic_err)
        control: PathBuf,
        #[command(flatten)]
        geometry: GridArgs,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Correct the model grid with control points
    Collocate {
        /// Model grid text file (lon lat value)
        grid: PathBuf,
        /// Control points file (id lat lon normal geodetic normal_err geodetic_err)
        control: PathBuf,
        /// Corrected grid output file
        output: PathBuf,
        /// Also write per-node predictions (lon lat geometric signal error)
        #[arg(short, long)]
        predictions: Option<PathBuf>,
        /// Trend model: none, constant, poly:<nlat>,<nlon>,
        /// regression:<x>,<y>,<total>, trig:<order>
        #[arg(short, long, default_value = "regression:1,1,1")]
        trend: String,
        #[command(flatten)]
        geometry: GridArgs,
        #[command(flatten)]
        model: ModelArgs,
    },
}

/// Geometry of the model grid file
#[derive(Args)]
struct GridArgs {
    /// Southern edge latitude (degrees)
    #[arg(long, default_value = "51.0")]
    lat_min: f64,
    /// Northern edge latitude (degrees)
    #[arg(long, default_value = "57.0")]
    lat_max: f64,
    /// Western edge longitude (degrees)
    #[arg(long, default_value = "23.0")]
    lon_min: f64,
    /// Eastern edge longitude (degrees)
    #[arg(long, default_value = "33.0")]
    lon_max: f64,
    /// Latitude step (arc minutes)
    #[arg(long, default_value = "2.5")]
    step_lat: f64,
    /// Longitude step (arc minutes)
    #[arg(long, default_value = "2.5")]
    step_lon: f64,
    /// Grid file lists the southern row first
    #[arg(long)]
    ascending: bool,
}

impl GridArgs {
    fn spec(&self) -> Result<GridSpec> {
        GridSpec::new(
            self.lat_min,
            self.lon_min,
            self.lat_max,
            self.lon_max,
            self.step_lat / 60.0,
            self.step_lon / 60.0,
        )
        .context("Invalid grid geometry")
    }

    fn order(&self) -> RowOrder {
        if self.ascending {
            RowOrder::Ascending
        } else {
            RowOrder::Descending
        }
    }
}

/// Statistical model options
#[derive(Args)]
struct ModelArgs {
    /// Covariance function: gaussMarkov2, gaussMarkov3, gaussian, hirvonen
    #[arg(short, long, default_value = "hirvonen")]
    cov: String,
    /// Reference system: grs80, wgs84
    #[arg(short, long, default_value = "grs80")]
    ref_system: String,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_grid(path: &Path, geometry: &GridArgs) -> Result<Grid> {
    let pb = spinner("Reading model grid...");
    let mut grid = Grid::new(geometry.spec()?).context("Failed to allocate grid")?;
    read_grid_text(path, &mut grid, geometry.order())
        .with_context(|| format!("Failed to read grid {}", path.display()))?;
    pb.finish_and_clear();
    info!("Grid: {} x {}", grid.cols(), grid.rows());
    Ok(grid)
}

fn read_controls(path: &Path, surface: Arc<dyn ModelSurface>) -> Result<Vec<ControlPoint>> {
    let records = read_control_records(path)
        .with_context(|| format!("Failed to read control points {}", path.display()))?;
    let controls: Vec<ControlPoint> = records
        .into_iter()
        .map(|r| r.into_control_point(Arc::clone(&surface)))
        .collect();
    info!("Control points: {}", controls.len());
    Ok(controls)
}

fn control_signals(controls: &[ControlPoint]) -> Result<Vec<Observation>> {
    controls
        .iter()
        .map(ControlPoint::signal)
        .collect::<quasigeoid_core::Result<Vec<_>>>()
        .context("Control point outside the model grid")
}

fn log_rms(label: &str, signals: &[Observation]) {
    let rms = SignalRms::of(signals);
    info!(
        "{}: RMS value = {:.4} m, RMS error = {:.4} m",
        label, rms.value, rms.error
    );
}

fn parse_cov(s: &str) -> Result<CovType> {
    s.parse::<CovType>()
        .with_context(|| format!("Unknown covariance function: {}", s))
}

fn parse_ref_system(s: &str) -> Result<RefSystem> {
    s.parse::<RefSystem>()
        .with_context(|| format!("Unknown reference system: {}", s))
}

fn parse_degrees(s: &str, expected: usize) -> Result<Vec<u32>> {
    let degrees = s
        .split(',')
        .map(|d| d.trim().parse::<u32>().context("Invalid trend degree"))
        .collect::<Result<Vec<_>>>()?;
    if degrees.len() != expected {
        anyhow::bail!("Expected {} trend degrees, got: {}", expected, s);
    }
    Ok(degrees)
}

fn parse_trend(s: &str, controls: &[ControlPoint]) -> Result<Option<TrendModel>> {
    let s = s.trim().to_lowercase();
    let (name, args) = s.split_once(':').unwrap_or((s.as_str(), ""));
    let trend = match name {
        "none" => return Ok(None),
        "constant" => TrendModel::Constant,
        "poly" | "polynomial" => {
            let d = parse_degrees(args, 2)?;
            TrendModel::Polynomial(PolynomialTrend::centered(d[0], d[1], controls)?)
        }
        "regression" => {
            let d = parse_degrees(args, 3)?;
            TrendModel::Regression(RegressionTrend::new(d[0], d[1], d[2])?)
        }
        "trig" | "trigonometric" => {
            let d = parse_degrees(args, 1)?;
            TrendModel::Trigonometric(TrigonometricTrend::new(d[0])?)
        }
        _ => anyhow::bail!(
            "Unknown trend: {}. Use none, constant, poly:<nlat>,<nlon>, regression:<x>,<y>,<total> or trig:<order>.",
            s
        ),
    };
    Ok(Some(trend))
}

fn fit_covariance(controls: &[ControlPoint], model: &ModelArgs) -> Result<EmpiricalCov> {
    let kind = parse_cov(&model.cov)?;
    let ellipsoid = parse_ref_system(&model.ref_system)?.ellipsoid();
    let pb = spinner("Fitting covariance function...");
    let empirical = EmpiricalCov::fit(controls, kind, &ellipsoid, &EmpiricalCovParams::default())
        .context("Failed to fit covariance function")?;
    pb.finish_and_clear();
    info!("Covariance function: {}", empirical.cov_function());
    Ok(empirical)
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── Model grid ───────────────────────────────────────────────
        Commands::Model {
            coefficients,
            output,
            gravity_model,
            max_degree,
            ref_system,
            geometry,
        } => {
            let model = gravity_model
                .parse::<GravityModel>()
                .with_context(|| format!("Unknown gravity model: {}", gravity_model))?;
            let ellipsoid = parse_ref_system(&ref_system)?.ellipsoid();

            let pb = spinner("Reading gravity field coefficients...");
            let field = GravityFieldModel::read(&coefficients, model, ellipsoid, max_degree)
                .with_context(|| format!("Failed to read coefficients {}", coefficients.display()))?;
            pb.finish_and_clear();
            info!("{}: degree {}", model, field.max_degree());

            let synthesis = GeoidSynthesis::new(field);
            info!(
                "N0 = {:.4} m, model error = {:.4} m",
                synthesis.zero_degree_term(),
                synthesis.total_error()
            );

            let mut grid = Grid::new(geometry.spec()?).context("Failed to allocate grid")?;
            info!("Grid: {} x {}", grid.cols(), grid.rows());

            let start = Instant::now();
            let pb = spinner("Synthesizing model heights...");
            grid.fill_from(&synthesis)
                .context("Failed to synthesize model grid")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            write_grid_text(&grid, &output).context("Failed to write output")?;
            done("Model grid", &output, elapsed);
        }

        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { grid, geometry } => {
            let model = read_grid(&grid, &geometry)?;
            let spec = model.spec();
            let stats = model.statistics();

            println!("File: {}", grid.display());
            println!(
                "Dimensions: {} x {} ({} nodes)",
                model.cols(),
                model.rows(),
                model.len()
            );
            println!(
                "Extent: lat {:.6} .. {:.6}, lon {:.6} .. {:.6}",
                spec.lat_min, spec.lat_max, spec.lon_min, spec.lon_max
            );
            println!(
                "Step: {:.4}' x {:.4}'",
                spec.d_lat * 60.0,
                spec.d_lon * 60.0
            );
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!("  Valid nodes: {}", stats.valid_count);
        }

        // ── Empirical covariance ─────────────────────────────────────
        Commands::Empirical {
            grid,
            control,
            geometry,
            model,
        } => {
            let grid = Arc::new(read_grid(&grid, &geometry)?);
            let surface: Arc<dyn ModelSurface> = Arc::new(BilinearInterpolator::new(grid));
            let controls = read_controls(&control, surface)?;
            log_rms("Signals", &control_signals(&controls)?);

            let empirical = fit_covariance(&controls, &model)?;
            let f = empirical.cov_function();

            println!("Covariance function: {}", f.kind());
            println!("  Variance: {:.6} m²", f.variance());
            println!("  Correlation distance: {:.3}°", f.correl_distance());
            println!("  RMS misfit: {:.6}", empirical.misfit());
            println!(
                "  Bin width: {:.4}°, horizon: {:.4}°",
                empirical.min_distance(),
                empirical.max_distance()
            );
            println!("\n  distance    empirical    model");
            for s in empirical.curve() {
                println!(
                    "  {:8.4}  {:11.6}  {:11.6}",
                    s.distance,
                    s.covariance,
                    f.covariance(s.distance)
                );
            }
        }

        // ── Collocation ──────────────────────────────────────────────
        Commands::Collocate {
            grid,
            control,
            output,
            predictions,
            trend,
            geometry,
            model,
        } => {
            let ellipsoid = parse_ref_system(&model.ref_system)?.ellipsoid();
            let grid = Arc::new(read_grid(&grid, &geometry)?);
            let surface: Arc<dyn ModelSurface> =
                Arc::new(BilinearInterpolator::new(Arc::clone(&grid)));
            let controls = read_controls(&control, surface)?;
            log_rms("Signals before correction", &control_signals(&controls)?);

            let empirical = fit_covariance(&controls, &model)?;
            let trend = parse_trend(&trend, &controls)?;
            match &trend {
                Some(t) => info!("Trend: {}", t),
                None => info!("Trend: none"),
            }

            let nodes = prognosis_nodes(&controls, &grid);
            info!("Prognosis nodes: {}", nodes.len());

            let start = Instant::now();
            let pb = spinner("Running collocation...");
            let predicted = prognosis(
                &controls,
                &nodes,
                empirical.cov_function(),
                &ellipsoid,
                &CollocationParams { trend },
            )
            .context("Collocation failed")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();

            let predicted_signals: Vec<Observation> =
                predicted.iter().map(|n| n.signal()).collect();
            log_rms("Predicted signals", &predicted_signals);

            let mut corrected = (*grid).clone();
            corrected
                .apply_predictions(&predicted)
                .context("Failed to merge predictions")?;

            let corrected = Arc::new(corrected);
            let after: Arc<dyn ModelSurface> = Arc::new(BilinearInterpolator::new(Arc::clone(&corrected)));
            let residual: Vec<ControlPoint> = read_controls(&control, after)?;
            log_rms("Signals after correction", &control_signals(&residual)?);

            let pb = spinner("Writing output...");
            write_grid_text(&corrected, &output).context("Failed to write output")?;
            if let Some(path) = &predictions {
                write_predictions(&predicted, path).context("Failed to write predictions")?;
            }
            pb.finish_and_clear();
            done("Corrected grid", &output, elapsed);
        }
    }

    Ok(())
}
