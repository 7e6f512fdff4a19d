//! Command implementations for `wbgt-cli`.
//!
//! Each subcommand reads its inputs from files, runs one library stage and
//! writes the result. The binary only parses arguments and sets up logging.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use grid_processor::{read_field_set, write_field_set, GapFiller, GridProcessorConfig};
use projection::EqualAreaCrs;
use zonal_stats::{
    missing_regions, read_regions, write_results, AggregatorConfig, GeographyKind,
    ZonalAggregator,
};

/// Fill missing cells of a grid document.
#[derive(Args, Debug, Clone)]
pub struct FillArgs {
    /// Input grid document (JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output grid document (JSON)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Field to fill (repeatable; default: every field)
    #[arg(short, long = "field")]
    pub fields: Vec<String>,

    /// Numeric fill value to treat as missing
    #[arg(long, env = "GRID_MISSING_VALUE")]
    pub missing_value: Option<f32>,

    /// Relative tolerance for uniform axis spacing
    #[arg(long, env = "GRID_SPACING_TOLERANCE", default_value_t = 1e-6)]
    pub spacing_tolerance: f64,

    /// Fill time slices one after another
    #[arg(long)]
    pub sequential: bool,
}

impl FillArgs {
    pub fn config(&self) -> GridProcessorConfig {
        GridProcessorConfig {
            spacing_tolerance: self.spacing_tolerance,
            parallel: !self.sequential,
            missing_value: self.missing_value,
        }
    }
}

/// Aggregate a grid document over county or tract polygons.
#[derive(Args, Debug, Clone)]
pub struct AggregateArgs {
    /// Input grid document (JSON)
    #[arg(short, long)]
    pub grid: PathBuf,

    /// Region polygons (GeoJSON FeatureCollection)
    #[arg(short, long)]
    pub regions: PathBuf,

    /// Region category: county or tract
    #[arg(long, default_value = "county")]
    pub geography: String,

    /// Output GeoJSON FeatureCollection
    #[arg(short, long)]
    pub output: PathBuf,

    /// Equal-area CRS used for overlap areas
    #[arg(long, env = "ZONAL_EQUAL_AREA_CRS", default_value = "EPSG:5070")]
    pub crs: String,

    /// Longest polygon edge in degrees before reprojection
    #[arg(long, env = "ZONAL_DENSIFY_STEP_DEG", default_value_t = 0.05)]
    pub densify_step: f64,

    /// Numeric fill value in the grid to treat as missing
    #[arg(long, env = "GRID_MISSING_VALUE")]
    pub missing_value: Option<f32>,

    /// Relative tolerance for uniform axis spacing
    #[arg(long, env = "GRID_SPACING_TOLERANCE", default_value_t = 1e-6)]
    pub spacing_tolerance: f64,

    /// Evaluate regions one after another
    #[arg(long)]
    pub sequential: bool,
}

impl AggregateArgs {
    pub fn grid_config(&self) -> GridProcessorConfig {
        GridProcessorConfig {
            spacing_tolerance: self.spacing_tolerance,
            parallel: !self.sequential,
            missing_value: self.missing_value,
        }
    }

    pub fn config(&self) -> Result<AggregatorConfig> {
        let equal_area_crs: EqualAreaCrs = self
            .crs
            .parse()
            .with_context(|| format!("Invalid --crs '{}'", self.crs))?;
        Ok(AggregatorConfig {
            equal_area_crs,
            densify_step_deg: self.densify_step,
            parallel: !self.sequential,
        })
    }
}

/// Run the gap filler over a grid document.
pub fn run_fill(args: &FillArgs) -> Result<()> {
    let config = args.config();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid grid configuration: {}", e))?;

    let fields = read_field_set(&args.input, &config)
        .with_context(|| format!("Failed to read grid {}", args.input.display()))?;
    let filled = GapFiller::new(config)
        .fill_fields(&fields, &args.fields)
        .context("Gap filling failed")?;
    write_field_set(&args.output, &filled)
        .with_context(|| format!("Failed to write grid {}", args.output.display()))?;

    info!(
        fields = filled.len(),
        output = %args.output.display(),
        "Filled grid written"
    );
    Ok(())
}

/// Run the zonal aggregator and return the number of regions written.
pub fn run_aggregate(args: &AggregateArgs) -> Result<usize> {
    // Reject an unknown geography before touching any file.
    let kind: GeographyKind = args.geography.parse()?;
    let aggregator = ZonalAggregator::new(args.config()?)?;

    let grid_config = args.grid_config();
    grid_config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid grid configuration: {}", e))?;
    let fields = read_field_set(&args.grid, &grid_config)
        .with_context(|| format!("Failed to read grid {}", args.grid.display()))?;
    let regions = read_regions(&args.regions, kind)
        .with_context(|| format!("Failed to read regions {}", args.regions.display()))?;

    let results = aggregator.aggregate(&fields, &regions)?;
    write_results(&args.output, &results)
        .with_context(|| format!("Failed to write results {}", args.output.display()))?;

    let omitted = missing_regions(&regions, &results);
    info!(
        geography = %kind,
        input_regions = regions.len(),
        output_regions = results.len(),
        omitted = omitted.len(),
        output = %args.output.display(),
        "Aggregation complete"
    );
    Ok(results.len())
}
