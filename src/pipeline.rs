use std::time::{Duration, Instant};

use tracing::info;

use crate::config::ConvertConfig;
use crate::error::Result;
use crate::ingestion::{self, LoadStats, SizingDescriptor};
use crate::output::{self, WrittenFiles};

/// Summary of a completed conversion.
#[derive(Debug)]
pub struct ConvertResult {
    pub sizing: SizingDescriptor,
    /// `None` on a dry run.
    pub stats: Option<LoadStats>,
    /// `None` when no output path was configured or on a dry run.
    pub files: Option<WrittenFiles>,
    pub duration: Duration,
}

/// Conversion orchestrator: count, build, write.
pub struct Pipeline;

impl Pipeline {
    pub fn run(config: &ConvertConfig) -> Result<ConvertResult> {
        let start = Instant::now();

        info!(
            input = %config.input.display(),
            policy = %config.load.attribute_policy,
            "Starting conversion"
        );

        if config.dry_run {
            info!("--dry-run: counting only");
            let sizing = ingestion::count_obj(&config.input, &config.load)?;
            print_sizing(&sizing);
            return Ok(ConvertResult {
                sizing,
                stats: None,
                files: None,
                duration: start.elapsed(),
            });
        }

        info!("Stage 1/2: Load");
        let (mesh, stats) = ingestion::load_obj_with_stats(&config.input, &config.load)?;
        print_stats(&stats);

        let files = match &config.output {
            Some(stem) => {
                info!("Stage 2/2: Write");
                Some(output::write_mesh(&mesh, stem)?)
            }
            None => None,
        };

        let duration = start.elapsed();
        info!(
            points = mesh.point_count(),
            triangles = mesh.triangle_count(),
            elapsed = ?duration,
            "Conversion complete"
        );

        Ok(ConvertResult {
            sizing: stats.sizing,
            stats: Some(stats),
            files,
            duration,
        })
    }
}

fn print_sizing(sizing: &SizingDescriptor) {
    println!("=== Sizing ===");
    println!("  Positions: {}", sizing.position_count);
    println!("  Texcoords: {}", sizing.texcoord_count);
    println!("  Normals:   {}", sizing.normal_count);
    println!("  Corners:   {}", sizing.corner_count);
    println!("  Triangles: {}", sizing.triangle_count);
    println!("  Width:     {}", sizing.layout().width());
}

fn print_stats(stats: &LoadStats) {
    print_sizing(&stats.sizing);
    println!("  Points:    {}", stats.point_count);
    println!("  Dedup:     {:.1}%", stats.dedup_ratio * 100.0);
}
