use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use obj_indexer::config::{CliArgs, ConvertConfig};
use obj_indexer::pipeline::Pipeline;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Init tracing
    let filter = if args.verbose {
        EnvFilter::new("obj_indexer=debug")
    } else {
        EnvFilter::new("obj_indexer=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config: ConvertConfig = args.into();

    match Pipeline::run(&config) {
        Ok(result) => {
            match &result.files {
                Some(files) => println!(
                    "Done: wrote {} in {:.2}s",
                    files.buffer.display(),
                    result.duration.as_secs_f64()
                ),
                None => println!(
                    "Done: {} triangles in {:.2}s",
                    result.sizing.triangle_count,
                    result.duration.as_secs_f64()
                ),
            }
            Ok(())
        }
        Err(e) => {
            error!(%e, "Conversion failed");
            Err(anyhow::anyhow!(e)).context("obj-indexer conversion failed")
        }
    }
}
