use std::path::PathBuf;

use clap::Parser;

/// Default per-line scratch limit in bytes.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// How corners that omit texcoord or normal references are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AttributePolicy {
    /// Missing slots are filled with zeros.
    #[default]
    #[value(name = "padded")]
    Padded,
    /// Every corner must carry exactly the attributes of the file layout.
    #[value(name = "uniform")]
    Uniform,
}

impl std::fmt::Display for AttributePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributePolicy::Padded => write!(f, "padded"),
            AttributePolicy::Uniform => write!(f, "uniform"),
        }
    }
}

/// Knobs for a single load call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Longest accepted line in bytes, excluding the line terminator.
    pub max_line_length: usize,
    pub attribute_policy: AttributePolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            attribute_policy: AttributePolicy::Padded,
        }
    }
}

/// Fully resolved conversion configuration (constructed from CLI args).
#[derive(Debug, Clone, Default)]
pub struct ConvertConfig {
    pub input: PathBuf,
    /// Output path stem; `None` skips writing buffers.
    pub output: Option<PathBuf>,
    pub load: LoadOptions,
    pub dry_run: bool,
    pub verbose: bool,
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "obj-indexer",
    about = "Wavefront OBJ to interleaved indexed triangle list converter",
    version
)]
pub struct CliArgs {
    /// Input OBJ file
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Output path stem (writes <stem>.bin and <stem>.json)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Longest accepted line in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    pub max_line_length: usize,

    /// Handling of corners missing texcoord/normal: padded or uniform
    #[arg(long, value_enum, default_value = "padded")]
    pub attribute_policy: AttributePolicy,

    /// Count the input and report sizes only
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl From<CliArgs> for ConvertConfig {
    fn from(args: CliArgs) -> Self {
        ConvertConfig {
            input: args.input,
            output: args.output,
            load: LoadOptions {
                max_line_length: args.max_line_length,
                attribute_policy: args.attribute_policy,
            },
            dry_run: args.dry_run,
            verbose: args.verbose,
        }
    }
}
