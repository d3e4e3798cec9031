use std::path::PathBuf;

use clap::Parser;

use crate::error::{PrepareError, Result};

pub const DEFAULT_INPUT_DIR: &str = "/project/projectdirs/m3363/www/cosmoUniverse_2019_05_4parE";
pub const DEFAULT_OUTPUT_DIR: &str =
    "/global/cscratch1/sd/sfarrell/cosmoflow-benchmark/data/cosmoUniverse_2019_05_4parE_tf";

/// 命令行参数
#[derive(Debug, Clone, Parser)]
#[command(name = "volume-shards")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Split HDF5 simulation volumes into per-sub-cube TFRecord files")]
pub struct Args {
    /// Root directory searched recursively for source files
    #[arg(short, long, default_value = DEFAULT_INPUT_DIR, value_name = "PATH")]
    pub input_dir: PathBuf,

    /// Destination directory for records (created if absent)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, value_name = "PATH")]
    pub output_dir: PathBuf,

    /// Enable debug-level logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Edge length of each sub-cube
    #[arg(long, default_value_t = 128, allow_negative_numbers = true)]
    pub sample_size: i64,

    /// Process at most this many source files (first N in sorted order)
    #[arg(long, allow_negative_numbers = true)]
    pub max_files: Option<i64>,

    /// Worker pool size for this task
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub n_workers: i64,

    /// 0-based index of this task
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub task: i64,

    /// Total number of independent tasks
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub n_tasks: i64,

    /// Print this task's plan as JSON and exit without writing
    #[arg(long)]
    pub dry_run: bool,
}

/// 校验后的运行配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub verbose: bool,
    pub sample_size: usize,
    pub max_files: Option<usize>,
    pub n_workers: usize,
    pub task: usize,
    pub n_tasks: usize,
    pub dry_run: bool,
}

impl TryFrom<Args> for PrepareConfig {
    type Error = PrepareError;

    fn try_from(args: Args) -> Result<Self> {
        let sample_size = positive("--sample-size", args.sample_size)?;
        let n_workers = positive("--n-workers", args.n_workers)?;
        let n_tasks = positive("--n-tasks", args.n_tasks)?;
        let task = non_negative("--task", args.task)?;
        if task >= n_tasks {
            return Err(PrepareError::Argument(format!(
                "--task {} must be less than --n-tasks {}",
                task, n_tasks
            )));
        }
        let max_files = args
            .max_files
            .map(|n| non_negative("--max-files", n))
            .transpose()?;

        Ok(Self {
            input_dir: args.input_dir,
            output_dir: args.output_dir,
            verbose: args.verbose,
            sample_size,
            max_files,
            n_workers,
            task,
            n_tasks,
            dry_run: args.dry_run,
        })
    }
}

fn non_negative(flag: &str, value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| PrepareError::Argument(format!("{} must not be negative, got {}", flag, value)))
}

fn positive(flag: &str, value: i64) -> Result<usize> {
    match non_negative(flag, value)? {
        0 => Err(PrepareError::Argument(format!("{} must be at least 1", flag))),
        n => Ok(n),
    }
}
