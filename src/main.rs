use std::fs;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info};

use volume_shards::logging::init_logging;
use volume_shards::{
    AppState, Args, PrepareConfig, PrepareError, ReaderRegistry, TracingLog, assign_task,
    discover_files, dispatch, plan_task,
};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // 参数校验在任何工作开始之前完成
    let config = PrepareConfig::try_from(args)?;
    info!("Initializing");
    debug!(?config, "Configuration");

    let reader_registry = Arc::new(ReaderRegistry::new());
    if reader_registry.is_empty() {
        anyhow::bail!("no source readers compiled in; enable the `hdf5` feature");
    }
    debug!(extensions = ?reader_registry.supported_extensions(), "Registered readers");

    // 查找输入文件并取出本任务负责的部分
    let files = discover_files(&config.input_dir, &reader_registry, config.max_files)?;
    let assignment = assign_task(&files, config.task, config.n_tasks)?;
    info!(
        "Task {} of {}: {} of {} file(s)",
        config.task,
        config.n_tasks,
        assignment.files.len(),
        files.len()
    );

    if config.dry_run {
        let plan = plan_task(&assignment, &reader_registry, config.sample_size)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    // 输出目录只在开始时创建一次，之后所有工作线程共享
    fs::create_dir_all(&config.output_dir)
        .map_err(|e| PrepareError::write(&config.output_dir, e))?;

    let state = AppState::new(
        reader_registry,
        &config.output_dir,
        config.sample_size,
        Arc::new(TracingLog),
    );
    dispatch(&state, &assignment, config.n_workers)?;

    info!("All done!");
    Ok(())
}
