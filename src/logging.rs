use std::path::Path;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::processor::FileReport;

/// 进度日志接口
/// 核心组件只依赖这个接口，不直接依赖全局日志配置
pub trait ProgressLog: Send + Sync {
    /// 开始读取源文件
    fn reading(&self, input: &Path);

    /// 即将写入一个输出文件
    fn writing(&self, output: &Path);

    /// 一个源文件处理完成
    fn finished(&self, report: &FileReport);
}

/// 基于 tracing 的默认实现
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl ProgressLog for TracingLog {
    fn reading(&self, input: &Path) {
        info!("Reading {}", input.display());
    }

    fn writing(&self, output: &Path) {
        info!("Writing {}", output.display());
    }

    fn finished(&self, report: &FileReport) {
        debug!(
            records = report.records,
            bytes = report.bytes,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Finished {}",
            report.input.display()
        );
    }
}

/// 在进程入口处初始化一次日志输出
/// 默认 info 级别，verbose 时为 debug；设置了 RUST_LOG 时以其为准
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
