use std::path::PathBuf;
use std::sync::Arc;

use crate::logging::ProgressLog;
use crate::reader_registry::ReaderRegistry;

/// 输出文件扩展名
pub const OUTPUT_EXTENSION: &str = "tfrecord";

/// 全局共享状态，所有工作线程只读共享
/// 每个文件的处理只需要文件路径和这份状态
pub struct AppState {
    pub reader_registry: Arc<ReaderRegistry>,
    pub output_dir: PathBuf,
    /// 子立方体边长 S
    pub sample_size: usize,
    pub logger: Arc<dyn ProgressLog>,
}

impl AppState {
    pub fn new(
        reader_registry: Arc<ReaderRegistry>,
        output_dir: impl Into<PathBuf>,
        sample_size: usize,
        logger: Arc<dyn ProgressLog>,
    ) -> Self {
        Self {
            reader_registry,
            output_dir: output_dir.into(),
            sample_size,
            logger,
        }
    }
}
