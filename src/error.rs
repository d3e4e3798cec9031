use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 数据准备流程中的错误
/// 任何一个错误都会终止当前文件的处理，并向上传播到整个运行
#[derive(Debug, Error)]
pub enum PrepareError {
    /// 源文件缺失、无法读取、缺少数据集或形状不符合要求
    #[error("failed to read {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    /// 输出目录或输出文件无法写入
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 命令行参数组合无效，在开始任何工作之前报告
    #[error("invalid argument: {0}")]
    Argument(String),

    /// 工作线程池无法创建
    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

impl PrepareError {
    pub fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PrepareError>;
