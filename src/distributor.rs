use std::ops::Range;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::app_state::AppState;
use crate::error::{PrepareError, Result};
use crate::partition::blocks_per_axis;
use crate::processor::{FileReport, process_file};
use crate::reader_registry::ReaderRegistry;

/// 一个任务分到的源文件列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkAssignment {
    pub task: usize,
    pub n_tasks: usize,
    pub files: Vec<PathBuf>,
}

/// 单个文件的处理计划（只读取元数据）
#[derive(Debug, Clone, Serialize)]
pub struct FilePlan {
    pub path: PathBuf,
    pub shape: Vec<usize>,
    pub sub_cubes: usize,
}

/// 一个任务的处理计划，用于 `--dry-run`
#[derive(Debug, Clone, Serialize)]
pub struct TaskPlan {
    pub task: usize,
    pub n_tasks: usize,
    pub sample_size: usize,
    pub files: Vec<FilePlan>,
}

/// 递归查找根目录下所有源文件
/// 只保留文件名以已注册后缀结尾的普通文件（或指向普通文件的符号链接），
/// 按完整路径的字节序排序后截取前 max_files 个
pub fn discover_files(
    root: &Path,
    registry: &ReaderRegistry,
    max_files: Option<usize>,
) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(PrepareError::Argument(format!(
            "input directory {} does not exist or is not a directory",
            root.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        let file_type = entry.file_type();
        let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if registry.is_source_file(name) {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    if let Some(max_files) = max_files {
        files.truncate(max_files);
    }
    debug!(count = files.len(), root = %root.display(), "Discovered source files");
    Ok(files)
}

/// 把长度为 len 的列表分成 n_tasks 段连续区间，取第 task 段
/// 前 len % n_tasks 段各多一个元素，各段长度最多相差 1
pub fn task_range(len: usize, task: usize, n_tasks: usize) -> Range<usize> {
    let base = len / n_tasks;
    let extra = len % n_tasks;
    let start = task * base + task.min(extra);
    let size = base + usize::from(task < extra);
    start..start + size
}

/// 按任务切分文件列表
pub fn assign_task(files: &[PathBuf], task: usize, n_tasks: usize) -> Result<WorkAssignment> {
    if n_tasks == 0 || task >= n_tasks {
        return Err(PrepareError::Argument(format!(
            "task {} is out of range for {} task(s)",
            task, n_tasks
        )));
    }
    Ok(WorkAssignment {
        task,
        n_tasks,
        files: files[task_range(files.len(), task, n_tasks)].to_vec(),
    })
}

/// 使用固定大小的工作线程池处理本任务的全部文件
/// 文件之间没有依赖，完成顺序任意；第一个失败会终止整个批次
pub fn dispatch(
    state: &AppState,
    assignment: &WorkAssignment,
    n_workers: usize,
) -> Result<Vec<FileReport>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n_workers)
        .thread_name(|i| format!("volume-shards-worker-{}", i))
        .build()
        .map_err(|e| PrepareError::WorkerPool(e.to_string()))?;

    debug!(
        task = assignment.task,
        files = assignment.files.len(),
        workers = n_workers,
        "Dispatching files"
    );

    pool.install(|| {
        assignment
            .files
            .par_iter()
            .map(|file| process_file(state, file))
            .collect()
    })
}

/// 生成任务计划：读取每个文件的 shape，计算会产生的子立方体数量，不写任何文件
pub fn plan_task(
    assignment: &WorkAssignment,
    registry: &ReaderRegistry,
    sample_size: usize,
) -> Result<TaskPlan> {
    let files = assignment
        .files
        .iter()
        .map(|path| {
            let reader = registry
                .find_reader_for_file(path)
                .ok_or_else(|| PrepareError::read(path, "no reader registered for this file name"))?;
            let shape = reader.get_shape_from_file(path)?;
            let per_axis = blocks_per_axis(shape.first().copied().unwrap_or(0), sample_size);
            Ok(FilePlan {
                path: path.clone(),
                shape,
                sub_cubes: per_axis * per_axis * per_axis,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TaskPlan {
        task: assignment.task,
        n_tasks: assignment.n_tasks,
        sample_size,
        files,
    })
}
