use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_state::{AppState, OUTPUT_EXTENSION};
use crate::error::{PrepareError, Result};
use crate::record::encode_record;

/// 单个源文件的处理结果
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    /// 写出的记录（文件）数量
    pub records: usize,
    /// 写出的总字节数
    pub bytes: u64,
    pub elapsed: Duration,
}

/// 输出文件名：`<源文件名去掉扩展名>_<三位编号>.<扩展名>`
/// 编号超过 999 时自然变宽
pub fn output_file_name(input: &Path, index: usize, extension: &str) -> Result<String> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PrepareError::read(input, "source file name is not valid UTF-8"))?;
    Ok(format!("{}_{:03}.{}", stem, index, extension))
}

/// 处理一个源文件：读取体数据，切分为子立方体，每个子立方体写出一个记录文件
///
/// ## 流程
/// 1. 根据文件名后缀找到读取器，读取体数据（`full`）和参数向量（`unitPar`）
/// 2. 按 i、j、k 嵌套顺序枚举子立方体，编号从 0 开始
/// 3. 每个子立方体和参数向量编码为一条记录，写入输出目录下的独立文件
///
/// 任何读取或写入失败都会立即终止该文件的处理，不重试
pub fn process_file(state: &AppState, input: &Path) -> Result<FileReport> {
    let started = Instant::now();
    state.logger.reading(input);

    // ==================== 步骤 1: 查找读取器并加载数据 ====================
    let reader = state
        .reader_registry
        .find_reader_for_file(input)
        .ok_or_else(|| PrepareError::read(input, "no reader registered for this file name"))?;
    let volume = reader.read_from_file(input)?;

    // ==================== 步骤 2: 枚举子立方体并逐个写出 ====================
    let mut records = 0usize;
    let mut bytes = 0u64;
    for cube in volume.sub_cubes(state.sample_size) {
        let record = encode_record(&cube.view, volume.params());

        let file_name = output_file_name(input, cube.block.index, OUTPUT_EXTENSION)?;
        let output = state.output_dir.join(file_name);

        state.logger.writing(&output);
        fs::write(&output, &record).map_err(|e| PrepareError::write(&output, e))?;

        records += 1;
        bytes += record.len() as u64;
    }

    // ==================== 步骤 3: 汇报结果 ====================
    let report = FileReport {
        input: input.to_path_buf(),
        records,
        bytes,
        elapsed: started.elapsed(),
    };
    state.logger.finished(&report);
    Ok(report)
}
