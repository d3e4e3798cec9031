use std::path::Path;

use crate::error::Result;
use crate::volume::SourceVolume;

/// 源文件读取器 trait
/// 不同的源文件格式需要实现这个 trait
pub trait VolumeReader: Send + Sync {
    /// 支持的文件名后缀，例如: "hdf5"
    /// 按普通后缀匹配（不要求前面有点号）
    fn supported_extensions(&self) -> Vec<&'static str>;

    /// 检查文件名是否以支持的后缀结尾
    fn supports(&self, file_name: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|ext| file_name.ends_with(ext))
    }

    /// 读取完整的体数据和参数向量
    fn read_from_file(&self, path: &Path) -> Result<SourceVolume>;

    /// 快速获取体数据的 shape（只读取元数据，不读取完整数据）
    fn get_shape_from_file(&self, path: &Path) -> Result<Vec<usize>>;

    /// 读取器名称（用于日志和错误信息）
    fn name(&self) -> &'static str;
}
