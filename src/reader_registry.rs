use std::path::Path;

use crate::reader::VolumeReader;

/// 读取器注册表
/// 管理所有可用的源文件读取器，并根据文件名后缀匹配对应的读取器
pub struct ReaderRegistry {
    readers: Vec<Box<dyn VolumeReader>>,
}

impl ReaderRegistry {
    /// 创建新的注册表，自动注册所有内置读取器
    pub fn new() -> Self {
        Self::with_readers(crate::readers::get_all_readers())
    }

    /// 使用给定的读取器列表创建注册表
    pub fn with_readers(readers: Vec<Box<dyn VolumeReader>>) -> Self {
        Self { readers }
    }

    /// 根据文件名查找匹配的读取器
    pub fn find_reader(&self, file_name: &str) -> Option<&dyn VolumeReader> {
        self.readers
            .iter()
            .find(|reader| reader.supports(file_name))
            .map(|r| r.as_ref())
    }

    /// 根据文件路径查找匹配的读取器，自动提取文件名
    pub fn find_reader_for_file(&self, path: &Path) -> Option<&dyn VolumeReader> {
        let file_name = path.file_name()?.to_str()?;
        self.find_reader(file_name)
    }

    /// 文件名是否有对应的读取器
    pub fn is_source_file(&self, file_name: &str) -> bool {
        self.find_reader(file_name).is_some()
    }

    /// 获取所有支持的后缀列表
    pub fn supported_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self
            .readers
            .iter()
            .flat_map(|reader| reader.supported_extensions())
            .map(str::to_string)
            .collect();
        extensions.sort();
        extensions.dedup();
        extensions
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
