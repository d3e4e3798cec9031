use std::path::Path;

use crate::error::{PrepareError, Result};
use crate::reader::VolumeReader;
use crate::volume::{SourceVolume, validate_shape};

/// 体数据集名称
pub const VOLUME_DATASET: &str = "full";
/// 参数向量数据集名称
pub const PARAMS_DATASET: &str = "unitPar";

/// HDF5 源文件读取器
/// 文件中需要包含 `full`（至少三维）和 `unitPar`（一维）两个数据集，
/// 数值类型在读取时统一转换为 f32
pub struct Hdf5Reader;

impl Hdf5Reader {
    pub fn new() -> Self {
        Hdf5Reader
    }

    fn open(path: &Path) -> Result<hdf5::File> {
        hdf5::File::open(path).map_err(|e| PrepareError::read(path, e))
    }

    fn dataset(file: &hdf5::File, path: &Path, name: &str) -> Result<hdf5::Dataset> {
        file.dataset(name)
            .map_err(|e| PrepareError::read(path, format!("dataset `{}`: {}", name, e)))
    }
}

impl Default for Hdf5Reader {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeReader for Hdf5Reader {
    fn supported_extensions(&self) -> Vec<&'static str> {
        vec!["hdf5"]
    }

    fn name(&self) -> &'static str {
        "HDF5 Reader"
    }

    fn read_from_file(&self, path: &Path) -> Result<SourceVolume> {
        let file = Self::open(path)?;

        let volume = Self::dataset(&file, path, VOLUME_DATASET)?;
        let shape = volume.shape();
        validate_shape(&shape).map_err(|e| PrepareError::read(path, e))?;
        let data: Vec<f32> = volume
            .read_raw::<f32>()
            .map_err(|e| PrepareError::read(path, format!("dataset `{}`: {}", VOLUME_DATASET, e)))?;

        let params = Self::dataset(&file, path, PARAMS_DATASET)?;
        if params.ndim() != 1 {
            return Err(PrepareError::read(
                path,
                format!(
                    "dataset `{}` must be 1-dimensional, got shape {:?}",
                    PARAMS_DATASET,
                    params.shape()
                ),
            ));
        }
        let params: Vec<f32> = params
            .read_raw::<f32>()
            .map_err(|e| PrepareError::read(path, format!("dataset `{}`: {}", PARAMS_DATASET, e)))?;

        SourceVolume::new(&shape, data, params).map_err(|e| PrepareError::read(path, e))
    }

    fn get_shape_from_file(&self, path: &Path) -> Result<Vec<usize>> {
        let file = Self::open(path)?;
        let shape = Self::dataset(&file, path, VOLUME_DATASET)?.shape();
        validate_shape(&shape).map_err(|e| PrepareError::read(path, e))?;
        Ok(shape)
    }
}
