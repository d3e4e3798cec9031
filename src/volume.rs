use ndarray::{ArrayD, IxDyn};

use crate::partition::SubCubes;

/// 源体数据
/// 前三个轴为等长的空间轴（边长 E），之后的轴（例如每个体素的通道）原样保留
/// 参数向量由同一源文件切出的所有子立方体共享
#[derive(Debug, Clone)]
pub struct SourceVolume {
    /// 体素数据，按 C 语言顺序存储（最后一个轴变化最快）
    data: ArrayD<f32>,
    /// 参数向量（标签）
    params: Vec<f32>,
}

impl SourceVolume {
    /// 根据形状和扁平数据创建源体数据
    pub fn new(shape: &[usize], data: Vec<f32>, params: Vec<f32>) -> Result<Self, String> {
        validate_shape(shape)?;

        let total_elements: usize = shape.iter().product();
        if data.len() != total_elements {
            return Err(format!(
                "data length mismatch: shape {:?} needs {} elements, got {}",
                shape,
                total_elements,
                data.len()
            ));
        }

        let data = ArrayD::from_shape_vec(IxDyn(shape), data).map_err(|e| e.to_string())?;
        Ok(Self { data, params })
    }

    /// 空间边长 E
    pub fn edge_len(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    /// 按 sample_size 切分为子立方体序列（惰性，按 i、j、k 嵌套顺序）
    pub fn sub_cubes(&self, sample_size: usize) -> SubCubes<'_> {
        SubCubes::new(&self.data, sample_size)
    }
}

/// 检查形状：至少三维，且前三个轴等长
/// 读取器在只读取元数据时也用它提前拒绝不合格的文件
pub fn validate_shape(shape: &[usize]) -> Result<(), String> {
    if shape.len() < 3 {
        return Err(format!(
            "volume must have at least 3 dimensions, got shape {:?}",
            shape
        ));
    }
    if shape[1] != shape[0] || shape[2] != shape[0] {
        return Err(format!(
            "volume is not cubic along its first three axes: {:?}",
            shape
        ));
    }
    Ok(())
}
