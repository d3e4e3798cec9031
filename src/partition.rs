use std::ops::Range;

use ndarray::{ArrayD, ArrayViewD, Slice};
use serde::Serialize;

/// 子立方体的块索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockIndex {
    /// 按访问顺序的线性编号，从 0 开始
    pub index: usize,
    /// 最外层轴，变化最慢
    pub i: usize,
    pub j: usize,
    /// 最内层轴，变化最快
    pub k: usize,
}

impl BlockIndex {
    /// 由线性编号反推 (i, j, k)
    pub fn from_linear(index: usize, per_axis: usize) -> Self {
        Self {
            index,
            i: index / (per_axis * per_axis),
            j: (index / per_axis) % per_axis,
            k: index % per_axis,
        }
    }

    /// 三个空间轴上的范围（开始包含，结束不包含），单位：体素
    pub fn ranges(&self, sample_size: usize) -> [Range<usize>; 3] {
        [self.i, self.j, self.k].map(|b| b * sample_size..(b + 1) * sample_size)
    }
}

/// 每个轴上能完整放下的子立方体个数，余数部分被丢弃
pub fn blocks_per_axis(edge_len: usize, sample_size: usize) -> usize {
    edge_len.checked_div(sample_size).unwrap_or(0)
}

/// 块索引序列：按需从线性计数器计算，不预先生成全部索引
#[derive(Debug, Clone)]
pub struct BlockIndices {
    per_axis: usize,
    next: usize,
    total: usize,
}

impl BlockIndices {
    pub fn new(edge_len: usize, sample_size: usize) -> Self {
        let per_axis = blocks_per_axis(edge_len, sample_size);
        Self {
            per_axis,
            next: 0,
            total: per_axis * per_axis * per_axis,
        }
    }
}

impl Iterator for BlockIndices {
    type Item = BlockIndex;

    fn next(&mut self) -> Option<BlockIndex> {
        if self.next >= self.total {
            return None;
        }
        let block = BlockIndex::from_linear(self.next, self.per_axis);
        self.next += 1;
        Some(block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BlockIndices {}

/// 一个子立方体：源数据的借用视图，不复制数据
#[derive(Debug)]
pub struct SubCube<'a> {
    pub block: BlockIndex,
    pub view: ArrayViewD<'a, f32>,
}

/// 子立方体序列，只能消费一次；用相同输入重新调用即可得到相同结果
pub struct SubCubes<'a> {
    data: &'a ArrayD<f32>,
    sample_size: usize,
    blocks: BlockIndices,
}

impl<'a> SubCubes<'a> {
    pub fn new(data: &'a ArrayD<f32>, sample_size: usize) -> Self {
        let edge_len = data.shape().first().copied().unwrap_or(0);
        Self {
            data,
            sample_size,
            blocks: BlockIndices::new(edge_len, sample_size),
        }
    }
}

impl<'a> Iterator for SubCubes<'a> {
    type Item = SubCube<'a>;

    fn next(&mut self) -> Option<SubCube<'a>> {
        let block = self.blocks.next()?;
        let ranges = block.ranges(self.sample_size);
        let data: &'a ArrayD<f32> = self.data;
        // 只切前三个空间轴，其余轴保持完整
        let view = data.slice_each_axis(|axis| match axis.axis.index() {
            a @ 0..=2 => Slice::from(ranges[a].clone()),
            _ => Slice::from(..),
        });
        Some(SubCube { block, view })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.blocks.size_hint()
    }
}

impl ExactSizeIterator for SubCubes<'_> {}
