#[cfg(feature = "hdf5")]
mod h5;

#[cfg(feature = "hdf5")]
pub use h5::{Hdf5Reader, PARAMS_DATASET, VOLUME_DATASET};

/// 获取所有内置的读取器
pub fn get_all_readers() -> Vec<Box<dyn crate::reader::VolumeReader>> {
    #[allow(unused_mut)]
    let mut readers: Vec<Box<dyn crate::reader::VolumeReader>> = Vec::new();
    #[cfg(feature = "hdf5")]
    readers.push(Box::new(Hdf5Reader::new()));
    readers
}
