//! Shared fixtures: a tiny raw volume format registered through the reader
//! registry, plus a progress log that records what it was told.

#![allow(dead_code)] // Not every test binary uses every helper

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use volume_shards::processor::FileReport;
use volume_shards::{
    AppState, PrepareError, ProgressLog, ReaderRegistry, Result, SourceVolume, VolumeReader,
};

/// Raw test format, all little-endian:
/// `ndim: u32`, `dims: [u64; ndim]`, `n_params: u32`, `params: [f32]`, `data: [f32]`.
pub struct RawVolumeReader;

pub const RAW_EXTENSION: &str = "rawvol";

impl RawVolumeReader {
    fn read_header(reader: &mut impl Read) -> std::io::Result<(Vec<usize>, Vec<f32>)> {
        let ndim = reader.read_u32::<LittleEndian>()? as usize;
        let shape = (0..ndim)
            .map(|_| reader.read_u64::<LittleEndian>().map(|d| d as usize))
            .collect::<std::io::Result<Vec<_>>>()?;
        let n_params = reader.read_u32::<LittleEndian>()? as usize;
        let mut params = vec![0f32; n_params];
        reader.read_f32_into::<LittleEndian>(&mut params)?;
        Ok((shape, params))
    }
}

impl VolumeReader for RawVolumeReader {
    fn supported_extensions(&self) -> Vec<&'static str> {
        vec![RAW_EXTENSION]
    }

    fn read_from_file(&self, path: &Path) -> Result<SourceVolume> {
        let file = File::open(path).map_err(|e| PrepareError::read(path, e))?;
        let mut reader = BufReader::new(file);
        let (shape, params) = Self::read_header(&mut reader).map_err(|e| PrepareError::read(path, e))?;
        let mut data = vec![0f32; shape.iter().product()];
        reader
            .read_f32_into::<LittleEndian>(&mut data)
            .map_err(|e| PrepareError::read(path, e))?;
        SourceVolume::new(&shape, data, params).map_err(|e| PrepareError::read(path, e))
    }

    fn get_shape_from_file(&self, path: &Path) -> Result<Vec<usize>> {
        let file = File::open(path).map_err(|e| PrepareError::read(path, e))?;
        let (shape, _) =
            Self::read_header(&mut BufReader::new(file)).map_err(|e| PrepareError::read(path, e))?;
        Ok(shape)
    }

    fn name(&self) -> &'static str {
        "Raw Test Reader"
    }
}

pub fn raw_registry() -> Arc<ReaderRegistry> {
    Arc::new(ReaderRegistry::with_readers(vec![Box::new(RawVolumeReader)]))
}

/// Voxel value encodes its position so sub-cube contents can be checked.
pub fn voxel_value(x: usize, y: usize, z: usize, edge: usize) -> f32 {
    (x * edge * edge + y * edge + z) as f32
}

pub fn write_raw_volume(path: &Path, edge: usize, params: &[f32]) {
    let mut out = BufWriter::new(File::create(path).unwrap());
    out.write_u32::<LittleEndian>(3).unwrap();
    for _ in 0..3 {
        out.write_u64::<LittleEndian>(edge as u64).unwrap();
    }
    out.write_u32::<LittleEndian>(params.len() as u32).unwrap();
    for &p in params {
        out.write_f32::<LittleEndian>(p).unwrap();
    }
    for x in 0..edge {
        for y in 0..edge {
            for z in 0..edge {
                out.write_f32::<LittleEndian>(voxel_value(x, y, z, edge)).unwrap();
            }
        }
    }
    out.flush().unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Reading(PathBuf),
    Writing(PathBuf),
    Finished(PathBuf, usize),
}

/// Progress log that keeps every event for later assertions.
#[derive(Default)]
pub struct RecordingLog {
    events: Mutex<Vec<Event>>,
}

impl RecordingLog {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressLog for RecordingLog {
    fn reading(&self, input: &Path) {
        self.events.lock().unwrap().push(Event::Reading(input.to_path_buf()));
    }

    fn writing(&self, output: &Path) {
        self.events.lock().unwrap().push(Event::Writing(output.to_path_buf()));
    }

    fn finished(&self, report: &FileReport) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Finished(report.input.clone(), report.records));
    }
}

pub fn state(output_dir: &Path, sample_size: usize) -> (AppState, Arc<RecordingLog>) {
    let log = Arc::new(RecordingLog::default());
    let state = AppState::new(raw_registry(), output_dir, sample_size, log.clone());
    (state, log)
}

/// Sorted file names in a directory.
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
