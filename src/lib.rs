//! Splits large simulation volumes into fixed-size sub-cubes and writes each
//! sub-cube, together with the volume's parameter vector, as a single-record
//! TFRecord file.
//!
//! Work flows `distributor` → `processor` → `partition` → `record`.

pub mod app_state;
pub mod config;
pub mod distributor;
pub mod error;
pub mod logging;
pub mod partition;
pub mod processor;
pub mod reader;
pub mod reader_registry;
pub mod readers;
pub mod record;
pub mod volume;

pub use app_state::{AppState, OUTPUT_EXTENSION};
pub use config::{Args, PrepareConfig};
pub use distributor::{WorkAssignment, assign_task, discover_files, dispatch, plan_task};
pub use error::{PrepareError, Result};
pub use logging::{ProgressLog, TracingLog};
pub use processor::{FileReport, process_file};
pub use reader::VolumeReader;
pub use reader_registry::ReaderRegistry;
pub use volume::SourceVolume;
