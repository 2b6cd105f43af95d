pub mod inspect;
pub mod list;
pub mod run;
pub mod synth;

use std::path::PathBuf;
use thiserror::Error;

/// Raised by `run` when a recording holds none of the known sample files
#[derive(Debug, Error)]
#[error("no sample file found in {}", .0.display())]
pub struct NoSampleFile(pub PathBuf);
