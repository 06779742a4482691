use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A directory listing that could not be produced.
#[derive(Debug, Error)]
#[error("cannot open {}: {source}", path.display())]
pub struct LoadError {
  pub path: PathBuf,
  #[source]
  pub source: io::Error,
}

impl LoadError {
  pub fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self { path: path.into(), source }
  }
}

/// Failure of one item of a paste batch.
#[derive(Debug, Error)]
pub enum TransferError {
  #[error("{}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("cannot paste {} into itself", path.display())]
  IntoItself { path: PathBuf },

  #[error("{failed} item(s) under {} could not be copied", path.display())]
  Incomplete { path: PathBuf, failed: usize },
}

impl TransferError {
  pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Io { path: path.into(), source }
  }
}
