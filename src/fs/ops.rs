use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{EntryKind, Filesystem};
use crate::error::TransferError;

/// Appended to a destination name until it no longer collides.
pub const COLLISION_SUFFIX: char = '_';

/// Paths waiting to be pasted. Yank and cut always replace the whole buffer.
#[derive(Debug, Default, Clone)]
pub struct Transfer {
  pub buffer: Vec<PathBuf>,
  pub cutting: bool,
}

impl Transfer {
  pub fn yank(&mut self, paths: Vec<PathBuf>) {
    self.buffer = paths;
    self.cutting = false;
  }

  pub fn cut(&mut self, paths: Vec<PathBuf>) {
    self.yank(paths);
    self.cutting = true;
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn is_cut(&self, path: &Path) -> bool {
    self.cutting && self.buffer.iter().any(|p| p == path)
  }
}

/// Outcome of one paste batch.
#[derive(Debug, Default)]
pub struct PasteReport {
  pub pasted: Vec<PathBuf>,
  pub errors: Vec<TransferError>,
  pub removed: Vec<PathBuf>,
  pub moved: bool,
}

impl PasteReport {
  pub fn any_error(&self) -> bool {
    !self.errors.is_empty()
  }
}

/// Returns `dest`, or `dest` with `COLLISION_SUFFIX` appended as many times as
/// needed to name something that does not exist yet.
pub fn unique_dest_path(fs: &dyn Filesystem, dest: &Path) -> PathBuf {
  let mut candidate = dest.to_path_buf();
  while fs.exists(&candidate) {
    let mut name: OsString = candidate.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(COLLISION_SUFFIX.to_string());
    candidate.set_file_name(name);
  }
  candidate
}

/// Copies `src` to a free name derived from `dest`, dispatching on the
/// source's own type (symlinks are not followed). Returns the path written.
pub fn copy_entry(fs: &dyn Filesystem, src: &Path, dest: &Path) -> Result<PathBuf, TransferError> {
  let stat = fs.lstat(src).map_err(|e| TransferError::io(src, e))?;
  let dest = unique_dest_path(fs, dest);
  match stat.kind {
    EntryKind::Symlink => copy_symlink(fs, src, &dest)?,
    EntryKind::Directory => copy_dir_recursive(fs, src, &dest, stat.mode)?,
    EntryKind::Regular => fs.copy_file(src, &dest).map_err(|e| TransferError::io(src, e))?,
  }
  Ok(dest)
}

/// Recreates the link at `dest`, pointing at the fully resolved target of `src`.
fn copy_symlink(fs: &dyn Filesystem, src: &Path, dest: &Path) -> Result<(), TransferError> {
  let target = fs.resolve_symlink(src).map_err(|e| TransferError::io(src, e))?;
  fs.create_symlink(&target, dest).map_err(|e| TransferError::io(dest, e))
}

/// Copies every child even when some fail; the directory as a whole only
/// counts as copied if none did. Permission bits are applied last so that
/// read-only sources can still be filled.
fn copy_dir_recursive(fs: &dyn Filesystem, src: &Path, dest: &Path, mode: u32) -> Result<(), TransferError> {
  fs.create_dir(dest).map_err(|e| TransferError::io(dest, e))?;
  let children = fs.list_dir(src).map_err(|e| TransferError::io(src, e))?;

  let mut failed = 0;
  for child in children {
    if let Err(e) = copy_entry(fs, &src.join(&child.file_name), &dest.join(&child.file_name)) {
      warn!(error = %e, "child copy failed");
      failed += 1;
    }
  }
  if let Err(e) = fs.set_mode(dest, mode) {
    warn!(path = %dest.display(), error = %e, "could not apply permissions");
    failed += 1;
  }

  if failed > 0 {
    return Err(TransferError::Incomplete { path: src.to_path_buf(), failed });
  }
  Ok(())
}

/// Pastes the whole buffer into `dest_dir`. When cutting, sources are removed
/// only if every copy in the batch succeeded.
pub fn paste(fs: &dyn Filesystem, transfer: &mut Transfer, dest_dir: &Path) -> PasteReport {
  let mut report = PasteReport::default();

  for src in &transfer.buffer {
    let Some(name) = src.file_name() else {
      report.errors.push(TransferError::IntoItself { path: src.clone() });
      continue;
    };
    let is_dir = fs.lstat(src).is_ok_and(|s| s.is_dir());
    if is_dir && dest_dir.starts_with(src) {
      report.errors.push(TransferError::IntoItself { path: src.clone() });
      continue;
    }
    match copy_entry(fs, src, &dest_dir.join(name)) {
      Ok(dest) => report.pasted.push(dest),
      Err(e) => {
        warn!(error = %e, "paste item failed");
        report.errors.push(e);
      }
    }
  }

  if !transfer.cutting {
    info!(pasted = report.pasted.len(), failed = report.errors.len(), "copy finished");
    return report;
  }
  if report.any_error() {
    warn!(failed = report.errors.len(), "cut aborted, sources left in place");
    return report;
  }

  for src in &transfer.buffer {
    match fs.remove_entry(src) {
      Ok(()) => report.removed.push(src.clone()),
      Err(e) => {
        warn!(path = %src.display(), error = %e, "could not remove moved source");
        report.errors.push(TransferError::io(src, e));
      }
    }
  }
  info!(moved = report.removed.len(), "move finished");
  report.moved = true;
  transfer.cutting = false;
  transfer.buffer.clear();
  report
}
