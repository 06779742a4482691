use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::debug;

use super::{DirEntry, Filesystem};
use crate::error::LoadError;
use crate::event::Event;

/// Completion of one background listing, tagged with the generation of the
/// request that produced it.
#[derive(Debug)]
pub struct Listing {
  pub generation: u64,
  pub path: PathBuf,
  pub result: Result<Vec<DirEntry>, LoadError>,
}

/// Reads `path`, drops dotfiles unless `show_hidden`, and sorts by name.
pub fn read_listing(fs: &dyn Filesystem, path: &Path, show_hidden: bool) -> Result<Vec<DirEntry>, LoadError> {
  let mut entries = fs.list_dir(path).map_err(|e| LoadError::new(path, e))?;
  if !show_hidden {
    entries.retain(|e| !e.is_hidden());
  }
  entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
  Ok(entries)
}

/// Dispatches directory reads to background threads. Each request bumps the
/// loader's own generation counter; only a completion carrying the latest
/// generation is current; anything older is stale and must be dropped.
pub struct DirLoader {
  fs: Arc<dyn Filesystem>,
  tx: Sender<Event>,
  generation: u64,
}

impl DirLoader {
  pub fn new(fs: Arc<dyn Filesystem>, tx: Sender<Event>) -> Self {
    Self { fs, tx, generation: 0 }
  }

  pub fn request(&mut self, path: &Path, show_hidden: bool) -> u64 {
    self.generation += 1;
    let generation = self.generation;
    let fs = Arc::clone(&self.fs);
    let tx = self.tx.clone();
    let path = path.to_path_buf();
    debug!(generation, path = %path.display(), show_hidden, "requesting listing");

    thread::spawn(move || {
      let result = read_listing(fs.as_ref(), &path, show_hidden);
      // The session may already be gone; nothing to do then.
      let _ = tx.send(Event::DirLoaded(Listing { generation, path, result }));
    });

    generation
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn is_current(&self, listing: &Listing) -> bool {
    listing.generation == self.generation
  }
}
