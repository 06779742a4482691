pub mod entry;
pub mod loader;
#[cfg(test)]
pub mod memfs;
pub mod ops;

use std::io;
use std::path::{Path, PathBuf};

pub use entry::{DirEntry, EntryKind, Stat};
pub use loader::{DirLoader, Listing};

/// Every filesystem touch made by navigation and transfers goes through this
/// trait, so both can run against an in-memory fake in tests.
pub trait Filesystem: Send + Sync {
  /// Unsorted listing of `path`, hidden entries included. A child that
  /// cannot be stat'ed fails the whole listing.
  fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

  /// Stat following symlinks.
  fn stat(&self, path: &Path) -> io::Result<Stat>;

  /// Stat without following a final symlink.
  fn lstat(&self, path: &Path) -> io::Result<Stat>;

  /// Fully resolved real path.
  fn resolve_symlink(&self, path: &Path) -> io::Result<PathBuf>;

  fn can_read_dir(&self, path: &Path) -> bool;

  fn create_dir(&self, path: &Path) -> io::Result<()>;

  fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()>;

  /// Byte copy of a regular file, permission bits included.
  fn copy_file(&self, src: &Path, dest: &Path) -> io::Result<()>;

  fn create_symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

  /// Removes a file or symlink, or a directory with everything below it.
  fn remove_entry(&self, path: &Path) -> io::Result<()>;

  fn exists(&self, path: &Path) -> bool {
    self.lstat(path).is_ok()
  }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl Filesystem for RealFs {
  fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(path)? {
      let entry = entry?;
      let metadata = match entry.metadata() {
        Ok(metadata) => metadata,
        // Removed between readdir and stat; there is nothing left to list.
        Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
        Err(e) => return Err(e),
      };
      entries.push(DirEntry::new(entry.file_name(), Stat::from_metadata(&metadata)));
    }
    Ok(entries)
  }

  fn stat(&self, path: &Path) -> io::Result<Stat> {
    Ok(Stat::from_metadata(&std::fs::metadata(path)?))
  }

  fn lstat(&self, path: &Path) -> io::Result<Stat> {
    Ok(Stat::from_metadata(&std::fs::symlink_metadata(path)?))
  }

  fn resolve_symlink(&self, path: &Path) -> io::Result<PathBuf> {
    std::fs::canonicalize(path)
  }

  fn can_read_dir(&self, path: &Path) -> bool {
    std::fs::read_dir(path).is_ok()
  }

  fn create_dir(&self, path: &Path) -> io::Result<()> {
    std::fs::create_dir_all(path)
  }

  #[cfg(unix)]
  fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
  }

  #[cfg(not(unix))]
  fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_readonly(mode & 0o222 == 0);
    std::fs::set_permissions(path, perms)
  }

  fn copy_file(&self, src: &Path, dest: &Path) -> io::Result<()> {
    std::fs::copy(src, dest)?;
    Ok(())
  }

  #[cfg(unix)]
  fn create_symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
  }

  #[cfg(not(unix))]
  fn create_symlink(&self, _target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "symlinks are not supported on this platform"))
  }

  fn remove_entry(&self, path: &Path) -> io::Result<()> {
    if std::fs::symlink_metadata(path)?.is_dir() {
      std::fs::remove_dir_all(path)
    } else {
      std::fs::remove_file(path)
    }
  }
}
