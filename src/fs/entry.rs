use std::ffi::{OsStr, OsString};
use std::fs::Metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
  Regular,
  Directory,
  Symlink,
}

/// Metadata snapshot taken when an entry is listed or stat'ed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
  pub kind: EntryKind,
  pub mode: u32,
  pub len: u64,
}

impl Stat {
  pub fn from_metadata(metadata: &Metadata) -> Self {
    let file_type = metadata.file_type();
    let kind = if file_type.is_symlink() {
      EntryKind::Symlink
    } else if file_type.is_dir() {
      EntryKind::Directory
    } else {
      EntryKind::Regular
    };
    Self {
      kind,
      mode: permission_bits(metadata),
      len: metadata.len(),
    }
  }

  pub fn is_dir(&self) -> bool {
    self.kind == EntryKind::Directory
  }
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
  use std::os::unix::fs::PermissionsExt;
  metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
  if metadata.permissions().readonly() { 0o444 } else { 0o644 }
}

/// One row of a directory listing. Listings are replaced wholesale on reload,
/// entries are never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
  /// Name exactly as stored on disk. Every path built from an entry uses this.
  pub file_name: OsString,
  /// Lossy UTF-8 form of `file_name`, for display and matching only.
  pub name: String,
  pub stat: Stat,
}

impl DirEntry {
  pub fn new(file_name: impl Into<OsString>, stat: Stat) -> Self {
    let file_name = file_name.into();
    let name = file_name.to_string_lossy().into_owned();
    Self { file_name, name, stat }
  }

  pub fn kind(&self) -> EntryKind {
    self.stat.kind
  }

  pub fn is_dir(&self) -> bool {
    self.stat.is_dir()
  }

  pub fn is_symlink(&self) -> bool {
    self.stat.kind == EntryKind::Symlink
  }

  pub fn is_hidden(&self) -> bool {
    is_hidden_name(&self.file_name)
  }
}

pub fn is_hidden_name(name: &OsStr) -> bool {
  name.as_encoded_bytes().starts_with(b".")
}
