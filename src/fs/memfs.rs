//! In-memory `Filesystem` used by the state machine and transfer tests.

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use super::{DirEntry, EntryKind, Filesystem, Stat};

const MAX_LINK_DEPTH: usize = 40;

#[derive(Debug, Clone)]
enum Node {
  File { data: Vec<u8>, mode: u32 },
  Dir { mode: u32 },
  Symlink { target: PathBuf },
}

impl Node {
  fn stat(&self) -> Stat {
    match self {
      Node::File { data, mode } => Stat { kind: EntryKind::Regular, mode: *mode, len: data.len() as u64 },
      Node::Dir { mode } => Stat { kind: EntryKind::Directory, mode: *mode, len: 0 },
      Node::Symlink { target } => Stat {
        kind: EntryKind::Symlink,
        mode: 0o777,
        len: target.as_os_str().len() as u64,
      },
    }
  }
}

#[derive(Default)]
struct State {
  nodes: BTreeMap<PathBuf, Node>,
  failing_copies: HashSet<PathBuf>,
  unreadable: HashSet<PathBuf>,
}

pub struct MemFs {
  state: Mutex<State>,
}

fn not_found(path: &Path) -> io::Error {
  io::Error::new(io::ErrorKind::NotFound, format!("{}: no such file or directory", path.display()))
}

impl MemFs {
  pub fn new() -> Self {
    let mut state = State::default();
    state.nodes.insert(PathBuf::from("/"), Node::Dir { mode: 0o755 });
    Self { state: Mutex::new(state) }
  }

  fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
    let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
    f(&mut state)
  }

  fn insert_with_parents(&self, path: &Path, node: Node) {
    self.with_state(|s| {
      let mut parent = PathBuf::from("/");
      if let Some(p) = path.parent() {
        for comp in p.components() {
          if let Component::Normal(name) = comp {
            parent.push(name);
            s.nodes.entry(parent.clone()).or_insert(Node::Dir { mode: 0o755 });
          }
        }
      }
      s.nodes.insert(path.to_path_buf(), node);
    });
  }

  pub fn dir(&self, path: impl AsRef<Path>) -> &Self {
    self.insert_with_parents(path.as_ref(), Node::Dir { mode: 0o755 });
    self
  }

  pub fn file(&self, path: impl AsRef<Path>, contents: &str) -> &Self {
    self.insert_with_parents(path.as_ref(), Node::File { data: contents.as_bytes().to_vec(), mode: 0o644 });
    self
  }

  pub fn symlink(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) -> &Self {
    self.insert_with_parents(path.as_ref(), Node::Symlink { target: target.as_ref().to_path_buf() });
    self
  }

  /// Every `copy_file` whose source is `path` fails.
  pub fn fail_copies_of(&self, path: impl AsRef<Path>) -> &Self {
    let path = path.as_ref().to_path_buf();
    self.with_state(|s| s.failing_copies.insert(path));
    self
  }

  /// Listing or opening `path` fails with permission denied.
  pub fn deny(&self, path: impl AsRef<Path>) -> &Self {
    let path = path.as_ref().to_path_buf();
    self.with_state(|s| s.unreadable.insert(path));
    self
  }

  pub fn read(&self, path: impl AsRef<Path>) -> Option<String> {
    self.with_state(|s| match s.nodes.get(path.as_ref()) {
      Some(Node::File { data, .. }) => Some(String::from_utf8_lossy(data).to_string()),
      _ => None,
    })
  }

  pub fn link_target(&self, path: impl AsRef<Path>) -> Option<PathBuf> {
    self.with_state(|s| match s.nodes.get(path.as_ref()) {
      Some(Node::Symlink { target }) => Some(target.clone()),
      _ => None,
    })
  }

  pub fn contains(&self, path: impl AsRef<Path>) -> bool {
    self.with_state(|s| s.nodes.contains_key(path.as_ref()))
  }
}

fn resolve(state: &State, path: &Path, depth: usize) -> io::Result<PathBuf> {
  if depth > MAX_LINK_DEPTH {
    return Err(io::Error::other("too many levels of symbolic links"));
  }
  let mut cur = PathBuf::from("/");
  for comp in path.components() {
    match comp {
      Component::RootDir | Component::Prefix(_) => cur = PathBuf::from("/"),
      Component::CurDir => {}
      Component::ParentDir => {
        cur.pop();
      }
      Component::Normal(name) => {
        cur.push(name);
        if let Some(Node::Symlink { target }) = state.nodes.get(&cur) {
          let target = match cur.parent() {
            Some(parent) if target.is_relative() => parent.join(target),
            _ => target.clone(),
          };
          cur = resolve(state, &target, depth + 1)?;
        }
      }
    }
  }
  if state.nodes.contains_key(&cur) {
    Ok(cur)
  } else {
    Err(not_found(path))
  }
}

/// Resolves everything but the final component.
fn resolve_parent(state: &State, path: &Path) -> io::Result<PathBuf> {
  match (path.parent(), path.file_name()) {
    (Some(parent), Some(name)) => Ok(resolve(state, parent, 0)?.join(name)),
    _ => Ok(PathBuf::from("/")),
  }
}

fn require_dir(state: &State, path: &Path) -> io::Result<()> {
  match state.nodes.get(path) {
    Some(Node::Dir { .. }) => Ok(()),
    Some(_) => Err(io::Error::new(io::ErrorKind::NotADirectory, format!("{} is not a directory", path.display()))),
    None => Err(not_found(path)),
  }
}

impl Filesystem for MemFs {
  fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
    self.with_state(|s| {
      let dir = resolve(s, path, 0)?;
      require_dir(s, &dir)?;
      if s.unreadable.contains(&dir) {
        return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
      }
      Ok(
        s.nodes
          .iter()
          .filter(|(p, _)| p.parent() == Some(dir.as_path()))
          .filter_map(|(p, node)| {
            Some(DirEntry::new(p.file_name()?, node.stat()))
          })
          .collect(),
      )
    })
  }

  fn stat(&self, path: &Path) -> io::Result<Stat> {
    self.with_state(|s| {
      let real = resolve(s, path, 0)?;
      s.nodes.get(&real).map(Node::stat).ok_or_else(|| not_found(path))
    })
  }

  fn lstat(&self, path: &Path) -> io::Result<Stat> {
    self.with_state(|s| {
      let key = resolve_parent(s, path)?;
      s.nodes.get(&key).map(Node::stat).ok_or_else(|| not_found(path))
    })
  }

  fn resolve_symlink(&self, path: &Path) -> io::Result<PathBuf> {
    self.with_state(|s| resolve(s, path, 0))
  }

  fn can_read_dir(&self, path: &Path) -> bool {
    self.with_state(|s| {
      resolve(s, path, 0)
        .map(|dir| require_dir(s, &dir).is_ok() && !s.unreadable.contains(&dir))
        .unwrap_or(false)
    })
  }

  fn create_dir(&self, path: &Path) -> io::Result<()> {
    self.with_state(|s| {
      let key = resolve_parent(s, path)?;
      if let Some(parent) = key.parent() {
        require_dir(s, parent)?;
      }
      match s.nodes.get(&key) {
        Some(Node::Dir { .. }) => Ok(()),
        Some(_) => Err(io::Error::new(io::ErrorKind::AlreadyExists, "file exists")),
        None => {
          s.nodes.insert(key, Node::Dir { mode: 0o755 });
          Ok(())
        }
      }
    })
  }

  fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
    self.with_state(|s| {
      let real = resolve(s, path, 0)?;
      match s.nodes.get_mut(&real) {
        Some(Node::File { mode: m, .. }) | Some(Node::Dir { mode: m }) => {
          *m = mode;
          Ok(())
        }
        _ => Err(not_found(path)),
      }
    })
  }

  fn copy_file(&self, src: &Path, dest: &Path) -> io::Result<()> {
    self.with_state(|s| {
      if s.failing_copies.contains(src) {
        return Err(io::Error::other(format!("copy of {} failed", src.display())));
      }
      let real = resolve(s, src, 0)?;
      let node = match s.nodes.get(&real) {
        Some(node @ Node::File { .. }) => node.clone(),
        Some(_) => return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file")),
        None => return Err(not_found(src)),
      };
      let key = resolve_parent(s, dest)?;
      if let Some(parent) = key.parent() {
        require_dir(s, parent)?;
      }
      s.nodes.insert(key, node);
      Ok(())
    })
  }

  fn create_symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
    self.with_state(|s| {
      let key = resolve_parent(s, link)?;
      if let Some(parent) = key.parent() {
        require_dir(s, parent)?;
      }
      if s.nodes.contains_key(&key) {
        return Err(io::Error::new(io::ErrorKind::AlreadyExists, "file exists"));
      }
      s.nodes.insert(key, Node::Symlink { target: target.to_path_buf() });
      Ok(())
    })
  }

  fn remove_entry(&self, path: &Path) -> io::Result<()> {
    self.with_state(|s| {
      let key = resolve_parent(s, path)?;
      match s.nodes.get(&key) {
        Some(Node::Dir { .. }) => {
          s.nodes.retain(|p, _| !p.starts_with(&key));
          Ok(())
        }
        Some(_) => {
          s.nodes.remove(&key);
          Ok(())
        }
        None => Err(not_found(path)),
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builder_creates_parents() {
    let fs = MemFs::new();
    fs.file("/home/u/a.txt", "a");
    assert!(fs.stat(Path::new("/home")).unwrap().is_dir());
    assert!(fs.stat(Path::new("/home/u")).unwrap().is_dir());
    assert_eq!(fs.read("/home/u/a.txt").as_deref(), Some("a"));
  }

  #[test]
  fn test_symlink_resolution() {
    let fs = MemFs::new();
    fs.dir("/home/u/b").symlink("/home/u/c", "b");
    assert_eq!(fs.lstat(Path::new("/home/u/c")).unwrap().kind, EntryKind::Symlink);
    assert!(fs.stat(Path::new("/home/u/c")).unwrap().is_dir());
    assert_eq!(fs.resolve_symlink(Path::new("/home/u/c")).unwrap(), PathBuf::from("/home/u/b"));
  }

  #[test]
  fn test_denied_dir_cannot_be_listed() {
    let fs = MemFs::new();
    fs.dir("/locked").deny("/locked");
    assert!(!fs.can_read_dir(Path::new("/locked")));
    let err = fs.list_dir(Path::new("/locked")).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
  }

  #[test]
  fn test_remove_dir_is_recursive() {
    let fs = MemFs::new();
    fs.file("/t/x/y/z.txt", "z").file("/t/keep.txt", "k");
    fs.remove_entry(Path::new("/t/x")).unwrap();
    assert!(!fs.contains("/t/x/y/z.txt"));
    assert!(fs.contains("/t/keep.txt"));
  }
}
