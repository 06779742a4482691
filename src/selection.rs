use std::collections::{BTreeMap, BTreeSet};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Marked entries across every directory visited in the session, keyed by
/// directory. A directory's set is dropped as soon as it becomes empty.
#[derive(Debug, Default, Clone)]
pub struct Selection {
  dirs: BTreeMap<PathBuf, BTreeSet<OsString>>,
}

impl Selection {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.dirs.is_empty()
  }

  pub fn len(&self) -> usize {
    self.dirs.values().map(BTreeSet::len).sum()
  }

  pub fn contains(&self, dir: &Path, name: impl AsRef<OsStr>) -> bool {
    self.dirs.get(dir).is_some_and(|set| set.contains(name.as_ref()))
  }

  pub fn count_in(&self, dir: &Path) -> usize {
    self.dirs.get(dir).map_or(0, BTreeSet::len)
  }

  /// Flips `name` in `dir`. Returns whether it is now selected.
  pub fn toggle(&mut self, dir: &Path, name: impl AsRef<OsStr>) -> bool {
    let name = name.as_ref();
    let set = self.dirs.entry(dir.to_path_buf()).or_default();
    let selected = if set.remove(name) {
      false
    } else {
      set.insert(name.to_os_string());
      true
    };
    if set.is_empty() {
      self.dirs.remove(dir);
    }
    selected
  }

  /// Selects every name in `visible`, or clears the directory if all of them
  /// were already selected.
  pub fn toggle_all<S: AsRef<OsStr>>(&mut self, dir: &Path, visible: &[S]) {
    let all_selected = !visible.is_empty() && visible.iter().all(|n| self.contains(dir, n));
    if all_selected {
      self.dirs.remove(dir);
      return;
    }
    if visible.is_empty() {
      return;
    }
    let set = self.dirs.entry(dir.to_path_buf()).or_default();
    set.extend(visible.iter().map(|n| n.as_ref().to_os_string()));
  }

  pub fn remove_path(&mut self, path: &Path) {
    let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
      return;
    };
    if let Some(set) = self.dirs.get_mut(dir) {
      set.remove(name);
      if set.is_empty() {
        self.dirs.remove(dir);
      }
    }
  }

  /// Absolute paths of every selected entry, grouped by directory in path
  /// order.
  pub fn paths(&self) -> Vec<PathBuf> {
    self
      .dirs
      .iter()
      .flat_map(|(dir, names)| names.iter().map(move |n| dir.join(n)))
      .collect()
  }

  /// Newline-joined selected paths, no trailing newline.
  pub fn flatten(&self) -> String {
    self
      .paths()
      .iter()
      .map(|p| p.to_string_lossy().to_string())
      .collect::<Vec<_>>()
      .join("\n")
  }
}
