use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

const LAST_DIR_FILE: &str = "lastdir";
const SELECTION_FILE: &str = "selection";

/// What a finished session leaves behind for the shell: where it ended and
/// which paths were marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
  pub current_dir: PathBuf,
  /// Selected absolute paths joined by newlines, no trailing newline.
  pub flattened_selection: String,
}

impl SessionSnapshot {
  pub fn has_selection(&self) -> bool {
    !self.flattened_selection.is_empty()
  }

  /// Selection as a single space-separated line, the shape pasted into a
  /// shell prompt.
  pub fn clipboard_text(&self) -> String {
    self.flattened_selection.lines().collect::<Vec<_>>().join(" ")
  }

  /// Writes `lastdir` and, when anything is selected, `selection` under
  /// `cache_dir`. A selection file left by an earlier session is removed
  /// when this one ends with nothing selected.
  pub fn save(&self, cache_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(cache_dir)
      .with_context(|| format!("cannot create cache directory {}", cache_dir.display()))?;

    let last_dir = cache_dir.join(LAST_DIR_FILE);
    std::fs::write(&last_dir, format!("{}\n", self.current_dir.display()))
      .with_context(|| format!("cannot write {}", last_dir.display()))?;

    let selection = cache_dir.join(SELECTION_FILE);
    if self.has_selection() {
      std::fs::write(&selection, &self.flattened_selection)
        .with_context(|| format!("cannot write {}", selection.display()))?;
    } else {
      match std::fs::remove_file(&selection) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).with_context(|| format!("cannot remove {}", selection.display())),
      }
    }

    info!(dir = %self.current_dir.display(), "session saved");
    Ok(())
  }

  /// Hands the selection to the system clipboard. Failure is only logged.
  pub fn copy_selection_to_clipboard(&self) {
    if !self.has_selection() {
      return;
    }
    if let Err(e) = clipboard_anywhere::set_clipboard(&self.clipboard_text()) {
      warn!(error = %e, "could not copy selection to clipboard");
    }
  }
}

pub fn cache_dir() -> Result<PathBuf> {
  dirs::cache_dir()
    .map(|d| d.join("hop"))
    .ok_or_else(|| anyhow::anyhow!("could not determine cache directory"))
}
