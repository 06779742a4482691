/// Window of listing indices currently on screen, `min..=max`.
///
/// `height` is the span `max - min` the window keeps whenever the listing is
/// long enough; shorter listings clamp the span to `len - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
  pub min: usize,
  pub max: usize,
  pub height: usize,
}

impl Viewport {
  pub fn new(height: usize) -> Self {
    Self { min: 0, max: height, height }
  }

  /// Builds a window spanning `rows` terminal rows.
  pub fn for_rows(rows: usize) -> Self {
    Self::new(rows.saturating_sub(1))
  }

  pub fn span(&self, len: usize) -> usize {
    self.height.min(len.saturating_sub(1))
  }

  /// Rewinds the window to the top of a listing of `len` entries.
  pub fn reset(&mut self, len: usize) {
    self.min = 0;
    self.max = self.span(len);
  }

  /// Moves `cursor` by `delta` within `0..len`, shifting the window by exactly
  /// the amount the cursor leaves it. Returns the new cursor.
  pub fn move_cursor(&mut self, cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
      self.reset(0);
      return 0;
    }
    let next = cursor.saturating_add_signed(delta).min(len - 1);
    self.follow(next, len);
    next
  }

  /// Restores `min <= cursor <= max` and the span for `len`, moving the
  /// window as little as possible.
  pub fn follow(&mut self, cursor: usize, len: usize) {
    let span = self.span(len);
    let last = len.saturating_sub(1);
    if self.max - self.min.min(self.max) != span || self.max > last {
      self.max = (self.min + span).min(last);
      self.min = self.max - span;
    }
    if cursor > self.max {
      let overflow = cursor - self.max;
      self.min += overflow;
      self.max += overflow;
    } else if cursor < self.min {
      let underflow = self.min - cursor;
      self.min -= underflow;
      self.max -= underflow;
    }
  }

  pub fn resize(&mut self, rows: usize, cursor: usize, len: usize) {
    self.height = rows.saturating_sub(1);
    self.follow(cursor, len);
  }

  pub fn page(&self) -> isize {
    self.height.max(1) as isize
  }

  pub fn half_page(&self) -> isize {
    (self.height / 2).max(1) as isize
  }
}
