use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
  #[default]
  Unfiltered,
  /// Query is being typed; the cursor still indexes the raw listing.
  Filtering,
  /// Query accepted; the cursor indexes `matches`.
  Applied,
}

/// One surviving entry: its index in the raw listing and the character
/// positions of its name that matched the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
  pub index: usize,
  pub positions: Vec<usize>,
}

/// Ranks `targets` against `query` as ordered subsequence matches, best score
/// first. Equal scores keep listing order. An empty query keeps everything
/// in order with no positions.
pub fn rank<S: AsRef<str>>(matcher: &SkimMatcherV2, query: &str, targets: &[S]) -> Vec<Match> {
  if query.is_empty() {
    return (0..targets.len())
      .map(|index| Match { index, positions: Vec::new() })
      .collect();
  }

  let mut scored: Vec<(i64, Match)> = targets
    .iter()
    .enumerate()
    .filter_map(|(index, name)| {
      let (score, positions) = matcher.fuzzy_indices(name.as_ref(), query)?;
      Some((score, Match { index, positions }))
    })
    .collect();
  // sort_by is stable, which is what keeps ties in listing order
  scored.sort_by(|a, b| b.0.cmp(&a.0));
  scored.into_iter().map(|(_, m)| m).collect()
}

pub struct Filter {
  pub mode: FilterMode,
  pub query: String,
  pub matches: Vec<Match>,
  matcher: SkimMatcherV2,
}

impl Default for Filter {
  fn default() -> Self {
    Self::new()
  }
}

impl Filter {
  pub fn new() -> Self {
    Self {
      mode: FilterMode::Unfiltered,
      query: String::new(),
      matches: Vec::new(),
      matcher: SkimMatcherV2::default(),
    }
  }

  pub fn start<S: AsRef<str>>(&mut self, names: &[S]) {
    self.mode = FilterMode::Filtering;
    self.refresh(names);
  }

  pub fn push<S: AsRef<str>>(&mut self, c: char, names: &[S]) {
    self.query.push(c);
    self.refresh(names);
  }

  pub fn pop<S: AsRef<str>>(&mut self, names: &[S]) {
    self.query.pop();
    self.refresh(names);
  }

  /// Re-evaluates the current query against a (possibly new) listing.
  pub fn refresh<S: AsRef<str>>(&mut self, names: &[S]) {
    self.matches = rank(&self.matcher, &self.query, names);
  }

  pub fn accept(&mut self) {
    self.mode = FilterMode::Applied;
  }

  pub fn clear(&mut self) {
    self.mode = FilterMode::Unfiltered;
    self.query.clear();
    self.matches.clear();
  }

  pub fn is_applied(&self) -> bool {
    self.mode == FilterMode::Applied
  }

  pub fn is_active(&self) -> bool {
    self.mode != FilterMode::Unfiltered
  }
}
