#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Tab {
  #[default]
  Comments,
  Lottery,
  Raw,
}

impl Tab {
  pub(crate) const ALL: [Tab; 3] = [Tab::Comments, Tab::Raw, Tab::Lottery];

  pub(crate) fn index(self) -> usize {
    match self {
      Self::Comments => 0,
      Self::Raw => 1,
      Self::Lottery => 2,
    }
  }

  pub(crate) fn label(self) -> &'static str {
    match self {
      Self::Comments => "comments",
      Self::Lottery => "lottery",
      Self::Raw => "raw data",
    }
  }

  pub(crate) fn next(self) -> Self {
    match self {
      Self::Comments => Self::Raw,
      Self::Raw => Self::Lottery,
      Self::Lottery => Self::Comments,
    }
  }
}
