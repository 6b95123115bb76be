#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum SortMode {
  #[default]
  Heat,
  Recommendation,
  Time,
}

impl SortMode {
  /// Value of the `mode` query parameter on the main comment endpoint.
  pub(crate) fn api_code(self) -> u8 {
    match self {
      Self::Heat => 3,
      Self::Recommendation => 1,
      Self::Time => 2,
    }
  }

  pub(crate) fn label(self) -> &'static str {
    match self {
      Self::Heat => "热度",
      Self::Recommendation => "推荐",
      Self::Time => "时间",
    }
  }

  pub(crate) fn next(self) -> Self {
    match self {
      Self::Heat => Self::Time,
      Self::Recommendation => Self::Heat,
      Self::Time => Self::Recommendation,
    }
  }
}
