use super::*;

/// Settings shared by every request a client makes. Built once per run and
/// never mutated afterwards.
#[derive(Clone, Debug)]
pub(crate) struct ClientConfig {
  pub(crate) base_url: String,
  pub(crate) blocked_cooldown: Duration,
  pub(crate) cookie: Option<String>,
  pub(crate) precondition_cooldown: Duration,
  pub(crate) proxy: Option<String>,
  pub(crate) retries: u32,
  pub(crate) throttle: (Duration, Duration),
  pub(crate) timeout: Duration,
  pub(crate) transport_pause: Duration,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.bilibili.com".into(),
      blocked_cooldown: Duration::from_secs(5),
      cookie: None,
      precondition_cooldown: Duration::from_secs(10),
      proxy: None,
      retries: 3,
      throttle: (Duration::from_secs(1), Duration::from_secs(3)),
      timeout: Duration::from_secs(10),
      transport_pause: Duration::from_secs(2),
    }
  }
}

impl ClientConfig {
  pub(crate) const COOKIE_VAR: &str = "BILI_COOKIE";
  pub(crate) const PROXY_VAR: &str = "BILI_PROXY";

  /// The `bili_jct` cookie doubles as the csrf token on write-capable
  /// endpoints.
  pub(crate) fn csrf_token(&self) -> Option<&str> {
    self
      .cookie
      .as_deref()?
      .split(';')
      .filter_map(|pair| pair.trim().split_once('='))
      .find(|(name, _)| *name == "bili_jct")
      .map(|(_, value)| value.trim())
      .filter(|value| !value.is_empty())
  }

  pub(crate) fn from_env() -> Self {
    let read = |name: &str| {
      env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    };

    Self {
      cookie: read(Self::COOKIE_VAR),
      proxy: read(Self::PROXY_VAR),
      ..Self::default()
    }
  }

  #[cfg(test)]
  pub(crate) fn immediate(base_url: String) -> Self {
    Self {
      base_url,
      blocked_cooldown: Duration::ZERO,
      precondition_cooldown: Duration::ZERO,
      throttle: (Duration::ZERO, Duration::ZERO),
      transport_pause: Duration::ZERO,
      ..Self::default()
    }
  }
}

/// How the driver chooses the `next` parameter of the following request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Pagination {
  #[default]
  Cursor,
  PageNumber,
}

impl Pagination {
  pub(crate) fn advance(self, current: u64, server_next: u64) -> Option<u64> {
    match self {
      Self::Cursor => (server_next != 0).then_some(server_next),
      Self::PageNumber => Some(current.saturating_add(1)),
    }
  }

  pub(crate) fn first(self) -> u64 {
    match self {
      Self::Cursor => 0,
      Self::PageNumber => 1,
    }
  }

  pub(crate) fn label(self) -> &'static str {
    match self {
      Self::Cursor => "cursor",
      Self::PageNumber => "page",
    }
  }

  pub(crate) fn toggle(self) -> Self {
    match self {
      Self::Cursor => Self::PageNumber,
      Self::PageNumber => Self::Cursor,
    }
  }
}

#[derive(Clone, Debug)]
pub(crate) struct RunConfig {
  pub(crate) bvid: String,
  pub(crate) fetch_replies: bool,
  pub(crate) max_pages: usize,
  pub(crate) pagination: Pagination,
  pub(crate) sort: SortMode,
  pub(crate) video_url: String,
}

impl RunConfig {
  pub(crate) const DEFAULT_PAGES: usize = 10;
  pub(crate) const MAX_PAGES: usize = 100;

  pub(crate) fn new(bvid: impl Into<String>) -> Self {
    let bvid = bvid.into();

    Self {
      video_url: format!("https://www.bilibili.com/video/{bvid}"),
      bvid,
      fetch_replies: false,
      max_pages: Self::DEFAULT_PAGES,
      pagination: Pagination::default(),
      sort: SortMode::default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn with_cookie(cookie: &str) -> ClientConfig {
    ClientConfig {
      cookie: Some(cookie.to_string()),
      ..ClientConfig::default()
    }
  }

  #[test]
  fn csrf_token_is_read_from_bili_jct() {
    let config = with_cookie("SESSDATA=abc%2C123; bili_jct=0f6c43; DedeUserID=7");
    assert_eq!(config.csrf_token(), Some("0f6c43"));
  }

  #[test]
  fn csrf_token_is_absent_without_bili_jct() {
    assert_eq!(with_cookie("SESSDATA=abc").csrf_token(), None);
    assert_eq!(with_cookie("bili_jct=").csrf_token(), None);
    assert_eq!(ClientConfig::default().csrf_token(), None);
  }

  #[test]
  fn cursor_pagination_stops_on_zero() {
    assert_eq!(Pagination::Cursor.first(), 0);
    assert_eq!(Pagination::Cursor.advance(0, 57), Some(57));
    assert_eq!(Pagination::Cursor.advance(57, 0), None);
  }

  #[test]
  fn page_number_pagination_ignores_server_cursor() {
    assert_eq!(Pagination::PageNumber.first(), 1);
    assert_eq!(Pagination::PageNumber.advance(1, 0), Some(2));
    assert_eq!(Pagination::PageNumber.advance(4, 99), Some(5));
  }

  #[test]
  fn run_config_builds_canonical_video_url() {
    let config = RunConfig::new("BV1xx411c7mD");

    assert_eq!(config.video_url, "https://www.bilibili.com/video/BV1xx411c7mD");
    assert_eq!(config.max_pages, RunConfig::DEFAULT_PAGES);
    assert!(!config.fetch_replies);
  }
}
