use {regex::Regex, std::sync::LazyLock};

static VIDEO_PATH: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"/video/(BV[0-9A-Za-z]+)").expect("valid video path pattern")
});

static BARE_ID: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"BV[0-9A-Za-z]+").expect("valid bvid pattern")
});

/// Finds the `BV…` identifier in a pasted video URL or a bare id.
pub(crate) fn extract_bvid(input: &str) -> Option<String> {
  let input = input.trim();

  VIDEO_PATH
    .captures(input)
    .and_then(|captures| captures.get(1))
    .or_else(|| BARE_ID.find(input))
    .map(|found| found.as_str().to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_from_full_url() {
    assert_eq!(
      extract_bvid("https://www.bilibili.com/video/BV1xx411c7mD?p=2&t=30"),
      Some("BV1xx411c7mD".to_string())
    );
  }

  #[test]
  fn extracts_bare_id() {
    assert_eq!(
      extract_bvid("  BV1GJ411x7h7 "),
      Some("BV1GJ411x7h7".to_string())
    );
  }

  #[test]
  fn prefers_video_path_segment() {
    assert_eq!(
      extract_bvid("https://b23.tv/BVaaa?from=/video/BV1bb"),
      Some("BV1bb".to_string())
    );
  }

  #[test]
  fn returns_none_without_id() {
    assert_eq!(extract_bvid("https://www.bilibili.com/"), None);
    assert_eq!(extract_bvid(""), None);
  }
}
