use super::*;

pub(crate) const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Collapses every run of whitespace, newlines included, into one space and
/// decodes the HTML entities the platform sometimes leaves in messages.
pub(crate) fn flatten(text: &str) -> String {
  let decoded = html_escape::decode_html_entities(text);

  decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn format_minute(time: &DateTime<Utc>) -> String {
  time.with_timezone(&Local).format(MINUTE_FORMAT).to_string()
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
  if text.chars().count() <= max_chars {
    return text.to_string();
  }

  let mut result = text.chars().take(max_chars).collect::<String>();

  result.push_str("...");

  result
}
