use super::*;

/// A record recovered from a plain-text export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ExportedComment {
  pub(crate) author: String,
  pub(crate) content: String,
  pub(crate) likes: u64,
  pub(crate) time: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FormatError {
  /// One-based line number of the offending line.
  pub(crate) line: usize,
  pub(crate) reason: String,
}

impl Display for FormatError {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "line {}: {}", self.line, self.reason)
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ParseEvent {
  FormatError(FormatError),
  Progress(u8),
}

#[derive(Debug, Default)]
pub(crate) struct ParseReport {
  pub(crate) comments: Vec<ExportedComment>,
  pub(crate) format_errors: Vec<FormatError>,
}

struct Scanner<'a, F> {
  emit: F,
  lines: Vec<&'a str>,
  report: ParseReport,
}

impl<'a, F: FnMut(ParseEvent)> Scanner<'a, F> {
  const PROGRESS_EVERY: usize = 10;

  fn line(&self, index: usize) -> Option<&'a str> {
    self.lines.get(index).copied().map(str::trim)
  }

  fn parse_info(line: &str) -> Option<(u64, NaiveDateTime)> {
    let (likes, time) = line.split_once('|')?;

    let likes = likes.trim().strip_prefix(LIKES_LABEL)?.trim().parse().ok()?;

    let time = NaiveDateTime::parse_from_str(
      time.trim().strip_prefix(TIME_LABEL)?.trim(),
      MINUTE_FORMAT,
    )
    .ok()?;

    Some((likes, time))
  }

  fn percent(&self, index: usize) -> u8 {
    if self.lines.is_empty() {
      return 100;
    }

    u8::try_from(index.min(self.lines.len()) * 100 / self.lines.len())
      .unwrap_or(100)
  }

  /// Parses the block starting at `start`. On failure returns the index of
  /// the line that broke the grammar.
  fn record(
    &self,
    start: usize,
    author: &str,
  ) -> Result<ExportedComment, (usize, String)> {
    let content_index = start + 1;

    let content = self
      .line(content_index)
      .ok_or_else(|| {
        (content_index, String::from("record truncated before content line"))
      })?
      .strip_prefix(CONTENT_LABEL)
      .ok_or_else(|| {
        (content_index, format!("expected `{CONTENT_LABEL}` line"))
      })?
      .trim();

    let info_index = start + 2;

    let info = self
      .line(info_index)
      .ok_or_else(|| {
        (info_index, String::from("record truncated before likes line"))
      })?;

    let (likes, time) = Self::parse_info(info).ok_or_else(|| {
      (
        info_index,
        format!("expected `{LIKES_LABEL} <n> | {TIME_LABEL} <time>` line"),
      )
    })?;

    Ok(ExportedComment {
      author: author.to_string(),
      content: content.to_string(),
      likes,
      time,
    })
  }

  fn reject(&mut self, index: usize, reason: String) {
    let error = FormatError {
      line: index + 1,
      reason,
    };

    debug!(%error, "skipping malformed record");

    (self.emit)(ParseEvent::FormatError(error.clone()));

    self.report.format_errors.push(error);
  }

  fn run(mut self) -> ParseReport {
    (self.emit)(ParseEvent::Progress(0));

    let mut index = 0;

    while let Some(line) = self.line(index) {
      if line.starts_with(EXPORT_TITLE) {
        index += 1;

        while self.line(index).is_some_and(|line| record_author(line).is_none())
        {
          index += 1;
        }

        continue;
      }

      let Some(author) = record_author(line) else {
        index += 1;
        continue;
      };

      if author.is_empty() {
        self.reject(index, String::from("record has no author"));
        index += 1;
        continue;
      }

      match self.record(index, author) {
        Ok(comment) => {
          self.report.comments.push(comment);

          index += 4;

          if self.report.comments.len() % Self::PROGRESS_EVERY == 0 {
            let percent = self.percent(index);
            (self.emit)(ParseEvent::Progress(percent));
          }
        }
        Err((failed, reason)) => {
          self.reject(failed, reason);
          index = failed + 1;
        }
      }
    }

    (self.emit)(ParseEvent::Progress(100));

    self.report
  }
}

/// Returns the author if `line` opens a record, i.e. `<digits>. <author>`.
/// A bare `<digits>.` marker yields an empty author.
fn record_author(line: &str) -> Option<&str> {
  let digits = line.chars().take_while(char::is_ascii_digit).count();

  if digits == 0 {
    return None;
  }

  let rest = line[digits..].strip_prefix('.')?;

  if rest.is_empty() || rest.starts_with(' ') {
    Some(rest.trim())
  } else {
    None
  }
}

/// Reads a plain-text export. Malformed records are reported through `emit`
/// and skipped; only an unreadable file is an error.
pub(crate) fn parse_export<F>(path: &Path, emit: F) -> Result<ParseReport, Error>
where
  F: FnMut(ParseEvent),
{
  let text = fs::read_to_string(path).map_err(|error| Error::io(path, error))?;

  let report = parse_text(&text, emit);

  info!(
    path = %path.display(),
    comments = report.comments.len(),
    format_errors = report.format_errors.len(),
    "parsed export"
  );

  Ok(report)
}

pub(crate) fn parse_text<F>(text: &str, emit: F) -> ParseReport
where
  F: FnMut(ParseEvent),
{
  Scanner {
    emit,
    lines: text.lines().collect(),
    report: ParseReport::default(),
  }
  .run()
}
