use super::*;

pub(crate) const CONTENT_LABEL: &str = "内容:";
pub(crate) const EXPORT_TITLE: &str = "B站视频评论爬取结果";
pub(crate) const LIKES_LABEL: &str = "点赞:";
pub(crate) const TIME_LABEL: &str = "时间:";

const CSV_HEADER: [&str; 5] = ["序号", "用户名", "评论内容", "点赞数", "时间"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExportFormat {
  Csv,
  Json,
  Text,
}

impl ExportFormat {
  pub(crate) fn from_path(path: &Path) -> Result<Self, Error> {
    let extension = path
      .extension()
      .and_then(|extension| extension.to_str())
      .map(str::to_ascii_lowercase);

    match extension.as_deref() {
      Some("csv") => Ok(Self::Csv),
      Some("json") => Ok(Self::Json),
      Some("txt") => Ok(Self::Text),
      _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
    }
  }

  pub(crate) fn render(
    self,
    video_url: &str,
    comments: &[Comment],
    scraped_at: DateTime<Local>,
  ) -> Result<String, Error> {
    Ok(match self {
      Self::Csv => render_csv(comments)?,
      Self::Json => render_json(video_url, comments, scraped_at)?,
      Self::Text => render_text(video_url, comments, scraped_at),
    })
  }
}

#[derive(Serialize)]
struct JsonExport<'a> {
  comments: Vec<&'a Value>,
  scrape_time: String,
  video_url: &'a str,
}

fn render_csv(comments: &[Comment]) -> Result<String, Error> {
  let mut writer = csv::WriterBuilder::new()
    .terminator(csv::Terminator::Any(b'\n'))
    .from_writer(Vec::new());

  writer.write_record(CSV_HEADER)?;

  for (index, comment) in comments.iter().enumerate() {
    writer.write_record([
      (index + 1).to_string(),
      comment.author.clone(),
      comment.body.clone(),
      comment.like_count.to_string(),
      comment.timestamp(),
    ])?;
  }

  let bytes = writer
    .into_inner()
    .map_err(|error| Error::Encode(error.to_string()))?;

  String::from_utf8(bytes).map_err(|error| Error::Encode(error.to_string()))
}

fn render_json(
  video_url: &str,
  comments: &[Comment],
  scraped_at: DateTime<Local>,
) -> Result<String, Error> {
  Ok(serde_json::to_string_pretty(&JsonExport {
    comments: comments.iter().map(|comment| &comment.raw).collect(),
    scrape_time: scraped_at.to_rfc3339(),
    video_url,
  })?)
}

fn render_text(
  video_url: &str,
  comments: &[Comment],
  scraped_at: DateTime<Local>,
) -> String {
  let mut out = format!(
    "{EXPORT_TITLE}\n视频URL: {video_url}\n爬取时间: {}\n评论数量: {}\n\n",
    scraped_at.format("%Y-%m-%d %H:%M:%S"),
    comments.len(),
  );

  for (index, comment) in comments.iter().enumerate() {
    out.push_str(&format!(
      "{}. {}\n   {CONTENT_LABEL} {}\n   {LIKES_LABEL} {} | {TIME_LABEL} {}\n\n",
      index + 1,
      flatten(&comment.author),
      comment.flattened_body(),
      comment.like_count,
      comment.timestamp(),
    ));
  }

  out
}

/// The collected records as a pretty JSON array, as shown in the raw data
/// tab.
pub(crate) fn raw_json(comments: &[Comment]) -> Result<String, Error> {
  Ok(serde_json::to_string_pretty(
    &comments.iter().map(|comment| &comment.raw).collect::<Vec<_>>(),
  )?)
}

/// Writes `comments` to `path` in the format implied by its extension.
pub(crate) fn write_export(
  path: &Path,
  video_url: &str,
  comments: &[Comment],
) -> Result<ExportFormat, Error> {
  let format = ExportFormat::from_path(path)?;

  let contents = format.render(video_url, comments, Local::now())?;

  fs::write(path, contents).map_err(|error| Error::io(path, error))?;

  info!(
    path = %path.display(),
    ?format,
    comments = comments.len(),
    "exported comments"
  );

  Ok(format)
}
