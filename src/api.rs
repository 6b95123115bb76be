use super::*;

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
  pub(crate) code: i64,
  pub(crate) data: Option<Value>,
  #[serde(default)]
  pub(crate) message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideoInfo {
  #[serde(default)]
  pub(crate) aid: Option<u64>,
  #[serde(default)]
  pub(crate) title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CursorInfo {
  #[serde(default)]
  pub(crate) is_end: bool,
  #[serde(default)]
  pub(crate) next: u64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MainPage {
  #[serde(default)]
  pub(crate) cursor: CursorInfo,
  #[serde(default)]
  pub(crate) replies: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReplyPage {
  #[serde(default)]
  pub(crate) replies: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawReply {
  pub(crate) content: RawContent,
  #[serde(default)]
  pub(crate) count: u64,
  pub(crate) ctime: i64,
  #[serde(default)]
  pub(crate) like: u64,
  pub(crate) member: RawMember,
  #[serde(default)]
  pub(crate) root: u64,
  pub(crate) rpid: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawContent {
  #[serde(default)]
  pub(crate) message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawMember {
  pub(crate) uname: String,
}
