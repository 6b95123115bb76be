use super::*;

/// One comment or reply as returned by the platform. The original JSON
/// object is kept alongside the decoded fields for the JSON export.
#[derive(Clone, Debug)]
pub(crate) struct Comment {
  pub(crate) author: String,
  pub(crate) body: String,
  pub(crate) created_at: DateTime<Utc>,
  pub(crate) id: u64,
  pub(crate) like_count: u64,
  pub(crate) raw: Value,
  pub(crate) reply_count: u64,
  pub(crate) root_id: u64,
}

impl Comment {
  /// Body on a single line, used by the table and the text export.
  pub(crate) fn flattened_body(&self) -> String {
    flatten(&self.body)
  }

  pub(crate) fn has_replies(&self) -> bool {
    self.reply_count > 0
  }

  pub(crate) fn timestamp(&self) -> String {
    format_minute(&self.created_at)
  }
}

impl TryFrom<Value> for Comment {
  type Error = Error;

  fn try_from(raw: Value) -> Result<Self, Self::Error> {
    let reply = RawReply::deserialize(&raw)?;

    let created_at = DateTime::from_timestamp(reply.ctime, 0).ok_or_else(|| {
      Error::Decode(format!("invalid ctime {} on {}", reply.ctime, reply.rpid))
    })?;

    Ok(Self {
      author: reply.member.uname,
      body: reply.content.message,
      created_at,
      id: reply.rpid,
      like_count: reply.like,
      raw,
      reply_count: reply.count,
      root_id: reply.root,
    })
  }
}

#[cfg(test)]
pub(crate) fn sample_comment(id: u64, reply_count: u64) -> Comment {
  Comment::try_from(serde_json::json!({
    "rpid": id,
    "root": 0,
    "count": reply_count,
    "like": id * 2,
    "ctime": 1_700_000_000 + i64::try_from(id).unwrap() * 60,
    "member": { "uname": format!("user{id}") },
    "content": { "message": format!("comment number {id}") },
  }))
  .unwrap()
}
