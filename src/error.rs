use super::*;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
  #[error("api returned code {code}: {message}")]
  Api { code: i64, message: String },
  #[error("request blocked by anti-bot check (http {status}, code {code})")]
  Blocked { code: i64, status: u16 },
  #[error("could not decode response: {0}")]
  Decode(String),
  #[error("could not encode export: {0}")]
  Encode(String),
  #[error("could not access {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("video {0} has no numeric id")]
  MissingNumericId(String),
  #[error("video {bvid} could not be resolved: {reason}")]
  NotFound { bvid: String, reason: String },
  #[error("network error: {0}")]
  Transport(String),
  #[error(
    "unsupported export format for {}, expected .json, .csv or .txt",
    .0.display()
  )]
  UnsupportedFormat(PathBuf),
}

impl Error {
  pub(crate) fn io(path: &Path, source: io::Error) -> Self {
    Self::Io {
      path: path.to_path_buf(),
      source,
    }
  }

  pub(crate) fn is_retryable(&self) -> bool {
    matches!(self, Self::Blocked { .. } | Self::Decode(_) | Self::Transport(_))
  }
}

impl From<csv::Error> for Error {
  fn from(error: csv::Error) -> Self {
    Self::Encode(error.to_string())
  }
}

impl From<reqwest::Error> for Error {
  fn from(error: reqwest::Error) -> Self {
    if error.is_decode() {
      Self::Decode(error.to_string())
    } else {
      Self::Transport(error.to_string())
    }
  }
}

impl From<serde_json::Error> for Error {
  fn from(error: serde_json::Error) -> Self {
    Self::Decode(error.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_transient_failures_are_retryable() {
    assert!(Error::Transport("reset".into()).is_retryable());
    assert!(Error::Decode("eof".into()).is_retryable());
    assert!(
      Error::Blocked {
        code: -412,
        status: 200
      }
      .is_retryable()
    );

    assert!(
      !Error::Api {
        code: -404,
        message: "啥都木有".into()
      }
      .is_retryable()
    );
    assert!(!Error::MissingNumericId("BV1xx".into()).is_retryable());
    assert!(!Error::Encode("short write".into()).is_retryable());
  }

  #[test]
  fn io_error_mentions_path() {
    let error = Error::io(
      Path::new("/tmp/comments.txt"),
      io::Error::new(io::ErrorKind::NotFound, "missing"),
    );

    assert_eq!(error.to_string(), "could not access /tmp/comments.txt: missing");
  }
}
