#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PromptKind {
  Cookie,
  ExportPath,
  ImportPath,
  Proxy,
  VideoUrl,
}

impl PromptKind {
  pub(crate) fn label(self) -> &'static str {
    match self {
      Self::Cookie => "Cookie",
      Self::ExportPath => "Export to (.json/.csv/.txt)",
      Self::ImportPath => "Lottery file",
      Self::Proxy => "Proxy",
      Self::VideoUrl => "Video URL",
    }
  }
}

/// Single-line text input shown in the status bar.
pub(crate) struct Prompt {
  pub(crate) buffer: String,
  pub(crate) kind: PromptKind,
  pub(crate) message_backup: String,
}

impl Prompt {
  pub(crate) fn new(
    kind: PromptKind,
    initial: String,
    message_backup: String,
  ) -> Self {
    Self {
      buffer: initial,
      kind,
      message_backup,
    }
  }

  pub(crate) fn render(&self) -> String {
    format!("{}: {}", self.kind.label(), self.buffer)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn render_reflects_current_buffer() {
    let mut prompt =
      Prompt::new(PromptKind::VideoUrl, String::new(), "status".into());
    assert_eq!(prompt.render(), "Video URL: ");

    prompt.buffer.push_str("BV1xx411c7mD");
    assert_eq!(prompt.render(), "Video URL: BV1xx411c7mD");
  }

  #[test]
  fn render_keeps_prefilled_value() {
    let prompt = Prompt::new(
      PromptKind::Proxy,
      "http://127.0.0.1:7890".into(),
      String::new(),
    );

    assert_eq!(prompt.render(), "Proxy: http://127.0.0.1:7890");
  }
}
