use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
  CancelPrompt,
  ClearResults,
  CycleSort,
  DecreaseMinLength,
  DecreasePages,
  DecreaseWinners,
  Draw,
  HideHelp,
  IncreaseMinLength,
  IncreasePages,
  IncreaseWinners,
  None,
  OpenVideo,
  PageDown,
  PageUp,
  Quit,
  SelectFirst,
  SelectLast,
  SelectNext,
  SelectPrevious,
  ShowHelp,
  StartCollection,
  StartPrompt(PromptKind),
  StopCollection,
  SubmitPrompt,
  SwitchTab,
  TogglePagination,
  ToggleReplies,
}

impl Command {
  pub(crate) fn for_key(key: KeyEvent, tab: Tab) -> Self {
    let modifiers = key.modifiers;

    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => Self::Quit,
      KeyCode::Char('?') => Self::ShowHelp,
      KeyCode::Tab
      | KeyCode::Left
      | KeyCode::Right
      | KeyCode::Char('h' | 'l') => Self::SwitchTab,
      KeyCode::Down | KeyCode::Char('j') => Self::SelectNext,
      KeyCode::Up | KeyCode::Char('k') => Self::SelectPrevious,
      KeyCode::PageDown => Self::PageDown,
      KeyCode::PageUp => Self::PageUp,
      KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
        Self::PageDown
      }
      KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
        Self::PageUp
      }
      KeyCode::Home => Self::SelectFirst,
      KeyCode::End => Self::SelectLast,
      KeyCode::Enter => match tab {
        Tab::Comments => Self::StartCollection,
        Tab::Lottery => Self::Draw,
        Tab::Raw => Self::None,
      },
      KeyCode::Char('u' | '/') => Self::StartPrompt(PromptKind::VideoUrl),
      KeyCode::Char('C') => Self::StartPrompt(PromptKind::Cookie),
      KeyCode::Char('P') => Self::StartPrompt(PromptKind::Proxy),
      KeyCode::Char('e') => Self::StartPrompt(PromptKind::ExportPath),
      KeyCode::Char('f') => Self::StartPrompt(PromptKind::ImportPath),
      KeyCode::Char('x') => Self::StopCollection,
      KeyCode::Char('c') => Self::ClearResults,
      KeyCode::Char('s') => Self::CycleSort,
      KeyCode::Char('r') => Self::ToggleReplies,
      KeyCode::Char('p') => Self::TogglePagination,
      KeyCode::Char('+' | '=') => Self::IncreasePages,
      KeyCode::Char('-') => Self::DecreasePages,
      KeyCode::Char(']') => Self::IncreaseMinLength,
      KeyCode::Char('[') => Self::DecreaseMinLength,
      KeyCode::Char('>' | '.') => Self::IncreaseWinners,
      KeyCode::Char('<' | ',') => Self::DecreaseWinners,
      KeyCode::Char('o') => Self::OpenVideo,
      _ => Self::None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn enter_depends_on_tab() {
    assert_eq!(
      Command::for_key(key(KeyCode::Enter), Tab::Comments),
      Command::StartCollection
    );
    assert_eq!(
      Command::for_key(key(KeyCode::Enter), Tab::Lottery),
      Command::Draw
    );
    assert_eq!(
      Command::for_key(key(KeyCode::Enter), Tab::Raw),
      Command::None
    );
  }

  #[test]
  fn control_u_pages_instead_of_prompting() {
    assert_eq!(
      Command::for_key(
        KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
        Tab::Comments
      ),
      Command::PageUp
    );
    assert_eq!(
      Command::for_key(key(KeyCode::Char('u')), Tab::Comments),
      Command::StartPrompt(PromptKind::VideoUrl)
    );
  }

  #[test]
  fn uppercase_keys_open_connection_prompts() {
    assert_eq!(
      Command::for_key(
        KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT),
        Tab::Comments
      ),
      Command::StartPrompt(PromptKind::Cookie)
    );
    assert_eq!(
      Command::for_key(key(KeyCode::Char('c')), Tab::Comments),
      Command::ClearResults
    );
  }
}
