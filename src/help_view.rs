use super::*;

const HELP_TEXT: &str = "\
Navigation:
  tab / ← / →  switch between comments, raw data and lottery
  ↑ / k        move selection up
  ↓ / j        move selection down
  pg↓ / ctrl+d page down
  pg↑ / ctrl+u page up
  home / end   jump to first or last row

Collecting:
  u  /         enter the video URL or BV id
  enter        start collecting
  x            stop the running collection
  s            cycle sort order (热度 → 时间 → 推荐)
  r            toggle reply expansion
  p            toggle cursor or page-number paging
  + / -        raise or lower the page limit
  C            set the cookie sent with every request
  P            set the http proxy
  e            export the table (.json, .csv or .txt)
  c            clear the current tab
  o            open the video in your browser

Raw data:
  ↑ / ↓        scroll the collected records as JSON

Lottery:
  f            load a .txt export
  [ / ]        lower or raise the minimum length
  < / >        fewer or more winners
  enter        draw winners and save 抽奖结果.txt

  q / esc      quit
  ?            toggle this help
";

const HELP_STATUS: &str = "Press ? or esc to close help";

const HELP_TITLE: &str = "Help";

pub(crate) struct HelpView {
  message_backup: Option<String>,
  visible: bool,
}

impl HelpView {
  pub(crate) fn draw(&self, frame: &mut Frame) {
    if !self.visible {
      return;
    }

    let area = Self::help_area(frame.area());

    frame.render_widget(Clear, area);

    let help = Paragraph::new(HELP_TEXT)
      .block(Block::default().title(HELP_TITLE).borders(Borders::ALL))
      .wrap(Wrap { trim: false });

    frame.render_widget(help, area);
  }

  pub(crate) fn handle_key(key: KeyEvent) -> Command {
    match key.code {
      KeyCode::Char('?') | KeyCode::Esc => Command::HideHelp,
      KeyCode::Char('q') => Command::Quit,
      _ => Command::None,
    }
  }

  fn help_area(area: Rect) -> Rect {
    let (lines, widest) = HELP_TEXT.lines().fold((0, 0), |(count, width), line| {
      (count + 1, width.max(line.chars().count()))
    });

    let clamp = |value: usize, limit: u16| {
      u16::try_from(value).unwrap_or(u16::MAX).clamp(1, limit.max(1))
    };

    let width = clamp(widest + 4, area.width.saturating_sub(2));
    let height = clamp(lines + 2, area.height.saturating_sub(2));

    Rect::new(
      area.x + area.width.saturating_sub(width) / 2,
      area.y + area.height.saturating_sub(height) / 2,
      width.min(area.width),
      height.min(area.height),
    )
  }

  pub(crate) fn hide(&mut self, message: &mut String) {
    if !self.visible {
      return;
    }

    *message = self
      .message_backup
      .take()
      .unwrap_or_else(|| COMMENTS_STATUS.into());

    self.visible = false;
  }

  pub(crate) fn is_visible(&self) -> bool {
    self.visible
  }

  pub(crate) fn new() -> Self {
    Self {
      message_backup: None,
      visible: false,
    }
  }

  pub(crate) fn show(&mut self, message: &mut String) {
    if self.visible {
      return;
    }

    self.message_backup = Some(message.clone());

    *message = HELP_STATUS.into();

    self.visible = true;
  }
}
