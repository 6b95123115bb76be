use super::*;

pub(crate) struct State {
  active_run: Option<ActiveRun>,
  active_tab: Tab,
  client_config: ClientConfig,
  comments: ListView<Comment>,
  eligible: Option<usize>,
  format_errors: usize,
  help: HelpView,
  list_height: usize,
  lottery_file: Option<PathBuf>,
  lottery_load: Option<u64>,
  lottery_pool: Vec<ExportedComment>,
  lottery_progress: Option<u8>,
  message: String,
  min_length: usize,
  next_request_id: u64,
  pending_effects: Vec<Effect>,
  prompt: Option<Prompt>,
  raw: ListView<String>,
  raw_stale: bool,
  settings: RunConfig,
  transient_message: Option<TransientMessage>,
  video_url: String,
  winner_count: usize,
  winners: ListView<ExportedComment>,
}

impl State {
  const DEFAULT_EXPORT: &str = "comments.txt";

  const DEFAULT_WINNERS: usize = 1;

  pub(crate) fn active_tab(&self) -> Tab {
    self.active_tab
  }

  fn adjust_min_length(&mut self, delta: isize) {
    self.min_length = self.min_length.saturating_add_signed(delta);
    self.set_transient_message(format!("最小字数: {}", self.min_length));
  }

  fn adjust_pages(&mut self, delta: isize) {
    self.settings.max_pages = self
      .settings
      .max_pages
      .saturating_add_signed(delta)
      .clamp(1, RunConfig::MAX_PAGES);

    self.set_transient_message(format!(
      "爬取页数: {}",
      self.settings.max_pages
    ));
  }

  fn adjust_winners(&mut self, delta: isize) {
    self.winner_count = self.winner_count.saturating_add_signed(delta).max(1);
    self.set_transient_message(format!("中奖人数: {}", self.winner_count));
  }

  fn cancel_prompt(&mut self) {
    if let Some(prompt) = self.prompt.take() {
      self.message = prompt.message_backup;
    }
  }

  pub(crate) fn clear_pending_effects(&mut self) {
    self.pending_effects.clear();
  }

  fn clear_results(&mut self) {
    match self.active_tab {
      Tab::Comments | Tab::Raw => {
        if self.active_run.is_some() {
          self.set_transient_message("请先停止当前爬取任务".into());
          return;
        }

        self.comments.clear();
        self.raw_stale = true;
        self.set_transient_message("评论列表已清空".into());
      }
      Tab::Lottery => {
        self.lottery_pool.clear();
        self.lottery_file = None;
        self.eligible = None;
        self.format_errors = 0;
        self.winners.clear();
        self.set_transient_message("抽奖数据已清空".into());
      }
    }
  }

  pub(crate) fn collection_ratio(&self) -> f64 {
    match (&self.active_run, self.active_tab) {
      (Some(run), Tab::Comments | Tab::Raw) => run.ratio(),
      (_, Tab::Lottery) => {
        f64::from(self.lottery_progress.unwrap_or_default()) / 100.0
      }
      (None, Tab::Comments | Tab::Raw) => {
        if self.comments.is_empty() {
          0.0
        } else {
          1.0
        }
      }
    }
  }

  pub(crate) fn comments(&self) -> &ListView<Comment> {
    &self.comments
  }

  pub(crate) fn dispatch_command(
    &mut self,
    command: Command,
  ) -> Result<CommandDispatch> {
    debug_assert!(
      self.pending_effects.is_empty(),
      "command dispatch should start without pending effects"
    );

    let mut should_exit = false;

    match command {
      Command::Quit => {
        if let Some(run) = self.active_run.take() {
          run.cancel.cancel();
        }

        should_exit = true;
      }
      Command::ShowHelp => self.help.show(&mut self.message),
      Command::HideHelp => self.help.hide(&mut self.message),
      Command::StartPrompt(kind) => self.start_prompt(kind),
      Command::CancelPrompt => self.cancel_prompt(),
      Command::SubmitPrompt => self.submit_prompt()?,
      Command::SwitchTab => self.switch_tab(),
      Command::SelectNext => self.move_selection(1),
      Command::SelectPrevious => self.move_selection(-1),
      Command::PageDown => self.move_selection(self.page_jump()),
      Command::PageUp => self.move_selection(-self.page_jump()),
      Command::SelectFirst => self.select_index(0),
      Command::SelectLast => self.select_index(usize::MAX),
      Command::StartCollection => self.start_collection(),
      Command::StopCollection => self.stop_collection(),
      Command::ClearResults => self.clear_results(),
      Command::CycleSort => {
        self.settings.sort = self.settings.sort.next();
        self.set_transient_message(format!(
          "排序方式: {}",
          self.settings.sort.label()
        ));
      }
      Command::TogglePagination => {
        self.settings.pagination = self.settings.pagination.toggle();
        self.set_transient_message(format!(
          "分页方式: {}",
          self.settings.pagination.label()
        ));
      }
      Command::ToggleReplies => {
        self.settings.fetch_replies = !self.settings.fetch_replies;
        self.set_transient_message(format!(
          "爬取回复: {}",
          on_off(self.settings.fetch_replies)
        ));
      }
      Command::IncreasePages => self.adjust_pages(1),
      Command::DecreasePages => self.adjust_pages(-1),
      Command::IncreaseMinLength => self.adjust_min_length(1),
      Command::DecreaseMinLength => self.adjust_min_length(-1),
      Command::IncreaseWinners => self.adjust_winners(1),
      Command::DecreaseWinners => self.adjust_winners(-1),
      Command::Draw => self.draw_winners(),
      Command::OpenVideo => self.open_video(),
      Command::None => {}
    }

    Ok(CommandDispatch {
      effects: std::mem::take(&mut self.pending_effects),
      should_exit,
    })
  }

  fn draw_winners(&mut self) {
    if self.lottery_pool.is_empty() {
      self.set_transient_message("请先加载评论文件 (f)".into());
      return;
    }

    let result = draw(&self.lottery_pool, self.min_length, self.winner_count);

    self.eligible = Some(result.eligible);

    if result.winners.is_empty() {
      self.winners.clear();
      self.set_transient_message(format!(
        "没有字数不少于 {} 的评论",
        self.min_length
      ));
      return;
    }

    self.message = format!(
      "共 {} 条评论符合要求，抽取了 {} 位获奖者",
      result.eligible,
      result.winners.len()
    );

    self.pending_effects.push(Effect::SaveLotteryReport {
      report: result.report(),
    });

    self.winners = ListView::default();
    self.winners.extend(result.winners);
  }

  fn handle_collect(&mut self, run_id: u64, event: CollectEvent) {
    let Some(run) = self.active_run.as_mut() else {
      return;
    };

    if run.run_id != run_id {
      return;
    }

    match event {
      CollectEvent::PageCompleted { comments, .. }
      | CollectEvent::Replies { comments, .. } => {
        self.comments.extend(comments);
        self.raw_stale = true;
      }
      CollectEvent::Progress {
        max_pages,
        page,
        total,
      } => {
        run.page = page;
        run.max_pages = max_pages;

        if !self.help.is_visible() {
          self.message = format!(
            "正在爬取({}排序): 第 {page}/{max_pages} 页 | 已获取 {total} 条评论",
            run.sort.label()
          );
        }
      }
      CollectEvent::Completed { comments } => {
        self.active_run = None;

        let total = comments.len();

        self.comments.replace(comments);
        self.raw_stale = true;

        if !self.help.is_visible() {
          self.message = format!("爬取完成! 共获取 {total} 条评论");
        }
      }
      CollectEvent::Failed { message } => {
        self.active_run = None;
        self.set_transient_message(format!("爬取失败: {message}"));
      }
    }
  }

  pub(crate) fn handle_event(&mut self, event: Event) {
    match event {
      Event::Collect { event, run_id } => self.handle_collect(run_id, event),
      Event::Exported { path, result } => match result {
        Ok(format) => self.set_transient_message(format!(
          "已导出 {} 条评论到 {} ({format:?})",
          self.comments.len(),
          path.display()
        )),
        Err(error) => {
          self.set_transient_message(format!("导出失败: {error}"));
        }
      },
      Event::LotteryParse { event, request_id } => {
        if self.lottery_load != Some(request_id) {
          return;
        }

        match event {
          ParseEvent::FormatError(_) => self.format_errors += 1,
          ParseEvent::Progress(percent) => {
            self.lottery_progress = Some(percent);

            if !self.help.is_visible() {
              self.message = format!("加载中... {percent}%");
            }
          }
        }
      }
      Event::LotteryLoaded { request_id, result } => {
        if self.lottery_load != Some(request_id) {
          return;
        }

        self.lottery_load = None;

        match result {
          Ok(report) => {
            self.format_errors = report.format_errors.len();
            self.lottery_pool = report.comments;
            self.eligible = None;
            self.winners.clear();

            if !self.help.is_visible() {
              self.message =
                format!("成功加载 {} 条评论", self.lottery_pool.len());

              if self.format_errors > 0 {
                self.message.push_str(&format!(
                  "，跳过 {} 处格式错误",
                  self.format_errors
                ));
              }
            }
          }
          Err(error) => {
            self.lottery_progress = None;
            self.lottery_file = None;
            self.set_transient_message(format!("加载文件时出错: {error}"));
          }
        }
      }
      Event::ReportSaved { result } => match result {
        Ok(path) => self.set_transient_message(format!(
          "抽奖结果已保存到 {}",
          path.display()
        )),
        Err(error) => {
          self.set_transient_message(format!("保存抽奖结果失败: {error}"));
        }
      },
    }
  }

  fn handle_prompt_key(&mut self, key: KeyEvent) -> Command {
    let Some(prompt) = self.prompt.as_mut() else {
      return Command::None;
    };

    match key.code {
      KeyCode::Esc => return Command::CancelPrompt,
      KeyCode::Enter => return Command::SubmitPrompt,
      KeyCode::Backspace => {
        prompt.buffer.pop();
      }
      KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        prompt.buffer.clear();
      }
      KeyCode::Char(ch) => {
        let modifiers = key.modifiers;

        if modifiers.contains(KeyModifiers::CONTROL)
          || modifiers.contains(KeyModifiers::ALT)
          || modifiers.contains(KeyModifiers::SUPER)
        {
          return Command::None;
        }

        prompt.buffer.push(ch);
      }
      _ => return Command::None,
    }

    self.message = prompt.render();

    Command::None
  }

  pub(crate) fn help(&self) -> &HelpView {
    &self.help
  }

  pub(crate) fn help_is_visible(&self) -> bool {
    self.help.is_visible()
  }

  pub(crate) fn is_collecting(&self) -> bool {
    self.active_run.is_some()
  }

  pub(crate) fn lottery_pool_len(&self) -> usize {
    self.lottery_pool.len()
  }

  pub(crate) fn lottery_summary(&self) -> String {
    let file = self
      .lottery_file
      .as_ref()
      .map_or_else(|| "未加载".to_string(), |path| path.display().to_string());

    let mut summary = format!(
      "文件: {file} | 评论: {} | 最小字数: {} | 中奖人数: {}",
      self.lottery_pool.len(),
      self.min_length,
      self.winner_count
    );

    if let Some(eligible) = self.eligible {
      summary.push_str(&format!(" | 符合条件: {eligible}"));
    }

    if self.format_errors > 0 {
      summary.push_str(&format!(" | 格式错误: {}", self.format_errors));
    }

    summary
  }

  pub(crate) fn message(&self) -> &str {
    &self.message
  }

  fn move_selection(&mut self, delta: isize) {
    match self.active_tab {
      Tab::Comments => self.comments.move_by(delta),
      Tab::Lottery => self.winners.move_by(delta),
      Tab::Raw => self.raw.move_by(delta),
    }
  }

  pub(crate) fn new(client_config: ClientConfig, video_url: String) -> Self {
    Self {
      active_run: None,
      active_tab: Tab::default(),
      client_config,
      comments: ListView::default(),
      eligible: None,
      format_errors: 0,
      help: HelpView::new(),
      list_height: 0,
      lottery_file: None,
      lottery_load: None,
      lottery_pool: Vec::new(),
      lottery_progress: None,
      message: COMMENTS_STATUS.into(),
      min_length: 0,
      next_request_id: 0,
      pending_effects: Vec::new(),
      prompt: None,
      raw: ListView::default(),
      raw_stale: false,
      settings: RunConfig::new(""),
      transient_message: None,
      video_url,
      winner_count: Self::DEFAULT_WINNERS,
      winners: ListView::default(),
    }
  }

  fn next_request_id(&mut self) -> u64 {
    self.next_request_id = self.next_request_id.wrapping_add(1);
    self.next_request_id
  }

  fn open_video(&mut self) {
    match extract_bvid(&self.video_url) {
      Some(bvid) => self.pending_effects.push(Effect::OpenUrl {
        url: RunConfig::new(bvid).video_url,
      }),
      None => self.set_transient_message("请先输入视频链接 (u)".into()),
    }
  }

  fn page_jump(&self) -> isize {
    isize::try_from(self.list_height.max(1) / 3)
      .unwrap_or(1)
      .max(1)
  }

  pub(crate) fn prompt_command(&mut self, key: KeyEvent) -> Option<Command> {
    self.prompt.is_some().then(|| self.handle_prompt_key(key))
  }

  /// The collected records as JSON lines, rebuilt only after the comment
  /// list changed.
  pub(crate) fn raw(&mut self) -> &ListView<String> {
    if self.raw_stale {
      self.raw_stale = false;

      let lines = match raw_json(self.comments.items()) {
        Ok(json) => json.lines().map(str::to_string).collect(),
        Err(error) => vec![format!("error: {error}")],
      };

      self.raw.replace(lines);
    }

    &self.raw
  }

  fn select_index(&mut self, index: usize) {
    match self.active_tab {
      Tab::Comments => self.comments.set_selected(index),
      Tab::Lottery => self.winners.set_selected(index),
      Tab::Raw => self.raw.set_selected(index),
    }
  }

  pub(crate) fn set_list_height(&mut self, height: usize) {
    self.list_height = height;
  }

  pub(crate) fn set_list_offset(&mut self, offset: usize) {
    match self.active_tab {
      Tab::Comments => self.comments.set_offset(offset),
      Tab::Lottery => self.winners.set_offset(offset),
      Tab::Raw => self.raw.set_offset(offset),
    }
  }

  pub(crate) fn set_transient_message(&mut self, message: String) {
    let original = self.transient_message.as_ref().map_or_else(
      || self.message.clone(),
      |transient| transient.original().to_string(),
    );

    self.transient_message =
      Some(TransientMessage::new(message.clone(), original));

    self.message = message;
  }

  pub(crate) fn settings_summary(&self) -> String {
    let video = extract_bvid(&self.video_url)
      .unwrap_or_else(|| "未设置视频 (u)".to_string());

    format!(
      "{video} | 排序: {} | 页数: {} | 回复: {} | 分页: {} | cookie: {} | 代理: {}",
      self.settings.sort.label(),
      self.settings.max_pages,
      on_off(self.settings.fetch_replies),
      self.settings.pagination.label(),
      if self.client_config.cookie.is_some() {
        "已设置"
      } else {
        "无"
      },
      self.client_config.proxy.as_deref().unwrap_or("无"),
    )
  }

  fn start_collection(&mut self) {
    if self.active_run.is_some() {
      self.set_transient_message("已有爬取任务在运行，按 x 停止".into());
      return;
    }

    let Some(bvid) = extract_bvid(&self.video_url) else {
      self.set_transient_message("无效的B站视频链接，按 u 输入".into());
      return;
    };

    let run_id = self.next_request_id();

    let cancel = CancelFlag::default();

    let run = RunConfig {
      bvid: bvid.clone(),
      video_url: self.video_url.trim().to_string(),
      ..self.settings.clone()
    };

    self.active_run = Some(ActiveRun {
      cancel: cancel.clone(),
      max_pages: run.max_pages,
      page: 0,
      run_id,
      sort: run.sort,
    });

    self.comments.clear();
    self.raw_stale = true;

    self.message = format!("正在获取 {bvid} 的视频信息...");

    self.pending_effects.push(Effect::StartCollection {
      cancel,
      client: self.client_config.clone(),
      run,
      run_id,
    });
  }

  fn start_prompt(&mut self, kind: PromptKind) {
    let initial = match kind {
      PromptKind::Cookie => self.client_config.cookie.clone(),
      PromptKind::ExportPath => Some(Self::DEFAULT_EXPORT.to_string()),
      PromptKind::ImportPath => self
        .lottery_file
        .as_ref()
        .map(|path| path.display().to_string())
        .or_else(|| Some(Self::DEFAULT_EXPORT.to_string())),
      PromptKind::Proxy => self.client_config.proxy.clone(),
      PromptKind::VideoUrl => Some(self.video_url.clone()),
    };

    let prompt =
      Prompt::new(kind, initial.unwrap_or_default(), self.message.clone());

    self.message = prompt.render();

    self.prompt = Some(prompt);
  }

  fn stop_collection(&mut self) {
    let Some(run) = self.active_run.take() else {
      self.set_transient_message("当前没有正在运行的爬取任务".into());
      return;
    };

    run.cancel.cancel();

    self.message =
      format!("已停止爬取，保留 {} 条评论", self.comments.len());
  }

  fn submit_prompt(&mut self) -> Result {
    let Some(prompt) = self.prompt.take() else {
      return Ok(());
    };

    self.message = prompt.message_backup;

    let value = prompt.buffer.trim().to_string();

    let optional = (!value.is_empty()).then(|| value.clone());

    match prompt.kind {
      PromptKind::Cookie => {
        self.client_config.cookie = optional;
        self.set_transient_message(
          "Cookie 已更新，下次爬取时生效".into(),
        );
      }
      PromptKind::Proxy => {
        self.client_config.proxy = optional;
        self.set_transient_message("代理已更新，下次爬取时生效".into());
      }
      PromptKind::VideoUrl => {
        self.video_url = value;

        match extract_bvid(&self.video_url) {
          Some(bvid) => {
            self.set_transient_message(format!("视频: {bvid}，按 enter 开始"));
          }
          None => {
            self.set_transient_message("无法从链接中识别 BV 号".into());
          }
        }
      }
      PromptKind::ExportPath => {
        if value.is_empty() {
          return Ok(());
        }

        if self.comments.is_empty() {
          self.set_transient_message("没有可导出的评论".into());
          return Ok(());
        }

        let path = PathBuf::from(value);

        ExportFormat::from_path(&path)
          .context("export path must end in .json, .csv or .txt")?;

        self.pending_effects.push(Effect::Export {
          comments: self.comments.items().to_vec(),
          path,
          video_url: self.video_url.trim().to_string(),
        });
      }
      PromptKind::ImportPath => {
        if value.is_empty() {
          return Ok(());
        }

        let path = PathBuf::from(value);

        let request_id = self.next_request_id();

        self.lottery_file = Some(path.clone());
        self.lottery_load = Some(request_id);
        self.lottery_progress = Some(0);
        self.format_errors = 0;

        self.pending_effects.push(Effect::LoadLotteryFile {
          path,
          request_id,
        });
      }
    }

    Ok(())
  }

  fn switch_tab(&mut self) {
    self.active_tab = self.active_tab.next();

    if self.active_run.is_none() && self.lottery_load.is_none() {
      self.message = match self.active_tab {
        Tab::Comments => COMMENTS_STATUS,
        Tab::Lottery => LOTTERY_STATUS,
        Tab::Raw => RAW_STATUS,
      }
      .into();
    }
  }

  pub(crate) fn update_transient_message(&mut self) {
    if let Some(transient) = self.transient_message.clone() {
      if self.message != transient.current() {
        self.transient_message = None;
      } else if transient.is_expired() {
        self.message = transient.original().to_string();
        self.transient_message = None;
      }
    }
  }

  pub(crate) fn winners(&self) -> &ListView<ExportedComment> {
    &self.winners
  }
}

fn on_off(value: bool) -> &'static str {
  if value { "开" } else { "关" }
}

#[cfg(test)]
mod tests {
  use {super::*, crate::comment::sample_comment};

  const URL: &str = "https://www.bilibili.com/video/BV1xx411c7mD";

  fn dispatch(state: &mut State, command: Command) -> CommandDispatch {
    state.dispatch_command(command).expect("dispatch succeeds")
  }

  fn exported(author: &str, content: &str) -> ExportedComment {
    ExportedComment {
      author: author.into(),
      content: content.into(),
      likes: 1,
      time: NaiveDateTime::parse_from_str("2024-01-01 00:00", MINUTE_FORMAT)
        .unwrap(),
    }
  }

  fn started_state() -> (State, u64) {
    let mut state = State::new(ClientConfig::default(), URL.into());

    let dispatch = dispatch(&mut state, Command::StartCollection);

    let [Effect::StartCollection { run_id, .. }] = dispatch.effects.as_slice()
    else {
      panic!("expected a single start effect");
    };

    (state, *run_id)
  }

  fn type_text(state: &mut State, text: &str) {
    for ch in text.chars() {
      let command = state
        .prompt_command(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));

      assert_eq!(command, Some(Command::None));
    }
  }

  #[test]
  fn start_collection_builds_run_from_settings() {
    let mut state = State::new(ClientConfig::default(), URL.into());

    dispatch(&mut state, Command::CycleSort);
    dispatch(&mut state, Command::ToggleReplies);
    dispatch(&mut state, Command::IncreasePages);

    let dispatch = dispatch(&mut state, Command::StartCollection);

    match dispatch.effects.as_slice() {
      [Effect::StartCollection { run, .. }] => {
        assert_eq!(run.bvid, "BV1xx411c7mD");
        assert_eq!(run.video_url, URL);
        assert_eq!(run.sort, SortMode::Time);
        assert!(run.fetch_replies);
        assert_eq!(run.max_pages, RunConfig::DEFAULT_PAGES + 1);
      }
      _ => panic!("unexpected effects"),
    }

    assert!(state.is_collecting());
  }

  #[test]
  fn invalid_url_does_not_start() {
    let mut state = State::new(ClientConfig::default(), "not a link".into());

    let dispatch = dispatch(&mut state, Command::StartCollection);

    assert!(dispatch.effects.is_empty());
    assert!(!state.is_collecting());
    assert!(state.message().contains("无效"));
  }

  #[test]
  fn second_start_is_refused_while_running() {
    let (mut state, _) = started_state();

    let dispatch = dispatch(&mut state, Command::StartCollection);

    assert!(dispatch.effects.is_empty());
  }

  #[test]
  fn collect_events_fill_the_table() {
    let (mut state, run_id) = started_state();

    state.handle_event(Event::Collect {
      event: CollectEvent::PageCompleted {
        comments: vec![sample_comment(1, 0), sample_comment(2, 0)],
        page: 1,
      },
      run_id,
    });

    state.handle_event(Event::Collect {
      event: CollectEvent::Progress {
        max_pages: 10,
        page: 1,
        total: 2,
      },
      run_id,
    });

    assert_eq!(state.comments().len(), 2);
    assert_eq!(
      state.message(),
      "正在爬取(热度排序): 第 1/10 页 | 已获取 2 条评论"
    );
    assert!((state.collection_ratio() - 0.1).abs() < f64::EPSILON);

    state.handle_event(Event::Collect {
      event: CollectEvent::Completed {
        comments: vec![sample_comment(1, 0), sample_comment(2, 0)],
      },
      run_id,
    });

    assert!(!state.is_collecting());
    assert_eq!(state.message(), "爬取完成! 共获取 2 条评论");
  }

  #[test]
  fn raw_tab_follows_collected_records() {
    let (mut state, run_id) = started_state();

    let page = |id| Event::Collect {
      event: CollectEvent::PageCompleted {
        comments: vec![sample_comment(id, 0)],
        page: 1,
      },
      run_id,
    };

    state.handle_event(page(1));

    dispatch(&mut state, Command::SwitchTab);

    assert_eq!(state.active_tab(), Tab::Raw);

    let value =
      serde_json::from_str::<Value>(&state.raw().items().join("\n")).unwrap();

    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(value[0]["rpid"], 1);

    state.handle_event(page(2));

    let value =
      serde_json::from_str::<Value>(&state.raw().items().join("\n")).unwrap();

    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[1]["rpid"], 2);

    dispatch(&mut state, Command::SelectLast);

    let last = state.raw().len() - 1;

    assert_eq!(state.raw().selected_index(), Some(last));
  }

  #[test]
  fn events_from_stopped_run_are_ignored() {
    let (mut state, run_id) = started_state();

    dispatch(&mut state, Command::StopCollection);

    state.handle_event(Event::Collect {
      event: CollectEvent::PageCompleted {
        comments: vec![sample_comment(1, 0)],
        page: 1,
      },
      run_id,
    });

    assert!(state.comments().is_empty());
    assert!(!state.is_collecting());
  }

  #[test]
  fn failure_keeps_partial_results() {
    let (mut state, run_id) = started_state();

    state.handle_event(Event::Collect {
      event: CollectEvent::PageCompleted {
        comments: vec![sample_comment(1, 0)],
        page: 1,
      },
      run_id,
    });

    state.handle_event(Event::Collect {
      event: CollectEvent::Failed {
        message: "boom".into(),
      },
      run_id,
    });

    assert_eq!(state.comments().len(), 1);
    assert_eq!(state.message(), "爬取失败: boom");
  }

  #[test]
  fn page_limit_is_clamped() {
    let mut state = State::new(ClientConfig::default(), String::new());

    for _ in 0..20 {
      dispatch(&mut state, Command::DecreasePages);
    }

    assert_eq!(state.settings.max_pages, 1);

    for _ in 0..200 {
      dispatch(&mut state, Command::IncreasePages);
    }

    assert_eq!(state.settings.max_pages, RunConfig::MAX_PAGES);
  }

  #[test]
  fn cookie_prompt_updates_client_config() {
    let mut state = State::new(ClientConfig::default(), String::new());

    dispatch(&mut state, Command::StartPrompt(PromptKind::Cookie));

    assert_eq!(state.message(), "Cookie: ");

    type_text(&mut state, "SESSDATA=x; bili_jct=tok");

    dispatch(&mut state, Command::SubmitPrompt);

    assert_eq!(state.client_config.csrf_token(), Some("tok"));
    assert!(state.prompt.is_none());
  }

  #[test]
  fn cancelled_prompt_restores_message() {
    let mut state = State::new(ClientConfig::default(), String::new());

    let before = state.message().to_string();

    dispatch(&mut state, Command::StartPrompt(PromptKind::Proxy));

    assert_eq!(
      state.prompt_command(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
      Some(Command::CancelPrompt)
    );

    dispatch(&mut state, Command::CancelPrompt);

    assert_eq!(state.message(), before);
    assert!(state.client_config.proxy.is_none());
  }

  #[test]
  fn export_requires_comments() {
    let mut state = State::new(ClientConfig::default(), URL.into());

    dispatch(&mut state, Command::StartPrompt(PromptKind::ExportPath));

    let dispatch = dispatch(&mut state, Command::SubmitPrompt);

    assert!(dispatch.effects.is_empty());
    assert_eq!(state.message(), "没有可导出的评论");
  }

  #[test]
  fn export_rejects_unknown_extension() {
    let mut state = State::new(ClientConfig::default(), URL.into());

    state.comments.extend([sample_comment(1, 0)]);

    dispatch(&mut state, Command::StartPrompt(PromptKind::ExportPath));

    for _ in 0..State::DEFAULT_EXPORT.len() {
      state.prompt_command(KeyEvent::new(
        KeyCode::Backspace,
        KeyModifiers::NONE,
      ));
    }

    type_text(&mut state, "out.xlsx");

    assert!(state.dispatch_command(Command::SubmitPrompt).is_err());
  }

  #[test]
  fn export_emits_effect_with_current_comments() {
    let mut state = State::new(ClientConfig::default(), URL.into());

    state.comments.extend([sample_comment(1, 0), sample_comment(2, 0)]);

    dispatch(&mut state, Command::StartPrompt(PromptKind::ExportPath));

    let dispatch = dispatch(&mut state, Command::SubmitPrompt);

    match dispatch.effects.as_slice() {
      [
        Effect::Export {
          comments,
          path,
          video_url,
        },
      ] => {
        assert_eq!(comments.len(), 2);
        assert_eq!(path, Path::new(State::DEFAULT_EXPORT));
        assert_eq!(video_url, URL);
      }
      _ => panic!("unexpected effects"),
    }
  }

  #[test]
  fn stale_lottery_load_is_ignored() {
    let mut state = State::new(ClientConfig::default(), String::new());

    dispatch(&mut state, Command::StartPrompt(PromptKind::ImportPath));
    dispatch(&mut state, Command::SubmitPrompt);

    state.handle_event(Event::LotteryLoaded {
      request_id: 99,
      result: Ok(ParseReport {
        comments: vec![exported("a", "hello")],
        format_errors: Vec::new(),
      }),
    });

    assert_eq!(state.lottery_pool_len(), 0);
  }

  #[test]
  fn loaded_pool_can_be_drawn() {
    let mut state = State::new(ClientConfig::default(), String::new());

    dispatch(&mut state, Command::SwitchTab);
    dispatch(&mut state, Command::StartPrompt(PromptKind::ImportPath));

    let dispatch_result = dispatch(&mut state, Command::SubmitPrompt);

    let [Effect::LoadLotteryFile { request_id, .. }] =
      dispatch_result.effects.as_slice()
    else {
      panic!("expected a load effect");
    };

    state.handle_event(Event::LotteryLoaded {
      request_id: *request_id,
      result: Ok(ParseReport {
        comments: vec![
          exported("a", "hi"),
          exported("b", "long enough"),
          exported("c", "also long"),
        ],
        format_errors: vec![FormatError {
          line: 3,
          reason: "bad".into(),
        }],
      }),
    });

    assert_eq!(state.lottery_pool_len(), 3);
    assert_eq!(state.message(), "成功加载 3 条评论，跳过 1 处格式错误");

    for _ in 0..5 {
      dispatch(&mut state, Command::IncreaseMinLength);
    }

    dispatch(&mut state, Command::IncreaseWinners);

    let drawn = dispatch(&mut state, Command::Draw);

    assert!(matches!(
      drawn.effects.as_slice(),
      [Effect::SaveLotteryReport { report }] if report.contains("共 2 条评论符合要求")
    ));
    assert_eq!(state.winners().len(), 2);
    assert!(state.lottery_summary().contains("符合条件: 2"));
  }

  #[test]
  fn draw_without_pool_is_refused() {
    let mut state = State::new(ClientConfig::default(), String::new());

    let dispatch = dispatch(&mut state, Command::Draw);

    assert!(dispatch.effects.is_empty());
    assert!(state.winners().is_empty());
  }

  #[test]
  fn quit_cancels_running_collection() {
    let (mut state, _) = started_state();

    let cancel = state
      .active_run
      .as_ref()
      .map(|run| run.cancel.clone())
      .unwrap();

    let dispatch = dispatch(&mut state, Command::Quit);

    assert!(dispatch.should_exit);
    assert!(cancel.is_cancelled());
  }
}
