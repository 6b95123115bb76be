use super::*;

pub(crate) struct App {
  event_rx: UnboundedReceiver<Event>,
  event_tx: UnboundedSender<Event>,
  handle: Handle,
  state: State,
}

impl App {
  fn comment_list_item(
    index: usize,
    comment: &Comment,
    width: u16,
  ) -> ListItem<'static> {
    let header = format!(
      "{}. {} · 👍 {} · {}{}",
      index + 1,
      comment.author,
      comment.like_count,
      comment.timestamp(),
      if comment.root_id == 0 {
        String::new()
      } else {
        format!(" · 回复 #{}", comment.root_id)
      }
    );

    let body = truncate(
      &comment.flattened_body(),
      TABLE_BODY_CHARS.min(usize::from(width).saturating_sub(4).max(1)),
    );

    Self::two_line_item(header, body)
  }

  fn draw(&mut self, frame: &mut Frame) {
    let layout = Layout::default()
      .direction(Direction::Vertical)
      .margin(1)
      .constraints([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
      ])
      .split(frame.area());

    self.state.set_list_height(layout[3].height as usize);

    let active_tab = self.state.active_tab();

    let tabs = Tabs::new(
      Tab::ALL
        .iter()
        .map(|tab| Line::from(tab.label().to_uppercase()))
        .collect::<Vec<_>>(),
    )
    .select(active_tab.index())
    .style(Style::default().fg(Color::DarkGray))
    .highlight_style(
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    )
    .divider(Span::raw(" "));

    frame.render_widget(tabs, layout[0]);

    let summary = match active_tab {
      Tab::Comments | Tab::Raw => self.state.settings_summary(),
      Tab::Lottery => self.state.lottery_summary(),
    };

    frame.render_widget(
      Paragraph::new(format!("{BASE_INDENT}{summary}"))
        .style(Style::default().fg(Color::White)),
      layout[1],
    );

    frame.render_widget(
      Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(self.state.collection_ratio()),
      layout[2],
    );

    let width = layout[3].width;

    let (items, selected, offset) = match active_tab {
      Tab::Comments => {
        let view = self.state.comments();

        let items = if view.is_empty() {
          vec![Self::placeholder(if self.state.is_collecting() {
            "Waiting for the first page..."
          } else {
            "No comments yet. Press u to enter a video, enter to start."
          })]
        } else {
          view
            .items()
            .iter()
            .enumerate()
            .map(|(index, comment)| {
              Self::comment_list_item(index, comment, width)
            })
            .collect()
        };

        (items, view.selected_index(), view.offset())
      }
      Tab::Lottery => {
        let view = self.state.winners();

        let items = if view.is_empty() {
          vec![Self::placeholder(if self.state.lottery_pool_len() == 0 {
            "No comments loaded. Press f to load a .txt export."
          } else {
            "Press enter to draw winners."
          })]
        } else {
          view
            .items()
            .iter()
            .enumerate()
            .map(|(index, winner)| Self::winner_list_item(index, winner))
            .collect()
        };

        (items, view.selected_index(), view.offset())
      }
      Tab::Raw => {
        if self.state.comments().is_empty() {
          (vec![Self::placeholder("Nothing collected yet.")], None, 0)
        } else {
          let view = self.state.raw();

          let items = view
            .items()
            .iter()
            .map(|line| {
              ListItem::new(Line::from(vec![
                Span::raw(BASE_INDENT),
                Span::raw(line.clone()),
              ]))
            })
            .collect();

          (items, view.selected_index(), view.offset())
        }
      }
    };

    let mut list_state = ListState::default()
      .with_selected(selected)
      .with_offset(offset);

    let list = List::new(items)
      .highlight_style(
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("");

    frame.render_stateful_widget(list, layout[3], &mut list_state);

    self.state.set_list_offset(list_state.offset());

    let status = Paragraph::new(self.state.message().to_string())
      .style(Style::default().fg(Color::DarkGray));

    frame.render_widget(status, layout[4]);

    self.state.help().draw(frame);
  }

  fn execute_effect(&mut self, effect: Effect) {
    let sender = self.event_tx.clone();

    match effect {
      Effect::Export {
        comments,
        path,
        video_url,
      } => {
        self.handle.spawn_blocking(move || {
          let result = write_export(&path, &video_url, &comments);
          let _ = sender.send(Event::Exported { path, result });
        });
      }
      Effect::LoadLotteryFile { path, request_id } => {
        self.handle.spawn_blocking(move || {
          let result = parse_export(&path, |event| {
            let _ = sender.send(Event::LotteryParse { event, request_id });
          });

          let _ = sender.send(Event::LotteryLoaded { request_id, result });
        });
      }
      Effect::OpenUrl { url } => match webbrowser::open(&url) {
        Ok(()) => {
          self.state.set_transient_message(format!(
            "已在浏览器中打开: {}",
            truncate(&url, 80)
          ));
        }
        Err(error) => {
          self
            .state
            .set_transient_message(format!("无法打开链接: {error}"));
        }
      },
      Effect::SaveLotteryReport { report } => {
        self.handle.spawn_blocking(move || {
          let path = PathBuf::from(REPORT_FILE);

          let result = fs::write(&path, report)
            .map(|()| path.clone())
            .map_err(|error| Error::io(&path, error));

          let _ = sender.send(Event::ReportSaved { result });
        });
      }
      Effect::StartCollection {
        cancel,
        client,
        run,
        run_id,
      } => {
        let client = match Client::new(client) {
          Ok(client) => client,
          Err(error) => {
            let _ = sender.send(Event::Collect {
              event: CollectEvent::Failed {
                message: format!("{error:#}"),
              },
              run_id,
            });

            return;
          }
        };

        self.handle.spawn(async move {
          let summary = Collector::new(client, run, cancel)
            .run(|event| {
              let _ = sender.send(Event::Collect { event, run_id });
            })
            .await;

          debug!(
            run_id,
            status = ?summary.status,
            pages = summary.pages,
            comments = summary.comments.len(),
            "collection task finished"
          );
        });
      }
    }
  }

  pub(crate) fn new(client_config: ClientConfig, video_url: String) -> Self {
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    Self {
      event_rx,
      event_tx,
      handle: Handle::current(),
      state: State::new(client_config, video_url),
    }
  }

  fn placeholder(text: &'static str) -> ListItem<'static> {
    ListItem::new(Line::from(vec![Span::raw(BASE_INDENT), Span::raw(text)]))
  }

  fn process_pending_events(&mut self) {
    self.state.update_transient_message();

    while let Ok(event) = self.event_rx.try_recv() {
      self.state.handle_event(event);
    }
  }

  pub(crate) fn run(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
  ) -> Result {
    loop {
      self.process_pending_events();

      terminal.draw(|frame| self.draw(frame))?;

      if !crossterm_event::poll(Duration::from_millis(200))? {
        continue;
      }

      let CrosstermEvent::Key(key) = crossterm_event::read()? else {
        continue;
      };

      if key.kind != KeyEventKind::Press {
        continue;
      }

      let command = if self.state.help_is_visible() {
        HelpView::handle_key(key)
      } else if let Some(command) = self.state.prompt_command(key) {
        command
      } else {
        Command::for_key(key, self.state.active_tab())
      };

      match self.state.dispatch_command(command) {
        Ok(dispatch) => {
          for effect in dispatch.effects {
            self.execute_effect(effect);
          }

          if dispatch.should_exit {
            break;
          }
        }
        Err(error) => {
          self.state.clear_pending_effects();
          self.state.set_transient_message(format!("error: {error:#}"));
        }
      }
    }

    Ok(())
  }

  fn two_line_item(header: String, detail: String) -> ListItem<'static> {
    ListItem::new(vec![
      Line::from(vec![
        Span::raw(BASE_INDENT),
        Span::styled(header, Style::default().fg(Color::White)),
      ]),
      Line::from(vec![
        Span::raw(BASE_INDENT),
        Span::styled(detail, Style::default().fg(Color::DarkGray)),
      ]),
      Line::from(Span::raw(BASE_INDENT)),
    ])
  }

  fn winner_list_item(
    index: usize,
    winner: &ExportedComment,
  ) -> ListItem<'static> {
    Self::two_line_item(
      format!(
        "🎉 第 {} 位获奖者 · {} · 👍 {} · {}",
        index + 1,
        winner.author,
        winner.likes,
        winner.time.format(MINUTE_FORMAT)
      ),
      winner.content.clone(),
    )
  }
}
