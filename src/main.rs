use {
  active_run::ActiveRun,
  anyhow::Context,
  api::{Envelope, MainPage, RawReply, ReplyPage, VideoInfo},
  app::App,
  async_trait::async_trait,
  bvid::extract_bvid,
  chrono::{DateTime, Local, NaiveDateTime, Utc},
  client::{Client, CommentSource},
  collector::{CancelFlag, CollectEvent, Collector},
  command::Command,
  command_dispatch::CommandDispatch,
  comment::Comment,
  config::{ClientConfig, RunConfig},
  crossterm::{
    event as crossterm_event,
    event::{
      Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    },
    execute,
    style::Stylize,
    terminal::{
      EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
      enable_raw_mode,
    },
  },
  effect::Effect,
  error::Error,
  event::Event,
  export::{
    CONTENT_LABEL, EXPORT_TITLE, ExportFormat, LIKES_LABEL, TIME_LABEL,
    raw_json, write_export,
  },
  help_view::HelpView,
  list_view::ListView,
  lottery::{REPORT_FILE, draw},
  parser::{ExportedComment, ParseEvent, ParseReport, parse_export},
  prompt::{Prompt, PromptKind},
  rand::Rng,
  ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
      Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs,
      Wrap,
    },
  },
  serde::{Deserialize, Serialize},
  serde_json::Value,
  sort_mode::SortMode,
  state::State,
  std::{
    backtrace::BacktraceStatus,
    env,
    fmt::{self, Display, Formatter},
    fs,
    io::{self, IsTerminal, Stdout},
    path::{Path, PathBuf},
    process,
    sync::{
      Arc, Mutex,
      atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
  },
  tab::Tab,
  tokio::{
    runtime::Handle,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
  },
  tracing::{debug, info, warn},
  tracing_subscriber::EnvFilter,
  transient_message::TransientMessage,
  utils::{MINUTE_FORMAT, flatten, format_minute, truncate},
};

#[cfg(test)]
use {
  client::Page,
  config::Pagination,
  parser::{FormatError, parse_text},
};

mod active_run;
mod api;
mod app;
mod bvid;
mod client;
mod collector;
mod command;
mod command_dispatch;
mod comment;
mod config;
mod effect;
mod error;
mod event;
mod export;
mod help_view;
mod list_view;
mod lottery;
mod parser;
mod prompt;
mod sort_mode;
mod state;
mod tab;
mod transient_message;
mod utils;

const BASE_INDENT: &str = " ";

const COMMENTS_STATUS: &str = "u url • enter start • x stop • s sort • r replies • +/- pages • e export • tab raw data • ? help";

const LOTTERY_STATUS: &str = "f load file • [/] min length • </> winners • enter draw • tab comments • ? help";

const RAW_STATUS: &str =
  "j/k scroll • e export • c clear • tab lottery • ? help";

const LOG_FILE_VAR: &str = "BILI_LOG_FILE";

const TABLE_BODY_CHARS: usize = 100;

type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;

/// Sends tracing output to a file so it never draws over the terminal UI.
fn initialize_logging() -> Result<PathBuf> {
  let path = env::var_os(LOG_FILE_VAR).map_or_else(
    || env::temp_dir().join("bili-comments.log"),
    PathBuf::from,
  );

  let file = fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(&path)
    .with_context(|| format!("could not open log file {}", path.display()))?;

  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::fmt()
    .with_ansi(false)
    .with_env_filter(filter)
    .with_writer(Mutex::new(file))
    .try_init()
    .map_err(|error| anyhow::anyhow!(error))
    .context("could not install log subscriber")?;

  Ok(path)
}

fn initialize_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
  enable_raw_mode()?;

  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen)?;

  Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(
  terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result {
  disable_raw_mode()?;

  execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

  terminal.show_cursor()?;

  Ok(())
}

async fn run() -> Result {
  let log_path = initialize_logging()?;

  let client_config = ClientConfig::from_env();

  info!(
    log = %log_path.display(),
    cookie = client_config.cookie.is_some(),
    proxy = ?client_config.proxy,
    "starting"
  );

  let mut terminal = initialize_terminal()?;

  let mut app = App::new(client_config, String::new());

  let result = app.run(&mut terminal);

  restore_terminal(&mut terminal)?;

  result
}

#[tokio::main]
async fn main() {
  if let Err(error) = run().await {
    let use_color = io::stderr().is_terminal();

    if use_color {
      eprintln!("{} {error}", "error:".bold().red());
    } else {
      eprintln!("error: {error}");
    }

    for (i, error) in error.chain().skip(1).enumerate() {
      if i == 0 {
        eprintln!();

        if use_color {
          eprintln!("{}", "because:".bold().red());
        } else {
          eprintln!("because:");
        }
      }

      if use_color {
        eprintln!("{} {error}", "-".bold().red());
      } else {
        eprintln!("- {error}");
      }
    }

    let backtrace = error.backtrace();

    if backtrace.status() == BacktraceStatus::Captured {
      if use_color {
        eprintln!("{}", "backtrace:".bold().red());
      } else {
        eprintln!("backtrace:");
      }

      eprintln!("{backtrace}");
    }

    process::exit(1);
  }
}
