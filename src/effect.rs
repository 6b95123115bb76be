use super::*;

pub(crate) enum Effect {
  Export {
    comments: Vec<Comment>,
    path: PathBuf,
    video_url: String,
  },
  LoadLotteryFile {
    path: PathBuf,
    request_id: u64,
  },
  OpenUrl {
    url: String,
  },
  SaveLotteryReport {
    report: String,
  },
  StartCollection {
    cancel: CancelFlag,
    client: ClientConfig,
    run: RunConfig,
    run_id: u64,
  },
}
