use super::*;

pub(crate) enum Event {
  Collect {
    event: CollectEvent,
    run_id: u64,
  },
  Exported {
    path: PathBuf,
    result: Result<ExportFormat, Error>,
  },
  LotteryLoaded {
    request_id: u64,
    result: Result<ParseReport, Error>,
  },
  LotteryParse {
    event: ParseEvent,
    request_id: u64,
  },
  ReportSaved {
    result: Result<PathBuf, Error>,
  },
}
