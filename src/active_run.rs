use super::*;

/// Bookkeeping for the collection currently running in the background.
pub(crate) struct ActiveRun {
  pub(crate) cancel: CancelFlag,
  pub(crate) max_pages: usize,
  pub(crate) page: usize,
  pub(crate) run_id: u64,
  pub(crate) sort: SortMode,
}

impl ActiveRun {
  pub(crate) fn ratio(&self) -> f64 {
    if self.max_pages == 0 {
      return 0.0;
    }

    let as_f64 =
      |value: usize| f64::from(u32::try_from(value).unwrap_or(u32::MAX));

    (as_f64(self.page) / as_f64(self.max_pages)).clamp(0.0, 1.0)
  }
}
