use super::*;

/// Cooperative stop signal shared between the consumer and a running
/// collection. Checked around every fetch, never mid-request.
#[derive(Clone, Debug, Default)]
pub(crate) struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
  pub(crate) fn cancel(&self) {
    self.0.store(true, Ordering::Relaxed);
  }

  pub(crate) fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::Relaxed)
  }
}

#[derive(Clone, Debug)]
pub(crate) enum CollectEvent {
  Completed {
    comments: Vec<Comment>,
  },
  Failed {
    message: String,
  },
  PageCompleted {
    comments: Vec<Comment>,
    page: usize,
  },
  Progress {
    max_pages: usize,
    page: usize,
    total: usize,
  },
  Replies {
    comments: Vec<Comment>,
    root: u64,
  },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RunStatus {
  Cancelled,
  Completed,
  Failed,
}

#[derive(Debug)]
pub(crate) struct RunSummary {
  pub(crate) comments: Vec<Comment>,
  pub(crate) pages: usize,
  pub(crate) status: RunStatus,
}

pub(crate) struct Collector<S> {
  cancel: CancelFlag,
  config: RunConfig,
  source: S,
}

impl<S: CommentSource> Collector<S> {
  /// Only the first few top-level comments of each page get their replies
  /// expanded.
  pub(crate) const REPLY_ROOTS_PER_PAGE: usize = 5;

  async fn expand_replies<F>(
    &self,
    oid: u64,
    page: usize,
    roots: &[Comment],
    accumulated: &mut Vec<Comment>,
    emit: &mut F,
  ) where
    F: FnMut(CollectEvent),
  {
    for root in roots
      .iter()
      .take(Self::REPLY_ROOTS_PER_PAGE)
      .filter(|comment| comment.has_replies())
    {
      if self.cancel.is_cancelled() {
        return;
      }

      match self.source.fetch_replies(oid, root.id).await {
        Ok(replies) if replies.is_empty() => {}
        Ok(replies) => {
          debug!(
            page,
            root = root.id,
            count = replies.len(),
            "fetched replies"
          );

          accumulated.extend(replies.iter().cloned());

          emit(CollectEvent::Replies {
            comments: replies,
            root: root.id,
          });
        }
        Err(error) => {
          debug!(page, root = root.id, %error, "skipping reply thread");
        }
      }
    }
  }

  fn fail<F>(&self, message: String, emit: &mut F) -> RunSummary
  where
    F: FnMut(CollectEvent),
  {
    warn!(bvid = %self.config.bvid, %message, "collection failed");

    emit(CollectEvent::Failed { message });

    RunSummary {
      comments: Vec::new(),
      pages: 0,
      status: RunStatus::Failed,
    }
  }

  pub(crate) fn new(source: S, config: RunConfig, cancel: CancelFlag) -> Self {
    Self {
      cancel,
      config,
      source,
    }
  }

  /// Drives one collection run to its end, reporting every step through
  /// `emit`. Once cancellation is observed nothing further is emitted.
  pub(crate) async fn run<F>(self, mut emit: F) -> RunSummary
  where
    F: FnMut(CollectEvent),
  {
    let bvid = self.config.bvid.clone();

    info!(
      %bvid,
      sort = self.config.sort.label(),
      pagination = self.config.pagination.label(),
      max_pages = self.config.max_pages,
      replies = self.config.fetch_replies,
      "starting collection"
    );

    let video = match self.source.resolve_video(&bvid).await {
      Ok(video) => video,
      Err(error) => return self.fail(error.to_string(), &mut emit),
    };

    let Some(oid) = video.aid.filter(|aid| *aid != 0) else {
      return self.fail(Error::MissingNumericId(bvid).to_string(), &mut emit);
    };

    info!(
      %bvid,
      oid,
      title = video.title.as_deref().unwrap_or_default(),
      "resolved video"
    );

    let mut accumulated = Vec::new();
    let mut next = self.config.pagination.first();
    let mut pages = 0;

    let cancelled = |pages: usize, comments: Vec<Comment>| {
      info!(pages, total = comments.len(), "collection cancelled");

      RunSummary {
        comments,
        pages,
        status: RunStatus::Cancelled,
      }
    };

    while pages < self.config.max_pages {
      if self.cancel.is_cancelled() {
        return cancelled(pages, accumulated);
      }

      let page = match self
        .source
        .fetch_page(oid, next, self.config.sort)
        .await
      {
        Ok(page) => page,
        Err(error) if pages == 0 => {
          return self.fail(
            format!("could not fetch the first page: {error}"),
            &mut emit,
          );
        }
        Err(error) => {
          warn!(page = pages + 1, %error, "page failed, ending collection");
          break;
        }
      };

      if self.cancel.is_cancelled() {
        return cancelled(pages, accumulated);
      }

      if page.comments.is_empty() {
        debug!(page = pages + 1, "empty page, collection exhausted");
        break;
      }

      pages += 1;

      accumulated.extend(page.comments.iter().cloned());

      info!(
        page = pages,
        count = page.comments.len(),
        total = accumulated.len(),
        "page completed"
      );

      emit(CollectEvent::PageCompleted {
        comments: page.comments.clone(),
        page: pages,
      });

      emit(CollectEvent::Progress {
        max_pages: self.config.max_pages,
        page: pages,
        total: accumulated.len(),
      });

      if self.config.fetch_replies {
        self
          .expand_replies(
            oid,
            pages,
            &page.comments,
            &mut accumulated,
            &mut emit,
          )
          .await;
      }

      match self.config.pagination.advance(next, page.next) {
        Some(following) => next = following,
        None => {
          debug!(page = pages, "cursor exhausted");
          break;
        }
      }
    }

    if self.cancel.is_cancelled() {
      return cancelled(pages, accumulated);
    }

    info!(pages, total = accumulated.len(), "collection completed");

    emit(CollectEvent::Completed {
      comments: accumulated.clone(),
    });

    RunSummary {
      comments: accumulated,
      pages,
      status: RunStatus::Completed,
    }
  }
}
