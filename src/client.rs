use {
  super::*,
  reqwest::{
    StatusCode,
    header::{COOKIE, HeaderMap, HeaderValue, REFERER},
  },
};

/// Where the collector gets its pages from.
#[async_trait]
pub(crate) trait CommentSource: Send + Sync {
  async fn fetch_page(
    &self,
    oid: u64,
    next: u64,
    sort: SortMode,
  ) -> Result<Page, Error>;

  async fn fetch_replies(
    &self,
    oid: u64,
    root: u64,
  ) -> Result<Vec<Comment>, Error>;

  async fn resolve_video(&self, bvid: &str) -> Result<VideoInfo, Error>;
}

#[derive(Debug, Default)]
pub(crate) struct Page {
  pub(crate) comments: Vec<Comment>,
  /// Cursor for the following request, zero once the server reports the end.
  pub(crate) next: u64,
}

#[derive(Clone)]
pub(crate) struct Client {
  client: reqwest::Client,
  config: ClientConfig,
}

impl Client {
  const BLOCKED_CODE: i64 = -412;

  const MAIN_URL: &str = "/x/v2/reply/main";

  const PAGE_SIZE: u32 = 20;

  const REFERER: &str = "https://www.bilibili.com";

  const REPLY_URL: &str = "/x/v2/reply/reply";

  const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

  const VIDEO_URL: &str = "/x/web-interface/view";

  fn classify(status: StatusCode, body: &[u8]) -> Result<Value, Error> {
    if status == StatusCode::PRECONDITION_FAILED {
      return Err(Error::Blocked {
        code: 0,
        status: status.as_u16(),
      });
    }

    if !status.is_success() {
      return Err(Error::Transport(format!("unexpected http status {status}")));
    }

    let envelope = serde_json::from_slice::<Envelope>(body)?;

    match envelope.code {
      0 => Ok(envelope.data.unwrap_or(Value::Null)),
      Self::BLOCKED_CODE => Err(Error::Blocked {
        code: envelope.code,
        status: status.as_u16(),
      }),
      code => Err(Error::Api {
        code,
        message: envelope.message,
      }),
    }
  }

  fn decode_replies(replies: Option<Vec<Value>>) -> Vec<Comment> {
    replies
      .unwrap_or_default()
      .into_iter()
      .filter_map(|raw| match Comment::try_from(raw) {
        Ok(comment) => Some(comment),
        Err(error) => {
          warn!(%error, "skipping malformed reply");
          None
        }
      })
      .collect()
  }

  fn jitter((min, max): (Duration, Duration)) -> Duration {
    if max <= min {
      min
    } else {
      rand::rng().random_range(min..=max)
    }
  }

  pub(crate) fn new(config: ClientConfig) -> Result<Self> {
    let mut headers = HeaderMap::new();

    headers.insert(REFERER, HeaderValue::from_static(Self::REFERER));

    if let Some(cookie) = &config.cookie {
      headers.insert(
        COOKIE,
        HeaderValue::from_str(cookie)
          .context("cookie is not a valid header value")?,
      );
    }

    let builder = reqwest::Client::builder()
      .default_headers(headers)
      .timeout(config.timeout)
      .user_agent(Self::USER_AGENT);

    // Only the configured proxy is used, never the environment's.
    let builder = match &config.proxy {
      Some(proxy) => builder.proxy(
        reqwest::Proxy::all(proxy)
          .with_context(|| format!("invalid proxy address {proxy}"))?,
      ),
      None => builder.no_proxy(),
    };

    Ok(Self {
      client: builder.build().context("could not build http client")?,
      config,
    })
  }

  fn pause_after(&self, error: &Error) -> Duration {
    match error {
      Error::Blocked { status: 412, .. } => self.config.precondition_cooldown,
      Error::Blocked { .. } => self.config.blocked_cooldown,
      _ => self.config.transport_pause,
    }
  }

  async fn request(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<Value, Error> {
    let url = format!("{}{path}", self.config.base_url);

    let attempts = self.config.retries.max(1);

    let mut attempt = 0;

    loop {
      attempt += 1;

      let delay = Self::jitter(self.config.throttle);

      if !delay.is_zero() {
        tokio::time::sleep(delay).await;
      }

      let outcome = match self.client.get(&url).query(query).send().await {
        Ok(response) => {
          let status = response.status();

          match response.bytes().await {
            Ok(body) => Self::classify(status, &body),
            Err(error) => Err(error.into()),
          }
        }
        Err(error) => Err(error.into()),
      };

      let error = match outcome {
        Ok(data) => {
          debug!(%url, attempt, "request succeeded");
          return Ok(data);
        }
        Err(error) => error,
      };

      if !error.is_retryable() || attempt >= attempts {
        warn!(%url, attempt, %error, "request failed, giving up");
        return Err(error);
      }

      let pause = self.pause_after(&error);

      warn!(
        %url,
        attempt,
        attempts,
        %error,
        ?pause,
        "request failed, retrying"
      );

      tokio::time::sleep(pause).await;
    }
  }
}

#[async_trait]
impl CommentSource for Client {
  async fn fetch_page(
    &self,
    oid: u64,
    next: u64,
    sort: SortMode,
  ) -> Result<Page, Error> {
    let mut query = vec![
      ("type", "1".to_string()),
      ("oid", oid.to_string()),
      ("next", next.to_string()),
      ("mode", sort.api_code().to_string()),
      ("ps", Self::PAGE_SIZE.to_string()),
    ];

    if let Some(csrf) = self.config.csrf_token() {
      query.push(("csrf", csrf.to_string()));
    }

    let data = self.request(Self::MAIN_URL, &query).await?;

    let page = if data.is_null() {
      MainPage::default()
    } else {
      MainPage::deserialize(&data)?
    };

    Ok(Page {
      comments: Self::decode_replies(page.replies),
      next: if page.cursor.is_end {
        0
      } else {
        page.cursor.next
      },
    })
  }

  async fn fetch_replies(
    &self,
    oid: u64,
    root: u64,
  ) -> Result<Vec<Comment>, Error> {
    let query = [
      ("type", "1".to_string()),
      ("oid", oid.to_string()),
      ("root", root.to_string()),
      ("ps", Self::PAGE_SIZE.to_string()),
      ("pn", "1".to_string()),
    ];

    let data = self.request(Self::REPLY_URL, &query).await?;

    let page = if data.is_null() {
      ReplyPage::default()
    } else {
      ReplyPage::deserialize(&data)?
    };

    Ok(Self::decode_replies(page.replies))
  }

  async fn resolve_video(&self, bvid: &str) -> Result<VideoInfo, Error> {
    let data = self
      .request(Self::VIDEO_URL, &[("bvid", bvid.to_string())])
      .await
      .map_err(|error| Error::NotFound {
        bvid: bvid.to_string(),
        reason: match error {
          Error::Api { message, .. } if !message.is_empty() => message,
          other => other.to_string(),
        },
      })?;

    Ok(VideoInfo::deserialize(&data)?)
  }
}
