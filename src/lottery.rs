use {super::*, rand::seq::IndexedRandom};

pub(crate) const REPORT_FILE: &str = "抽奖结果.txt";

#[derive(Debug)]
pub(crate) struct Draw {
  pub(crate) eligible: usize,
  pub(crate) winners: Vec<ExportedComment>,
}

impl Draw {
  pub(crate) fn report(&self) -> String {
    let rule = "=".repeat(50);
    let separator = "-".repeat(50);

    let mut out = format!(
      "共 {} 条评论符合要求，从中抽取 {} 位获奖者:\n\n{rule}\n\n",
      self.eligible,
      self.winners.len()
    );

    for (index, winner) in self.winners.iter().enumerate() {
      out.push_str(&format!(
        "🎉 第 {} 位获奖者 🎉\n用户名: {}\n评论内容: {}\n点赞数: {} | 评论时间: {}\n{separator}\n\n",
        index + 1,
        winner.author,
        winner.content,
        winner.likes,
        winner.time.format(MINUTE_FORMAT),
      ));
    }

    out
  }
}

/// Draws up to `count` distinct comments whose content has at least
/// `min_length` characters. Every call uses a fresh random draw.
pub(crate) fn draw(
  comments: &[ExportedComment],
  min_length: usize,
  count: usize,
) -> Draw {
  let eligible = comments
    .iter()
    .filter(|comment| comment.content.chars().count() >= min_length)
    .collect::<Vec<_>>();

  let winners = eligible
    .choose_multiple(&mut rand::rng(), count.min(eligible.len()))
    .map(|comment| (*comment).clone())
    .collect::<Vec<_>>();

  info!(
    pool = comments.len(),
    eligible = eligible.len(),
    winners = winners.len(),
    min_length,
    "lottery drawn"
  );

  Draw {
    eligible: eligible.len(),
    winners,
  }
}

#[cfg(test)]
mod tests {
  use {super::*, std::collections::HashSet};

  fn pool() -> Vec<ExportedComment> {
    ["a", "bb", "ccc", "一二三四", "hello world"]
      .iter()
      .enumerate()
      .map(|(index, content)| ExportedComment {
        author: format!("user{index}"),
        content: (*content).to_string(),
        likes: index as u64,
        time: NaiveDateTime::parse_from_str(
          "2024-01-01 00:00",
          MINUTE_FORMAT,
        )
        .unwrap(),
      })
      .collect()
  }

  #[test]
  fn draws_exactly_k_distinct_eligible_comments() {
    let pool = pool();

    for _ in 0..20 {
      let result = draw(&pool, 3, 2);

      assert_eq!(result.eligible, 3);
      assert_eq!(result.winners.len(), 2);

      let authors = result
        .winners
        .iter()
        .map(|winner| winner.author.as_str())
        .collect::<HashSet<_>>();

      assert_eq!(authors.len(), 2);

      for winner in &result.winners {
        assert!(winner.content.chars().count() >= 3);
      }
    }
  }

  #[test]
  fn length_counts_characters() {
    let result = draw(&pool(), 4, 10);

    let mut contents = result
      .winners
      .iter()
      .map(|winner| winner.content.as_str())
      .collect::<Vec<_>>();

    contents.sort_unstable();

    assert_eq!(contents, vec!["hello world", "一二三四"]);
  }

  #[test]
  fn oversized_request_returns_whole_pool() {
    let result = draw(&pool(), 0, 100);

    assert_eq!(result.eligible, 5);
    assert_eq!(result.winners.len(), 5);
  }

  #[test]
  fn empty_filter_yields_empty_draw() {
    let result = draw(&pool(), 50, 3);

    assert_eq!(result.eligible, 0);
    assert!(result.winners.is_empty());
    assert!(draw(&[], 0, 1).winners.is_empty());
  }

  #[test]
  fn report_lists_every_winner() {
    let result = Draw {
      eligible: 5,
      winners: pool().into_iter().take(2).collect(),
    };

    let report = result.report();

    assert!(report.starts_with("共 5 条评论符合要求，从中抽取 2 位获奖者:"));
    assert!(report.contains("第 1 位获奖者"));
    assert!(report.contains("用户名: user1\n评论内容: bb\n"));
    assert!(report.contains("点赞数: 1 | 评论时间: 2024-01-01 00:00"));
  }
}
