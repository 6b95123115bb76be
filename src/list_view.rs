pub(crate) struct ListView<T> {
  items: Vec<T>,
  offset: usize,
  selected: usize,
}

impl<T> Default for ListView<T> {
  fn default() -> Self {
    Self {
      items: Vec::new(),
      offset: 0,
      selected: 0,
    }
  }
}

impl<T> ListView<T> {
  pub(crate) fn clear(&mut self) {
    *self = Self::default();
  }

  pub(crate) fn extend<I>(&mut self, items: I)
  where
    I: IntoIterator<Item = T>,
  {
    self.items.extend(items);
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub(crate) fn items(&self) -> &[T] {
    &self.items
  }

  pub(crate) fn len(&self) -> usize {
    self.items.len()
  }

  pub(crate) fn move_by(&mut self, delta: isize) {
    let current = self.selected_index().unwrap_or(0);

    self.set_selected(current.saturating_add_signed(delta));
  }

  pub(crate) fn offset(&self) -> usize {
    let selected = self.selected_index().unwrap_or(0);

    if self.items.is_empty() {
      0
    } else {
      self.offset.min(selected)
    }
  }

  /// Swaps in a new item list, keeping the selection where it was when
  /// possible.
  pub(crate) fn replace(&mut self, items: Vec<T>) {
    self.items = items;
    self.set_selected(self.selected);
    self.set_offset(self.offset);
  }

  pub(crate) fn selected_index(&self) -> Option<usize> {
    if self.items.is_empty() {
      None
    } else {
      Some(self.selected.min(self.items.len().saturating_sub(1)))
    }
  }

  pub(crate) fn selected_item(&self) -> Option<&T> {
    self
      .selected_index()
      .and_then(|index| self.items.get(index))
  }

  pub(crate) fn set_offset(&mut self, offset: usize) {
    if self.items.is_empty() {
      self.offset = 0;
    } else {
      let max_offset = self.items.len().saturating_sub(1);
      self.offset = offset.min(max_offset);
    }
  }

  pub(crate) fn set_selected(&mut self, index: usize) {
    if self.items.is_empty() {
      self.selected = 0;
    } else {
      self.selected = index.min(self.items.len().saturating_sub(1));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn selected_index_is_none_when_empty() {
    let view = ListView::<i32>::default();
    assert_eq!(view.selected_index(), None);
    assert!(view.selected_item().is_none());
  }

  #[test]
  fn selection_and_offset_are_clamped_to_bounds() {
    let mut view = ListView {
      items: vec![1, 2, 3],
      ..ListView::default()
    };

    view.set_selected(10);
    assert_eq!(view.selected_index(), Some(2));

    view.set_offset(10);
    assert_eq!(view.offset(), 2);
  }

  #[test]
  fn extend_keeps_selection() {
    let mut view = ListView::default();
    view.extend(["a", "b"]);
    view.set_selected(1);

    view.extend(["c", "d"]);

    assert_eq!(view.len(), 4);
    assert_eq!(view.selected_item(), Some(&"b"));
  }

  #[test]
  fn move_by_saturates_at_both_ends() {
    let mut view = ListView::default();
    view.extend([10, 20, 30]);

    view.move_by(-5);
    assert_eq!(view.selected_item(), Some(&10));

    view.move_by(2);
    assert_eq!(view.selected_item(), Some(&30));

    view.move_by(7);
    assert_eq!(view.selected_item(), Some(&30));
  }

  #[test]
  fn replace_clamps_previous_selection() {
    let mut view = ListView::default();
    view.extend([1, 2, 3, 4]);
    view.set_selected(3);

    view.replace(vec![7, 8]);
    assert_eq!(view.selected_item(), Some(&8));

    view.clear();
    assert!(view.is_empty());
    assert_eq!(view.offset(), 0);
  }
}
