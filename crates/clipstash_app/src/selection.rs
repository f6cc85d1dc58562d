//! Keyboard selection over the flattened history list.

/// Selected row index. Always re-derived from the list length it is applied to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    index: usize,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Select `index` outright, e.g. to re-target a row after a failed copy.
    pub fn select(&mut self, index: usize) {
        self.index = index;
    }

    /// Move down, wrapping to the first row. No-op on an empty list.
    pub fn move_down(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.index = if self.index + 1 >= len { 0 } else { self.index + 1 };
    }

    /// Move up, wrapping to the last row. No-op on an empty list.
    pub fn move_up(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.index = if self.index == 0 || self.index >= len {
            len - 1
        } else {
            self.index - 1
        };
    }

    /// Adjust after one row was removed from a list of `old_len` rows.
    ///
    /// When the index falls off the shortened list it moves to
    /// `max(0, old_len - 2)`; otherwise it stays put so the row that slid into
    /// place becomes the selection.
    pub fn after_delete(&mut self, old_len: usize) {
        let new_last = old_len.saturating_sub(2);
        if self.index >= new_last {
            self.index = new_last;
        }
    }

    /// Keep the index inside a list that was replaced or refreshed.
    pub fn clamp_to(&mut self, len: usize) {
        if self.index >= len {
            self.index = len.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Selection;

    #[test]
    fn navigation_wraps_both_ways() {
        let mut selection = Selection::new();
        selection.move_up(3);
        assert_eq!(selection.index(), 2);
        selection.move_down(3);
        assert_eq!(selection.index(), 0);
        selection.move_down(3);
        assert_eq!(selection.index(), 1);
    }

    #[test]
    fn navigation_on_empty_list_is_noop() {
        let mut selection = Selection::new();
        selection.move_down(0);
        selection.move_up(0);
        assert_eq!(selection.index(), 0);
    }

    #[test]
    fn deleting_last_row_selects_new_last() {
        for old_len in [1usize, 2, 5] {
            let mut selection = Selection::new();
            selection.select(old_len - 1);
            selection.after_delete(old_len);
            assert_eq!(selection.index(), old_len.saturating_sub(2), "len {}", old_len);
        }
    }

    #[test]
    fn deleting_other_row_keeps_index() {
        let mut selection = Selection::new();
        selection.select(1);
        selection.after_delete(5);
        assert_eq!(selection.index(), 1);
    }

    #[test]
    fn clamp_pulls_index_into_shorter_list() {
        let mut selection = Selection::new();
        selection.select(7);
        selection.clamp_to(3);
        assert_eq!(selection.index(), 2);
        selection.clamp_to(0);
        assert_eq!(selection.index(), 0);
    }
}
