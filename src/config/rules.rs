//! Immutable editing of rule lists.
//!
//! A settings editor never mutates a rule list in place: each operation
//! returns a new vector, and the caller swaps it into a new `ReaderConfig`
//! which is then recompiled.  Out-of-range positions are clamped (insert,
//! move) or ignored (remove, replace).

/// Insert `item` at `at`, clamped to the end of the list.
pub fn insert<T: Clone>(items: &[T], at: usize, item: T) -> Vec<T> {
    let at = at.min(items.len());
    let mut out = Vec::with_capacity(items.len() + 1);
    out.extend_from_slice(&items[..at]);
    out.push(item);
    out.extend_from_slice(&items[at..]);
    out
}

/// Remove the item at `at`; an out-of-range index returns an unchanged copy.
pub fn remove<T: Clone>(items: &[T], at: usize) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != at)
        .map(|(_, item)| item.clone())
        .collect()
}

/// Move the item at `from` so it ends up at index `to` (clamped).
pub fn move_to<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let Some(item) = items.get(from) else {
        return items.to_vec();
    };
    let rest = remove(items, from);
    insert(&rest, to, item.clone())
}

/// Replace the item at `at`; an out-of-range index returns an unchanged copy.
pub fn replace<T: Clone>(items: &[T], at: usize, item: T) -> Vec<T> {
    let mut out = items.to_vec();
    if let Some(slot) = out.get_mut(at) {
        *slot = item;
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditRuleConfig;

    #[test]
    fn insert_clamps_position() {
        assert_eq!(insert(&[1, 2], 1, 9), vec![1, 9, 2]);
        assert_eq!(insert(&[1, 2], 10, 9), vec![1, 2, 9]);
        assert_eq!(insert(&[] as &[i32], 0, 9), vec![9]);
    }

    #[test]
    fn remove_ignores_out_of_range() {
        assert_eq!(remove(&[1, 2, 3], 1), vec![1, 3]);
        assert_eq!(remove(&[1, 2, 3], 3), vec![1, 2, 3]);
    }

    #[test]
    fn move_forward_and_back() {
        assert_eq!(move_to(&[1, 2, 3, 4], 0, 2), vec![2, 3, 1, 4]);
        assert_eq!(move_to(&[1, 2, 3, 4], 3, 0), vec![4, 1, 2, 3]);
        assert_eq!(move_to(&[1, 2, 3], 0, 99), vec![2, 3, 1]);
        assert_eq!(move_to(&[1, 2, 3], 7, 0), vec![1, 2, 3]);
    }

    #[test]
    fn replace_keeps_original_untouched() {
        let original = vec![
            EditRuleConfig::new("a", "1"),
            EditRuleConfig::new("b", "2"),
        ];
        let edited = replace(&original, 1, EditRuleConfig::new("c", "3"));

        assert_eq!(original[1].pattern, "b");
        assert_eq!(edited[1].pattern, "c");
        assert_eq!(replace(&original, 5, EditRuleConfig::new("x", "")), original);
    }
}
