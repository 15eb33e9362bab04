//! Optimistic list edits
//!
//! UI-side helper for the apply/confirm/revert cycle: take a snapshot, apply
//! the local edit immediately, then either confirm once the write lands or
//! revert to the snapshot when it fails. The service layer never reads this
//! state; it exists purely so a view can stay responsive while a store call
//! is in flight.

/// A list with at most one in-flight optimistic edit
#[derive(Debug, Clone, Default)]
pub struct OptimisticList<T: Clone> {
    items: Vec<T>,
    snapshot: Option<Vec<T>>,
}

impl<T: Clone> OptimisticList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            snapshot: None,
        }
    }

    /// The current view, optimistic edit included
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Is an edit awaiting confirmation?
    pub fn pending(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Snapshot the current state and apply an edit on top of it. A second
    /// apply before confirm/revert keeps the original snapshot, so a revert
    /// still restores the last confirmed state.
    pub fn apply(&mut self, edit: impl FnOnce(&mut Vec<T>)) {
        if self.snapshot.is_none() {
            self.snapshot = Some(self.items.clone());
        }
        edit(&mut self.items);
    }

    /// The write landed; drop the snapshot
    pub fn confirm(&mut self) {
        self.snapshot = None;
    }

    /// The write failed; restore the snapshot
    pub fn revert(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.items = snapshot;
        }
    }

    /// Replace the whole list with a fresh authoritative snapshot (e.g. a
    /// live-query delivery), discarding any pending edit
    pub fn reconcile(&mut self, items: Vec<T>) {
        self.items = items;
        self.snapshot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_then_confirm_keeps_edit() {
        let mut list = OptimisticList::new(vec![1, 2, 3]);
        list.apply(|items| items.push(4));
        assert!(list.pending());
        assert_eq!(list.items(), &[1, 2, 3, 4]);

        list.confirm();
        assert!(!list.pending());
        assert_eq!(list.items(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_apply_then_revert_restores_snapshot() {
        let mut list = OptimisticList::new(vec![1, 2, 3]);
        list.apply(|items| items.retain(|&n| n != 2));
        assert_eq!(list.items(), &[1, 3]);

        list.revert();
        assert!(!list.pending());
        assert_eq!(list.items(), &[1, 2, 3]);
    }

    #[test]
    fn test_second_apply_keeps_original_snapshot() {
        let mut list = OptimisticList::new(vec![1]);
        list.apply(|items| items.push(2));
        list.apply(|items| items.push(3));
        assert_eq!(list.items(), &[1, 2, 3]);

        list.revert();
        assert_eq!(list.items(), &[1]);
    }

    #[test]
    fn test_revert_without_pending_edit_is_noop() {
        let mut list = OptimisticList::new(vec![1, 2]);
        list.revert();
        assert_eq!(list.items(), &[1, 2]);
    }

    #[test]
    fn test_reconcile_discards_pending_edit() {
        let mut list = OptimisticList::new(vec![1]);
        list.apply(|items| items.push(2));

        list.reconcile(vec![5, 6]);
        assert!(!list.pending());
        assert_eq!(list.items(), &[5, 6]);
    }
}
