//! Undo/redo stacks for one step's annotation list
//!
//! Each entry is a full snapshot of the list taken just before a committed
//! change. Snapshots are owned copies, never shared with the live list.

use crate::domain::Annotation;

#[derive(Clone, Debug, Default)]
pub struct History {
    past: Vec<Vec<Annotation>>,
    future: Vec<Vec<Annotation>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the state before a change. Any redo entries are dropped.
    pub fn record(&mut self, snapshot: Vec<Annotation>) {
        self.past.push(snapshot);
        self.future.clear();
    }

    /// Restore the previous snapshot into `list`. Returns false when there
    /// is nothing to undo.
    pub fn undo(&mut self, list: &mut Vec<Annotation>) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        self.future.push(std::mem::replace(list, previous));
        true
    }

    /// Re-apply the most recently undone snapshot
    pub fn redo(&mut self, list: &mut Vec<Annotation>) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        self.past.push(std::mem::replace(list, next));
        true
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnnotationKind, NumberBadge, PctPoint};
    use proptest::prelude::*;

    fn badge(n: u8) -> Annotation {
        Annotation::new(AnnotationKind::Number(NumberBadge {
            x: f32::from(n),
            y: 10.0,
            text: n.to_string(),
            color: None,
        }))
    }

    #[test]
    fn test_stack_lengths_move_by_one() {
        let mut history = History::new();
        let mut list = vec![];
        history.record(list.clone());
        list.push(badge(1));
        history.record(list.clone());
        list.push(badge(2));

        assert!(history.undo(&mut list));
        assert_eq!((history.past_len(), history.future_len()), (1, 1));
        assert_eq!(list.len(), 1);
        assert!(history.redo(&mut list));
        assert_eq!((history.past_len(), history.future_len()), (2, 0));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_record_clears_future() {
        let mut history = History::new();
        let mut list = vec![badge(1)];
        history.record(vec![]);
        history.undo(&mut list);
        assert!(history.can_redo());
        history.record(list.clone());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = History::new();
        let mut list = vec![badge(1)];
        assert!(!history.undo(&mut list));
        assert!(!history.redo(&mut list));
        assert_eq!(list.len(), 1);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Create(u8),
        Move(usize, f32, f32),
        Delete(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<u8>().prop_map(Op::Create),
            (any::<usize>(), 0.0f32..100.0, 0.0f32..100.0).prop_map(|(i, x, y)| Op::Move(i, x, y)),
            any::<usize>().prop_map(Op::Delete),
        ]
    }

    fn apply(list: &mut Vec<Annotation>, op: &Op) {
        match *op {
            Op::Create(n) => list.push(badge(n)),
            Op::Move(i, x, y) if !list.is_empty() => {
                let len = list.len();
                list[i % len].move_handle_to(PctPoint::new(x, y));
            }
            Op::Delete(i) if !list.is_empty() => {
                let len = list.len();
                list.remove(i % len);
            }
            _ => {}
        }
    }

    proptest! {
        #[test]
        fn prop_undo_then_redo_restores_list(ops in prop::collection::vec(op(), 1..20)) {
            let mut history = History::new();
            let mut list = Vec::new();
            for op in &ops {
                history.record(list.clone());
                apply(&mut list, op);
            }
            let before = list.clone();
            let past = history.past_len();

            prop_assert!(history.undo(&mut list));
            prop_assert_eq!(history.past_len(), past - 1);
            prop_assert_eq!(history.future_len(), 1);
            prop_assert!(history.redo(&mut list));
            prop_assert_eq!(&list, &before);
            prop_assert_eq!(history.past_len(), past);
        }
    }
}
