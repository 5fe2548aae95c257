//! Bounded navigation history

use super::{ScreenContext, ScreenHandlers, ScreenId};

/// Number of screens remembered for back-navigation
pub const HISTORY_DEPTH: usize = 4;

/// Active screen plus a fixed-depth history of previous screens
///
/// `history[0]` is the most recent entry. Pushing past the depth drops
/// the oldest entry; popping back-fills with `ScreenId(0)`.
pub struct ScreenStack<C: ScreenContext> {
    table: &'static [ScreenHandlers<C>],
    current: ScreenId,
    history: [ScreenId; HISTORY_DEPTH],
}

impl<C: ScreenContext> ScreenStack<C> {
    pub fn new(table: &'static [ScreenHandlers<C>], initial: ScreenId) -> Self {
        Self {
            table,
            current: initial,
            history: [ScreenId(0); HISTORY_DEPTH],
        }
    }

    /// Resolve `id` against the handler table
    pub fn lookup(&self, id: ScreenId) -> Option<ScreenId> {
        if (id.0 as usize) < self.table.len() {
            Some(id)
        } else {
            None
        }
    }

    pub fn table(&self) -> &'static [ScreenHandlers<C>] {
        self.table
    }

    /// Handlers of the active screen
    pub fn active(&self) -> Option<&'static ScreenHandlers<C>> {
        self.table.get(self.current.0 as usize)
    }

    pub fn current(&self) -> ScreenId {
        self.current
    }

    pub fn set_current(&mut self, id: ScreenId) {
        self.current = id;
    }

    pub fn history(&self) -> &[ScreenId; HISTORY_DEPTH] {
        &self.history
    }

    /// Remember the active screen
    pub fn push(&mut self) {
        self.history.copy_within(0..HISTORY_DEPTH - 1, 1);
        self.history[0] = self.current;
    }

    /// Make the most recent entry active again
    pub fn pop(&mut self) {
        self.current = self.history[0];
        self.forget();
    }

    /// Drop the most recent entry without navigating
    pub fn forget(&mut self) {
        self.history.copy_within(1..HISTORY_DEPTH, 0);
        self.history[HISTORY_DEPTH - 1] = ScreenId(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::tests::{Recorder, TABLE};

    fn stack() -> ScreenStack<Recorder> {
        ScreenStack::new(&TABLE, ScreenId(0))
    }

    #[test]
    fn test_lookup() {
        let s = stack();
        assert_eq!(s.lookup(ScreenId(2)), Some(ScreenId(2)));
        assert_eq!(s.lookup(ScreenId(3)), None);
        assert_eq!(s.lookup(ScreenId(0xFF)), None);
    }

    #[test]
    fn test_push_beyond_depth_drops_oldest() {
        let mut s = stack();
        for id in 1..=5 {
            s.set_current(ScreenId(id));
            s.push();
        }
        assert_eq!(
            s.history(),
            &[ScreenId(5), ScreenId(4), ScreenId(3), ScreenId(2)]
        );
        assert!(!s.history().contains(&ScreenId(1)));

        let mut popped = std::vec::Vec::new();
        for _ in 0..5 {
            s.pop();
            popped.push(s.current().0);
        }
        assert_eq!(popped, [5, 4, 3, 2, 0]);
    }

    #[test]
    fn test_forget_keeps_current() {
        let mut s = stack();
        s.set_current(ScreenId(1));
        s.push();
        s.set_current(ScreenId(2));
        s.push();
        s.forget();
        assert_eq!(s.current(), ScreenId(2));
        assert_eq!(s.history()[0], ScreenId(1));
        assert_eq!(s.history()[1], ScreenId(0));
    }

    #[test]
    fn test_active_handlers_follow_current() {
        let mut s = stack();
        assert!(s.active().is_some());
        s.set_current(ScreenId(9));
        assert!(s.active().is_none());
    }
}
