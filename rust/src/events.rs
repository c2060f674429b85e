//! Change notifications for [`TreeVec`](crate::TreeVec).
//!
//! Listeners are plain callbacks keyed by a numeric id. They run after the
//! mutation has completed, in registration order.

use std::collections::BTreeMap;
use std::fmt;

/// A completed mutation of a `TreeVec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    /// `count` elements now start at `index`.
    Inserted { index: usize, count: usize },
    /// `count` elements that started at `index` are gone.
    Removed { index: usize, count: usize },
    /// The element at `index` was replaced.
    Updated { index: usize },
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&Change)>;

/// Registered listeners.
pub(crate) struct Listeners {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
}

impl Listeners {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 1,
            listeners: BTreeMap::new(),
        }
    }

    pub(crate) fn add<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&Change) + 'static,
    {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.listeners.insert(id, Box::new(listener));
        ListenerId(id)
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id.0).is_some()
    }

    pub(crate) fn emit(&mut self, change: Change) {
        for listener in self.listeners.values_mut() {
            listener(&change);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for Listeners {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_every_listener_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();

        let first = Rc::clone(&log);
        listeners.add(move |c| first.borrow_mut().push((1, *c)));
        let second = Rc::clone(&log);
        listeners.add(move |c| second.borrow_mut().push((2, *c)));

        listeners.emit(Change::Updated { index: 4 });
        assert_eq!(
            *log.borrow(),
            vec![(1, Change::Updated { index: 4 }), (2, Change::Updated { index: 4 })]
        );
    }

    #[test]
    fn test_remove_listener() {
        let hits = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::new();
        let counter = Rc::clone(&hits);
        let id = listeners.add(move |_| *counter.borrow_mut() += 1);

        listeners.emit(Change::Removed { index: 0, count: 1 });
        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        listeners.emit(Change::Removed { index: 0, count: 1 });

        assert_eq!(*hits.borrow(), 1);
        assert_eq!(listeners.len(), 0);
    }
}
