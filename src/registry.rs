//! Disposable registry: a bounded FIFO pool for short-lived entries.
//!
//! Scenes throw a lot of one-off animatables at the screen (played cards,
//! sparks, banners) that end up covered and forgotten. The registry keeps
//! only the most recent `capacity` of them; appending past that evicts the
//! oldest.

use std::collections::VecDeque;
use std::fmt;

use log::debug;

/// Called with each entry the registry evicts.
pub type EvictionHook<T> = Box<dyn FnMut(T)>;

pub struct DisposableRegistry<T> {
    entries: VecDeque<T>,
    capacity: usize,
    on_evict: Option<EvictionHook<T>>,
}

impl<T> DisposableRegistry<T> {
    /// A registry holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        DisposableRegistry {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            on_evict: None,
        }
    }

    /// Hand evicted entries to `hook` instead of dropping them.
    pub fn with_eviction_hook(mut self, hook: impl FnMut(T) + 'static) -> Self {
        self.on_evict = Some(Box::new(hook));
        self
    }

    pub fn set_eviction_hook(&mut self, hook: impl FnMut(T) + 'static) {
        self.on_evict = Some(Box::new(hook));
    }

    /// Add `entry` at the back, first evicting the oldest entry if the
    /// registry is full.
    pub fn append(&mut self, entry: T) {
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!("disposable registry full ({}), evicting oldest", self.capacity);
                if let Some(hook) = self.on_evict.as_mut() {
                    hook(evicted);
                }
            }
        }
        self.entries.push_back(entry);
    }

    /// Remove and return the first entry matching `pred`.
    pub fn remove_first(&mut self, pred: impl FnMut(&T) -> bool) -> Option<T> {
        let index = self.entries.iter().position(pred)?;
        self.entries.remove(index)
    }

    pub fn find(&self, pred: impl FnMut(&&T) -> bool) -> Option<&T> {
        self.entries.iter().find(pred)
    }

    pub fn find_mut(&mut self, pred: impl FnMut(&&mut T) -> bool) -> Option<&mut T> {
        self.entries.iter_mut().find(pred)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<'a, T> IntoIterator for &'a DisposableRegistry<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for DisposableRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposableRegistry")
            .field("capacity", &self.capacity)
            .field("entries", &self.entries)
            .field("has_eviction_hook", &self.on_evict.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn sixty_first_entry_evicts_the_first() {
        let mut registry = DisposableRegistry::new(60);
        for i in 0..60 {
            registry.append(i);
        }
        assert_eq!(registry.len(), 60);
        registry.append(60);
        assert_eq!(registry.len(), 60);
        assert!(registry.find(|&&x| x == 0).is_none());
        assert_eq!(registry.iter().next(), Some(&1));
        assert_eq!(registry.iter().last(), Some(&60));
    }

    #[test]
    fn remove_takes_first_match_only() {
        let mut registry = DisposableRegistry::new(4);
        for x in [1, 2, 1] {
            registry.append(x);
        }
        assert_eq!(registry.remove_first(|&x| x == 1), Some(1));
        assert_eq!(registry.iter().copied().collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(registry.remove_first(|&x| x == 9), None);
    }

    #[test]
    fn eviction_hook_receives_evicted_entries() {
        let evicted = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&evicted);
        let mut registry =
            DisposableRegistry::new(2).with_eviction_hook(move |x| sink.borrow_mut().push(x));
        for x in ["a", "b", "c", "d"] {
            registry.append(x);
        }
        assert_eq!(*evicted.borrow(), vec!["a", "b"]);
        assert_eq!(registry.iter().copied().collect::<Vec<_>>(), vec!["c", "d"]);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut registry = DisposableRegistry::new(0);
        registry.append('x');
        registry.append('y');
        assert_eq!(registry.capacity(), 1);
        assert_eq!(registry.iter().copied().collect::<Vec<_>>(), vec!['y']);
    }
}
