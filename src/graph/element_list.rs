//! Doubly-linked list of element ids over fixed-capacity arrays
//!
//! Used to hold the elements of a keyed type whose primary key has not been
//! checked since they were added or modified.

use super::element_store::ElementStore;

const NONE: u32 = u32::MAX;

#[derive(Debug, Clone)]
pub struct ElementList {
    next: Vec<u32>,
    prev: Vec<u32>,
    present: Vec<bool>,
    first: u32,
    last: u32,
    size: usize,
}

impl ElementList {
    pub fn new(capacity: usize) -> Self {
        ElementList {
            next: vec![NONE; capacity],
            prev: vec![NONE; capacity],
            present: vec![false; capacity],
            first: NONE,
            last: NONE,
            size: 0,
        }
    }

    /// A list holding every live element of `store`, in position order.
    pub fn from_store(store: &ElementStore) -> Self {
        let mut list = ElementList::new(store.capacity());
        for &id in store.live() {
            list.add_to_back(id);
        }
        list
    }

    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity > self.next.len() {
            self.next.resize(capacity, NONE);
            self.prev.resize(capacity, NONE);
            self.present.resize(capacity, false);
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn first(&self) -> Option<u32> {
        (self.first != NONE).then_some(self.first)
    }

    pub fn contains(&self, element: u32) -> bool {
        self.present.get(element as usize).copied().unwrap_or(false)
    }

    /// Appends `element`. Returns false if it was already in the list.
    pub fn add_to_back(&mut self, element: u32) -> bool {
        self.ensure_capacity(element as usize + 1);
        let e = element as usize;
        if self.present[e] {
            return false;
        }
        self.present[e] = true;
        self.prev[e] = self.last;
        self.next[e] = NONE;
        if self.last == NONE {
            self.first = element;
        } else {
            self.next[self.last as usize] = element;
        }
        self.last = element;
        self.size += 1;
        true
    }

    /// Unlinks `element`. Returns false if it was not in the list.
    pub fn remove(&mut self, element: u32) -> bool {
        if !self.contains(element) {
            return false;
        }
        let e = element as usize;
        let (p, n) = (self.prev[e], self.next[e]);
        if p == NONE {
            self.first = n;
        } else {
            self.next[p as usize] = n;
        }
        if n == NONE {
            self.last = p;
        } else {
            self.prev[n as usize] = p;
        }
        self.present[e] = false;
        self.prev[e] = NONE;
        self.next[e] = NONE;
        self.size -= 1;
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        let mut current = self.first;
        std::iter::from_fn(move || {
            if current == NONE {
                return None;
            }
            let element = current;
            current = self.next[element as usize];
            Some(element)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut list = ElementList::new(8);
        assert!(list.is_empty());
        assert!(list.add_to_back(3));
        assert!(list.add_to_back(5));
        assert!(list.add_to_back(1));
        assert!(!list.add_to_back(5));
        assert_eq!(list.len(), 3);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![3, 5, 1]);

        assert!(list.remove(5));
        assert!(!list.remove(5));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![3, 1]);

        assert!(list.remove(3));
        assert_eq!(list.first(), Some(1));
        assert!(list.remove(1));
        assert_eq!(list.first(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_grows_past_initial_capacity() {
        let mut list = ElementList::new(2);
        assert!(list.add_to_back(10));
        assert!(list.contains(10));
        assert!(!list.contains(100));
    }

    #[test]
    fn test_from_store() {
        let mut store = ElementStore::new(8);
        for _ in 0..4 {
            store.add();
        }
        store.remove(1);
        let list = ElementList::from_store(&store);
        assert_eq!(list.len(), 3);
        assert!(list.contains(0));
        assert!(!list.contains(1));
        assert!(list.contains(3));
    }
}
