//! Id allocation for one element type
//!
//! Every id in `[0, capacity)` lives somewhere in `position2id`. The first
//! `count` slots form the live partition; the rest are free ids in the order
//! they will be handed out. `id2position` is the inverse permutation with
//! `FREE_BIT` set on ids outside the live partition.

/// Marks an `id2position` entry whose id is not currently live.
pub(crate) const FREE_BIT: u32 = 0x8000_0000;
const POSITION_MASK: u32 = !FREE_BIT;

#[inline]
pub(crate) fn encode_slot(position: u32, free: bool) -> u32 {
    if free {
        position | FREE_BIT
    } else {
        position
    }
}

#[inline]
pub(crate) fn slot_position(slot: u32) -> u32 {
    slot & POSITION_MASK
}

#[inline]
pub(crate) fn slot_is_free(slot: u32) -> bool {
    slot & FREE_BIT != 0
}

/// Rounds a requested capacity up to the next power of two, minimum 2.
pub fn power_of_two(capacity: usize) -> usize {
    capacity.max(2).next_power_of_two()
}

#[derive(Debug, Clone)]
pub struct ElementStore {
    position2id: Vec<u32>,
    id2position: Vec<u32>,
    uids: Vec<i64>,
    count: usize,
}

impl ElementStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = power_of_two(capacity);
        let mut store = ElementStore {
            position2id: Vec::with_capacity(capacity),
            id2position: Vec::with_capacity(capacity),
            uids: Vec::with_capacity(capacity),
            count: 0,
        };
        store.grow_to(capacity);
        store
    }

    fn grow_to(&mut self, capacity: usize) {
        let old = self.position2id.len();
        for id in old..capacity {
            self.position2id.push(id as u32);
            self.id2position.push(encode_slot(id as u32, true));
        }
        self.uids.resize(capacity, 0);
    }

    /// Grows the store so that it can hold at least `capacity` ids.
    ///
    /// Returns true if the backing arrays were reallocated.
    pub fn ensure_capacity(&mut self, capacity: usize) -> bool {
        if capacity <= self.capacity() {
            return false;
        }
        let mut new_capacity = self.capacity().max(2);
        while new_capacity < capacity {
            new_capacity <<= 1;
        }
        self.grow_to(new_capacity);
        true
    }

    pub fn capacity(&self) -> usize {
        self.position2id.len()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Allocates the free id sitting just past the live partition.
    ///
    /// That slot always holds the most recently freed id, so a remove
    /// followed by an add hands the same id back. The caller must have
    /// ensured capacity for one more element.
    pub fn add(&mut self) -> u32 {
        let id = self.position2id[self.count];
        self.id2position[id as usize] = encode_slot(self.count as u32, false);
        self.count += 1;
        id
    }

    /// Claims a specific free id. The caller must have checked that `id` is
    /// within capacity and not live.
    pub fn add_id(&mut self, id: u32) {
        let position = slot_position(self.id2position[id as usize]) as usize;
        let boundary = self.count;
        if position != boundary {
            let displaced = self.position2id[boundary];
            self.position2id[position] = displaced;
            self.id2position[displaced as usize] = encode_slot(position as u32, true);
            self.position2id[boundary] = id;
        }
        self.id2position[id as usize] = encode_slot(boundary as u32, false);
        self.count += 1;
    }

    /// Frees a live id by swapping the last live element into its position.
    pub fn remove(&mut self, id: u32) {
        let position = self.id2position[id as usize] as usize;
        let last = self.count - 1;
        let last_id = self.position2id[last];
        self.position2id[position] = last_id;
        self.id2position[last_id as usize] = encode_slot(position as u32, false);
        self.position2id[last] = id;
        self.id2position[id as usize] = encode_slot(last as u32, true);
        self.count -= 1;
    }

    pub fn element_exists(&self, id: u32) -> bool {
        self.id2position
            .get(id as usize)
            .is_some_and(|&slot| !slot_is_free(slot))
    }

    pub fn element(&self, position: usize) -> u32 {
        self.position2id[position]
    }

    pub fn element_position(&self, id: u32) -> usize {
        slot_position(self.id2position[id as usize]) as usize
    }

    pub fn uid(&self, id: u32) -> i64 {
        self.uids[id as usize]
    }

    pub fn set_uid(&mut self, id: u32, uid: i64) {
        self.uids[id as usize] = uid;
    }

    /// Live ids in position order.
    pub fn live(&self) -> &[u32] {
        &self.position2id[..self.count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_encoding() {
        let slot = encode_slot(17, true);
        assert!(slot_is_free(slot));
        assert_eq!(slot_position(slot), 17);

        let slot = encode_slot(17, false);
        assert!(!slot_is_free(slot));
        assert_eq!(slot_position(slot), 17);

        let max = encode_slot(POSITION_MASK, true);
        assert_eq!(slot_position(max), POSITION_MASK);
    }

    #[test]
    fn test_power_of_two() {
        assert_eq!(power_of_two(0), 2);
        assert_eq!(power_of_two(2), 2);
        assert_eq!(power_of_two(3), 4);
        assert_eq!(power_of_two(64), 64);
        assert_eq!(power_of_two(65), 128);
    }

    #[test]
    fn test_sequential_allocation() {
        let mut store = ElementStore::new(8);
        for expected in 0..5 {
            assert_eq!(store.add(), expected);
        }
        assert_eq!(store.count(), 5);
        assert!(store.element_exists(4));
        assert!(!store.element_exists(5));
        assert!(!store.element_exists(1000));
    }

    #[test]
    fn test_remove_swaps_last_into_hole() {
        let mut store = ElementStore::new(8);
        for _ in 0..5 {
            store.add();
        }
        store.remove(store.element(2));
        assert_eq!(store.count(), 4);
        assert_eq!(store.element(2), 4);
        assert_eq!(store.element_position(4), 2);
        for p in 0..store.count() {
            assert_eq!(store.element_position(store.element(p)), p);
        }
    }

    #[test]
    fn test_recycles_most_recently_freed() {
        let mut store = ElementStore::new(8);
        for _ in 0..5 {
            store.add();
        }
        let freed = store.element(2);
        store.remove(freed);
        assert_eq!(store.add(), freed);
    }

    #[test]
    fn test_add_specific_id() {
        let mut store = ElementStore::new(8);
        store.add_id(6);
        assert!(store.element_exists(6));
        assert_eq!(store.count(), 1);
        assert_eq!(store.element(0), 6);
        // id 0 was displaced to where 6 used to be and is still free
        assert!(!store.element_exists(0));
        assert_eq!(store.add(), 1);
        assert_eq!(store.add(), 2);
        let mut seen: Vec<u32> = store.live().to_vec();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 6]);
    }

    #[test]
    fn test_ensure_capacity_doubles() {
        let mut store = ElementStore::new(4);
        assert!(!store.ensure_capacity(4));
        assert!(store.ensure_capacity(5));
        assert_eq!(store.capacity(), 8);
        assert!(store.ensure_capacity(33));
        assert_eq!(store.capacity(), 64);
        for _ in 0..64 {
            store.add();
        }
        assert_eq!(store.count(), 64);
    }

    #[test]
    fn test_uid_slot() {
        let mut store = ElementStore::new(4);
        let id = store.add();
        store.set_uid(id, 42);
        assert_eq!(store.uid(id), 42);
    }
}
