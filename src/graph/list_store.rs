//! Category-partitioned adjacency lists in a single flat array
//!
//! Each owner (a vertex, a link, an element type) holds a block of the flat
//! `members` array. Inside a block the members are grouped by category, and
//! `bounds` records where each category bucket starts, followed by the total
//! count, so an owner uses `categories + 1` bound entries.
//!
//! Every member remembers its owner and a packed `(position, category)` entry,
//! which lets `remove_element` run without the caller naming the owner.

use tracing::trace;

pub(crate) const CATEGORY_SHIFT: u32 = 28;
const POSITION_MASK: u32 = (1 << CATEGORY_SHIFT) - 1;
const NONE: u32 = u32::MAX;
const MIN_BLOCK: u32 = 4;

#[inline]
pub(crate) fn pack_entry(position: u32, category: u32) -> u32 {
    position | (category << CATEGORY_SHIFT)
}

#[inline]
pub(crate) fn entry_position(entry: u32) -> u32 {
    entry & POSITION_MASK
}

#[inline]
pub(crate) fn entry_category(entry: u32) -> u32 {
    entry >> CATEGORY_SHIFT
}

#[derive(Debug, Clone)]
pub struct ListStore {
    categories: usize,
    count_length: usize,
    bounds: Vec<u32>,
    block_start: Vec<u32>,
    block_capacity: Vec<u32>,
    members: Vec<u32>,
    garbage: usize,
    element_owner: Vec<u32>,
    element_entry: Vec<u32>,
}

impl ListStore {
    pub fn new(categories: usize, list_capacity: usize, element_capacity: usize) -> Self {
        let count_length = categories + 1;
        ListStore {
            categories,
            count_length,
            bounds: vec![0; list_capacity * count_length],
            block_start: vec![0; list_capacity],
            block_capacity: vec![0; list_capacity],
            members: Vec::new(),
            garbage: 0,
            element_owner: vec![NONE; element_capacity],
            element_entry: vec![0; element_capacity],
        }
    }

    pub fn categories(&self) -> usize {
        self.categories
    }

    pub fn expand_list_capacity(&mut self, capacity: usize) {
        if capacity > self.block_start.len() {
            self.bounds.resize(capacity * self.count_length, 0);
            self.block_start.resize(capacity, 0);
            self.block_capacity.resize(capacity, 0);
        }
    }

    pub fn expand_element_capacity(&mut self, capacity: usize) {
        if capacity > self.element_owner.len() {
            self.element_owner.resize(capacity, NONE);
            self.element_entry.resize(capacity, 0);
        }
    }

    #[inline]
    fn bound(&self, owner: u32, category: usize) -> u32 {
        self.bounds[owner as usize * self.count_length + category]
    }

    /// Makes room for one more member in `owner`'s block.
    fn reserve(&mut self, owner: u32) {
        let o = owner as usize;
        let total = self.bound(owner, self.categories);
        let capacity = self.block_capacity[o];
        if total < capacity {
            return;
        }

        let new_capacity = (capacity * 2).max(MIN_BLOCK);
        let old_start = self.block_start[o] as usize;
        let new_start = self.members.len();
        self.members.resize(new_start + new_capacity as usize, NONE);
        self.members
            .copy_within(old_start..old_start + total as usize, new_start);
        self.block_start[o] = new_start as u32;
        self.block_capacity[o] = new_capacity;
        self.garbage += capacity as usize;

        if self.garbage > 64 && self.garbage * 2 > self.members.len() {
            self.compact();
        }
    }

    /// Rewrites `members` without the blocks abandoned by relocation.
    fn compact(&mut self) {
        trace!(
            garbage = self.garbage,
            len = self.members.len(),
            "compacting list store"
        );
        let mut members = Vec::with_capacity(self.members.len() - self.garbage);
        for o in 0..self.block_start.len() {
            let capacity = self.block_capacity[o] as usize;
            if capacity == 0 {
                continue;
            }
            let start = self.block_start[o] as usize;
            self.block_start[o] = members.len() as u32;
            members.extend_from_slice(&self.members[start..start + capacity]);
        }
        self.members = members;
        self.garbage = 0;
    }

    #[inline]
    fn place(&mut self, owner: u32, position: u32, category: u32, element: u32) {
        let start = self.block_start[owner as usize] as usize;
        self.members[start + position as usize] = element;
        self.element_entry[element as usize] = pack_entry(position, category);
    }

    /// Adds `element` to `owner` under `category`.
    ///
    /// Buckets after `category` each rotate their first member to their end,
    /// so at most one member per later bucket moves.
    pub fn add_element(&mut self, owner: u32, element: u32, category: usize) {
        self.reserve(owner);
        let base = owner as usize * self.count_length;
        let start = self.block_start[owner as usize] as usize;

        let mut hole = self.bounds[base + self.categories];
        for k in (category + 1..self.categories).rev() {
            let first = self.bounds[base + k];
            if first != hole {
                let moved = self.members[start + first as usize];
                self.place(owner, hole, k as u32, moved);
            }
            hole = first;
        }
        self.place(owner, hole, category as u32, element);
        for k in category + 1..self.count_length {
            self.bounds[base + k] += 1;
        }
        self.element_owner[element as usize] = owner;
    }

    /// Removes `element` from whichever owner and category currently hold it.
    pub fn remove_element(&mut self, element: u32) {
        let owner = self.element_owner[element as usize];
        let entry = self.element_entry[element as usize];
        let category = entry_category(entry) as usize;
        let base = owner as usize * self.count_length;
        let start = self.block_start[owner as usize] as usize;

        let mut hole = entry_position(entry);
        for k in category..self.categories {
            let last = self.bounds[base + k + 1] - 1;
            if last != hole {
                let moved = self.members[start + last as usize];
                self.place(owner, hole, k as u32, moved);
            }
            hole = last;
        }
        for k in category + 1..self.count_length {
            self.bounds[base + k] -= 1;
        }
        self.element_owner[element as usize] = NONE;
    }

    pub fn contains(&self, element: u32) -> bool {
        self.element_owner
            .get(element as usize)
            .is_some_and(|&owner| owner != NONE)
    }

    pub fn element_count(&self, owner: u32) -> usize {
        self.bound(owner, self.categories) as usize
    }

    pub fn element_count_in(&self, owner: u32, category: usize) -> usize {
        (self.bound(owner, category + 1) - self.bound(owner, category)) as usize
    }

    pub fn element(&self, owner: u32, position: usize) -> u32 {
        self.members[self.block_start[owner as usize] as usize + position]
    }

    pub fn element_in(&self, owner: u32, category: usize, position: usize) -> u32 {
        let offset = self.bound(owner, category) as usize + position;
        self.members[self.block_start[owner as usize] as usize + offset]
    }

    /// The owner currently holding `element`.
    pub fn element_list(&self, element: u32) -> u32 {
        self.element_owner[element as usize]
    }

    pub fn element_category(&self, element: u32) -> usize {
        entry_category(self.element_entry[element as usize]) as usize
    }

    pub fn element_position(&self, element: u32) -> usize {
        entry_position(self.element_entry[element as usize]) as usize
    }

    /// Members of `owner` in bucket order.
    pub fn elements(&self, owner: u32) -> &[u32] {
        let start = self.block_start[owner as usize] as usize;
        &self.members[start..start + self.element_count(owner)]
    }
}
