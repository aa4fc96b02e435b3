//! Primary key values and the hash set that enforces their uniqueness

use super::types::GraphElementType;
use super::value::AttributeValue;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Multiplier folding successive key attribute hashes together.
pub(crate) const KEY_HASH_MULTIPLIER: u64 = 34_829_039;
/// Weight of the directed flag in a transaction key hash.
pub(crate) const DIRECTION_HASH_MULTIPLIER: u64 = 113;

/// The primary key value of one element.
///
/// Transaction keys also carry the keys of both endpoint vertices and
/// whether the transaction is undirected, so that equal attribute values
/// on different vertex pairs are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphKey {
    pub element_type: GraphElementType,
    pub values: Vec<AttributeValue>,
    pub source: Option<Box<GraphKey>>,
    pub destination: Option<Box<GraphKey>>,
    pub undirected: bool,
}

impl GraphKey {
    pub fn element(element_type: GraphElementType, values: Vec<AttributeValue>) -> Self {
        Self {
            element_type,
            values,
            source: None,
            destination: None,
            undirected: false,
        }
    }

    pub fn transaction(
        values: Vec<AttributeValue>,
        source: GraphKey,
        destination: GraphKey,
        undirected: bool,
    ) -> Self {
        Self {
            element_type: GraphElementType::Transaction,
            values,
            source: Some(Box::new(source)),
            destination: Some(Box::new(destination)),
            undirected,
        }
    }
}

impl fmt::Display for GraphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(source), Some(destination)) = (&self.source, &self.destination) {
            let arrow = if self.undirected { "-" } else { "->" };
            write!(f, "{}{}{}", source, arrow, destination)?;
        }
        write!(f, "[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}

/// Elements whose primary key is known to be unique, bucketed by key hash.
///
/// The set does not read attribute values itself. Callers supply the hash
/// of an element's key and an equality test against candidates, which lets
/// transaction keys fold in their endpoints and direction.
#[derive(Debug, Clone)]
pub struct ElementKeySet {
    element_type: GraphElementType,
    buckets: FxHashMap<u64, Vec<u32>>,
    hashes: Vec<Option<u64>>,
    len: usize,
}

impl ElementKeySet {
    pub fn new(element_type: GraphElementType, capacity: usize) -> Self {
        Self {
            element_type,
            buckets: FxHashMap::default(),
            hashes: vec![None; capacity],
            len: 0,
        }
    }

    pub fn element_type(&self) -> GraphElementType {
        self.element_type
    }

    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity > self.hashes.len() {
            self.hashes.resize(capacity, None);
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, element: u32) -> bool {
        self.hashes
            .get(element as usize)
            .is_some_and(Option::is_some)
    }

    /// Inserts `element` under `hash` unless a member with an equal key is
    /// already present, in which case that member is returned and the set is
    /// left unchanged.
    pub fn add<F>(&mut self, element: u32, hash: u64, mut same_key: F) -> Option<u32>
    where
        F: FnMut(u32) -> bool,
    {
        self.ensure_capacity(element as usize + 1);
        let bucket = self.buckets.entry(hash).or_default();
        if let Some(&existing) = bucket.iter().find(|&&other| other != element && same_key(other)) {
            return Some(existing);
        }
        if !bucket.contains(&element) {
            bucket.push(element);
            self.hashes[element as usize] = Some(hash);
            self.len += 1;
        }
        None
    }

    /// Removes `element`. Returns whether it was a member.
    pub fn remove(&mut self, element: u32) -> bool {
        let Some(hash) = self.hashes.get_mut(element as usize).and_then(Option::take) else {
            return false;
        };
        if let Some(bucket) = self.buckets.get_mut(&hash) {
            bucket.retain(|&other| other != element);
            if bucket.is_empty() {
                self.buckets.remove(&hash);
            }
        }
        self.len -= 1;
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.buckets.values().flatten().copied()
    }
}
