//! Live instance accounting
//!
//! Every `StoreGraph` registers itself on construction (including clones)
//! and deregisters in `Drop`.

use std::sync::atomic::{AtomicUsize, Ordering};

static LIVE_GRAPHS: AtomicUsize = AtomicUsize::new(0);

/// Number of `StoreGraph` instances currently alive in this process.
pub fn live_graph_count() -> usize {
    LIVE_GRAPHS.load(Ordering::Relaxed)
}

pub(crate) fn register_graph() {
    LIVE_GRAPHS.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn release_graph() {
    LIVE_GRAPHS.fetch_sub(1, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StoreGraph;

    #[test]
    fn test_live_count_covers_clones() {
        // Other tests create graphs concurrently, so only a lower bound holds.
        let graph = StoreGraph::new();
        let copy = graph.clone();
        assert!(live_graph_count() >= 2);
        drop(copy);
        drop(graph);
    }
}
