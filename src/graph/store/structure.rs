//! Vertex, link, edge and transaction lifecycle, adjacency reads and capacity
//!
//! A transaction is filed in three lists: its link's transaction list
//! (bucketed by direction class) and the transaction lists of both
//! endpoints (bucketed by the endpoint's role). Links and edges are created
//! and retired as the first and last transaction of their kind come and go.

use super::StoreGraph;
use crate::graph::error::{GraphError, GraphResult};
use crate::graph::types::{Direction, GraphElementType, GraphOperationMode, VertexDirection};
use tracing::{debug, trace};

pub(super) const NO_LINK: u32 = u32::MAX;
/// Marks a `link_prev` entry holding a hash slot rather than a link.
const CHAIN_HEAD: u32 = 0x8000_0000;

/// Distinct non-empty combinations of the three vertex direction bits.
pub(super) const LINK_CATEGORIES: usize = 7;

/// Direction state (a set of `VertexDirection::bit`s) for each vertex-link
/// category.
const CATEGORY_TO_STATE: [usize; LINK_CATEGORIES] = [6, 4, 5, 1, 3, 7, 2];
/// Inverse of `CATEGORY_TO_STATE`. State 0 never occurs.
const STATE_TO_CATEGORY: [usize; 8] = [0, 3, 6, 4, 1, 2, 0, 5];

#[inline]
fn low_end(link: u32) -> u32 {
    link << 1
}

#[inline]
fn high_end(link: u32) -> u32 {
    (link << 1) | 1
}

/// How a new transaction sits on its link and at its endpoints.
struct Placement {
    low: u32,
    high: u32,
    low_direction: VertexDirection,
    high_direction: VertexDirection,
    source: u32,
    destination: u32,
    source_direction: VertexDirection,
    destination_direction: VertexDirection,
}

impl Placement {
    fn new(source: u32, destination: u32, directed: bool) -> Self {
        let (low, high) = if source <= destination {
            (source, destination)
        } else {
            (destination, source)
        };
        if !directed {
            // Undirected transactions always run low to high.
            return Placement {
                low,
                high,
                low_direction: VertexDirection::Undirected,
                high_direction: VertexDirection::Undirected,
                source: low,
                destination: high,
                source_direction: VertexDirection::Undirected,
                destination_direction: VertexDirection::Undirected,
            };
        }
        let (low_direction, high_direction) = if source <= destination {
            (VertexDirection::Outgoing, VertexDirection::Incoming)
        } else {
            (VertexDirection::Incoming, VertexDirection::Outgoing)
        };
        Placement {
            low,
            high,
            low_direction,
            high_direction,
            source,
            destination,
            source_direction: VertexDirection::Outgoing,
            destination_direction: VertexDirection::Incoming,
        }
    }
}

impl StoreGraph {
    // ---------------------------------------------------------------------
    // Vertices
    // ---------------------------------------------------------------------

    /// Adds a vertex under a recycled or fresh id.
    pub fn add_vertex(&mut self) -> u32 {
        self.ensure_vertex_capacity(self.vertex_store.count() + 1);
        let vertex = self.vertex_store.add();
        self.finish_add_vertex(vertex);
        vertex
    }

    /// Adds a vertex under a specific id.
    pub fn add_vertex_with_id(&mut self, vertex: u32) -> GraphResult<u32> {
        if self.vertex_store.element_exists(vertex) {
            return Err(GraphError::DuplicateVertexId(vertex));
        }
        self.ensure_vertex_capacity(vertex as usize + 1);
        self.vertex_store.add_id(vertex);
        self.finish_add_vertex(vertex);
        Ok(vertex)
    }

    fn finish_add_vertex(&mut self, vertex: u32) {
        self.bump_structure();
        let uid = self.issue_uid();
        self.vertex_store.set_uid(vertex, uid);
        self.mark_key_pending(GraphElementType::Vertex, vertex);
        self.add_element_to_indices(GraphElementType::Vertex, vertex);
        if let Some(edit) = self.graph_edit.as_deref_mut() {
            edit.add_vertex(vertex);
        }
        trace!(vertex, "added vertex");
    }

    /// Removes a vertex.
    ///
    /// In EXECUTE mode every incident transaction is removed first and every
    /// non-default value is cleared, so that an attached edit log can put
    /// them back.
    pub fn remove_vertex(&mut self, vertex: u32) -> GraphResult<()> {
        if !self.vertex_store.element_exists(vertex) {
            return Err(GraphError::VertexNotFound(vertex));
        }

        if self.operation_mode == GraphOperationMode::Execute {
            while self.vertex_transactions.element_count(vertex) > 0 {
                let transaction = self.vertex_transactions.element(vertex, 0) >> 1;
                self.remove_transaction(transaction)?;
            }
            self.clear_element_values(GraphElementType::Vertex, vertex)?;
        }

        self.remove_element_from_indices(GraphElementType::Vertex, vertex);
        self.forget_key(GraphElementType::Vertex, vertex);
        self.vertex_store.remove(vertex);
        self.bump_structure();

        if let Some(edit) = self.graph_edit.as_deref_mut() {
            edit.remove_vertex(vertex);
        }
        trace!(vertex, "removed vertex");
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_store.count()
    }

    pub fn vertex_capacity(&self) -> usize {
        self.vertex_store.capacity()
    }

    pub fn vertex_exists(&self, vertex: u32) -> bool {
        self.vertex_store.element_exists(vertex)
    }

    /// The vertex at `position` in `[0, vertex_count)`.
    pub fn vertex(&self, position: usize) -> Option<u32> {
        (position < self.vertex_store.count()).then(|| self.vertex_store.element(position))
    }

    pub fn vertex_position(&self, vertex: u32) -> Option<usize> {
        self.vertex_exists(vertex)
            .then(|| self.vertex_store.element_position(vertex))
    }

    pub fn vertex_uid(&self, vertex: u32) -> Option<i64> {
        self.vertex_exists(vertex).then(|| self.vertex_store.uid(vertex))
    }

    /// Live vertices in position order.
    pub fn vertices(&self) -> impl Iterator<Item = u32> + '_ {
        self.vertex_store.live().iter().copied()
    }

    // ---------------------------------------------------------------------
    // Transactions
    // ---------------------------------------------------------------------

    /// Adds a transaction from `source` to `destination`.
    ///
    /// An undirected transaction is stored with its lower vertex id as the
    /// source.
    pub fn add_transaction(
        &mut self,
        source: u32,
        destination: u32,
        directed: bool,
    ) -> GraphResult<u32> {
        self.insert_transaction(None, source, destination, directed)
    }

    /// Adds a transaction under a specific id.
    pub fn add_transaction_with_id(
        &mut self,
        transaction: u32,
        source: u32,
        destination: u32,
        directed: bool,
    ) -> GraphResult<u32> {
        self.insert_transaction(Some(transaction), source, destination, directed)
    }

    fn insert_transaction(
        &mut self,
        requested: Option<u32>,
        source: u32,
        destination: u32,
        directed: bool,
    ) -> GraphResult<u32> {
        if !self.vertex_store.element_exists(source) {
            return Err(GraphError::VertexNotFound(source));
        }
        if !self.vertex_store.element_exists(destination) {
            return Err(GraphError::VertexNotFound(destination));
        }
        if let Some(id) = requested {
            if self.transaction_store.element_exists(id) {
                return Err(GraphError::DuplicateTransactionId(id));
            }
        }

        self.ensure_link_capacity(self.link_store.count() + 1);
        self.ensure_edge_capacity(self.edge_store.count() + 1);

        let transaction = match requested {
            None => {
                self.ensure_transaction_capacity(self.transaction_store.count() + 1);
                self.transaction_store.add()
            }
            Some(id) => {
                self.ensure_transaction_capacity(id as usize + 1);
                self.transaction_store.add_id(id);
                id
            }
        };

        self.bump_structure();
        let uid = self.issue_uid();
        self.transaction_store.set_uid(transaction, uid);

        let placement = Placement::new(source, destination, directed);
        self.vertex_transactions.add_element(
            placement.source,
            transaction << 1,
            placement.source_direction.category(),
        );
        self.vertex_transactions.add_element(
            placement.destination,
            (transaction << 1) | 1,
            placement.destination_direction.category(),
        );

        let link = match self.find_link(placement.low, placement.high) {
            Some(link) => {
                self.widen_link(link, &placement);
                link
            }
            None => self.create_link(&placement),
        };

        self.link_transactions
            .add_element(link, transaction, placement.low_direction.category());

        self.mark_key_pending(GraphElementType::Transaction, transaction);
        self.add_element_to_indices(GraphElementType::Transaction, transaction);

        if let Some(edit) = self.graph_edit.as_deref_mut() {
            edit.add_transaction(placement.source, placement.destination, directed, transaction);
        }
        trace!(
            transaction,
            source = placement.source,
            destination = placement.destination,
            directed,
            "added transaction"
        );
        Ok(transaction)
    }

    fn create_link(&mut self, placement: &Placement) -> u32 {
        let link = self.link_store.add();
        let uid = self.issue_uid();
        self.link_store.set_uid(link, uid);

        self.vertex_links.add_element(
            placement.low,
            low_end(link),
            STATE_TO_CATEGORY[placement.low_direction.bit()],
        );
        self.vertex_links.add_element(
            placement.high,
            high_end(link),
            STATE_TO_CATEGORY[placement.high_direction.bit()],
        );
        let slot = self.hash_slot(placement.low, placement.high);
        self.chain_insert(link, slot);

        self.create_edge(link, placement);
        self.mark_key_pending(GraphElementType::Link, link);
        self.add_element_to_indices(GraphElementType::Link, link);
        link
    }

    /// Records a new direction on an existing link, creating its edge.
    fn widen_link(&mut self, link: u32, placement: &Placement) {
        let low_state = CATEGORY_TO_STATE[self.vertex_links.element_category(low_end(link))];
        let new_low_state = low_state | placement.low_direction.bit();
        if new_low_state == low_state {
            return;
        }

        self.vertex_links.remove_element(low_end(link));
        self.vertex_links
            .add_element(placement.low, low_end(link), STATE_TO_CATEGORY[new_low_state]);

        let high_state = CATEGORY_TO_STATE[self.vertex_links.element_category(high_end(link))];
        self.vertex_links.remove_element(high_end(link));
        self.vertex_links.add_element(
            placement.high,
            high_end(link),
            STATE_TO_CATEGORY[high_state | placement.high_direction.bit()],
        );

        self.create_edge(link, placement);
    }

    fn create_edge(&mut self, link: u32, placement: &Placement) {
        let edge = self.edge_store.add();
        let uid = self.issue_uid();
        self.edge_store.set_uid(edge, uid);

        self.link_edges
            .add_element(link, edge, placement.low_direction.category());
        self.vertex_edges.add_element(
            placement.source,
            edge << 1,
            placement.source_direction.category(),
        );
        self.vertex_edges.add_element(
            placement.destination,
            (edge << 1) | 1,
            placement.destination_direction.category(),
        );
        self.mark_key_pending(GraphElementType::Edge, edge);
        self.add_element_to_indices(GraphElementType::Edge, edge);
    }

    /// Removes a transaction, retiring its edge and link if it was the last
    /// of its kind.
    pub fn remove_transaction(&mut self, transaction: u32) -> GraphResult<()> {
        if !self.transaction_store.element_exists(transaction) {
            return Err(GraphError::TransactionNotFound(transaction));
        }

        if self.operation_mode == GraphOperationMode::Execute {
            self.clear_element_values(GraphElementType::Transaction, transaction)?;
        }

        self.remove_element_from_indices(GraphElementType::Transaction, transaction);
        self.forget_key(GraphElementType::Transaction, transaction);

        let link = self.link_transactions.element_list(transaction);
        let direction = self.link_transactions.element_category(transaction);
        let source = self.vertex_transactions.element_list(transaction << 1);
        let destination = self.vertex_transactions.element_list((transaction << 1) | 1);

        self.link_transactions.remove_element(transaction);
        self.vertex_transactions.remove_element(transaction << 1);
        self.vertex_transactions.remove_element((transaction << 1) | 1);
        self.transaction_store.remove(transaction);

        if self.link_transactions.element_count_in(link, direction) == 0 {
            self.retire_edge(link, direction);
        }

        self.bump_structure();

        let directed = Direction::from_category(direction) != Direction::Flat;
        if let Some(edit) = self.graph_edit.as_deref_mut() {
            edit.remove_transaction(source, destination, directed, transaction);
        }
        trace!(transaction, source, destination, "removed transaction");
        Ok(())
    }

    /// Drops the edge of `direction` under `link`, and the link itself when
    /// no transactions remain.
    fn retire_edge(&mut self, link: u32, direction: usize) {
        let edge = self.link_edges.element_in(link, direction, 0);
        self.remove_element_from_indices(GraphElementType::Edge, edge);
        self.forget_key(GraphElementType::Edge, edge);
        self.reset_element_values(GraphElementType::Edge, edge);
        self.edge_store.remove(edge);
        self.link_edges.remove_element(edge);
        self.vertex_edges.remove_element(edge << 1);
        self.vertex_edges.remove_element((edge << 1) | 1);

        let low = self.vertex_links.element_list(low_end(link));
        let high = self.vertex_links.element_list(high_end(link));
        let mut low_state = CATEGORY_TO_STATE[self.vertex_links.element_category(low_end(link))];
        let mut high_state = CATEGORY_TO_STATE[self.vertex_links.element_category(high_end(link))];
        self.vertex_links.remove_element(low_end(link));
        self.vertex_links.remove_element(high_end(link));

        if self.link_transactions.element_count(link) == 0 {
            self.remove_element_from_indices(GraphElementType::Link, link);
            self.forget_key(GraphElementType::Link, link);
            self.reset_element_values(GraphElementType::Link, link);
            self.link_store.remove(link);
            self.chain_remove(link);
            return;
        }

        match Direction::from_category(direction) {
            Direction::Uphill => {
                low_state ^= VertexDirection::Outgoing.bit();
                high_state ^= VertexDirection::Incoming.bit();
            }
            Direction::Downhill => {
                low_state ^= VertexDirection::Incoming.bit();
                high_state ^= VertexDirection::Outgoing.bit();
            }
            Direction::Flat => {
                low_state ^= VertexDirection::Undirected.bit();
                high_state ^= VertexDirection::Undirected.bit();
            }
        }
        self.vertex_links
            .add_element(low, low_end(link), STATE_TO_CATEGORY[low_state]);
        self.vertex_links
            .add_element(high, high_end(link), STATE_TO_CATEGORY[high_state]);
    }

    /// Moves the source end of a transaction to another vertex.
    ///
    /// The move is a remove and re-add under the same id, hidden from the
    /// edit sink, which instead hears a single endpoint change. `reversed`
    /// is reported when an undirected transaction had to swap its ends.
    pub fn set_transaction_source_vertex(
        &mut self,
        transaction: u32,
        new_source: u32,
    ) -> GraphResult<()> {
        let (old_source, destination, directed) = self.endpoints_for_move(transaction, new_source)?;
        self.rewire_transaction(transaction, new_source, destination, directed)?;
        let reversed = !directed && new_source > destination;
        if let Some(edit) = self.graph_edit.as_deref_mut() {
            edit.set_transaction_source_vertex(transaction, old_source, new_source, reversed);
        }
        Ok(())
    }

    /// Moves the destination end of a transaction to another vertex.
    pub fn set_transaction_destination_vertex(
        &mut self,
        transaction: u32,
        new_destination: u32,
    ) -> GraphResult<()> {
        let (source, old_destination, directed) =
            self.endpoints_for_move(transaction, new_destination)?;
        self.rewire_transaction(transaction, source, new_destination, directed)?;
        let reversed = !directed && source > new_destination;
        if let Some(edit) = self.graph_edit.as_deref_mut() {
            edit.set_transaction_destination_vertex(
                transaction,
                old_destination,
                new_destination,
                reversed,
            );
        }
        Ok(())
    }

    fn endpoints_for_move(&self, transaction: u32, vertex: u32) -> GraphResult<(u32, u32, bool)> {
        if !self.transaction_store.element_exists(transaction) {
            return Err(GraphError::TransactionNotFound(transaction));
        }
        if !self.vertex_store.element_exists(vertex) {
            return Err(GraphError::VertexNotFound(vertex));
        }
        let source = self.vertex_transactions.element_list(transaction << 1);
        let destination = self.vertex_transactions.element_list((transaction << 1) | 1);
        let direction = Direction::from_category(self.link_transactions.element_category(transaction));
        Ok((source, destination, direction != Direction::Flat))
    }

    /// Re-files a transaction between new endpoints without clearing its
    /// values or telling the edit sink. The transaction keeps its UID.
    fn rewire_transaction(
        &mut self,
        transaction: u32,
        source: u32,
        destination: u32,
        directed: bool,
    ) -> GraphResult<()> {
        let uid = self.transaction_store.uid(transaction);
        let sink = self.graph_edit.take();
        let mode = self.operation_mode;
        if mode == GraphOperationMode::Execute {
            self.operation_mode = GraphOperationMode::Redo;
        }
        let result = self
            .remove_transaction(transaction)
            .and_then(|_| self.insert_transaction(Some(transaction), source, destination, directed));
        self.operation_mode = mode;
        self.graph_edit = sink;
        result?;
        self.transaction_store.set_uid(transaction, uid);
        Ok(())
    }

    pub fn transaction_count(&self) -> usize {
        self.transaction_store.count()
    }

    pub fn transaction_capacity(&self) -> usize {
        self.transaction_store.capacity()
    }

    pub fn transaction_exists(&self, transaction: u32) -> bool {
        self.transaction_store.element_exists(transaction)
    }

    pub fn transaction(&self, position: usize) -> Option<u32> {
        (position < self.transaction_store.count()).then(|| self.transaction_store.element(position))
    }

    pub fn transaction_position(&self, transaction: u32) -> Option<usize> {
        self.transaction_exists(transaction)
            .then(|| self.transaction_store.element_position(transaction))
    }

    pub fn transaction_uid(&self, transaction: u32) -> Option<i64> {
        self.transaction_exists(transaction)
            .then(|| self.transaction_store.uid(transaction))
    }

    pub fn transactions(&self) -> impl Iterator<Item = u32> + '_ {
        self.transaction_store.live().iter().copied()
    }

    pub fn transaction_link(&self, transaction: u32) -> Option<u32> {
        self.transaction_exists(transaction)
            .then(|| self.link_transactions.element_list(transaction))
    }

    pub fn transaction_direction(&self, transaction: u32) -> Option<Direction> {
        self.transaction_exists(transaction).then(|| {
            Direction::from_category(self.link_transactions.element_category(transaction))
        })
    }

    /// The edge aggregating this transaction.
    pub fn transaction_edge(&self, transaction: u32) -> Option<u32> {
        let link = self.transaction_link(transaction)?;
        let direction = self.link_transactions.element_category(transaction);
        Some(self.link_edges.element_in(link, direction, 0))
    }

    pub fn transaction_source_vertex(&self, transaction: u32) -> Option<u32> {
        self.transaction_exists(transaction)
            .then(|| self.vertex_transactions.element_list(transaction << 1))
    }

    pub fn transaction_destination_vertex(&self, transaction: u32) -> Option<u32> {
        self.transaction_exists(transaction)
            .then(|| self.vertex_transactions.element_list((transaction << 1) | 1))
    }

    // ---------------------------------------------------------------------
    // Links
    // ---------------------------------------------------------------------

    pub fn link_count(&self) -> usize {
        self.link_store.count()
    }

    pub fn link_capacity(&self) -> usize {
        self.link_store.capacity()
    }

    pub fn link_exists(&self, link: u32) -> bool {
        self.link_store.element_exists(link)
    }

    pub fn link(&self, position: usize) -> Option<u32> {
        (position < self.link_store.count()).then(|| self.link_store.element(position))
    }

    pub fn link_position(&self, link: u32) -> Option<usize> {
        self.link_exists(link)
            .then(|| self.link_store.element_position(link))
    }

    pub fn link_uid(&self, link: u32) -> Option<i64> {
        self.link_exists(link).then(|| self.link_store.uid(link))
    }

    pub fn links(&self) -> impl Iterator<Item = u32> + '_ {
        self.link_store.live().iter().copied()
    }

    /// The link joining two vertices, in either order.
    pub fn link_between(&self, vertex1: u32, vertex2: u32) -> Option<u32> {
        if vertex1 <= vertex2 {
            self.find_link(vertex1, vertex2)
        } else {
            self.find_link(vertex2, vertex1)
        }
    }

    /// The lower-id vertex of a link.
    pub fn link_low_vertex(&self, link: u32) -> Option<u32> {
        self.link_exists(link)
            .then(|| self.vertex_links.element_list(low_end(link)))
    }

    pub fn link_high_vertex(&self, link: u32) -> Option<u32> {
        self.link_exists(link)
            .then(|| self.vertex_links.element_list(high_end(link)))
    }

    pub fn link_edge_count(&self, link: u32) -> usize {
        if !self.link_exists(link) {
            return 0;
        }
        self.link_edges.element_count(link)
    }

    pub fn link_edge_count_in(&self, link: u32, direction: Direction) -> usize {
        if !self.link_exists(link) {
            return 0;
        }
        self.link_edges.element_count_in(link, direction.category())
    }

    pub fn link_edge(&self, link: u32, position: usize) -> Option<u32> {
        (position < self.link_edge_count(link)).then(|| self.link_edges.element(link, position))
    }

    pub fn link_edge_in(&self, link: u32, direction: Direction, position: usize) -> Option<u32> {
        (position < self.link_edge_count_in(link, direction))
            .then(|| self.link_edges.element_in(link, direction.category(), position))
    }

    pub fn link_transaction_count(&self, link: u32) -> usize {
        if !self.link_exists(link) {
            return 0;
        }
        self.link_transactions.element_count(link)
    }

    pub fn link_transaction_count_in(&self, link: u32, direction: Direction) -> usize {
        if !self.link_exists(link) {
            return 0;
        }
        self.link_transactions.element_count_in(link, direction.category())
    }

    pub fn link_transaction(&self, link: u32, position: usize) -> Option<u32> {
        (position < self.link_transaction_count(link))
            .then(|| self.link_transactions.element(link, position))
    }

    pub fn link_transaction_in(
        &self,
        link: u32,
        direction: Direction,
        position: usize,
    ) -> Option<u32> {
        (position < self.link_transaction_count_in(link, direction))
            .then(|| self.link_transactions.element_in(link, direction.category(), position))
    }

    // ---------------------------------------------------------------------
    // Edges
    // ---------------------------------------------------------------------

    pub fn edge_count(&self) -> usize {
        self.edge_store.count()
    }

    pub fn edge_capacity(&self) -> usize {
        self.edge_store.capacity()
    }

    pub fn edge_exists(&self, edge: u32) -> bool {
        self.edge_store.element_exists(edge)
    }

    pub fn edge(&self, position: usize) -> Option<u32> {
        (position < self.edge_store.count()).then(|| self.edge_store.element(position))
    }

    pub fn edge_position(&self, edge: u32) -> Option<usize> {
        self.edge_exists(edge)
            .then(|| self.edge_store.element_position(edge))
    }

    pub fn edge_uid(&self, edge: u32) -> Option<i64> {
        self.edge_exists(edge).then(|| self.edge_store.uid(edge))
    }

    pub fn edges(&self) -> impl Iterator<Item = u32> + '_ {
        self.edge_store.live().iter().copied()
    }

    pub fn edge_link(&self, edge: u32) -> Option<u32> {
        self.edge_exists(edge)
            .then(|| self.link_edges.element_list(edge))
    }

    pub fn edge_direction(&self, edge: u32) -> Option<Direction> {
        self.edge_exists(edge)
            .then(|| Direction::from_category(self.link_edges.element_category(edge)))
    }

    pub fn edge_source_vertex(&self, edge: u32) -> Option<u32> {
        self.edge_exists(edge)
            .then(|| self.vertex_edges.element_list(edge << 1))
    }

    pub fn edge_destination_vertex(&self, edge: u32) -> Option<u32> {
        self.edge_exists(edge)
            .then(|| self.vertex_edges.element_list((edge << 1) | 1))
    }

    pub fn edge_transaction_count(&self, edge: u32) -> usize {
        match (self.edge_link(edge), self.edge_direction(edge)) {
            (Some(link), Some(direction)) => self.link_transaction_count_in(link, direction),
            _ => 0,
        }
    }

    pub fn edge_transaction(&self, edge: u32, position: usize) -> Option<u32> {
        let link = self.edge_link(edge)?;
        let direction = self.edge_direction(edge)?;
        self.link_transaction_in(link, direction, position)
    }

    // ---------------------------------------------------------------------
    // Vertex adjacency
    // ---------------------------------------------------------------------

    /// Number of link ends at the vertex. A self loop's link counts twice.
    pub fn vertex_link_count(&self, vertex: u32) -> usize {
        if !self.vertex_exists(vertex) {
            return 0;
        }
        self.vertex_links.element_count(vertex)
    }

    pub fn vertex_link(&self, vertex: u32, position: usize) -> Option<u32> {
        (position < self.vertex_link_count(vertex))
            .then(|| self.vertex_links.element(vertex, position) >> 1)
    }

    pub fn vertex_neighbour_count(&self, vertex: u32) -> usize {
        self.vertex_link_count(vertex)
    }

    /// The vertex at the other end of the link at `position`.
    pub fn vertex_neighbour(&self, vertex: u32, position: usize) -> Option<u32> {
        (position < self.vertex_link_count(vertex)).then(|| {
            let end = self.vertex_links.element(vertex, position);
            self.vertex_links.element_list(end ^ 1)
        })
    }

    pub fn vertex_neighbours(&self, vertex: u32) -> impl Iterator<Item = u32> + '_ {
        (0..self.vertex_link_count(vertex)).filter_map(move |p| self.vertex_neighbour(vertex, p))
    }

    pub fn vertex_edge_count(&self, vertex: u32) -> usize {
        if !self.vertex_exists(vertex) {
            return 0;
        }
        self.vertex_edges.element_count(vertex)
    }

    pub fn vertex_edge_count_in(&self, vertex: u32, direction: VertexDirection) -> usize {
        if !self.vertex_exists(vertex) {
            return 0;
        }
        self.vertex_edges.element_count_in(vertex, direction.category())
    }

    pub fn vertex_edge(&self, vertex: u32, position: usize) -> Option<u32> {
        (position < self.vertex_edge_count(vertex))
            .then(|| self.vertex_edges.element(vertex, position) >> 1)
    }

    pub fn vertex_edge_in(
        &self,
        vertex: u32,
        direction: VertexDirection,
        position: usize,
    ) -> Option<u32> {
        (position < self.vertex_edge_count_in(vertex, direction))
            .then(|| self.vertex_edges.element_in(vertex, direction.category(), position) >> 1)
    }

    /// Degree of the vertex. A self loop counts twice.
    pub fn vertex_transaction_count(&self, vertex: u32) -> usize {
        if !self.vertex_exists(vertex) {
            return 0;
        }
        self.vertex_transactions.element_count(vertex)
    }

    pub fn vertex_transaction_count_in(&self, vertex: u32, direction: VertexDirection) -> usize {
        if !self.vertex_exists(vertex) {
            return 0;
        }
        self.vertex_transactions
            .element_count_in(vertex, direction.category())
    }

    pub fn vertex_transaction(&self, vertex: u32, position: usize) -> Option<u32> {
        (position < self.vertex_transaction_count(vertex))
            .then(|| self.vertex_transactions.element(vertex, position) >> 1)
    }

    pub fn vertex_transaction_in(
        &self,
        vertex: u32,
        direction: VertexDirection,
        position: usize,
    ) -> Option<u32> {
        (position < self.vertex_transaction_count_in(vertex, direction)).then(|| {
            self.vertex_transactions
                .element_in(vertex, direction.category(), position)
                >> 1
        })
    }

    pub fn vertex_transactions(&self, vertex: u32) -> impl Iterator<Item = u32> + '_ {
        (0..self.vertex_transaction_count(vertex))
            .filter_map(move |p| self.vertex_transaction(vertex, p))
    }

    // ---------------------------------------------------------------------
    // Link hash chains
    // ---------------------------------------------------------------------

    #[inline]
    fn hash_slot(&self, low: u32, high: u32) -> usize {
        (low.wrapping_mul(11).wrapping_add(high.wrapping_mul(117)) & self.link_mask) as usize
    }

    fn find_link(&self, low: u32, high: u32) -> Option<u32> {
        let mut link = self.link_hash[self.hash_slot(low, high)];
        while link != NO_LINK {
            if self.vertex_links.element_list(low_end(link)) == low
                && self.vertex_links.element_list(high_end(link)) == high
            {
                return Some(link);
            }
            link = self.link_next[link as usize];
        }
        None
    }

    fn chain_insert(&mut self, link: u32, slot: usize) {
        let first = self.link_hash[slot];
        self.link_next[link as usize] = first;
        self.link_prev[link as usize] = slot as u32 | CHAIN_HEAD;
        if first != NO_LINK {
            self.link_prev[first as usize] = link;
        }
        self.link_hash[slot] = link;
    }

    fn chain_remove(&mut self, link: u32) {
        let previous = self.link_prev[link as usize];
        let next = self.link_next[link as usize];
        if previous & CHAIN_HEAD != 0 {
            self.link_hash[(previous & !CHAIN_HEAD) as usize] = next;
        } else {
            self.link_next[previous as usize] = next;
        }
        if next != NO_LINK {
            self.link_prev[next as usize] = previous;
        }
    }

    // ---------------------------------------------------------------------
    // Capacity
    // ---------------------------------------------------------------------

    fn ensure_vertex_capacity(&mut self, capacity: usize) {
        if self.vertex_store.ensure_capacity(capacity) {
            let capacity = self.vertex_store.capacity();
            debug!(capacity, "grew vertex capacity");
            self.vertex_links.expand_list_capacity(capacity);
            self.vertex_edges.expand_list_capacity(capacity);
            self.vertex_transactions.expand_list_capacity(capacity);
            self.expand_attribute_element_capacity(GraphElementType::Vertex, capacity);
        }
    }

    fn ensure_link_capacity(&mut self, capacity: usize) {
        if !self.link_store.ensure_capacity(capacity) {
            return;
        }
        let capacity = self.link_store.capacity();
        debug!(capacity, "grew link capacity");
        self.vertex_links.expand_element_capacity(capacity << 1);
        self.link_edges.expand_list_capacity(capacity);
        self.link_transactions.expand_list_capacity(capacity);

        self.link_mask = (capacity - 1) as u32;
        self.link_hash = vec![NO_LINK; capacity];
        self.link_next = vec![NO_LINK; capacity];
        self.link_prev = vec![NO_LINK; capacity];
        for position in 0..self.link_store.count() {
            let link = self.link_store.element(position);
            let slot = self.hash_slot(
                self.vertex_links.element_list(low_end(link)),
                self.vertex_links.element_list(high_end(link)),
            );
            self.chain_insert(link, slot);
        }

        self.expand_attribute_element_capacity(GraphElementType::Link, capacity);
    }

    fn ensure_edge_capacity(&mut self, capacity: usize) {
        if self.edge_store.ensure_capacity(capacity) {
            let capacity = self.edge_store.capacity();
            debug!(capacity, "grew edge capacity");
            self.link_edges.expand_element_capacity(capacity);
            self.vertex_edges.expand_element_capacity(capacity << 1);
            self.expand_attribute_element_capacity(GraphElementType::Edge, capacity);
        }
    }

    fn ensure_transaction_capacity(&mut self, capacity: usize) {
        if self.transaction_store.ensure_capacity(capacity) {
            let capacity = self.transaction_store.capacity();
            debug!(capacity, "grew transaction capacity");
            self.vertex_transactions.expand_element_capacity(capacity << 1);
            self.link_transactions.expand_element_capacity(capacity);
            self.expand_attribute_element_capacity(GraphElementType::Transaction, capacity);
        }
    }

    pub(super) fn ensure_attribute_capacity(&mut self, capacity: usize) {
        if self.attribute_store.ensure_capacity(capacity) {
            let capacity = self.attribute_store.capacity();
            debug!(capacity, "grew attribute capacity");
            self.type_attributes.expand_element_capacity(capacity);
            self.attributes.resize_with(capacity, || None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_tables_are_inverse() {
        for (category, &state) in CATEGORY_TO_STATE.iter().enumerate() {
            assert_eq!(STATE_TO_CATEGORY[state], category);
        }
    }

    #[test]
    fn test_placement_canonicalizes_undirected() {
        let p = Placement::new(5, 2, false);
        assert_eq!((p.source, p.destination), (2, 5));
        assert_eq!((p.low, p.high), (2, 5));

        let p = Placement::new(5, 2, true);
        assert_eq!((p.source, p.destination), (5, 2));
        assert_eq!(p.low_direction, VertexDirection::Incoming);
        assert_eq!(p.high_direction, VertexDirection::Outgoing);
    }

    #[test]
    fn test_link_chain_survives_rehash() {
        let mut graph = StoreGraph::with_config(crate::config::StoreGraphConfig {
            vertex_capacity: 2,
            link_capacity: 2,
            edge_capacity: 2,
            transaction_capacity: 2,
            ..Default::default()
        });
        let vertices: Vec<u32> = (0..10).map(|_| graph.add_vertex()).collect();
        for pair in vertices.windows(2) {
            graph.add_transaction(pair[0], pair[1], true).unwrap();
        }
        assert!(graph.link_capacity() >= 9);
        for pair in vertices.windows(2) {
            assert!(graph.link_between(pair[1], pair[0]).is_some());
        }
        assert_eq!(graph.link_between(vertices[0], vertices[9]), None);
    }
}
