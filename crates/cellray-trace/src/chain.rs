//! Traversal chain: the ordered crossing candidates along one ray.
//!
//! Nodes live in a growable arena and link to each other by handle, so the
//! list order is the link order, not the storage order.

use std::ops::Index;

use cellray_cloud::CellId;

/// Initial arena capacity; most rays cross far fewer cells.
const RESERVE: usize = 64;

/// Handle of a node in a [`Chain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(usize);

/// One discovered position along the ray.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RayPoint {
    /// Cell the ray occupies immediately after this position.
    pub cell: CellId,
    /// Following node in traversal order, `None` for the terminal node.
    pub next: Option<NodeId>,
    /// Distance from the ray start.
    pub s: f64,
}

/// Singly-linked list of [`RayPoint`]s ordered by increasing `s`.
#[derive(Debug)]
pub(crate) struct Chain {
    nodes: Vec<RayPoint>,
}

impl Chain {
    /// Two sentinels: the start at `s = 0` linked to the end at `s = length`.
    pub fn seeded(start_cell: CellId, end_cell: CellId, length: f64) -> Self {
        let mut nodes = Vec::with_capacity(RESERVE);
        nodes.push(RayPoint {
            cell: start_cell,
            next: Some(NodeId(1)),
            s: 0.0,
        });
        nodes.push(RayPoint {
            cell: end_cell,
            next: None,
            s: length,
        });
        Self { nodes }
    }

    /// The start sentinel.
    pub fn head(&self) -> NodeId {
        NodeId(0)
    }

    /// Splice a new node in directly after `at` and return its handle.
    pub fn insert_after(&mut self, at: NodeId, cell: CellId, s: f64) -> NodeId {
        let id = NodeId(self.nodes.len());
        let next = self.nodes[at.0].next;
        self.nodes.push(RayPoint { cell, next, s });
        self.nodes[at.0].next = Some(id);
        id
    }

    /// Number of nodes, sentinels included.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes in link order.
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &RayPoint> + '_ {
        let mut cursor = Some(self.head());
        std::iter::from_fn(move || {
            let id = cursor?;
            let node = &self.nodes[id.0];
            cursor = node.next;
            Some(node)
        })
    }
}

impl Index<NodeId> for Chain {
    type Output = RayPoint;

    fn index(&self, id: NodeId) -> &RayPoint {
        &self.nodes[id.0]
    }
}
