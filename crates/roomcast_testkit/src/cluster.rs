//! Multi-node cluster helpers.

use crate::fixtures::TestNode;

/// A fully-meshed set of in-memory nodes.
///
/// Every node's hub knows every node (including itself, which fan-out
/// skips via the origin check), so a publish on any node propagates to
/// all the others.
pub struct TestCluster {
    nodes: Vec<TestNode>,
}

impl TestCluster {
    /// Builds `n` nodes named `node0..nodeN` and meshes them.
    #[must_use]
    pub fn meshed(n: usize) -> Self {
        let nodes: Vec<TestNode> = (0..n).map(|i| TestNode::new(&format!("node{i}"))).collect();

        for node in &nodes {
            for other in &nodes {
                if node.id != other.id {
                    node.hub.hello(other.peer_handle(), other.id.clone());
                }
            }
        }

        Self { nodes }
    }

    /// Returns the node at an index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of range.
    #[must_use]
    pub fn node(&self, index: usize) -> &TestNode {
        &self.nodes[index]
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the cluster has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Blocks until every node's queued events are fully relayed.
    pub fn settle(&self) {
        for node in &self.nodes {
            node.hub.flush();
        }
    }

    /// Returns each node's room count, in node order.
    #[must_use]
    pub fn room_counts(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .map(|n| n.store.len().expect("in-memory store len"))
            .collect()
    }
}

impl std::fmt::Debug for TestCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCluster")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}
