use super::node::{NodeId, TrieNode};
use super::OpeningId;
use crate::notation::{self, MoveKey, Ply};
use std::collections::BTreeSet;
use tracing::debug;

/// Append-only trie of recorded openings rooted at the standard start position
///
/// Nodes live in an arena owned by the index; parent links are plain ids and
/// carry no ownership. Sessions hold [`NodeId`]s into this arena and read it
/// through a shared reference, so the index is effectively read-only once an
/// opening's insertion has returned.
#[derive(Debug, Clone)]
pub struct OpeningTrieIndex {
    nodes: Vec<TrieNode>,
}

impl Default for OpeningTrieIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OpeningTrieIndex {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::root(notation::start_position())],
        }
    }

    pub fn root(&self) -> &TrieNode {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Look up a node; `None` for an id handed out by some other index
    pub fn node(&self, id: NodeId) -> Option<&TrieNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().children.is_empty()
    }

    pub fn contains_opening(&self, opening_id: OpeningId) -> bool {
        self.root().opening_ids.contains(&opening_id)
    }

    /// Insert one recorded opening
    ///
    /// Walks from the root, creating missing children, and tags the root plus
    /// every node on the path with `opening_id`. An empty sequence is a no-op.
    /// Re-inserting the same opening leaves the tree unchanged.
    pub fn insert(&mut self, opening_id: OpeningId, sequence: &[Ply]) {
        if sequence.is_empty() {
            return;
        }

        let mut current = NodeId::ROOT;
        self.nodes[current.0].opening_ids.insert(opening_id);

        let mut created = 0usize;
        for ply in sequence {
            current = match self.nodes[current.0].child_for(&ply.key) {
                Some(existing) => existing,
                None => {
                    let id = NodeId(self.nodes.len());
                    self.nodes.push(TrieNode::child(
                        current,
                        ply.mv.clone(),
                        ply.san.clone(),
                        ply.position.clone(),
                    ));
                    self.nodes[current.0].children.insert(ply.key.clone(), id);
                    created += 1;
                    id
                }
            };
            self.nodes[current.0].opening_ids.insert(opening_id);
        }

        debug!(
            "[INDEX] Opening {} inserted: {} plies, {} new nodes ({} total)",
            opening_id,
            sequence.len(),
            created,
            self.nodes.len()
        );
    }

    /// Children of `node` that still belong to one of `allowed`
    ///
    /// This is the "which theory continuations remain" query. Results are
    /// ordered by move key so seeded callers see a stable order.
    pub fn children_matching(
        &self,
        node: NodeId,
        allowed: &BTreeSet<OpeningId>,
    ) -> Vec<(MoveKey, NodeId)> {
        let Some(node) = self.node(node) else {
            return Vec::new();
        };
        let mut matching: Vec<(MoveKey, NodeId)> = node
            .children
            .iter()
            .filter(|(_, child)| {
                self.node(**child)
                    .is_some_and(|child| child.tagged_with_any(allowed))
            })
            .map(|(key, child)| (key.clone(), *child))
            .collect();
        matching.sort_by(|a, b| a.0.cmp(&b.0));
        matching
    }

    /// SAN moves from the root down to `node`
    pub fn path_of(&self, node: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut cursor = Some(node);
        while let Some(current) = cursor.and_then(|id| self.node(id)) {
            if let Some(san) = current.san() {
                path.push(san.to_string());
            }
            cursor = current.parent;
        }
        path.reverse();
        path
    }

    /// Openings passing through `node`; empty for an unknown id
    pub fn opening_ids_at(&self, node: NodeId) -> &BTreeSet<OpeningId> {
        static NONE: BTreeSet<OpeningId> = BTreeSet::new();
        self.node(node).map_or(&NONE, |node| &node.opening_ids)
    }
}
