use crate::notation::MoveKey;
use crate::opening::{NodeId, OpeningId, OpeningTrieIndex};
use std::collections::BTreeSet;

/// Trie nodes consistent with the moves played so far
///
/// Restricted to the openings the player has learned for their colour. With a
/// strict sequence trie this holds at most one node, but it is kept as an
/// ordered set so transposition-aware indices can slot in later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFrontier {
    nodes: Vec<NodeId>,
}

impl CandidateFrontier {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The root, if any learned opening is indexed at all
    pub fn seeded(index: &OpeningTrieIndex, learned: &BTreeSet<OpeningId>) -> Self {
        if index.root().tagged_with_any(learned) {
            Self::from_nodes([NodeId::ROOT])
        } else {
            Self::empty()
        }
    }

    /// Build from nodes, dropping duplicates while keeping first-seen order
    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let mut seen = BTreeSet::new();
        let nodes = nodes.into_iter().filter(|id| seen.insert(*id)).collect();
        Self { nodes }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Every learned continuation out of the frontier, as (move, child) pairs
    pub fn continuations(
        &self,
        index: &OpeningTrieIndex,
        learned: &BTreeSet<OpeningId>,
    ) -> Vec<(MoveKey, NodeId)> {
        self.nodes
            .iter()
            .flat_map(|node| index.children_matching(*node, learned))
            .collect()
    }

    /// Frontier after `key` is played: the matching learned children only
    pub fn advance(
        &self,
        index: &OpeningTrieIndex,
        learned: &BTreeSet<OpeningId>,
        key: &MoveKey,
    ) -> Self {
        Self::from_nodes(
            self.continuations(index, learned)
                .into_iter()
                .filter(|(child_key, _)| child_key == key)
                .map(|(_, child)| child),
        )
    }

    /// False when every node is a leaf for the learned openings
    pub fn has_continuation(
        &self,
        index: &OpeningTrieIndex,
        learned: &BTreeSet<OpeningId>,
    ) -> bool {
        self.nodes
            .iter()
            .any(|node| !index.children_matching(*node, learned).is_empty())
    }

    /// Learned openings that still pass through some frontier node
    pub fn remaining_opening_ids(
        &self,
        index: &OpeningTrieIndex,
        learned: &BTreeSet<OpeningId>,
    ) -> BTreeSet<OpeningId> {
        self.nodes
            .iter()
            .flat_map(|node| index.opening_ids_at(*node).iter().copied())
            .filter(|id| learned.contains(id))
            .collect()
    }
}
