use super::OpeningId;
use crate::notation::MoveKey;
use shakmaty::{Chess, Move};
use std::collections::{BTreeSet, HashMap};

/// Handle to a node in the index arena
///
/// Nodes are never removed, so an id handed out once stays valid for the life
/// of the index, including across later insertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// One ply shared by every opening with the same move prefix
#[derive(Debug, Clone)]
pub struct TrieNode {
    pub(crate) position: Chess,
    pub(crate) move_from_parent: Option<Move>,
    pub(crate) san: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: HashMap<MoveKey, NodeId>,
    pub(crate) opening_ids: BTreeSet<OpeningId>,
}

impl TrieNode {
    pub(crate) fn root(position: Chess) -> Self {
        Self {
            position,
            move_from_parent: None,
            san: None,
            parent: None,
            children: HashMap::new(),
            opening_ids: BTreeSet::new(),
        }
    }

    pub(crate) fn child(parent: NodeId, mv: Move, san: String, position: Chess) -> Self {
        Self {
            position,
            move_from_parent: Some(mv),
            san: Some(san),
            parent: Some(parent),
            children: HashMap::new(),
            opening_ids: BTreeSet::new(),
        }
    }

    /// Position reached at this node
    pub fn position(&self) -> &Chess {
        &self.position
    }

    /// `None` only at the root
    pub fn move_from_parent(&self) -> Option<&Move> {
        self.move_from_parent.as_ref()
    }

    /// SAN of the move leading here, as recorded
    pub fn san(&self) -> Option<&str> {
        self.san.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> impl Iterator<Item = (&MoveKey, NodeId)> {
        self.children.iter().map(|(key, id)| (key, *id))
    }

    pub fn child_for(&self, key: &MoveKey) -> Option<NodeId> {
        self.children.get(key).copied()
    }

    pub fn opening_ids(&self) -> &BTreeSet<OpeningId> {
        &self.opening_ids
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True if any of `allowed` passes through this node
    pub fn tagged_with_any(&self, allowed: &BTreeSet<OpeningId>) -> bool {
        // Iterate the smaller set
        if self.opening_ids.len() <= allowed.len() {
            self.opening_ids.iter().any(|id| allowed.contains(id))
        } else {
            allowed.iter().any(|id| self.opening_ids.contains(id))
        }
    }
}
