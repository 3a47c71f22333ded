//! Opening trie index
//!
//! Recorded openings share a single tree keyed by move. Each node remembers
//! which openings pass through it, so "which of the player's lines are still
//! alive" is an intersection at the current node.
//!
//! # Structure
//!
//! - `node` - [`TrieNode`] and its arena handle [`NodeId`]
//! - `index` - [`OpeningTrieIndex`]: insertion and matching queries
//!
//! The index is a strict sequence trie. Two move orders reaching the same
//! position stay on separate branches.

mod index;
mod node;


pub use index::OpeningTrieIndex;
pub use node::{NodeId, TrieNode};

/// Identifier of a recorded opening
pub type OpeningId = u32;
