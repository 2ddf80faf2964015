//! Deduplication of identical subtrees.
//!
//! Two nodes are merged when their children arrays are identical slot by
//! slot. Each merge makes more parents identical, so passes repeat until one
//! finds nothing; the number of passes is bounded by the trie depth.

use ahash::AHashMap;

use super::node::{BitDag, Children, NodeId, Stage};
use crate::{Error, Result};

/// Node counts reported by [`BitDag::reduce`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReduceStats {
    /// Live nodes before reduction, root included
    pub nodes_before: usize,
    /// Live nodes after reduction, root included
    pub nodes_after: usize,
    /// Passes run, including the final pass that found nothing
    pub passes: usize,
    /// Nodes merged away
    pub merged: usize,
}

impl BitDag {
    /// Merge structurally identical nodes until a fixpoint.
    pub fn reduce(&mut self) -> Result<ReduceStats> {
        if self.stage > Stage::Reduced {
            return Err(Error::OutOfOrder("reduce after addressing"));
        }

        let nodes_before = self.live_count();
        let mut passes = 0;
        let mut merged = 0;

        loop {
            passes += 1;
            let merges = self.find_duplicates();
            if merges.is_empty() {
                break;
            }
            log::debug!("Pass {}: merging {} duplicate nodes", passes, merges.len());
            merged += merges.len();
            for (duplicate, canonical) in merges {
                self.merge(duplicate, canonical);
            }
        }

        self.stage = Stage::Reduced;
        let stats = ReduceStats {
            nodes_before,
            nodes_after: self.live_count(),
            passes,
            merged,
        };
        log::info!(
            "Reduced {} => {} nodes in {} passes",
            stats.nodes_before,
            stats.nodes_after,
            stats.passes
        );
        Ok(stats)
    }

    /// Pair every duplicate with the first-created node sharing its children.
    ///
    /// Classes come from one snapshot, so merges applied afterwards rewrite
    /// all members of a class the same way.
    fn find_duplicates(&self) -> Vec<(NodeId, NodeId)> {
        let mut canonical: AHashMap<Children, NodeId> = AHashMap::with_capacity(self.nodes.len());
        let mut merges = Vec::new();

        for id in self.live_ids().filter(|id| !id.is_root()) {
            let children = self.node(id).children;
            match canonical.get(&children) {
                Some(&first) => merges.push((id, first)),
                None => {
                    canonical.insert(children, id);
                }
            }
        }
        merges
    }

    /// Point every parent of `duplicate` at `canonical`, then retire it.
    fn merge(&mut self, duplicate: NodeId, canonical: NodeId) {
        let edges = std::mem::take(&mut self.node_mut(duplicate).parents);
        for &(parent, slot) in &edges {
            self.node_mut(parent).children[slot as usize] = Some(canonical);
        }
        self.node_mut(canonical).parents.extend(edges);
        self.retire(duplicate);
    }
}
