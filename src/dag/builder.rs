//! Trie construction: one range at a time, nibble by nibble.

use super::node::{BitDag, NodeId, Stage};
use crate::range::AddrRange;
use crate::{Error, Result};

impl BitDag {
    /// Insert one aligned block.
    ///
    /// The range is validated before any node is created. Ranges must not
    /// overlap ranges inserted earlier.
    pub fn insert(&mut self, range: AddrRange) -> Result<()> {
        if self.stage != Stage::Building {
            return Err(Error::OutOfOrder("insert after reduction"));
        }
        range.check_aligned(self.width)?;

        let levels = self.width.levels();
        let mut current = NodeId::ROOT;

        for level in 0..levels {
            let a = self.width.nibble(range.start, level);
            let b = self.width.nibble(range.end, level);

            if a == b && level + 1 < levels {
                current = self.descend(current, a, range)?;
                continue;
            }

            // Branch point: everything below this nibble pair is covered.
            if a == 0 && b == 15 && !current.is_root() {
                self.collapse_into_parent(current, range)?;
            } else {
                for slot in a..=b {
                    self.mark_full(current, slot, range)?;
                }
            }
            return Ok(());
        }

        Ok(())
    }

    /// Insert every range in order.
    pub fn insert_all(&mut self, ranges: &[AddrRange]) -> Result<()> {
        for range in ranges {
            self.insert(*range)?;
        }
        Ok(())
    }

    fn descend(&mut self, current: NodeId, slot: usize, range: AddrRange) -> Result<NodeId> {
        match self.node(current).children[slot] {
            None => Ok(self.alloc_child(current, slot)),
            Some(NodeId::ROOT) => Err(overlap(range)),
            Some(next) => Ok(next),
        }
    }

    fn mark_full(&mut self, current: NodeId, slot: usize, range: AddrRange) -> Result<()> {
        let node = self.node_mut(current);
        if node.children[slot].is_some() {
            return Err(overlap(range));
        }
        node.children[slot] = Some(NodeId::ROOT);
        Ok(())
    }

    /// Replace the single parent's pointer to `current` with a root pointer.
    fn collapse_into_parent(&mut self, current: NodeId, range: AddrRange) -> Result<()> {
        let node = self.node(current);
        if node.children.iter().any(Option::is_some) {
            return Err(overlap(range));
        }
        let (parent, slot) = match node.parents.as_slice() {
            [edge] => *edge,
            edges => {
                return Err(Error::SharedBranchPoint {
                    parents: edges.len(),
                })
            }
        };

        self.node_mut(parent).children[slot as usize] = Some(NodeId::ROOT);
        self.retire(current);
        Ok(())
    }
}

fn overlap(range: AddrRange) -> Error {
    Error::OverlappingRange {
        start: range.start,
        end: range.end,
    }
}
