//! Byte offset assignment.

use super::format::{record_size, MAX_BLOB_SIZE};
use super::node::{BitDag, NodeId, Stage};
use crate::{Error, Result};

impl BitDag {
    /// Encoded size of one node: header plus one pointer per real child that
    /// still has a parent.
    pub fn encoded_size(&self, id: NodeId) -> usize {
        let pointers = self
            .node(id)
            .real_children()
            .filter(|(_, child)| self.node(*child).parent_count() > 0)
            .count();
        record_size(pointers)
    }

    /// Assign every live node its byte offset, in creation order.
    ///
    /// Returns the total blob size. Fails if the blob would not be
    /// addressable with 16-bit half-offsets.
    pub fn assign(&mut self) -> Result<usize> {
        match self.stage {
            Stage::Building => return Err(Error::OutOfOrder("assign before reduction")),
            Stage::Addressed => return Err(Error::OutOfOrder("assign twice")),
            Stage::Reduced => {}
        }

        let ids: Vec<NodeId> = self.live_ids().collect();
        let mut cursor = 0usize;
        let mut offsets = Vec::with_capacity(ids.len());
        for &id in &ids {
            offsets.push(cursor);
            cursor += self.encoded_size(id);
        }

        log::info!("Total size: {} bytes for {} nodes", cursor, ids.len());
        if cursor >= MAX_BLOB_SIZE {
            return Err(Error::AddressOverflow {
                size: cursor,
                limit: MAX_BLOB_SIZE,
            });
        }

        for (id, offset) in ids.into_iter().zip(offsets) {
            self.node_mut(id).address = Some(offset as u32);
        }
        self.stage = Stage::Addressed;
        Ok(cursor)
    }
}
