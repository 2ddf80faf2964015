//! Serialization of addressed nodes.

use super::format::NodeRecord;
use super::node::{BitDag, NodeId, Stage};
use crate::{Error, Result};

impl BitDag {
    /// Build the record for one addressed node.
    ///
    /// Root pointers land in `set_child`; pointers to nodes with a positive
    /// address land in `has_child` with the address halved.
    pub fn record(&self, id: NodeId) -> NodeRecord {
        let mut record = NodeRecord::default();
        for (slot, child) in self.node(id).children.iter().enumerate() {
            let Some(child) = child else { continue };
            if child.is_root() {
                record.set_child |= 1 << slot;
                continue;
            }
            if let Some(address) = self.node(*child).address.filter(|a| *a > 0) {
                record.has_child |= 1 << slot;
                record.pointers.push((address >> 1) as u16);
            }
        }
        record
    }

    /// Concatenate every live record in address order.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.stage != Stage::Addressed {
            return Err(Error::OutOfOrder("encode before addressing"));
        }

        let mut out = Vec::new();
        for id in self.live_ids() {
            let expected = self.node(id).address.unwrap_or_default() as usize;
            if out.len() != expected {
                return Err(Error::EncodingMismatch {
                    node: id.index(),
                    expected,
                    actual: out.len(),
                });
            }

            let record = self.record(id);
            if record.size() != self.encoded_size(id) {
                return Err(Error::EncodingMismatch {
                    node: id.index(),
                    expected: expected + self.encoded_size(id),
                    actual: expected + record.size(),
                });
            }
            record.write_to(&mut out);
        }
        Ok(out)
    }
}
