//! Self-check of the finished DAG against its input ranges.

use ahash::AHashMap;

use super::node::{BitDag, Children, NodeId};
use crate::range::AddrRange;
use crate::{Error, Result};

impl BitDag {
    /// Check structural invariants and re-test range boundaries.
    ///
    /// `ranges` must be the sorted sequence the DAG was built from.
    pub fn verify(&self, ranges: &[AddrRange]) -> Result<()> {
        self.check_structure()?;

        let mut checked = 0usize;
        for (address, expected) in probe_points(ranges, self.width.max()) {
            if self.contains(address) != expected {
                return Err(Error::SelfCheck { address, expected });
            }
            checked += 1;
        }
        log::debug!("Self-check passed for {} addresses", checked);
        Ok(())
    }

    fn check_structure(&self) -> Result<()> {
        let mut seen: AHashMap<Children, NodeId> = AHashMap::new();
        for id in self.live_ids().filter(|id| !id.is_root()) {
            let node = self.node(id);
            if node.is_full() {
                return Err(Error::FullNode(id.index()));
            }
            if let Some(first) = seen.insert(node.children, id) {
                return Err(Error::MissedMerge {
                    first: first.index(),
                    second: id.index(),
                });
            }
        }
        Ok(())
    }
}

/// Boundary and midpoint addresses of each range with their expected
/// membership. Neighbours outside a range are skipped when an adjacent range
/// covers them or they fall outside the address space.
pub fn probe_points(ranges: &[AddrRange], max: u128) -> Vec<(u128, bool)> {
    let mut points = Vec::with_capacity(ranges.len() * 5);
    for (n, range) in ranges.iter().enumerate() {
        if let Some(before) = range.start.checked_sub(1) {
            let adjacent = n > 0 && ranges[n - 1].end == before;
            if !adjacent {
                points.push((before, false));
            }
        }
        points.push((range.start, true));
        points.push((range.midpoint(), true));
        points.push((range.end, true));
        if range.end < max {
            let after = range.end + 1;
            let adjacent = ranges.get(n + 1).is_some_and(|next| next.start == after);
            if !adjacent {
                points.push((after, false));
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::AddressWidth;

    #[test]
    fn test_probe_points_skip_adjacent_neighbours() {
        let ranges = [AddrRange::new(0x00, 0x0F), AddrRange::new(0x10, 0x1F)];
        let points = probe_points(&ranges, 0xFF);

        assert!(!points.contains(&(0x0F, false)));
        assert!(!points.contains(&(0x10, false)));
        assert!(points.contains(&(0x20, false)));
        assert!(points.contains(&(0x17, true)));
        // start of the space has no predecessor
        assert_eq!(points[0], (0x00, true));
    }

    #[test]
    fn test_probe_points_at_space_edges() {
        let ranges = [AddrRange::new(0, u128::MAX)];
        let points = probe_points(&ranges, u128::MAX);
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|(_, expected)| *expected));
    }

    #[test]
    fn test_verify_accepts_built_dag() {
        let ranges = [
            AddrRange::host(0x05),
            AddrRange::new(0x40, 0x7F),
            AddrRange::new(0xA0, 0xA3),
        ];
        let mut dag = BitDag::new(AddressWidth::new(8).unwrap());
        dag.insert_all(&ranges).unwrap();
        dag.reduce().unwrap();
        assert!(dag.verify(&ranges).is_ok());
    }

    #[test]
    fn test_verify_detects_missing_range() {
        let mut dag = BitDag::new(AddressWidth::new(8).unwrap());
        dag.insert(AddrRange::host(0x05)).unwrap();
        dag.reduce().unwrap();

        let claimed = [AddrRange::host(0x05), AddrRange::host(0x09)];
        assert!(matches!(
            dag.verify(&claimed),
            Err(Error::SelfCheck {
                address: 0x09,
                expected: true
            })
        ));
    }

    #[test]
    fn test_verify_detects_full_node() {
        let ranges = [AddrRange::new(0x100, 0x17F), AddrRange::new(0x180, 0x1FF)];
        let mut dag = BitDag::new(AddressWidth::new(12).unwrap());
        dag.insert_all(&ranges).unwrap();
        dag.reduce().unwrap();
        assert!(matches!(dag.verify(&ranges), Err(Error::FullNode(_))));
    }

    #[test]
    fn test_verify_detects_missed_merge() {
        let ranges = [AddrRange::new(0x10, 0x13), AddrRange::new(0x20, 0x23)];
        let mut dag = BitDag::new(AddressWidth::new(8).unwrap());
        dag.insert_all(&ranges).unwrap();
        assert!(matches!(
            dag.verify(&ranges),
            Err(Error::MissedMerge { .. })
        ));
    }
}
