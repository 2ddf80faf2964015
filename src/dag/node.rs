//! Node arena shared by every compiler stage.

use std::fmt;

use crate::range::AddressWidth;

/// Number of child slots per node, one per nibble value.
pub const FANOUT: usize = 16;

/// Index of a node inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The sentinel root. A slot pointing here means "fully included".
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Children of a node, one optional edge per nibble.
pub type Children = [Option<NodeId>; FANOUT];

/// A trie/DAG vertex.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) children: Children,
    /// Back-edges `(parent, slot)` for every slot pointing at this node.
    pub(crate) parents: Vec<(NodeId, u8)>,
    pub(crate) address: Option<u32>,
    pub(crate) retired: bool,
}

impl Node {
    fn new() -> Self {
        Self {
            children: [None; FANOUT],
            parents: Vec::new(),
            address: None,
            retired: false,
        }
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub fn parent_count(&self) -> usize {
        self.parents.len()
    }

    pub fn address(&self) -> Option<u32> {
        self.address
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// Whether every slot points at the root.
    pub fn is_full(&self) -> bool {
        self.children.iter().all(|c| *c == Some(NodeId::ROOT))
    }

    /// Slots pointing at a real (non-root) node.
    pub(crate) fn real_children(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(slot, c)| match c {
                Some(id) if !id.is_root() => Some((slot, *id)),
                _ => None,
            })
    }
}

/// Progress of a compilation run. Each stage only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Building,
    Reduced,
    Addressed,
}

/// Nibble trie over one address space, reduced in place into a DAG.
///
/// The arena owns every node; edges are [`NodeId`] indices and node 0 is the
/// root sentinel.
#[derive(Debug, Clone)]
pub struct BitDag {
    pub(crate) width: AddressWidth,
    pub(crate) nodes: Vec<Node>,
    pub(crate) stage: Stage,
}

impl BitDag {
    /// Create an empty DAG holding only the root.
    pub fn new(width: AddressWidth) -> Self {
        Self {
            width,
            nodes: vec![Node::new()],
            stage: Stage::Building,
        }
    }

    pub fn width(&self) -> AddressWidth {
        self.width
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn root(&self) -> &Node {
        self.node(NodeId::ROOT)
    }

    /// Live node ids in creation order, root first.
    pub fn live_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.retired)
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Number of live nodes, root included.
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.retired).count()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Allocate a node hanging off `parent` at `slot`.
    pub(crate) fn alloc_child(&mut self, parent: NodeId, slot: usize) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let mut node = Node::new();
        node.parents.push((parent, slot as u8));
        self.nodes.push(node);
        self.node_mut(parent).children[slot] = Some(id);
        id
    }

    /// Drop the back-edges this node holds on its children and retire it.
    pub(crate) fn retire(&mut self, id: NodeId) {
        let edges: Vec<(usize, NodeId)> = self.node(id).real_children().collect();
        for (slot, child) in edges {
            let parents = &mut self.node_mut(child).parents;
            if let Some(pos) = parents.iter().position(|&e| e == (id, slot as u8)) {
                parents.swap_remove(pos);
            }
        }
        let node = self.node_mut(id);
        node.parents.clear();
        node.retired = true;
    }

    /// Membership walk over the in-memory DAG.
    ///
    /// An empty slot means absent, a root pointer means present, anything else
    /// descends one nibble. Running out of nibbles means absent.
    pub fn contains(&self, addr: u128) -> bool {
        let mut current = NodeId::ROOT;
        for level in 0..self.width.levels() {
            match self.node(current).children[self.width.nibble(addr, level)] {
                None => return false,
                Some(NodeId::ROOT) => return true,
                Some(next) => current = next,
            }
        }
        false
    }
}
