//! Nibble DAG compiler and its binary format.
//!
//! Ranges are inserted into a 16-way trie (one nibble per level), identical
//! subtrees are merged into shared nodes, and the surviving nodes are laid
//! out back to back. A child slot pointing at the root means "everything
//! below is included".
//!
//! # Blob Structure
//!
//! ```text
//! +------------------+
//! |   ROOT RECORD    |  offset 0, top-level nibble table
//! +------------------+
//! |   NODE RECORD    |  creation order
//! +------------------+
//! |       ...        |
//! +------------------+
//!
//! record (little-endian):
//! +-----------+-----------+---------------------------+
//! | has_child | set_child | ptr * popcount(has_child) |
//! |   u16     |   u16     | u16 = child offset >> 1   |
//! +-----------+-----------+---------------------------+
//! ```
//!
//! There is no header: the reader must know the address width, and the
//! blob length is the file size. Blobs are always below 128 KiB.

mod builder;
mod compiler;
mod encode;
mod format;
mod layout;
mod node;
mod reader;
mod reduce;
mod verify;

#[cfg(test)]
mod tests;

pub use compiler::{Built, CompileStats, CompiledDag, DagCompiler};
pub use format::*;
pub use node::{BitDag, Children, Node, NodeId, Stage, FANOUT};
pub use reader::{DagReader, RegionIndex};
pub use reduce::ReduceStats;
pub use verify::probe_points;
