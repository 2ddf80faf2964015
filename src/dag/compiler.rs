//! End-to-end compilation of one address family.

use super::node::BitDag;
use super::reduce::ReduceStats;
use crate::range::{validate_sequence, AddrRange, AddressWidth};
use crate::Result;

/// Summary of one compilation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Number of input ranges
    pub ranges: usize,
    /// Node counts from the deduplicator
    pub reduce: ReduceStats,
    /// Size of the encoded blob in bytes
    pub size: usize,
}

/// A verified, encoded DAG.
#[derive(Debug, Clone)]
pub struct CompiledDag {
    pub width: AddressWidth,
    pub bytes: Vec<u8>,
    pub stats: CompileStats,
}

/// Compiles sorted range lists into DAG blobs.
///
/// # Examples
/// ```
/// use ipdag::{AddrRange, AddressWidth, DagCompiler};
///
/// let compiler = DagCompiler::new(AddressWidth::V4);
/// let compiled = compiler.compile(&[AddrRange::new(0x0200_0000, 0x020F_FFFF)]).unwrap();
/// assert_eq!(compiled.stats.ranges, 1);
/// assert!(!compiled.bytes.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DagCompiler {
    width: AddressWidth,
}

impl DagCompiler {
    pub fn new(width: AddressWidth) -> Self {
        Self { width }
    }

    pub fn width(&self) -> AddressWidth {
        self.width
    }

    /// Build, reduce, address, self-check and encode.
    ///
    /// Nothing is returned unless every stage succeeds.
    pub fn compile(&self, ranges: &[AddrRange]) -> Result<CompiledDag> {
        let built = self.build(ranges)?;
        let bytes = built.encode()?;
        let stats = CompileStats {
            ranges: ranges.len(),
            reduce: built.reduce_stats,
            size: bytes.len(),
        };
        log::info!(
            "Compiled {} ranges ({}) into {} bytes",
            stats.ranges,
            self.width,
            stats.size
        );
        Ok(CompiledDag {
            width: self.width,
            bytes,
            stats,
        })
    }

    /// Run every stage up to the self-check and return the addressed DAG.
    pub fn build(&self, ranges: &[AddrRange]) -> Result<Built> {
        validate_sequence(ranges, self.width)?;

        let mut dag = BitDag::new(self.width);
        dag.insert_all(ranges)?;
        let reduce_stats = dag.reduce()?;
        dag.assign()?;
        dag.verify(ranges)?;

        Ok(Built { dag, reduce_stats })
    }
}

/// An addressed and verified DAG with its reduction stats.
#[derive(Debug, Clone)]
pub struct Built {
    pub dag: BitDag,
    pub reduce_stats: ReduceStats,
}

impl std::ops::Deref for Built {
    type Target = BitDag;

    fn deref(&self) -> &BitDag {
        &self.dag
    }
}
