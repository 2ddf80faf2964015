//! Error types for ipdag.

use thiserror::Error;

/// Error type for ipdag operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Address width is not a multiple of 4 in 4..=128
    #[error("invalid address width: {0} (must be a multiple of 4 between 4 and 128)")]
    InvalidWidth(u32),

    /// Range start is greater than its end
    #[error("invalid range: start {start:#x} > end {end:#x}")]
    InvalidRange { start: u128, end: u128 },

    /// Range is not a power-of-two aligned block
    #[error("range {start:#x}-{end:#x} is not a power-of-two aligned block")]
    MisalignedRange { start: u128, end: u128 },

    /// Range end does not fit in the address width
    #[error("range end {end:#x} does not fit in {width} bits")]
    RangeOutOfWidth { end: u128, width: u32 },

    /// Range sequence is not sorted ascending and disjoint
    #[error("range #{index} is not sorted after, or overlaps, its predecessor")]
    UnorderedRanges { index: usize },

    /// Range overlaps a range that was already inserted
    #[error("range {start:#x}-{end:#x} overlaps an inserted range")]
    OverlappingRange { start: u128, end: u128 },

    /// Branch point to collapse is referenced by more than one parent
    #[error("branch point has {parents} parents, expected exactly one")]
    SharedBranchPoint { parents: usize },

    /// Encoded DAG does not fit in 16-bit half-offsets
    #[error("encoded size {size} bytes reaches the {limit} byte addressing limit")]
    AddressOverflow { size: usize, limit: usize },

    /// Self-check walk disagrees with the input ranges
    #[error("self-check failed: {address:#x} expected {expected}")]
    SelfCheck { address: u128, expected: bool },

    /// A node has every slot pointing at the root
    #[error("node #{0} has all 16 children fully set")]
    FullNode(usize),

    /// Two live nodes share an identical children array after reduction
    #[error("nodes #{first} and #{second} are identical after reduction")]
    MissedMerge { first: usize, second: usize },

    /// Compiler stage called out of order
    #[error("cannot {0} at this stage")]
    OutOfOrder(&'static str),

    /// Encoded record disagrees with its assigned address or size
    #[error("node #{node} encoded at offset {actual}, expected {expected}")]
    EncodingMismatch {
        node: usize,
        expected: usize,
        actual: usize,
    },

    /// Unparseable line in a CIDR list
    #[error("invalid network on line {line}: {value}")]
    InvalidNetwork { line: usize, value: String },

    /// Compiled blob cannot be read
    #[error("invalid index blob: {0}")]
    InvalidBlob(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for ipdag operations.
pub type Result<T> = std::result::Result<T, Error>;
