//! ipdag - compiles IP region range lists into compact membership indexes.
//!
//! A region (for example every network block belonging to a set of
//! countries) is given as a list of CIDR networks. This crate turns it into a
//! small binary blob per address family that answers "is this address in the
//! region?" with one nibble-indexed walk, no range list needed at query time.
//!
//! # Pipeline
//!
//! 1. **Load**: read CIDR lists ([`source`]), optionally gzip compressed
//! 2. **Normalize**: aggregate into sorted, disjoint, aligned ranges ([`range`])
//! 3. **Build**: insert every range into a 16-way nibble trie
//! 4. **Reduce**: merge identical subtrees until a fixpoint, turning the trie
//!    into a DAG
//! 5. **Address**: lay nodes out back to back; the blob must stay below 128 KiB
//! 6. **Verify**: re-walk range boundaries and midpoints before writing
//! 7. **Encode**: emit `has_child`/`set_child` bitmasks plus half-offset
//!    pointers
//!
//! Any failure aborts the whole run; nothing is written for a region that
//! does not compile and verify.
//!
//! # Quick Start
//!
//! ```
//! use ipdag::{AddrRange, AddressWidth, DagCompiler, DagReader};
//!
//! // 2.0.0.0/12
//! let ranges = [AddrRange::new(0x0200_0000, 0x020F_FFFF)];
//! let compiled = DagCompiler::new(AddressWidth::V4).compile(&ranges).unwrap();
//!
//! let reader = DagReader::from_bytes(compiled.bytes, AddressWidth::V4).unwrap();
//! assert!(reader.contains(0x0200_0001));
//! assert!(!reader.contains(0x0210_0000));
//! ```
//!
//! # Artifacts
//!
//! For a region named `N` the `ipdag-gen` tool writes:
//!
//! - `N_v4.btr`, `N_v6.btr`: DAG blobs (see [`dag`] for the layout)
//! - `N_v4.bin`, `N_v6.bin`: fixed-width prefix lists ([`prefix`])
//! - `N.json`: build report ([`report`])

mod error;

pub mod config;
pub mod dag;
pub mod prefix;
pub mod range;
pub mod region;
pub mod report;
pub mod source;

// Re-export core types
pub use error::{Error, Result};
pub use range::{AddrRange, AddressWidth, Family, FamilyRanges};

// Re-export compiler types
pub use dag::{BitDag, CompileStats, CompiledDag, DagCompiler, DagReader, ReduceStats, RegionIndex};

// Re-export build pipeline
pub use config::BuildConfig;
pub use region::{build, CompiledRegion, WriteOptions};
pub use report::BuildReport;
