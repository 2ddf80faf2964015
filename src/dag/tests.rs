//! Scenario tests for the DAG compiler.
//!
//! These compile small and pathological range sets end to end and check the
//! in-memory walk, the encoded bytes and the blob reader against each other.

use super::*;
use crate::range::{AddrRange, AddressWidth};
use crate::Error;

fn width(bits: u32) -> AddressWidth {
    AddressWidth::new(bits).expect("valid width")
}

fn compile(bits: u32, ranges: &[AddrRange]) -> CompiledDag {
    DagCompiler::new(width(bits))
        .compile(ranges)
        .expect("Failed to compile ranges")
}

fn reader(compiled: &CompiledDag) -> DagReader {
    DagReader::from_bytes(compiled.bytes.clone(), compiled.width).expect("Failed to read blob")
}

fn in_ranges(ranges: &[AddrRange], addr: u128) -> bool {
    ranges.iter().any(|r| r.contains(addr))
}

/// Cheap deterministic pseudo-random sequence.
fn lcg(seed: &mut u64) -> u64 {
    *seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *seed >> 33
}

// ============================================================================
// Reference Scenarios
// ============================================================================

#[test]
fn test_empty_input_has_empty_root() {
    let built = DagCompiler::new(width(8)).build(&[]).unwrap();
    assert!(built.root().children().iter().all(Option::is_none));

    let compiled = compile(8, &[]);
    assert_eq!(compiled.bytes, vec![0, 0, 0, 0]);
    let reader = reader(&compiled);
    for addr in 0..=0xFF {
        assert!(!reader.contains(addr));
    }
}

#[test]
fn test_whole_space_sets_every_top_level_slot() {
    let ranges = [AddrRange::new(0, 0xFF)];
    let built = DagCompiler::new(width(8)).build(&ranges).unwrap();

    assert!(built.root().is_full());
    assert_eq!(built.live_count(), 1);

    let compiled = compile(8, &ranges);
    assert_eq!(compiled.bytes, vec![0x00, 0x00, 0xFF, 0xFF]);
    let reader = reader(&compiled);
    for addr in 0..=0xFF {
        assert!(reader.contains(addr));
    }
}

#[test]
fn test_two_distant_hosts_stay_separate() {
    let ranges = [AddrRange::host(0x00), AddrRange::host(0xFF)];
    let compiled = compile(8, &ranges);

    assert_eq!(compiled.stats.reduce.nodes_before, 3);
    assert_eq!(compiled.stats.reduce.nodes_after, 3);
    assert_eq!(
        compiled.bytes,
        vec![
            0x01, 0x80, 0x00, 0x00, 0x04, 0x00, 0x06, 0x00, // root
            0x00, 0x00, 0x01, 0x00, // 0x0_
            0x00, 0x00, 0x00, 0x80, // 0xF_
        ]
    );

    let reader = reader(&compiled);
    for addr in 0..=0xFF {
        assert_eq!(reader.contains(addr), addr == 0x00 || addr == 0xFF, "{:#x}", addr);
    }
}

#[test]
fn test_same_shaped_blocks_share_one_node() {
    let ranges = [AddrRange::new(0x30, 0x37), AddrRange::new(0xC0, 0xC7)];
    let built = DagCompiler::new(width(8)).build(&ranges).unwrap();

    assert_eq!(built.reduce_stats.nodes_before, 3);
    assert_eq!(built.reduce_stats.nodes_after, 2);

    let shared = built.root().children()[3].unwrap();
    assert_eq!(built.root().children()[0xC], Some(shared));
    assert_eq!(built.node(shared).parent_count(), 2);
}

// ============================================================================
// Reduction Properties
// ============================================================================

#[test]
fn test_reduction_converges_over_depth() {
    // identical 3-level tails under four different top nibbles
    let ranges: Vec<AddrRange> = [0x1_2340u128, 0x5_2340, 0x9_2340, 0xD_2340]
        .iter()
        .map(|&a| AddrRange::new(a, a + 7))
        .collect();
    let built = DagCompiler::new(width(20)).build(&ranges).unwrap();

    // root + one shared chain of four nodes
    assert_eq!(built.reduce_stats.nodes_before, 1 + 4 * 4);
    assert_eq!(built.reduce_stats.nodes_after, 1 + 4);
    assert_eq!(built.reduce_stats.passes, 5);
}

#[test]
fn test_no_full_node_survives() {
    let mut seed = 7;
    let ranges = random_ranges(&mut seed, 24, 400);
    let built = DagCompiler::new(width(24)).build(&ranges).unwrap();

    for id in built.live_ids().filter(|id| !id.is_root()) {
        assert!(!built.node(id).is_full());
    }
}

#[test]
fn test_rereduce_is_noop() {
    let mut seed = 11;
    let ranges = random_ranges(&mut seed, 16, 200);
    let mut dag = BitDag::new(width(16));
    dag.insert_all(&ranges).unwrap();
    let first = dag.reduce().unwrap();
    let second = dag.reduce().unwrap();

    assert_eq!(second.merged, 0);
    assert_eq!(second.nodes_after, first.nodes_after);
}

// ============================================================================
// Size Limits
// ============================================================================

#[test]
fn test_overflow_is_fatal() {
    // 16384 hosts with pairwise distinct low halves: every subtree below
    // the third level is unique, so nothing merges.
    let ranges: Vec<AddrRange> = (0u128..16384)
        .map(|i| AddrRange::host((i << 16) | ((i * 40503) & 0xFFFF)))
        .collect();

    let result = DagCompiler::new(AddressWidth::V4).compile(&ranges);
    match result {
        Err(Error::AddressOverflow { size, limit }) => {
            assert_eq!(limit, MAX_BLOB_SIZE);
            assert!(size >= MAX_BLOB_SIZE);
        }
        other => panic!("expected overflow, got {:?}", other.map(|c| c.stats)),
    }
}

#[test]
fn test_large_mergeable_input_fits() {
    // same tail everywhere: collapses to a handful of nodes
    let ranges: Vec<AddrRange> = (0u128..16384)
        .map(|i| AddrRange::host((i << 16) | 0x0101))
        .collect();
    let compiled = DagCompiler::new(AddressWidth::V4).compile(&ranges).unwrap();
    assert!(compiled.bytes.len() < MAX_BLOB_SIZE);
    assert!(compiled.stats.reduce.nodes_after < 16);
}

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn test_reader_agrees_with_ranges() {
    let mut seed = 42;
    let ranges = random_ranges(&mut seed, 16, 300);
    let compiled = compile(16, &ranges);
    let reader = reader(&compiled);

    for addr in 0..=0xFFFFu128 {
        assert_eq!(reader.contains(addr), in_ranges(&ranges, addr), "{:#x}", addr);
    }
}

#[test]
fn test_reader_agrees_with_probe_points() {
    let mut seed = 1234;
    let ranges = random_ranges(&mut seed, 32, 2000);
    let compiled = compile(32, &ranges);
    let reader = reader(&compiled);

    for (addr, expected) in probe_points(&ranges, AddressWidth::V4.max()) {
        assert_eq!(reader.contains(addr), expected, "{:#x}", addr);
    }
}

#[test]
fn test_ipv6_ranges() {
    let ranges = [
        AddrRange::new(0x2001_0420u128 << 96, (0x2001_0421u128 << 96) - 1),
        AddrRange::host(0x2a00_1450_4001_0800_0000_0000_0000_200e),
        AddrRange::new(u128::MAX - 0xFF, u128::MAX),
    ];
    let compiled = compile(128, &ranges);
    let reader = reader(&compiled);

    assert!(reader.contains(0x2001_0420_4000_0001u128 << 64));
    assert!(reader.contains(0x2a00_1450_4001_0800_0000_0000_0000_200e));
    assert!(!reader.contains(0x2a00_1450_4001_0800_0000_0000_0000_200f));
    assert!(reader.contains(u128::MAX));
    assert!(!reader.contains(0));
    assert!(!reader.contains(u128::MAX - 0x100));
}

#[test]
fn test_compile_is_deterministic() {
    let mut seed = 99;
    let ranges = random_ranges(&mut seed, 32, 1000);
    let first = compile(32, &ranges);
    let second = compile(32, &ranges);
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(first.stats, second.stats);
}

// ============================================================================
// Error Cases
// ============================================================================

#[test]
fn test_sibling_blocks_that_fill_a_node_are_rejected() {
    // two halves of 0x100/4 that were never aggregated
    let ranges = [AddrRange::new(0x100, 0x17F), AddrRange::new(0x180, 0x1FF)];
    let result = DagCompiler::new(width(12)).compile(&ranges);
    assert!(matches!(result, Err(Error::FullNode(_))));
}

#[test]
fn test_misaligned_input_is_rejected() {
    let result = DagCompiler::new(width(8)).compile(&[AddrRange::new(0x10, 0x1E)]);
    assert!(matches!(result, Err(Error::MisalignedRange { .. })));
}

/// Random sorted, disjoint, aligned blocks. Adjacent siblings are avoided
/// by leaving a gap after every block.
fn random_ranges(seed: &mut u64, bits: u32, count: usize) -> Vec<AddrRange> {
    let max = AddressWidth::new(bits).unwrap().max();
    let mut ranges = Vec::with_capacity(count);
    let mut cursor: u128 = 0;

    for _ in 0..count {
        let prefix_bits = (lcg(seed) % 9) as u32;
        let size = 1u128 << prefix_bits;
        let gap = (lcg(seed) % 64) as u128 + 1;
        let start = (cursor + gap + size - 1) / size * size;
        let end = start + size - 1;
        if end >= max {
            break;
        }
        ranges.push(AddrRange::new(start, end));
        // gap of at least one block keeps neighbours from filling a parent
        cursor = end + size + 1;
    }
    ranges
}
