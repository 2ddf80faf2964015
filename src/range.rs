//! Address ranges, address widths and normalization of raw networks.

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::fmt;

use crate::{Error, Result};

/// Number of bits consumed per trie level.
pub const NIBBLE_BITS: u32 = 4;

/// Width of an address space in bits.
///
/// Must be a multiple of 4 so every address splits into whole nibbles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressWidth(u32);

impl AddressWidth {
    /// IPv4 address space.
    pub const V4: AddressWidth = AddressWidth(32);
    /// IPv6 address space.
    pub const V6: AddressWidth = AddressWidth(128);

    /// Create a width, rejecting anything that is not a multiple of 4 in 4..=128.
    pub fn new(bits: u32) -> Result<Self> {
        if bits == 0 || bits > 128 || bits % NIBBLE_BITS != 0 {
            return Err(Error::InvalidWidth(bits));
        }
        Ok(Self(bits))
    }

    /// Width in bits.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Number of nibbles (trie levels) in an address.
    pub fn levels(&self) -> usize {
        (self.0 / NIBBLE_BITS) as usize
    }

    /// Largest address in this space.
    pub fn max(&self) -> u128 {
        if self.0 == 128 {
            u128::MAX
        } else {
            (1u128 << self.0) - 1
        }
    }

    /// Nibble of `value` at `level`, most significant first.
    pub fn nibble(&self, value: u128, level: usize) -> usize {
        let shift = self.0 - NIBBLE_BITS * (level as u32 + 1);
        ((value >> shift) & 0xF) as usize
    }
}

impl fmt::Display for AddressWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bits", self.0)
    }
}

/// IP address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Address width of this family.
    pub fn width(&self) -> AddressWidth {
        match self {
            Family::V4 => AddressWidth::V4,
            Family::V6 => AddressWidth::V6,
        }
    }

    /// Short name used in file names and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Family::V4 => "v4",
            Family::V6 => "v6",
        }
    }
}

/// Inclusive address range `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddrRange {
    pub start: u128,
    pub end: u128,
}

impl AddrRange {
    pub fn new(start: u128, end: u128) -> Self {
        Self { start, end }
    }

    /// Single-address range.
    pub fn host(addr: u128) -> Self {
        Self::new(addr, addr)
    }

    /// Check that this range is exactly one power-of-two aligned block
    /// inside `width`.
    pub fn check_aligned(&self, width: AddressWidth) -> Result<()> {
        if self.start > self.end {
            return Err(Error::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        if self.end > width.max() {
            return Err(Error::RangeOutOfWidth {
                end: self.end,
                width: width.bits(),
            });
        }
        // start ^ end must be a run of trailing ones with start zero underneath
        let host_bits = self.start ^ self.end;
        if host_bits & host_bits.wrapping_add(1) != 0 || self.start & host_bits != 0 {
            return Err(Error::MisalignedRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Whether `addr` falls inside this range.
    pub fn contains(&self, addr: u128) -> bool {
        self.start <= addr && addr <= self.end
    }

    /// Midpoint, rounded down.
    pub fn midpoint(&self) -> u128 {
        self.start + (self.end - self.start) / 2
    }
}

impl From<Ipv4Net> for AddrRange {
    fn from(net: Ipv4Net) -> Self {
        Self::new(
            u32::from(net.network()) as u128,
            u32::from(net.broadcast()) as u128,
        )
    }
}

impl From<Ipv6Net> for AddrRange {
    fn from(net: Ipv6Net) -> Self {
        Self::new(u128::from(net.network()), u128::from(net.broadcast()))
    }
}

/// Validate a whole range sequence: every range aligned, ascending and
/// disjoint from its predecessor.
pub fn validate_sequence(ranges: &[AddrRange], width: AddressWidth) -> Result<()> {
    for (index, range) in ranges.iter().enumerate() {
        range.check_aligned(width)?;
        if index > 0 && range.start <= ranges[index - 1].end {
            return Err(Error::UnorderedRanges { index });
        }
    }
    Ok(())
}

/// Canonical ranges for both address families.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyRanges {
    pub v4: Vec<AddrRange>,
    pub v6: Vec<AddrRange>,
}

impl FamilyRanges {
    /// Ranges of one family.
    pub fn get(&self, family: Family) -> &[AddrRange] {
        match family {
            Family::V4 => &self.v4,
            Family::V6 => &self.v6,
        }
    }
}

/// Aggregate raw networks into canonical sorted blocks, per family.
///
/// Adjacent and nested networks are merged, so the output never contains two
/// sibling blocks that together fill their parent.
pub fn aggregate(nets: &[IpNet]) -> (Vec<Ipv4Net>, Vec<Ipv6Net>) {
    let mut v4 = Vec::new();
    let mut v6 = Vec::new();
    for net in nets {
        match net.trunc() {
            IpNet::V4(n) => v4.push(n),
            IpNet::V6(n) => v6.push(n),
        }
    }

    let mut v4 = Ipv4Net::aggregate(&v4);
    let mut v6 = Ipv6Net::aggregate(&v6);
    v4.sort();
    v6.sort();
    (v4, v6)
}

/// Turn raw networks into sorted, disjoint, aligned ranges per family.
pub fn normalize(nets: &[IpNet]) -> FamilyRanges {
    let (v4, v6) = aggregate(nets);
    let ranges = FamilyRanges {
        v4: v4.into_iter().map(AddrRange::from).collect(),
        v6: v6.into_iter().map(AddrRange::from).collect(),
    };
    log::debug!(
        "Normalized {} networks into {} v4 and {} v6 ranges",
        nets.len(),
        ranges.v4.len(),
        ranges.v6.len()
    );
    ranges
}
