//! Membership lookups over a compiled blob.

use memmap2::Mmap;
use std::fs::File;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

use super::format::{read_word, POINTER_SIZE, RECORD_HEADER_SIZE};
use crate::range::AddressWidth;
use crate::{Error, Result};

enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Backing {
    fn as_slice(&self) -> &[u8] {
        match self {
            Backing::Mapped(mmap) => &mmap[..],
            Backing::Owned(bytes) => &bytes[..],
        }
    }
}

/// Reader for one compiled DAG blob.
///
/// Walks records starting at offset 0 one nibble at a time. A pointer
/// outside the blob ends the walk as a miss.
pub struct DagReader {
    data: Backing,
    width: AddressWidth,
}

impl DagReader {
    /// Memory-map a blob file.
    pub fn open(path: &Path, width: AddressWidth) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::with_backing(Backing::Mapped(mmap), width)
    }

    /// Read a blob held in memory.
    pub fn from_bytes(data: Vec<u8>, width: AddressWidth) -> Result<Self> {
        Self::with_backing(Backing::Owned(data), width)
    }

    fn with_backing(data: Backing, width: AddressWidth) -> Result<Self> {
        let len = data.as_slice().len();
        if len < RECORD_HEADER_SIZE || len % 2 != 0 {
            return Err(Error::InvalidBlob(format!("bad blob length {}", len)));
        }
        Ok(Self { data, width })
    }

    pub fn width(&self) -> AddressWidth {
        self.width
    }

    /// Blob size in bytes.
    pub fn len(&self) -> usize {
        self.data.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `value` is inside the compiled region.
    pub fn contains(&self, value: u128) -> bool {
        let data = self.data.as_slice();
        let mut offset = 0usize;

        for level in 0..self.width.levels() {
            let nibble = self.width.nibble(value, level);
            let bit = 1u16 << nibble;

            let Some(has_child) = read_word(data, offset) else {
                return false;
            };
            if has_child & bit != 0 {
                let index = (has_child & (bit - 1)).count_ones() as usize;
                let pointer_at = offset + RECORD_HEADER_SIZE + POINTER_SIZE * index;
                match read_word(data, pointer_at) {
                    Some(pointer) => offset = (pointer as usize) << 1,
                    None => return false,
                }
                continue;
            }

            return read_word(data, offset + 2).is_some_and(|set_child| set_child & bit != 0);
        }
        false
    }
}

/// IPv4 and IPv6 readers for one region.
pub struct RegionIndex {
    v4: DagReader,
    v6: DagReader,
}

impl RegionIndex {
    pub fn new(v4: DagReader, v6: DagReader) -> Self {
        Self { v4, v6 }
    }

    /// Open `<dir>/<name>_v4.btr` and `<dir>/<name>_v6.btr`.
    pub fn open(dir: &Path, name: &str) -> Result<Self> {
        let v4 = DagReader::open(&dir.join(format!("{}_v4.btr", name)), AddressWidth::V4)?;
        let v6 = DagReader::open(&dir.join(format!("{}_v6.btr", name)), AddressWidth::V6)?;
        Ok(Self::new(v4, v6))
    }

    /// Whether `ip` is inside the region. IPv4-mapped IPv6 addresses use the
    /// IPv4 index.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match ip {
            IpAddr::V4(v4) => self.contains_v4(v4),
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => self.contains_v4(v4),
                None => self.contains_v6(v6),
            },
        }
    }

    pub fn contains_v4(&self, ip: Ipv4Addr) -> bool {
        self.v4.contains(u32::from(ip) as u128)
    }

    pub fn contains_v6(&self, ip: Ipv6Addr) -> bool {
        self.v6.contains(u128::from(ip))
    }
}
