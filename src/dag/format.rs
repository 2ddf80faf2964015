//! Node record layout.

/// Bytes of the fixed record header (`has_child` + `set_child`).
pub const RECORD_HEADER_SIZE: usize = 4;

/// Bytes per child pointer.
pub const POINTER_SIZE: usize = 2;

/// Blobs must stay strictly below this size: pointers are 16-bit words
/// holding `address >> 1`.
pub const MAX_BLOB_SIZE: usize = 1 << 17;

/// Encoded size of a record with `pointers` child pointers.
pub fn record_size(pointers: usize) -> usize {
    RECORD_HEADER_SIZE + POINTER_SIZE * pointers
}

/// One decoded node record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeRecord {
    /// Bit i set: slot i points at another record
    pub has_child: u16,
    /// Bit i set: slot i is fully included
    pub set_child: u16,
    /// Child addresses shifted right by one, in ascending slot order
    pub pointers: Vec<u16>,
}

impl NodeRecord {
    /// Append the little-endian encoding to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.has_child.to_le_bytes());
        out.extend_from_slice(&self.set_child.to_le_bytes());
        for pointer in &self.pointers {
            out.extend_from_slice(&pointer.to_le_bytes());
        }
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        record_size(self.pointers.len())
    }

    /// Decode the record starting at byte `offset`.
    pub fn parse(data: &[u8], offset: usize) -> Option<Self> {
        let has_child = read_word(data, offset)?;
        let set_child = read_word(data, offset + 2)?;
        let pointers = (0..has_child.count_ones() as usize)
            .map(|i| read_word(data, offset + RECORD_HEADER_SIZE + POINTER_SIZE * i))
            .collect::<Option<Vec<u16>>>()?;
        Some(Self {
            has_child,
            set_child,
            pointers,
        })
    }
}

/// Read a little-endian u16 at a byte offset.
pub fn read_word(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}
