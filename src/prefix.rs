//! Fixed-width prefix list records.
//!
//! Each record is the network address in network byte order followed by a
//! one-byte prefix length: 5 bytes for IPv4, 17 bytes for IPv6.

use ipnet::{Ipv4Net, Ipv6Net};

/// IPv4 record size.
pub const V4_RECORD_SIZE: usize = 5;

/// IPv6 record size.
pub const V6_RECORD_SIZE: usize = 17;

/// Writer for the prefix list format.
///
/// The output buffer is kept between calls; each call overwrites it.
pub struct PrefixListWriter {
    buffer: Vec<u8>,
}

impl PrefixListWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Encode IPv4 networks in the given order.
    pub fn write_v4(&mut self, nets: &[Ipv4Net]) -> &[u8] {
        self.buffer.clear();
        self.buffer.reserve(nets.len() * V4_RECORD_SIZE);
        for net in nets {
            self.buffer.extend_from_slice(&net.network().octets());
            self.buffer.push(net.prefix_len());
        }
        &self.buffer
    }

    /// Encode IPv6 networks in the given order.
    pub fn write_v6(&mut self, nets: &[Ipv6Net]) -> &[u8] {
        self.buffer.clear();
        self.buffer.reserve(nets.len() * V6_RECORD_SIZE);
        for net in nets {
            self.buffer.extend_from_slice(&net.network().octets());
            self.buffer.push(net.prefix_len());
        }
        &self.buffer
    }
}

impl Default for PrefixListWriter {
    fn default() -> Self {
        Self::new()
    }
}
