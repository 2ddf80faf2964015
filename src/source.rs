//! Plain-text CIDR list loading.
//!
//! One network per line. Blank lines and `#` comments are ignored, and a bare
//! address is read as a host network. Files ending in `.gz` are decompressed.

use flate2::read::GzDecoder;
use ipnet::IpNet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::net::IpAddr;
use std::path::Path;

use crate::{Error, Result};

/// Parse networks from a reader.
pub fn parse_networks<R: Read>(reader: R) -> Result<Vec<IpNet>> {
    let mut nets = Vec::new();
    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;

        // Remove comments
        let line = match line.find('#') {
            Some(idx) => &line[..idx],
            None => &line,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        nets.push(parse_network(line).ok_or_else(|| Error::InvalidNetwork {
            line: index + 1,
            value: line.to_string(),
        })?);
    }
    Ok(nets)
}

/// Parse a CIDR, or a bare address as a full-length prefix.
pub fn parse_network(value: &str) -> Option<IpNet> {
    if let Ok(net) = value.parse::<IpNet>() {
        return Some(net.trunc());
    }
    let addr = value.parse::<IpAddr>().ok()?;
    let prefix_len = match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    IpNet::new(addr, prefix_len).ok()
}

/// Load networks from a file, decompressing `.gz` files.
pub fn load_networks(path: &Path) -> Result<Vec<IpNet>> {
    let file = File::open(path)?;
    let nets = if path.extension().is_some_and(|ext| ext == "gz") {
        parse_networks(GzDecoder::new(file))?
    } else {
        parse_networks(file)?
    };
    log::info!("Loaded {} networks from {:?}", nets.len(), path);
    Ok(nets)
}

/// Load and concatenate several lists.
pub fn load_all(paths: &[impl AsRef<Path>]) -> Result<Vec<IpNet>> {
    let mut nets = Vec::new();
    for path in paths {
        nets.extend(load_networks(path.as_ref())?);
    }
    Ok(nets)
}
