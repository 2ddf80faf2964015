//! Compiling both address families of a region and writing the artifacts.

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BuildConfig;
use crate::dag::{CompiledDag, DagCompiler, DagReader, RegionIndex};
use crate::prefix::PrefixListWriter;
use crate::range::{aggregate, AddrRange, Family};
use crate::report::{BuildReport, FamilyReport};
use crate::{source, Result};

/// Which extra artifacts to write next to the DAG blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub prefix_lists: bool,
    pub report: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            prefix_lists: true,
            report: true,
        }
    }
}

/// Both families of a region, compiled and verified.
#[derive(Debug, Clone)]
pub struct CompiledRegion {
    pub v4_nets: Vec<Ipv4Net>,
    pub v6_nets: Vec<Ipv6Net>,
    pub v4: CompiledDag,
    pub v6: CompiledDag,
}

impl CompiledRegion {
    /// Aggregate raw networks and compile each family.
    pub fn compile(nets: &[IpNet]) -> Result<Self> {
        let (v4_nets, v6_nets) = aggregate(nets);
        log::info!("{} v4 ranges", v4_nets.len());
        log::info!("{} v6 ranges", v6_nets.len());

        let v4_ranges: Vec<AddrRange> = v4_nets.iter().copied().map(AddrRange::from).collect();
        let v6_ranges: Vec<AddrRange> = v6_nets.iter().copied().map(AddrRange::from).collect();

        let v4 = DagCompiler::new(Family::V4.width()).compile(&v4_ranges)?;
        let v6 = DagCompiler::new(Family::V6.width()).compile(&v6_ranges)?;

        Ok(Self {
            v4_nets,
            v6_nets,
            v4,
            v6,
        })
    }

    /// Compiled blob of one family.
    pub fn dag(&self, family: Family) -> &CompiledDag {
        match family {
            Family::V4 => &self.v4,
            Family::V6 => &self.v6,
        }
    }

    /// In-memory lookup index over the compiled blobs.
    pub fn index(&self) -> Result<RegionIndex> {
        Ok(RegionIndex::new(
            DagReader::from_bytes(self.v4.bytes.clone(), self.v4.width)?,
            DagReader::from_bytes(self.v6.bytes.clone(), self.v6.width)?,
        ))
    }

    pub fn report(&self, name: &str) -> BuildReport {
        BuildReport::new(
            name,
            vec![
                FamilyReport::new(Family::V4, &self.v4),
                FamilyReport::new(Family::V6, &self.v6),
            ],
        )
    }

    /// Write `<name>_v4.btr`, `<name>_v6.btr` and the optional extras.
    ///
    /// Every file goes to a `.tmp` sibling first and is renamed into place
    /// only after all of them were written. Returns the final paths.
    pub fn write(&self, dir: &Path, name: &str, options: WriteOptions) -> Result<Vec<PathBuf>> {
        let mut staged: Vec<(PathBuf, Vec<u8>)> = Vec::new();

        for family in [Family::V4, Family::V6] {
            let path = dir.join(format!("{}_{}.btr", name, family.name()));
            staged.push((path, self.dag(family).bytes.clone()));
        }

        if options.prefix_lists {
            let mut writer = PrefixListWriter::new();
            let v4_path = dir.join(format!("{}_v4.bin", name));
            staged.push((v4_path, writer.write_v4(&self.v4_nets).to_vec()));
            let v6_path = dir.join(format!("{}_v6.bin", name));
            staged.push((v6_path, writer.write_v6(&self.v6_nets).to_vec()));
        }

        if options.report {
            let path = dir.join(format!("{}.json", name));
            staged.push((path, self.report(name).to_json()?.into_bytes()));
        }

        fs::create_dir_all(dir)?;
        let temp_paths: Vec<PathBuf> = staged.iter().map(|(path, _)| temp_path(path)).collect();

        for ((_, data), temp) in staged.iter().zip(&temp_paths) {
            if let Err(e) = fs::write(temp, data) {
                discard(&temp_paths);
                return Err(e.into());
            }
        }

        let mut written = Vec::with_capacity(staged.len());
        for ((path, _), temp) in staged.into_iter().zip(&temp_paths) {
            fs::rename(temp, &path)?;
            log::debug!("Wrote {:?}", path);
            written.push(path);
        }
        Ok(written)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn discard(temp_paths: &[PathBuf]) {
    for temp in temp_paths {
        if temp.is_file() {
            let _ = fs::remove_file(temp);
        }
    }
}

/// Run a configured build: load inputs, compile, write artifacts.
pub fn build(config: &BuildConfig) -> Result<CompiledRegion> {
    let nets = source::load_all(&config.inputs)?;
    let region = CompiledRegion::compile(&nets)?;
    region.write(
        &config.output_dir,
        &config.name,
        WriteOptions {
            prefix_lists: config.prefix_lists,
            report: config.report,
        },
    )?;
    Ok(region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::net::IpAddr;

    fn nets(list: &[&str]) -> Vec<IpNet> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_compile_region() {
        let region =
            CompiledRegion::compile(&nets(&["2.0.0.0/12", "2001:420::/32", "5.1.0.0/16"])).unwrap();
        let index = region.index().unwrap();

        assert!(index.contains(ip("2.0.0.1")));
        assert!(index.contains(ip("2.15.255.255")));
        assert!(!index.contains(ip("2.16.0.0")));
        assert!(!index.contains(ip("1.0.0.1")));
        assert!(index.contains(ip("5.1.200.3")));
        assert!(index.contains(ip("2001:420:4000:1::")));
        assert!(!index.contains(ip("::")));
        assert!(index.contains(ip("::ffff:2.0.0.1")));
    }

    #[test]
    fn test_write_without_extras() {
        let dir = tempfile::tempdir().unwrap();
        let region = CompiledRegion::compile(&nets(&["10.0.0.0/8"])).unwrap();
        let written = region
            .write(
                dir.path(),
                "lan",
                WriteOptions {
                    prefix_lists: false,
                    report: false,
                },
            )
            .unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(fs::read(&written[0]).unwrap(), region.v4.bytes);
        assert_eq!(fs::read(&written[1]).unwrap(), vec![0, 0, 0, 0]);
        assert!(!dir.path().join("lan_v4.btr.tmp").exists());
    }

    #[test]
    fn test_failed_write_leaves_no_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the v6 temp file should go makes that write fail
        fs::create_dir(dir.path().join("lan_v6.btr.tmp")).unwrap();

        let region = CompiledRegion::compile(&nets(&["10.0.0.0/8", "2001:db8::/32"])).unwrap();
        let result = region.write(dir.path(), "lan", WriteOptions::default());

        assert!(matches!(result, Err(Error::Io(_))));
        for file in ["lan_v4.btr", "lan_v4.btr.tmp", "lan_v6.btr", "lan.json", "lan_v4.bin"] {
            assert!(!dir.path().join(file).exists(), "{} left behind", file);
        }
    }
}
