//! Command implementations behind the `dutil` subcommands

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use dutil_core::{base64_decode, base64_encode, checksum, SerializeBuffer};
use tracing::info;

use crate::config::AppConfig;
use crate::graph_file::{LoadedGraph, PathReport};

/// Traversal order for the `paths` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Backtracking enumeration in out-edge insertion order
    DepthFirst,
    /// Shortest hop count first
    BreadthFirst,
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// 32-bit checksum of a file as eight lowercase hex digits
pub fn checksum_file(path: &Path) -> Result<String> {
    let data = read(path)?;
    Ok(format!("{:08x}", checksum(&data)))
}

/// Serialize a file's name and contents into a sealed buffer, as base64 text
pub fn pack(path: &Path, config: &AppConfig) -> Result<String> {
    let data = read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("{} has no usable file name", path.display()))?;

    let mut buf = SerializeBuffer::with_config(&config.toolkit.serialize)?;
    buf.write_string(name)?;
    buf.write_u64(data.len() as u64)?;
    buf.write_string(&data)?;
    let sealed = buf.seal()?;

    info!(file = name, bytes = data.len(), sealed = sealed.len(), "packed");
    Ok(base64_encode(&sealed))
}

/// Restore a file packed by [`pack`] into `out_dir`; returns the written path
pub fn unpack(packed: &Path, out_dir: &Path) -> Result<PathBuf> {
    let raw = read(packed)?;
    let text = std::str::from_utf8(&raw).context("Packed data is not text")?;
    let sealed = base64_decode(text.trim()).context("Packed data is not valid base64")?;
    let mut buf = SerializeBuffer::unseal(&sealed).context("Packed data failed verification")?;

    let name = buf.read_str()?;
    let declared = buf.read_u64()?;
    let data = buf.read_string()?;
    if declared != data.len() as u64 {
        return Err(anyhow!("Packed size {} does not match {} bytes of content", declared, data.len()));
    }

    // never let a stored name escape the output directory
    let file_name = Path::new(&name)
        .file_name()
        .ok_or_else(|| anyhow!("Packed file name {:?} is not usable", name))?;
    let target = out_dir.join(file_name);
    std::fs::write(&target, &data).with_context(|| format!("Failed to write {}", target.display()))?;

    info!(file = %target.display(), bytes = data.len(), "unpacked");
    Ok(target)
}

/// Enumerate paths between two named vertices of a TOML graph file
pub fn paths(
    graph_file: &Path,
    from: &str,
    to: &str,
    order: Order,
    limit: Option<usize>,
    config: &AppConfig,
) -> Result<Vec<PathReport>> {
    let loaded = LoadedGraph::from_file(graph_file, &config.toolkit)?;
    let found = match order {
        Order::DepthFirst => loaded.depth_first_paths(from, to, limit)?,
        Order::BreadthFirst => loaded.breadth_first_paths(from, to, limit)?,
    };
    info!(from, to, ?order, paths = found.len(), "paths enumerated");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_eight_hex_digits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"hello").unwrap();
        let sum = checksum_file(&path).unwrap();
        assert_eq!(sum.len(), 8);
        assert_eq!(sum, format!("{:08x}", checksum(b"hello")));
    }

    #[test]
    fn pack_then_unpack_restores_the_file() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let path = src.path().join("notes.txt");
        std::fs::write(&path, b"line one\nline two\n").unwrap();

        let packed = pack(&path, &AppConfig::default()).unwrap();
        let packed_path = src.path().join("notes.b64");
        std::fs::write(&packed_path, format!("{}\n", packed)).unwrap();

        let restored = unpack(&packed_path, out.path()).unwrap();
        assert_eq!(restored, out.path().join("notes.txt"));
        assert_eq!(std::fs::read(&restored).unwrap(), b"line one\nline two\n");
    }

    #[test]
    fn unpack_rejects_tampered_data() {
        let src = tempfile::tempdir().unwrap();
        let path = src.path().join("a.txt");
        std::fs::write(&path, b"payload").unwrap();

        let mut sealed = base64_decode(&pack(&path, &AppConfig::default()).unwrap()).unwrap();
        let last = sealed.len() - 5;
        sealed[last] ^= 0xFF;
        let packed_path = src.path().join("a.b64");
        std::fs::write(&packed_path, base64_encode(&sealed)).unwrap();

        let err = unpack(&packed_path, src.path()).unwrap_err();
        assert!(err.to_string().contains("failed verification"));
    }

    #[test]
    fn paths_reads_the_graph_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.toml");
        std::fs::write(
            &path,
            "[[vertex]]\nname = \"x\"\n[[vertex]]\nname = \"y\"\n[[edge]]\nfrom = \"x\"\nto = \"y\"\nweight = 4\n",
        )
        .unwrap();

        let found = paths(&path, "x", "y", Order::BreadthFirst, None, &AppConfig::default()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].weight, 4);
        assert!(paths(&path, "x", "missing", Order::DepthFirst, None, &AppConfig::default()).is_err());
    }
}
