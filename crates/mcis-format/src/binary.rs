//! MCG binary container.
//!
//! A fixed-size header with magic bytes, version, flags and counts, followed
//! by a JSON-serialized graph payload, terminated by a SHA-256 content hash
//! over everything before it.

use std::io::{Read, Write};

use sha2::{Digest, Sha256};

use mcis_core::Graph;

use crate::error::FormatError;

/// Magic bytes identifying an MCG file: "MCG\0"
pub const MAGIC: [u8; 4] = [0x4D, 0x43, 0x47, 0x00];

/// 4 (magic) + 3 (version) + 1 (flags) + 8*3 (node count, edge count, payload length)
const HEADER_SIZE: usize = 32;

/// Size of the trailing content hash.
const HASH_SIZE: usize = 32;

/// Layout version stored in bytes 4..7 of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McgVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl McgVersion {
    pub const CURRENT: McgVersion = McgVersion {
        major: 0,
        minor: 1,
        patch: 0,
    };

    /// Readable by this build: same major, minor not ahead of ours.
    pub fn is_compatible(&self) -> bool {
        self.major == Self::CURRENT.major && self.minor <= Self::CURRENT.minor
    }
}

impl std::fmt::Display for McgVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Graph properties summarized in header byte 7, readable without parsing
/// the payload. Unknown bits are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct McgFlags {
    /// The graph contains a directed cycle.
    pub has_cycles: bool,
    /// Some edge carries a non-zero weight.
    pub weighted: bool,
}

impl McgFlags {
    const HAS_CYCLES: u8 = 0x01;
    const WEIGHTED: u8 = 0x02;

    /// Flags describing `graph`.
    pub fn of(graph: &Graph) -> Self {
        Self {
            has_cycles: !graph.is_dag(),
            weighted: graph.edges().any(|(_, _, w)| w != 0),
        }
    }

    fn from_byte(byte: u8) -> Self {
        Self {
            has_cycles: byte & Self::HAS_CYCLES != 0,
            weighted: byte & Self::WEIGHTED != 0,
        }
    }

    fn to_byte(self) -> u8 {
        let mut byte = 0;
        if self.has_cycles {
            byte |= Self::HAS_CYCLES;
        }
        if self.weighted {
            byte |= Self::WEIGHTED;
        }
        byte
    }
}

/// An MCG file: header metadata + graph.
#[derive(Debug)]
pub struct McgFile {
    pub version: McgVersion,
    pub flags: McgFlags,
    pub graph: Graph,
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

impl McgFile {
    /// Wrap a graph, deriving the flags from its contents.
    pub fn new(graph: Graph) -> Self {
        Self {
            version: McgVersion::CURRENT,
            flags: McgFlags::of(&graph),
            graph,
        }
    }

    /// Serialize to a writer in MCG binary format.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        let payload = serde_json::to_vec(&self.graph)?;

        let node_count = self.graph.node_count() as u64;
        let edge_count = self.graph.edge_count() as u64;
        let payload_len = payload.len() as u64;

        let mut hasher = Sha256::new();

        writer.write_all(&MAGIC)?;
        hasher.update(MAGIC);

        let version_bytes = [self.version.major, self.version.minor, self.version.patch];
        writer.write_all(&version_bytes)?;
        hasher.update(version_bytes);

        let flag_byte = self.flags.to_byte();
        writer.write_all(&[flag_byte])?;
        hasher.update([flag_byte]);

        for val in [node_count, edge_count, payload_len] {
            let bytes = val.to_le_bytes();
            writer.write_all(&bytes)?;
            hasher.update(bytes);
        }

        writer.write_all(&payload)?;
        hasher.update(&payload);

        let hash: [u8; 32] = hasher.finalize().into();
        writer.write_all(&hash)?;

        Ok(())
    }

    /// Serialize to a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Deserialize from a reader.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, FormatError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Deserialize from a byte slice, verifying the hash, the header counts
    /// and the graph invariants.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < HEADER_SIZE + HASH_SIZE {
            return Err(FormatError::FileTooSmall);
        }

        if data[0..4] != MAGIC {
            return Err(FormatError::InvalidMagic);
        }

        let version = McgVersion {
            major: data[4],
            minor: data[5],
            patch: data[6],
        };
        if !version.is_compatible() {
            return Err(FormatError::UnsupportedVersion {
                major: version.major,
                minor: version.minor,
                patch: version.patch,
            });
        }

        let flags = McgFlags::from_byte(data[7]);

        let declared_nodes = read_u64(data, 8);
        let declared_edges = read_u64(data, 16);
        let payload_len =
            usize::try_from(read_u64(data, 24)).map_err(|_| FormatError::FileTooSmall)?;

        let payload_end = HEADER_SIZE
            .checked_add(payload_len)
            .ok_or(FormatError::FileTooSmall)?;
        let hash_end = payload_end
            .checked_add(HASH_SIZE)
            .ok_or(FormatError::FileTooSmall)?;
        if data.len() < hash_end {
            return Err(FormatError::FileTooSmall);
        }

        let stored_hash = &data[payload_end..hash_end];
        let computed_hash: [u8; 32] = Sha256::digest(&data[..payload_end]).into();
        if computed_hash != stored_hash {
            return Err(FormatError::HashMismatch);
        }

        let graph: Graph = serde_json::from_slice(&data[HEADER_SIZE..payload_end])?;

        let nodes = graph.node_count() as u64;
        let edges = graph.edge_count() as u64;
        if nodes != declared_nodes || edges != declared_edges {
            return Err(FormatError::CountMismatch {
                declared_nodes,
                declared_edges,
                nodes,
                edges,
            });
        }
        graph.validate().map_err(FormatError::InvalidGraph)?;

        Ok(Self {
            version,
            flags,
            graph,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> Graph {
        let mut g = Graph::new();
        g.add_nodes(["x", "y", "z"]).unwrap();
        g.add_edge("x", "z", 0).unwrap();
        g.add_edge("y", "z", 4).unwrap();
        g
    }

    /// Re-seal a tampered buffer so only the targeted check can fail.
    fn reseal(bytes: &mut [u8]) {
        let end = bytes.len() - HASH_SIZE;
        let hash: [u8; 32] = Sha256::digest(&bytes[..end]).into();
        bytes[end..].copy_from_slice(&hash);
    }

    #[test]
    fn round_trip() {
        let mcg = McgFile::new(sample_graph());
        let bytes = mcg.to_bytes().unwrap();
        let loaded = McgFile::from_bytes(&bytes).unwrap();

        assert_eq!(loaded.version, McgVersion::CURRENT);
        assert_eq!(loaded.graph, sample_graph());
        assert!(loaded.flags.weighted);
        assert!(!loaded.flags.has_cycles);
    }

    #[test]
    fn cyclic_graph_sets_flag() {
        let mut g = sample_graph();
        g.add_edge("z", "x", 0).unwrap();
        let mcg = McgFile::new(g);
        assert!(mcg.flags.has_cycles);
        assert_eq!(mcg.flags.to_byte(), 0x01);
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = McgFile::new(Graph::new()).to_bytes().unwrap();
        bytes[0] = 0xFF;
        assert!(matches!(
            McgFile::from_bytes(&bytes),
            Err(FormatError::InvalidMagic)
        ));
    }

    #[test]
    fn newer_version_rejected() {
        let mut bytes = McgFile::new(Graph::new()).to_bytes().unwrap();
        bytes[5] = McgVersion::CURRENT.minor + 1;
        assert!(matches!(
            McgFile::from_bytes(&bytes),
            Err(FormatError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn corrupted_payload_rejected() {
        let mut bytes = McgFile::new(sample_graph()).to_bytes().unwrap();
        bytes[HEADER_SIZE + 3] ^= 0xFF;
        assert!(matches!(
            McgFile::from_bytes(&bytes),
            Err(FormatError::HashMismatch)
        ));
    }

    #[test]
    fn header_count_mismatch_rejected() {
        let mut bytes = McgFile::new(sample_graph()).to_bytes().unwrap();
        bytes[8] = 99;
        reseal(&mut bytes);
        assert!(matches!(
            McgFile::from_bytes(&bytes),
            Err(FormatError::CountMismatch {
                declared_nodes: 99,
                nodes: 3,
                ..
            })
        ));
    }

    #[test]
    fn truncated_file_rejected() {
        assert!(matches!(
            McgFile::from_bytes(&MAGIC),
            Err(FormatError::FileTooSmall)
        ));

        let bytes = McgFile::new(sample_graph()).to_bytes().unwrap();
        assert!(matches!(
            McgFile::from_bytes(&bytes[..bytes.len() - 1]),
            Err(FormatError::FileTooSmall)
        ));
    }

    #[test]
    fn version_display() {
        assert_eq!(McgVersion::CURRENT.to_string(), "0.1.0");
    }

    #[test]
    fn write_and_read_via_io() {
        let mut buf = Vec::new();
        McgFile::new(sample_graph()).write_to(&mut buf).unwrap();
        let loaded = McgFile::read_from(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded.graph.node_count(), 3);
        assert_eq!(loaded.graph.edge_count(), 2);
    }

    /// Header plus hash around a hand-written payload.
    fn seal(payload: &[u8], nodes: u64, edges: u64) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.extend([0, 1, 0, 0]);
        for val in [nodes, edges, payload.len() as u64] {
            bytes.extend(val.to_le_bytes());
        }
        bytes.extend_from_slice(payload);
        let hash: [u8; 32] = Sha256::digest(&bytes).into();
        bytes.extend(hash);
        bytes
    }

    #[test]
    fn huge_payload_length_rejected() {
        let mut bytes = McgFile::new(sample_graph()).to_bytes().unwrap();
        let len = (usize::MAX as u64) - 40;
        bytes[24..32].copy_from_slice(&len.to_le_bytes());
        assert!(matches!(
            McgFile::from_bytes(&bytes),
            Err(FormatError::FileTooSmall)
        ));

        bytes[24..32].copy_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            McgFile::from_bytes(&bytes),
            Err(FormatError::FileTooSmall)
        ));
    }

    #[test]
    fn node_key_must_match_id() {
        let payload = br#"{"nodes":{"A":{"id":"B","num_parents":0,"children":{}}}}"#;
        let bytes = seal(payload, 1, 0);
        match McgFile::from_bytes(&bytes) {
            Err(FormatError::InvalidGraph(errors)) => {
                assert!(errors.contains(&mcis_core::GraphError::IdMismatch {
                    key: "A".to_string(),
                    id: "B".to_string(),
                }));
            }
            other => panic!("expected InvalidGraph, got {other:?}"),
        }
    }

    #[test]
    fn hand_sealed_payload_loads() {
        let payload = br#"{"nodes":{"A":{"id":"A","num_parents":0,"children":{}}}}"#;
        let loaded = McgFile::from_bytes(&seal(payload, 1, 0)).unwrap();
        assert!(loaded.graph.contains_node("A"));
        assert_eq!(loaded.flags, McgFlags::default());
    }
}
