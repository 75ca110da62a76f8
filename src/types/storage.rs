//! Storage providers and content identifiers
//!
//! Catenis messages that are not embedded in the transaction are stored on IPFS and
//! referenced by CID. The envelope carries a one-byte storage provider code that
//! tells which IPFS protocol revision the reference belongs to.

use cid::Cid;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Name shared by every IPFS storage provider revision
pub const IPFS_PROVIDER_NAME: &str = "ipfs";

const IPFS_PROVIDER_DESCRIPTION: &str = "IPFS - Interplanetary Filesystem";

/// Content identifier of a blob held in IPFS
///
/// Parsing follows the standard CID rules (CIDv0 multihash or CIDv1), and the
/// display form is the canonical string encoding (`Qm...` for v0, base32 for v1).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId(Cid);

impl ContentId {
    /// Parse a binary CID that must span the whole buffer
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let mut reader = bytes;
        let cid = Cid::read_bytes(&mut reader).ok()?;

        if !reader.is_empty() {
            return None;
        }

        Some(Self(cid))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    pub fn as_cid(&self) -> &Cid {
        &self.0
    }
}

impl FromStr for ContentId {
    type Err = cid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cid::try_from(s.trim()).map(Self)
    }
}

impl From<Cid> for ContentId {
    fn from(cid: Cid) -> Self {
        Self(cid)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ContentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Storage providers that may be named by an envelope's storage provider byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageProvider {
    /// IPFS, protocol version 1 (code 0x01)
    Ipfs,
    /// IPFS, protocol version 2 (code 0x02)
    Ipfs2,
}

impl StorageProvider {
    /// The only provider a settlement transaction may reference
    pub const OFF_CHAIN: StorageProvider = StorageProvider::Ipfs2;

    pub const ALL: [StorageProvider; 2] = [StorageProvider::Ipfs, StorageProvider::Ipfs2];

    pub fn byte_code(self) -> u8 {
        match self {
            StorageProvider::Ipfs => 0x01,
            StorageProvider::Ipfs2 => 0x02,
        }
    }

    pub fn from_byte_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|sp| sp.byte_code() == code)
    }

    pub fn name(self) -> &'static str {
        IPFS_PROVIDER_NAME
    }

    pub fn description(self) -> &'static str {
        IPFS_PROVIDER_DESCRIPTION
    }

    pub fn version(self) -> u32 {
        match self {
            StorageProvider::Ipfs => 1,
            StorageProvider::Ipfs2 => 2,
        }
    }

    pub fn info(self) -> StorageProviderInfo {
        StorageProviderInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
            version: self.version(),
        }
    }
}

/// Storage provider descriptor as surfaced in an inspection result
///
/// Off-chain envelopes carry their own descriptor, which is not limited to the
/// providers known to the on-chain envelope codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageProviderInfo {
    pub name: String,
    pub description: String,
    pub version: u32,
}

impl StorageProviderInfo {
    pub fn is_ipfs(&self) -> bool {
        self.name == IPFS_PROVIDER_NAME
    }
}
