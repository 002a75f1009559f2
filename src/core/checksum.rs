//! Content fingerprint of the applied pipeline set.

use sha2::{Digest, Sha256};

use crate::request::Version;

/// SHA-256 over the configs concatenated in the given order, lower-case hex.
pub fn pipelines_checksum<I, B>(configs: I) -> String
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    for config in configs {
        hasher.update(config.as_ref());
    }
    format!("{:x}", hasher.finalize())
}

pub fn version_for<I, B>(configs: I) -> Version
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    Version {
        pipelines_checksum: pipelines_checksum(configs),
    }
}
