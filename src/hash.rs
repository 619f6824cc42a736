//! Checksum verification for downloaded archives
//!
//! Digests are streamed over the whole file and rendered as lowercase hex.
//! MD5 is the default because the update service publishes MD5 checksums.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::Digest;

use crate::error::{self, Result};

/// Digest algorithm used to verify archives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Md5,
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Blake3 => "blake3",
        }
    }
}

enum StreamHasher {
    Md5(md5::Md5),
    Sha256(sha2::Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl StreamHasher {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Md5 => StreamHasher::Md5(md5::Md5::new()),
            DigestAlgorithm::Sha256 => StreamHasher::Sha256(sha2::Sha256::new()),
            DigestAlgorithm::Blake3 => StreamHasher::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            StreamHasher::Md5(h) => h.update(data),
            StreamHasher::Sha256(h) => h.update(data),
            StreamHasher::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            StreamHasher::Md5(h) => hex::encode(h.finalize()),
            StreamHasher::Sha256(h) => hex::encode(h.finalize()),
            StreamHasher::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Calculate the lowercase hex digest of a file
pub fn hash_file(path: &Path, algorithm: DigestAlgorithm) -> Result<String> {
    let file = File::open(path)
        .map_err(|e| error::file_operation(path.display().to_string(), e.to_string()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = StreamHasher::new(algorithm);
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| error::file_operation(path.display().to_string(), e.to_string()))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize_hex())
}

/// Normalize a published checksum: trim, drop an `<algorithm>:` prefix,
/// lowercase.
pub fn normalize_checksum(expected: &str, algorithm: DigestAlgorithm) -> String {
    let trimmed = expected.trim();
    let bare = trimmed
        .split_once(':')
        .filter(|(prefix, _)| prefix.eq_ignore_ascii_case(algorithm.name()))
        .map_or(trimmed, |(_, digest)| digest.trim());
    bare.to_ascii_lowercase()
}

/// Check a file against a published checksum.
///
/// Returns `Ok(false)` on mismatch; read failures are errors.
pub fn verify(path: &Path, expected: &str, algorithm: DigestAlgorithm) -> Result<bool> {
    let actual = hash_file(path, algorithm)?;
    Ok(actual == normalize_checksum(expected, algorithm))
}

/// Like [`verify`], but a mismatch is reported as `ChecksumMismatch`
pub fn verify_checksum(path: &Path, expected: &str, algorithm: DigestAlgorithm) -> Result<()> {
    let actual = hash_file(path, algorithm)?;
    let expected = normalize_checksum(expected, algorithm);
    if actual == expected {
        Ok(())
    } else {
        Err(error::checksum_mismatch(expected, actual))
    }
}
