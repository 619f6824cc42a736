//! Checksum and archive installation errors

use super::UpdaterError;

/// Creates a checksum mismatch error
pub fn checksum_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> UpdaterError {
    UpdaterError::ChecksumMismatch {
        expected: expected.into(),
        actual: actual.into(),
    }
}

/// Creates an archive extraction error
pub fn unzip_failed(archive: impl Into<String>, reason: impl Into<String>) -> UpdaterError {
    UpdaterError::Unzip {
        archive: archive.into(),
        reason: reason.into(),
    }
}

/// Creates a missing bundle entry error
pub fn missing_entry(entry: impl Into<String>, staging: impl Into<String>) -> UpdaterError {
    UpdaterError::MissingEntry {
        entry: entry.into(),
        staging: staging.into(),
    }
}
