//! File system errors

use super::UpdaterError;

/// Creates a file operation error for the given path
pub fn file_operation(path: impl Into<String>, reason: impl Into<String>) -> UpdaterError {
    UpdaterError::FileOperation {
        path: path.into(),
        reason: reason.into(),
    }
}
