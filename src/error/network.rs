//! Remote check and download errors

use super::UpdaterError;

/// Creates a network (transport or timeout) error
pub fn network_failed(message: impl Into<String>) -> UpdaterError {
    UpdaterError::Network {
        message: message.into(),
    }
}

/// Creates an invalid URL error
pub fn invalid_url(url: impl Into<String>) -> UpdaterError {
    UpdaterError::InvalidUrl { url: url.into() }
}

/// Creates a server error for a non-success status code
pub fn server_error(status: u16) -> UpdaterError {
    UpdaterError::Server { status }
}

/// Creates a decode error
pub fn decode_failed(reason: impl Into<String>) -> UpdaterError {
    UpdaterError::Decode {
        reason: reason.into(),
    }
}

/// Creates a no data error
pub fn no_data(url: impl Into<String>) -> UpdaterError {
    UpdaterError::NoData { url: url.into() }
}
