//! Mapping of adapter errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

use crate::adapter::ReadError;
use crate::codec::CodecError;

/// Errors returned by the remote storage endpoints.
///
/// Bodies are plain text, as Prometheus logs them verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Read(#[from] ReadError),
    /// One or more samples could not be stored; messages already joined.
    #[error("{0}")]
    Write(String),
    #[error("failed to encode metrics")]
    Metrics,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Codec(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Read(ReadError::Compile(_)) => StatusCode::BAD_REQUEST,
            Self::Codec(_) | Self::Read(ReadError::Storage(_)) | Self::Write(_) | Self::Metrics => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            warn!("rejected request: {self}");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::*;
    use crate::codec::ReadRequest;
    use crate::query::CompileError;
    use crate::storage::StorageError;

    /// Test the status code of each error kind.
    #[test]
    fn test_status_mapping() {
        let decode = ReadRequest::decode(&[0xff_u8][..]).expect_err("truncated varint");
        assert_eq!(ApiError::from(CodecError::Decode(decode)).status(), StatusCode::BAD_REQUEST);

        let compile = ReadError::Compile(CompileError::UnsupportedMatcher(9));
        assert_eq!(ApiError::from(compile).status(), StatusCode::BAD_REQUEST);

        let storage = ReadError::Storage(StorageError::Backend("down".into()));
        assert_eq!(ApiError::from(storage).status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(ApiError::Write("a, b".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    /// Test that the joined write messages are the response body text.
    #[test]
    fn test_write_error_message() {
        let err = ApiError::Write("store call 2 failed".into());
        assert_eq!(err.to_string(), "store call 2 failed");
    }
}
