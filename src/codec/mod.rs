//! Wire codec for the remote storage protocol.
//!
//! Bodies travel as protobuf messages compressed with the snappy *block*
//! format (not the framed format), in both directions.

pub mod proto;

use prost::Message;
use snap::raw::{decompress_len, Decoder, Encoder};
use thiserror::Error;

pub use proto::{
    Label, LabelMatcher, Query, QueryResult, ReadRequest, ReadResponse, Sample, TimeSeries,
    WriteRequest,
};

/// Largest decompressed body accepted, in bytes.
pub const MAX_DECOMPRESSED_LEN: usize = 32 * 1024 * 1024;

/// Errors raised while turning bodies into messages and back.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The body is not valid snappy block data.
    #[error("snappy decompression failed: {0}")]
    Decompress(#[source] snap::Error),
    /// The body claims a decompressed size above [`MAX_DECOMPRESSED_LEN`].
    #[error("snappy decompression failed: decompressed length {len} exceeds limit {limit}")]
    TooLarge { len: usize, limit: usize },
    /// The decompressed body is not a valid protobuf message.
    #[error("protobuf decoding failed: {0}")]
    Decode(#[from] prost::DecodeError),
    /// The encoded response could not be compressed.
    #[error("snappy compression failed: {0}")]
    Compress(#[source] snap::Error),
}

impl CodecError {
    /// Whether the error was caused by the request body rather than the server.
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Decompress(_) | Self::TooLarge { .. } | Self::Decode(_))
    }
}

/// Decompress and decode a remote write body.
pub fn decode_write_request(body: &[u8]) -> Result<WriteRequest, CodecError> {
    decode_message(body)
}

/// Decompress and decode a remote read body.
pub fn decode_read_request(body: &[u8]) -> Result<ReadRequest, CodecError> {
    decode_message(body)
}

/// Encode and compress a remote read response.
pub fn encode_read_response(response: &ReadResponse) -> Result<Vec<u8>, CodecError> {
    encode_message(response)
}

/// Decompress and decode a remote read response, as a client would.
pub fn decode_read_response(body: &[u8]) -> Result<ReadResponse, CodecError> {
    decode_message(body)
}

/// Encode and compress a remote write body, as a client would.
pub fn encode_write_request(request: &WriteRequest) -> Result<Vec<u8>, CodecError> {
    encode_message(request)
}

/// Encode and compress a remote read body, as a client would.
pub fn encode_read_request(request: &ReadRequest) -> Result<Vec<u8>, CodecError> {
    encode_message(request)
}

fn decode_message<M: Message + Default>(body: &[u8]) -> Result<M, CodecError> {
    // The header states the output size; check it before allocating.
    let len = decompress_len(body).map_err(CodecError::Decompress)?;
    if len > MAX_DECOMPRESSED_LEN {
        return Err(CodecError::TooLarge { len, limit: MAX_DECOMPRESSED_LEN });
    }
    let raw = Decoder::new().decompress_vec(body).map_err(CodecError::Decompress)?;
    Ok(M::decode(raw.as_slice())?)
}

fn encode_message<M: Message>(message: &M) -> Result<Vec<u8>, CodecError> {
    let raw = message.encode_to_vec();
    Encoder::new().compress_vec(&raw).map_err(CodecError::Compress)
}
