/// Errors raised while building protocol values into bounded buffers.
///
/// None of these are recoverable by retrying: they mean the input does not
/// fit the fixed capacity the node was built with.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("buffer overflow: {needed} bytes needed, capacity {capacity}")]
    BufferOverflow { needed: usize, capacity: usize },

    #[error("location token of {len} bytes exceeds session handle capacity {capacity}")]
    LocationTokenTooLong { len: usize, capacity: usize },

    #[error("invalid hardware address: {0}")]
    InvalidHwAddr(String),
}
