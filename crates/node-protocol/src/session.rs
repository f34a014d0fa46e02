//! Session handle returned by the directory on successful registration.

use std::fmt;

use crate::error::ProtocolError;

/// Maximum length of a location token the node will keep.
pub const SESSION_HANDLE_CAPACITY: usize = 20;

/// Location token (e.g. `/rd/12`) that scopes every request the node sends
/// after registering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle(heapless::String<SESSION_HANDLE_CAPACITY>);

impl SessionHandle {
    /// Copy a location token into a handle.  Tokens longer than
    /// [`SESSION_HANDLE_CAPACITY`] are rejected, never truncated.
    pub fn new(token: &str) -> Result<Self, ProtocolError> {
        let too_long = || ProtocolError::LocationTokenTooLong {
            len: token.len(),
            capacity: SESSION_HANDLE_CAPACITY,
        };
        let mut handle = heapless::String::new();
        handle.push_str(token).map_err(|_| too_long())?;
        Ok(Self(handle))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// `<handle>/<sub_path>`, bounded by `max_len` bytes.
    pub fn scoped_path(&self, sub_path: &str, max_len: usize) -> Result<String, ProtocolError> {
        let handle = self.0.trim_end_matches('/');
        let needed = handle.len() + 1 + sub_path.len();
        if needed > max_len {
            return Err(ProtocolError::BufferOverflow {
                needed,
                capacity: max_len,
            });
        }
        Ok(format!("{handle}/{sub_path}"))
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
