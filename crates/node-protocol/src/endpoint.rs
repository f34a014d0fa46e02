//! Endpoint naming: turns a link-layer address into the `ep=` query
//! parameter presented to the directory.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use crate::error::ProtocolError;

/// Length of an IEEE 802.15.4 extended address.
pub const HW_ADDR_LEN: usize = 8;

/// Query key that carries the endpoint name.
const EP_KEY: &str = "ep=";

/// Bytes reserved for an endpoint id: exactly the worst case for the
/// longest supported address (every octet rendered with three digits).
pub const ENDPOINT_ID_CAPACITY: usize = worst_case_len(HW_ADDR_LEN);

/// `ep=` plus `addr_len - 1` three-digit octets and the dots between them.
const fn worst_case_len(addr_len: usize) -> usize {
    if addr_len < 2 {
        return EP_KEY.len();
    }
    let groups = addr_len - 1;
    EP_KEY.len() + groups * 3 + (groups - 1)
}

/// A node's hardware (link-layer) address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkAddr(pub [u8; HW_ADDR_LEN]);

impl LinkAddr {
    pub fn octets(&self) -> &[u8; HW_ADDR_LEN] {
        &self.0
    }

    /// Endpoint id derived from this address.
    pub fn endpoint_id(&self) -> Result<EndpointId, ProtocolError> {
        build_endpoint_id(&self.0)
    }
}

impl FromStr for LinkAddr {
    type Err = ProtocolError;

    /// Parses `00:12:4b:00:06:0d:b2:a1` (`-` separators are accepted too).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidHwAddr(s.to_string());
        let mut octets = [0u8; HW_ADDR_LEN];
        let mut count = 0;

        for part in s.trim().split(|c: char| c == ':' || c == '-') {
            if count == HW_ADDR_LEN
                || part.is_empty()
                || part.len() > 2
                || !part.bytes().all(|b| b.is_ascii_hexdigit())
            {
                return Err(invalid());
            }
            octets[count] = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
            count += 1;
        }

        if count != HW_ADDR_LEN {
            return Err(invalid());
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for LinkAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, octet) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_char(':')?;
            }
            write!(f, "{octet:02x}")?;
        }
        Ok(())
    }
}

/// The `ep=<name>` query parameter identifying this node to the directory.
///
/// Built once at startup and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointId(heapless::String<ENDPOINT_ID_CAPACITY>);

impl EndpointId {
    /// Full query parameter, including the `ep=` key.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Endpoint name without the `ep=` key.
    pub fn name(&self) -> &str {
        self.0.strip_prefix(EP_KEY).unwrap_or(self.0.as_str())
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Build the endpoint id from the last `N - 1` bytes of `hw_addr`, each
/// rendered as a decimal octet and joined by `.`.
///
/// Addresses longer than [`HW_ADDR_LEN`] are rejected at compile time, so
/// the buffer can never be too small for a caller that type-checks.
pub fn build_endpoint_id<const N: usize>(hw_addr: &[u8; N]) -> Result<EndpointId, ProtocolError> {
    const {
        assert!(
            N <= HW_ADDR_LEN,
            "hardware address does not fit the endpoint id buffer"
        )
    };

    let overflow = || ProtocolError::BufferOverflow {
        needed: worst_case_len(N),
        capacity: ENDPOINT_ID_CAPACITY,
    };

    let mut id = heapless::String::<ENDPOINT_ID_CAPACITY>::new();
    id.push_str(EP_KEY).map_err(|_| overflow())?;
    for (i, octet) in hw_addr.iter().skip(1).enumerate() {
        if i > 0 {
            id.push('.').map_err(|_| overflow())?;
        }
        write!(id, "{octet}").map_err(|_| overflow())?;
    }

    Ok(EndpointId(id))
}
