//! `inet`/`cidr` carrier. Both types share one wire layout;
//! the distinction is carried by the OID passed alongside this value, not by
//! the shape itself.

use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inet {
    pub addr: IpAddr,
    pub prefix_len: u8,
}

impl Inet {
    pub fn host(addr: IpAddr) -> Self {
        let prefix_len = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        Inet { addr, prefix_len }
    }
}

/// `macaddr` (6 bytes) and `macaddr8` (8 bytes, EUI-64) share this shape; the
/// length distinguishes them on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr {
    pub octets: [u8; 8],
    pub is_eui64: bool,
}

impl MacAddr {
    pub fn bytes(&self) -> &[u8] {
        if self.is_eui64 { &self.octets } else { &self.octets[..6] }
    }
}
