//! `inet`/`cidr`/`macaddr`/`macaddr8` codecs. Binary layout
//! for inet/cidr is PostgreSQL's `{family, bits, is_cidr, addr_len, addr...}`
//! header (`utils/adt/network.c`).

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::codec::{FromSqlValue, ToSqlValue};
use crate::error::{Error, Result};
use crate::format::{FormatCode, IsNull};
use crate::oid::{Oid, oid};
use crate::value::network::{Inet, MacAddr};

const PGSQL_AF_INET: u8 = 2;
const PGSQL_AF_INET6: u8 = 3;

impl<'a> FromSqlValue<'a> for Inet {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        match text.split_once('/') {
            Some((addr, prefix)) => {
                let addr: IpAddr = addr
                    .parse()
                    .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not a valid address"))?;
                let prefix_len: u8 = prefix
                    .parse()
                    .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not a valid prefix length"))?;
                Ok(Inet { addr, prefix_len })
            }
            None => {
                let addr: IpAddr = text
                    .parse()
                    .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not a valid address"))?;
                Ok(Inet::host(addr))
            }
        }
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "truncated inet header"));
        }
        let family = bytes[0];
        let prefix_len = bytes[1];
        let addr_len = bytes[3];
        let addr_bytes = &bytes[4..];
        if addr_bytes.len() != usize::from(addr_len) {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "address length mismatch"));
        }
        let addr = match family {
            PGSQL_AF_INET => {
                let arr: [u8; 4] = addr_bytes
                    .try_into()
                    .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "expected 4-byte IPv4 address"))?;
                IpAddr::V4(Ipv4Addr::from(arr))
            }
            PGSQL_AF_INET6 => {
                let arr: [u8; 16] = addr_bytes
                    .try_into()
                    .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "expected 16-byte IPv6 address"))?;
                IpAddr::V6(Ipv6Addr::from(arr))
            }
            other => {
                return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, format!("unknown address family {other}")));
            }
        };
        Ok(Inet { addr, prefix_len })
    }
}

impl ToSqlValue for Inet {
    fn natural_oid(&self) -> Oid {
        oid::INET
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let natural_prefix = if self.addr.is_ipv4() { 32 } else { 128 };
        if self.prefix_len == natural_prefix {
            buf.extend_from_slice(self.addr.to_string().as_bytes());
        } else {
            buf.extend_from_slice(format!("{}/{}", self.addr, self.prefix_len).as_bytes());
        }
        Ok(IsNull::No)
    }

    fn encode_binary(&self, oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let is_cidr = u8::from(oid == crate::oid::oid::CIDR);
        match self.addr {
            IpAddr::V4(v4) => {
                buf.push(PGSQL_AF_INET);
                buf.push(self.prefix_len);
                buf.push(is_cidr);
                buf.push(4);
                buf.extend_from_slice(&v4.octets());
            }
            IpAddr::V6(v6) => {
                buf.push(PGSQL_AF_INET6);
                buf.push(self.prefix_len);
                buf.push(is_cidr);
                buf.push(16);
                buf.extend_from_slice(&v6.octets());
            }
        }
        Ok(IsNull::No)
    }
}

impl<'a> FromSqlValue<'a> for MacAddr {
    fn from_sql_text(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let text = core::str::from_utf8(bytes)
            .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "not valid UTF-8"))?;
        let parts: Vec<&str> = text.split(|c| c == ':' || c == '-').collect();
        if parts.len() != 6 && parts.len() != 8 {
            return Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "expected 6 or 8 hex groups"));
        }
        let mut octets = [0u8; 8];
        for (i, part) in parts.iter().enumerate() {
            octets[i] = u8::from_str_radix(part, 16)
                .map_err(|_| Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Text, "invalid hex group"))?;
        }
        Ok(MacAddr { octets, is_eui64: parts.len() == 8 })
    }

    fn from_sql_binary(oid: Oid, name: Option<&str>, bytes: &'a [u8]) -> Result<Self> {
        let mut octets = [0u8; 8];
        match bytes.len() {
            6 => {
                octets[..6].copy_from_slice(bytes);
                Ok(MacAddr { octets, is_eui64: false })
            }
            8 => {
                octets.copy_from_slice(bytes);
                Ok(MacAddr { octets, is_eui64: true })
            }
            _ => Err(Error::wire_invalid(oid, name.map(str::to_owned), FormatCode::Binary, "expected 6 or 8 bytes")),
        }
    }
}

impl ToSqlValue for MacAddr {
    fn natural_oid(&self) -> Oid {
        if self.is_eui64 { oid::MACADDR8 } else { oid::MACADDR }
    }

    fn encode_text(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        let hex: Vec<String> = self.bytes().iter().map(|b| format!("{b:02x}")).collect();
        buf.extend_from_slice(hex.join(":").as_bytes());
        Ok(IsNull::No)
    }

    fn encode_binary(&self, _oid: Oid, _name: Option<&str>, buf: &mut Vec<u8>) -> Result<IsNull> {
        buf.extend_from_slice(self.bytes());
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inet_text_round_trip() {
        let inet: Inet = Inet::from_sql_text(oid::INET, None, b"192.168.1.0/24").unwrap();
        let mut buf = Vec::new();
        inet.encode_text(oid::INET, None, &mut buf).unwrap();
        assert_eq!(buf, b"192.168.1.0/24");
    }

    #[test]
    fn inet_binary_round_trip() {
        let inet: Inet = Inet::from_sql_text(oid::INET, None, b"10.0.0.1").unwrap();
        let mut buf = Vec::new();
        inet.encode_binary(oid::INET, None, &mut buf).unwrap();
        let decoded = Inet::from_sql_binary(oid::INET, None, &buf).unwrap();
        assert_eq!(decoded.addr, inet.addr);
        assert_eq!(decoded.prefix_len, inet.prefix_len);
    }

    #[test]
    fn macaddr_text_round_trip() {
        let mac: MacAddr = MacAddr::from_sql_text(oid::MACADDR, None, b"08:00:2b:01:02:03").unwrap();
        let mut buf = Vec::new();
        mac.encode_text(oid::MACADDR, None, &mut buf).unwrap();
        assert_eq!(buf, b"08:00:2b:01:02:03");
    }

    #[test]
    fn macaddr_binary_round_trip() {
        let mac = MacAddr { octets: [1, 2, 3, 4, 5, 6, 0, 0], is_eui64: false };
        let mut buf = Vec::new();
        mac.encode_binary(oid::MACADDR, None, &mut buf).unwrap();
        let decoded = MacAddr::from_sql_binary(oid::MACADDR, None, &buf).unwrap();
        assert_eq!(decoded, mac);
    }
}
