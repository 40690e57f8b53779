// https://www.rfc-editor.org/rfc/rfc9460.html#section-2.2
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |          SvcParamKey          |        length of value        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// /                        SvcParamValue                          /
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
mod text;
mod wire;

use crate::utils::escape_octets;
use itertools::Itertools;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use rrlib::errors::DNSProtoErr;
use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::fmt::{self, Formatter};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

pub const PRIVATE_USE_START: u16 = 65280;
pub const PRIVATE_USE_END: u16 = 65534;

/// The registered SvcParamKeys this codec understands.
#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Copy,
    Clone,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    EnumString,
    Display,
)]
#[repr(u16)]
pub enum SvcParamKey {
    #[strum(serialize = "mandatory")]
    Mandatory = 0,
    #[strum(serialize = "alpn")]
    Alpn = 1,
    #[strum(serialize = "no-default-alpn")]
    NoDefaultAlpn = 2,
    #[strum(serialize = "port")]
    Port = 3,
    #[strum(serialize = "ipv4hint")]
    Ipv4Hint = 4,
    #[strum(serialize = "ech")]
    Ech = 5,
    #[strum(serialize = "ipv6hint")]
    Ipv6Hint = 6,
    // rfc9461
    #[strum(serialize = "dohpath")]
    DohPath = 7,
}

pub fn is_private_use(key: u16) -> bool {
    (PRIVATE_USE_START..=PRIVATE_USE_END).contains(&key)
}

/// Canonical mnemonic of a key, `key<id>` when it has none.
pub fn key_name(key: u16) -> String {
    match SvcParamKey::try_from(key) {
        Ok(k) => k.to_string(),
        Err(_) => format!("key{}", key),
    }
}

/// Inverse of `key_name`; also accepts the generic `key<id>` form for
/// registered keys.
pub fn key_from_name(name: &str) -> Result<u16, DNSProtoErr> {
    let name = name.to_lowercase();
    if let Ok(key) = SvcParamKey::from_str(name.as_str()) {
        return Ok(key.into());
    }
    match name.strip_prefix("key") {
        Some(id) if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) => {
            u16::from_str(id).map_err(|_| {
                DNSProtoErr::InvalidFieldValue(format!("svc param key `{}` out of range", name))
            })
        }
        _ => Err(DNSProtoErr::MalformedText(format!(
            "unknown svc param name `{}`",
            name
        ))),
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SvcParam {
    /// Keys a client must understand, kept sorted by id.
    Mandatory(BTreeSet<u16>),
    /// ALPN protocol ids, in the order given.
    Alpn(Vec<Vec<u8>>),
    NoDefaultAlpn,
    Port(u16),
    Ipv4Hint(Vec<Ipv4Addr>),
    /// ECHConfigList, opaque to this codec.
    Ech(Vec<u8>),
    Ipv6Hint(Vec<Ipv6Addr>),
    /// URI template for DNS over HTTPS.
    DohPath(String),
    /// Private use key, value carried as is.
    Opaque { key: u16, value: Vec<u8> },
}

impl SvcParam {
    pub fn mandatory<I: IntoIterator<Item = u16>>(keys: I) -> Result<Self, DNSProtoErr> {
        let mut ids = BTreeSet::new();
        for key in keys {
            if key == u16::from(SvcParamKey::Mandatory) {
                return Err(DNSProtoErr::InvalidFieldValue(
                    "mandatory must not list itself".to_owned(),
                ));
            }
            if !ids.insert(key) {
                return Err(DNSProtoErr::InvalidFieldValue(format!(
                    "mandatory lists {} more than once",
                    key_name(key)
                )));
            }
        }
        Ok(SvcParam::Mandatory(ids))
    }

    pub fn alpn<I, T>(ids: I) -> Result<Self, DNSProtoErr>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut alpn = vec![];
        for id in ids {
            let id = id.as_ref();
            if id.is_empty() || id.len() > 255 {
                return Err(DNSProtoErr::InvalidFieldValue(format!(
                    "alpn id of {} octets not in [1,255]",
                    id.len()
                )));
            }
            alpn.push(id.to_vec());
        }
        Ok(SvcParam::Alpn(alpn))
    }

    pub fn no_default_alpn() -> Self {
        SvcParam::NoDefaultAlpn
    }

    pub fn port(port: u16) -> Self {
        SvcParam::Port(port)
    }

    pub fn ipv4hint<I: IntoIterator<Item = Ipv4Addr>>(ips: I) -> Result<Self, DNSProtoErr> {
        let ips: Vec<Ipv4Addr> = ips.into_iter().collect();
        if ips.is_empty() {
            return Err(DNSProtoErr::LengthMismatch(
                "ipv4hint needs at least one address".to_owned(),
            ));
        }
        Ok(SvcParam::Ipv4Hint(ips))
    }

    pub fn ipv6hint<I: IntoIterator<Item = Ipv6Addr>>(ips: I) -> Result<Self, DNSProtoErr> {
        let ips: Vec<Ipv6Addr> = ips.into_iter().collect();
        if ips.is_empty() {
            return Err(DNSProtoErr::LengthMismatch(
                "ipv6hint needs at least one address".to_owned(),
            ));
        }
        Ok(SvcParam::Ipv6Hint(ips))
    }

    pub fn ech(config_list: &[u8]) -> Result<Self, DNSProtoErr> {
        if config_list.is_empty() {
            return Err(DNSProtoErr::InvalidFieldValue(
                "ech config list is empty".to_owned(),
            ));
        }
        Ok(SvcParam::Ech(config_list.to_vec()))
    }

    pub fn dohpath(template: &str) -> Result<Self, DNSProtoErr> {
        if template.is_empty() {
            return Err(DNSProtoErr::InvalidFieldValue(
                "dohpath template is empty".to_owned(),
            ));
        }
        Ok(SvcParam::DohPath(template.to_owned()))
    }

    pub fn opaque(key: u16, value: &[u8]) -> Result<Self, DNSProtoErr> {
        if !is_private_use(key) {
            return Err(DNSProtoErr::UnknownParamKey(key));
        }
        Ok(SvcParam::Opaque {
            key,
            value: value.to_vec(),
        })
    }

    pub fn key(&self) -> u16 {
        let key = match self {
            SvcParam::Mandatory(_) => SvcParamKey::Mandatory,
            SvcParam::Alpn(_) => SvcParamKey::Alpn,
            SvcParam::NoDefaultAlpn => SvcParamKey::NoDefaultAlpn,
            SvcParam::Port(_) => SvcParamKey::Port,
            SvcParam::Ipv4Hint(_) => SvcParamKey::Ipv4Hint,
            SvcParam::Ech(_) => SvcParamKey::Ech,
            SvcParam::Ipv6Hint(_) => SvcParamKey::Ipv6Hint,
            SvcParam::DohPath(_) => SvcParamKey::DohPath,
            SvcParam::Opaque { key, .. } => return *key,
        };
        key.into()
    }

    pub fn name(&self) -> String {
        key_name(self.key())
    }

    /// Decode one TLV. `binary_data` starts at the key and may run past the
    /// end of the value, only `4 + length` octets are looked at.
    pub fn parse(binary_data: &[u8]) -> Result<Self, DNSProtoErr> {
        let (key, length) = wire::peek_header(binary_data)?;
        let end = 4 + length as usize;
        if end > binary_data.len() {
            return Err(DNSProtoErr::TruncatedInput(format!(
                "{} declares {} octets but {} remain",
                key_name(key),
                length,
                binary_data.len() - 4
            )));
        }
        let tlv = &binary_data[..end];
        match SvcParamKey::try_from(key) {
            Ok(registered) => wire::from_wire(registered, tlv),
            Err(_) if is_private_use(key) => wire::opaque_from_wire(tlv),
            Err(_) => Err(DNSProtoErr::UnknownParamKey(key)),
        }
    }

    /// Decode the TLV at the front of `binary_data` and return the octets
    /// after it.
    pub fn parse_next(binary_data: &[u8]) -> Result<(Self, &[u8]), DNSProtoErr> {
        let param = SvcParam::parse(binary_data)?;
        let (_, length) = wire::peek_header(binary_data)?;
        Ok((param, &binary_data[4 + length as usize..]))
    }

    /// Raw value octets, without the key and length header.
    pub fn value(&self) -> Result<Vec<u8>, DNSProtoErr> {
        wire::value_bytes(self)
    }

    /// `key || length || value`
    pub fn serialize(&self) -> Result<Vec<u8>, DNSProtoErr> {
        let value = self.value()?;
        if value.len() > u16::MAX as usize {
            return Err(DNSProtoErr::EncodeError(format!(
                "{} value of {} octets does not fit a tlv",
                self.name(),
                value.len()
            )));
        }
        let mut data = Vec::with_capacity(4 + value.len());
        data.extend_from_slice(&self.key().to_be_bytes()[..]);
        data.extend_from_slice(&(value.len() as u16).to_be_bytes()[..]);
        data.extend_from_slice(value.as_slice());
        Ok(data)
    }
}

impl fmt::Display for SvcParam {
    fn fmt(&self, format: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SvcParam::Mandatory(keys) => write!(
                format,
                "mandatory={}",
                keys.iter().map(|k| key_name(*k)).join(",")
            ),
            SvcParam::Alpn(ids) => write!(
                format,
                "alpn={}",
                ids.iter().map(|id| escape_octets(id, b",")).join(",")
            ),
            SvcParam::NoDefaultAlpn => write!(format, "no-default-alpn"),
            SvcParam::Port(port) => write!(format, "port={}", port),
            SvcParam::Ipv4Hint(ips) => write!(format, "ipv4hint={}", ips.iter().join(",")),
            SvcParam::Ech(config) => write!(format, "ech={}", base64::encode(config)),
            SvcParam::Ipv6Hint(ips) => write!(format, "ipv6hint={}", ips.iter().join(",")),
            SvcParam::DohPath(template) => {
                write!(format, "dohpath={}", escape_octets(template.as_bytes(), b""))
            }
            SvcParam::Opaque { key, value } => write!(
                format,
                "{}={}",
                key_name(*key),
                data_encoding::HEXLOWER.encode(value)
            ),
        }
    }
}

impl FromStr for SvcParam {
    type Err = DNSProtoErr;

    /// Presentation form, `name` or `name=value`, value optionally quoted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        text::parse_param(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_registry() {
        assert_eq!(key_name(0), "mandatory");
        assert_eq!(key_name(2), "no-default-alpn");
        assert_eq!(key_name(7), "dohpath");
        assert_eq!(key_name(667), "key667");
        assert_eq!(key_from_name("ALPN"), Ok(1));
        assert_eq!(key_from_name("ipv6hint"), Ok(6));
        assert_eq!(key_from_name("key3"), Ok(3));
        assert_eq!(key_from_name("key65280"), Ok(65280));
        assert!(key_from_name("key70000").is_err());
        assert!(key_from_name("key").is_err());
        assert!(key_from_name("colour").is_err());
        assert!(is_private_use(65280));
        assert!(is_private_use(65534));
        assert!(!is_private_use(65535));
        assert!(!is_private_use(667));
    }

    #[test]
    fn test_param_display() {
        let cases = vec![
            (SvcParam::mandatory(vec![4, 1]).unwrap(), "mandatory=alpn,ipv4hint"),
            (SvcParam::mandatory(vec![9]).unwrap(), "mandatory=key9"),
            (SvcParam::alpn(vec!["h2", "h3-19"]).unwrap(), "alpn=h2,h3-19"),
            (SvcParam::alpn(vec!["a,b"]).unwrap(), "alpn=a\\,b"),
            (SvcParam::no_default_alpn(), "no-default-alpn"),
            (SvcParam::port(443), "port=443"),
            (
                SvcParam::ipv4hint(vec![Ipv4Addr::new(192, 0, 2, 1), Ipv4Addr::new(192, 0, 2, 2)])
                    .unwrap(),
                "ipv4hint=192.0.2.1,192.0.2.2",
            ),
            (
                SvcParam::ipv6hint(vec!["2001:db8::1".parse().unwrap()]).unwrap(),
                "ipv6hint=2001:db8::1",
            ),
            (SvcParam::ech(&[0x01, 0x02, 0x03]).unwrap(), "ech=AQID"),
            (SvcParam::dohpath("/q{?dns}").unwrap(), "dohpath=/q{?dns}"),
            (SvcParam::dohpath("/a b").unwrap(), "dohpath=/a\\032b"),
            (
                SvcParam::alpn(vec![&b"h 2"[..], &b"a\"b"[..], &[0xff][..]]).unwrap(),
                "alpn=h\\0322,a\\034b,\\255",
            ),
            (
                SvcParam::opaque(65280, &[0xde, 0xad]).unwrap(),
                "key65280=dead",
            ),
        ];
        for (param, text) in cases {
            assert_eq!(param.to_string(), text);
            assert_eq!(SvcParam::from_str(text), Ok(param));
        }
    }

    #[test]
    fn test_constructor_validation() {
        assert!(SvcParam::mandatory(vec![0]).is_err());
        assert!(SvcParam::mandatory(vec![1, 1]).is_err());
        assert!(SvcParam::alpn(vec![""]).is_err());
        assert!(SvcParam::ipv4hint(vec![]).is_err());
        assert!(SvcParam::ech(&[]).is_err());
        assert!(SvcParam::dohpath("").is_err());
        assert_eq!(
            SvcParam::opaque(667, &[1]),
            Err(DNSProtoErr::UnknownParamKey(667))
        );
    }

    #[test]
    fn test_serialize() {
        assert_eq!(
            SvcParam::port(53).serialize().unwrap(),
            vec![0x00, 0x03, 0x00, 0x02, 0x00, 0x35]
        );
        assert_eq!(
            SvcParam::no_default_alpn().serialize().unwrap(),
            vec![0x00, 0x02, 0x00, 0x00]
        );
        assert_eq!(
            SvcParam::alpn(vec!["h2", "h3-19"]).unwrap().serialize().unwrap(),
            b"\x00\x01\x00\x09\x02h2\x05h3-19".to_vec()
        );
        assert_eq!(
            SvcParam::mandatory(vec![4, 1]).unwrap().serialize().unwrap(),
            vec![0x00, 0x00, 0x00, 0x04, 0x00, 0x01, 0x00, 0x04]
        );
    }
}
