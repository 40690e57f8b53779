use super::{key_name, SvcParam, SvcParamKey};
use nom::number::complete::be_u16;
use nom::sequence::tuple;
use rrlib::errors::DNSProtoErr;
use std::collections::BTreeSet;
use std::net::{Ipv4Addr, Ipv6Addr};

pub(super) fn peek_header(tlv: &[u8]) -> Result<(u16, u16), DNSProtoErr> {
    let (_, (key, length)) = tuple((be_u16, be_u16))(tlv)
        .map_err(|_: nom::Err<nom::error::Error<&[u8]>>| {
            DNSProtoErr::TruncatedInput(format!(
                "svc param header needs 4 octets, {} remain",
                tlv.len()
            ))
        })?;
    Ok((key, length))
}

// Checks the tlv belongs to `expect` and that the declared length covers
// exactly the octets after the header, then hands back the value.
fn split_tlv(tlv: &[u8], expect: u16) -> Result<&[u8], DNSProtoErr> {
    let (key, length) = peek_header(tlv)?;
    if key != expect {
        return Err(DNSProtoErr::InvalidFieldValue(format!(
            "{} handed to the {} decoder",
            key_name(key),
            key_name(expect)
        )));
    }
    let value = &tlv[4..];
    if length as usize != value.len() {
        return Err(DNSProtoErr::LengthMismatch(format!(
            "{} declares {} octets, value has {}",
            key_name(key),
            length,
            value.len()
        )));
    }
    Ok(value)
}

pub(super) fn from_wire(key: SvcParamKey, tlv: &[u8]) -> Result<SvcParam, DNSProtoErr> {
    match key {
        SvcParamKey::Mandatory => mandatory_from_wire(tlv),
        SvcParamKey::Alpn => alpn_from_wire(tlv),
        SvcParamKey::NoDefaultAlpn => no_default_alpn_from_wire(tlv),
        SvcParamKey::Port => port_from_wire(tlv),
        SvcParamKey::Ipv4Hint => ipv4hint_from_wire(tlv),
        SvcParamKey::Ech => ech_from_wire(tlv),
        SvcParamKey::Ipv6Hint => ipv6hint_from_wire(tlv),
        SvcParamKey::DohPath => dohpath_from_wire(tlv),
    }
}

fn mandatory_from_wire(tlv: &[u8]) -> Result<SvcParam, DNSProtoErr> {
    let value = split_tlv(tlv, SvcParamKey::Mandatory.into())?;
    if value.len() % 2 != 0 {
        return Err(DNSProtoErr::LengthMismatch(format!(
            "mandatory length {} is not a multiple of 2",
            value.len()
        )));
    }
    SvcParam::mandatory(
        value
            .chunks_exact(2)
            .map(|id| u16::from_be_bytes([id[0], id[1]])),
    )
}

fn alpn_from_wire(tlv: &[u8]) -> Result<SvcParam, DNSProtoErr> {
    let value = split_tlv(tlv, SvcParamKey::Alpn.into())?;
    let mut ids = vec![];
    let mut offset = 0;
    while offset < value.len() {
        let size = value[offset] as usize;
        if size == 0 {
            return Err(DNSProtoErr::InvalidFieldValue(
                "alpn id of zero length".to_owned(),
            ));
        }
        if offset + 1 + size > value.len() {
            return Err(DNSProtoErr::InvalidFieldValue(format!(
                "alpn id of {} octets overruns the {} left",
                size,
                value.len() - offset - 1
            )));
        }
        ids.push(value[offset + 1..offset + 1 + size].to_vec());
        offset += 1 + size;
    }
    Ok(SvcParam::Alpn(ids))
}

fn no_default_alpn_from_wire(tlv: &[u8]) -> Result<SvcParam, DNSProtoErr> {
    let value = split_tlv(tlv, SvcParamKey::NoDefaultAlpn.into())?;
    if !value.is_empty() {
        return Err(DNSProtoErr::LengthMismatch(format!(
            "no-default-alpn carries {} octets, expect none",
            value.len()
        )));
    }
    Ok(SvcParam::NoDefaultAlpn)
}

fn port_from_wire(tlv: &[u8]) -> Result<SvcParam, DNSProtoErr> {
    let value = split_tlv(tlv, SvcParamKey::Port.into())?;
    if value.len() != 2 {
        return Err(DNSProtoErr::LengthMismatch(format!(
            "port carries {} octets, expect 2",
            value.len()
        )));
    }
    Ok(SvcParam::Port(u16::from_be_bytes([value[0], value[1]])))
}

fn ipv4hint_from_wire(tlv: &[u8]) -> Result<SvcParam, DNSProtoErr> {
    let value = split_tlv(tlv, SvcParamKey::Ipv4Hint.into())?;
    if value.is_empty() || value.len() % 4 != 0 {
        return Err(DNSProtoErr::LengthMismatch(format!(
            "ipv4hint length {} is not a positive multiple of 4",
            value.len()
        )));
    }
    Ok(SvcParam::Ipv4Hint(
        value
            .chunks_exact(4)
            .map(|ip| Ipv4Addr::new(ip[0], ip[1], ip[2], ip[3]))
            .collect(),
    ))
}

fn ech_from_wire(tlv: &[u8]) -> Result<SvcParam, DNSProtoErr> {
    let value = split_tlv(tlv, SvcParamKey::Ech.into())?;
    SvcParam::ech(value)
}

fn ipv6hint_from_wire(tlv: &[u8]) -> Result<SvcParam, DNSProtoErr> {
    let value = split_tlv(tlv, SvcParamKey::Ipv6Hint.into())?;
    if value.is_empty() || value.len() % 16 != 0 {
        return Err(DNSProtoErr::LengthMismatch(format!(
            "ipv6hint length {} is not a positive multiple of 16",
            value.len()
        )));
    }
    let mut ips = vec![];
    for chunk in value.chunks_exact(16) {
        let mut octets = [0u8; 16];
        octets.copy_from_slice(chunk);
        ips.push(Ipv6Addr::from(octets));
    }
    Ok(SvcParam::Ipv6Hint(ips))
}

fn dohpath_from_wire(tlv: &[u8]) -> Result<SvcParam, DNSProtoErr> {
    let value = split_tlv(tlv, SvcParamKey::DohPath.into())?;
    match std::str::from_utf8(value) {
        Ok(template) => SvcParam::dohpath(template),
        Err(_) => Err(DNSProtoErr::InvalidFieldValue(
            "dohpath is not valid utf8".to_owned(),
        )),
    }
}

pub(super) fn opaque_from_wire(tlv: &[u8]) -> Result<SvcParam, DNSProtoErr> {
    let (key, _) = peek_header(tlv)?;
    let value = split_tlv(tlv, key)?;
    SvcParam::opaque(key, value)
}

fn ids_to_bytes(ids: &BTreeSet<u16>) -> Vec<u8> {
    ids.iter().flat_map(|id| id.to_be_bytes().to_vec()).collect()
}

pub(super) fn value_bytes(param: &SvcParam) -> Result<Vec<u8>, DNSProtoErr> {
    let value = match param {
        SvcParam::Mandatory(ids) => ids_to_bytes(ids),
        SvcParam::Alpn(ids) => {
            let mut data = vec![];
            for id in ids {
                if id.is_empty() || id.len() > 255 {
                    return Err(DNSProtoErr::InvalidFieldValue(format!(
                        "alpn id of {} octets not in [1,255]",
                        id.len()
                    )));
                }
                data.push(id.len() as u8);
                data.extend_from_slice(id.as_slice());
            }
            data
        }
        SvcParam::NoDefaultAlpn => vec![],
        SvcParam::Port(port) => port.to_be_bytes().to_vec(),
        SvcParam::Ipv4Hint(ips) => ips.iter().flat_map(|ip| ip.octets().to_vec()).collect(),
        SvcParam::Ech(config) => config.clone(),
        SvcParam::Ipv6Hint(ips) => ips.iter().flat_map(|ip| ip.octets().to_vec()).collect(),
        SvcParam::DohPath(template) => template.as_bytes().to_vec(),
        SvcParam::Opaque { value, .. } => value.clone(),
    };
    Ok(value)
}

#[cfg(test)]
mod test {
    use crate::svcparam::SvcParam;
    use rrlib::errors::DNSProtoErr;
    use std::net::Ipv4Addr;

    #[test]
    fn test_parse_each_variant() {
        let cases: &[(&[u8], SvcParam)] = &[
            (
                b"\x00\x00\x00\x04\x00\x01\x00\x04",
                SvcParam::mandatory(vec![1, 4]).unwrap(),
            ),
            (
                b"\x00\x01\x00\x09\x02h2\x05h3-19",
                SvcParam::alpn(vec!["h2", "h3-19"]).unwrap(),
            ),
            (b"\x00\x02\x00\x00", SvcParam::NoDefaultAlpn),
            (b"\x00\x03\x00\x02\x01\xbb", SvcParam::Port(443)),
            (
                b"\x00\x04\x00\x04\xc0\x00\x02\x01",
                SvcParam::ipv4hint(vec![Ipv4Addr::new(192, 0, 2, 1)]).unwrap(),
            ),
            (b"\x00\x05\x00\x03abc", SvcParam::Ech(b"abc".to_vec())),
            (
                b"\x00\x07\x00\x10/dns-query{?dns}",
                SvcParam::DohPath("/dns-query{?dns}".to_owned()),
            ),
            (
                b"\xff\x00\x00\x02\xbe\xef",
                SvcParam::Opaque {
                    key: 65280,
                    value: vec![0xbe, 0xef],
                },
            ),
        ];
        for (wire, param) in cases {
            assert_eq!(SvcParam::parse(wire).unwrap(), *param);
            assert_eq!(param.serialize().unwrap(), wire.to_vec());
        }
    }

    #[test]
    fn test_parse_ignores_trailing_octets() {
        let wire = b"\x00\x03\x00\x02\x00\x35\x00\x02\x00\x00";
        assert_eq!(SvcParam::parse(wire), Ok(SvcParam::Port(53)));
    }

    #[test]
    fn test_parse_failures() {
        let cases: &[(&[u8], DNSProtoErr)] = &[
            (
                b"\x00\x03\x00",
                DNSProtoErr::TruncatedInput("svc param header needs 4 octets, 3 remain".into()),
            ),
            (
                b"\x00\x03\x00\x04\x00\x35",
                DNSProtoErr::TruncatedInput("port declares 4 octets but 2 remain".into()),
            ),
            (
                b"\x00\x04\x00\x03\xc0\x00\x02",
                DNSProtoErr::LengthMismatch(
                    "ipv4hint length 3 is not a positive multiple of 4".into(),
                ),
            ),
            (
                b"\x00\x06\x00\x04\x20\x01\x0d\xb8",
                DNSProtoErr::LengthMismatch(
                    "ipv6hint length 4 is not a positive multiple of 16".into(),
                ),
            ),
            (
                b"\x00\x01\x00\x03\x05h2",
                DNSProtoErr::InvalidFieldValue("alpn id of 5 octets overruns the 2 left".into()),
            ),
            (
                b"\x00\x01\x00\x01\x00",
                DNSProtoErr::InvalidFieldValue("alpn id of zero length".into()),
            ),
            (
                b"\x00\x00\x00\x03\x00\x01\x00",
                DNSProtoErr::LengthMismatch("mandatory length 3 is not a multiple of 2".into()),
            ),
            (
                b"\x00\x03\x00\x01\x00",
                DNSProtoErr::LengthMismatch("port carries 1 octets, expect 2".into()),
            ),
            (
                b"\x00\x02\x00\x01\x00",
                DNSProtoErr::LengthMismatch("no-default-alpn carries 1 octets, expect none".into()),
            ),
            (
                b"\x00\x05\x00\x00",
                DNSProtoErr::InvalidFieldValue("ech config list is empty".into()),
            ),
            (
                b"\x00\x07\x00\x02\xff\xfe",
                DNSProtoErr::InvalidFieldValue("dohpath is not valid utf8".into()),
            ),
            (b"\x02\x9b\x00\x01\x00", DNSProtoErr::UnknownParamKey(667)),
            (b"\xff\xff\x00\x00", DNSProtoErr::UnknownParamKey(65535)),
        ];
        for (wire, err) in cases {
            assert_eq!(SvcParam::parse(wire).as_ref(), Err(err));
        }
    }

    #[test]
    fn test_variant_decoder_checks_key() {
        let err = super::from_wire(super::SvcParamKey::Port, b"\x00\x04\x00\x02\x00\x35");
        assert!(matches!(err, Err(DNSProtoErr::InvalidFieldValue(_))));
    }
}
