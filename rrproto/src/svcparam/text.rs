use super::{is_private_use, key_from_name, SvcParam, SvcParamKey};
use crate::utils::{unescape_octets, unquote};
use nom::bytes::complete::take_while1;
use rrlib::errors::DNSProtoErr;
use std::convert::TryFrom;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

fn require_value(name: &str, value: Option<String>) -> Result<String, DNSProtoErr> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DNSProtoErr::MalformedText(format!(
            "svc param `{}` needs a value",
            name
        ))),
    }
}

pub(super) fn parse_param(token: &str) -> Result<SvcParam, DNSProtoErr> {
    let (rest, name) = take_while1::<_, _, nom::error::Error<&str>>(is_key_char)(token)
        .map_err(|_| DNSProtoErr::MalformedText(format!("svc param `{}` has no name", token)))?;
    let value = match rest {
        "" => None,
        _ if rest.starts_with('=') => Some(unquote(&rest[1..])),
        _ => {
            return Err(DNSProtoErr::MalformedText(format!(
                "svc param `{}` is not name=value",
                token
            )))
        }
    };
    let key = key_from_name(name)?;
    let registered = match SvcParamKey::try_from(key) {
        Ok(registered) => registered,
        Err(_) if is_private_use(key) => {
            let value = value.unwrap_or_default();
            let raw = data_encoding::HEXLOWER_PERMISSIVE
                .decode(value.as_bytes())
                .map_err(|e| {
                    DNSProtoErr::InvalidFieldValue(format!("{} value is not hex: {}", name, e))
                })?;
            return SvcParam::opaque(key, raw.as_slice());
        }
        Err(_) => return Err(DNSProtoErr::UnknownParamKey(key)),
    };

    match registered {
        SvcParamKey::Mandatory => {
            let value = require_value(name, value)?;
            let mut keys = vec![];
            for item in value.split(',') {
                keys.push(key_from_name(item)?);
            }
            SvcParam::mandatory(keys)
        }
        SvcParamKey::Alpn => {
            let value = require_value(name, value)?;
            SvcParam::alpn(unescape_octets(value.as_str(), Some(','))?)
        }
        SvcParamKey::NoDefaultAlpn => match value {
            Some(v) if !v.is_empty() => Err(DNSProtoErr::InvalidFieldValue(format!(
                "no-default-alpn takes no value, got `{}`",
                v
            ))),
            _ => Ok(SvcParam::NoDefaultAlpn),
        },
        SvcParamKey::Port => {
            let value = require_value(name, value)?;
            match u16::from_str(value.as_str()) {
                Ok(port) => Ok(SvcParam::Port(port)),
                Err(_) => Err(DNSProtoErr::InvalidFieldValue(format!(
                    "port `{}` not in [0,65535]",
                    value
                ))),
            }
        }
        SvcParamKey::Ipv4Hint => {
            let value = require_value(name, value)?;
            let mut ips = vec![];
            for item in value.split(',') {
                ips.push(Ipv4Addr::from_str(item)?);
            }
            SvcParam::ipv4hint(ips)
        }
        SvcParamKey::Ech => {
            let value = require_value(name, value)?;
            let config = base64::decode(value.as_str()).map_err(|e| {
                DNSProtoErr::InvalidFieldValue(format!("ech value is not base64: {}", e))
            })?;
            SvcParam::ech(config.as_slice())
        }
        SvcParamKey::Ipv6Hint => {
            let value = require_value(name, value)?;
            let mut ips = vec![];
            for item in value.split(',') {
                ips.push(Ipv6Addr::from_str(item)?);
            }
            SvcParam::ipv6hint(ips)
        }
        SvcParamKey::DohPath => {
            let value = require_value(name, value)?;
            let raw = unescape_octets(value.as_str(), None)?.concat();
            let template = String::from_utf8(raw).map_err(|_| {
                DNSProtoErr::InvalidFieldValue("dohpath template is not utf8".to_owned())
            })?;
            SvcParam::dohpath(template.as_str())
        }
    }
}
