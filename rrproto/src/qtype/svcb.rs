use crate::dnsname::{parse_name, DNSName};
use crate::meta::DNSType;
use crate::packet::Packet;
use crate::qtype::helper::build_string;
use crate::qtype::DNSWireFrame;
use crate::svcparam::SvcParam;
use nom::number::complete::be_u16;
use nom::IResult;
use rrlib::errors::DNSProtoErr;
use std::collections::BTreeMap;
use std::fmt::{self, Formatter};
use std::str::FromStr;

// https://www.rfc-editor.org/rfc/rfc9460.html#section-2.2
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |          SvcPriority          |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// /          TargetName           /
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// /          SvcParams            /
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// _8443._foo.api.example.com. 7200 IN SVCB 0 svc4.example.net.
// svc.example.com.            7200 IN SVCB 1 . alpn=h2,h3 port=8443
#[derive(Debug, PartialEq, Clone)]
pub struct DnsTypeSVCB {
    priority: u16,
    target: DNSName,
    // keyed by SvcParamKey, iteration order is the wire order
    params: BTreeMap<u16, SvcParam>,
}

fn parse_priority(input: &[u8]) -> IResult<&[u8], u16> {
    be_u16(input)
}

impl DnsTypeSVCB {
    pub fn new(priority: u16, target: &str) -> Result<Self, DNSProtoErr> {
        Ok(DnsTypeSVCB {
            priority,
            target: DNSName::new(target)?,
            params: BTreeMap::new(),
        })
    }

    pub fn priority(&self) -> u16 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: u16) {
        self.priority = priority;
        if priority == 0 {
            self.params.clear();
        }
    }

    pub fn target(&self) -> &DNSName {
        &self.target
    }

    pub fn set_target(&mut self, target: DNSName) {
        self.target = target
    }

    /// AliasMode carries no params.
    pub fn is_alias_form(&self) -> bool {
        self.priority == 0
    }

    pub fn params(&self) -> &BTreeMap<u16, SvcParam> {
        &self.params
    }

    pub fn param(&self, key: u16) -> Option<&SvcParam> {
        self.params.get(&key)
    }

    pub fn insert_param(&mut self, param: SvcParam) -> Result<(), DNSProtoErr> {
        if self.is_alias_form() {
            return Err(DNSProtoErr::InvalidFieldValue(format!(
                "alias form record can not carry {}",
                param.name()
            )));
        }
        let key = param.key();
        if self.params.contains_key(&key) {
            return Err(DNSProtoErr::DuplicateParamKey(key));
        }
        self.params.insert(key, param);
        Ok(())
    }

    pub fn remove_param(&mut self, key: u16) -> Option<SvcParam> {
        self.params.remove(&key)
    }

    pub fn with_param(mut self, param: SvcParam) -> Result<Self, DNSProtoErr> {
        self.insert_param(param)?;
        Ok(self)
    }
}

impl FromStr for DnsTypeSVCB {
    type Err = DNSProtoErr;

    // priority target [param]...
    fn from_str(rdata: &str) -> Result<Self, Self::Err> {
        let tokens = build_string(&rdata.split_whitespace().collect::<Vec<&str>>())?;
        if tokens.len() < 2 {
            return Err(DNSProtoErr::MalformedText(format!(
                "svcb rdata `{}` needs a priority and a target",
                rdata
            )));
        }
        let mut svcb = DnsTypeSVCB::new(u16::from_str(tokens[0].as_str())?, tokens[1].as_str())?;
        for token in &tokens[2..] {
            svcb.insert_param(SvcParam::from_str(token.as_str())?)?;
        }
        Ok(svcb)
    }
}

impl fmt::Display for DnsTypeSVCB {
    fn fmt(&self, format: &mut Formatter<'_>) -> fmt::Result {
        write!(format, "{} {}", self.priority, self.target)?;
        for param in self.params.values() {
            write!(format, " {}", param)?;
        }
        Ok(())
    }
}

impl DNSWireFrame for DnsTypeSVCB {
    fn decode(data: &[u8], original: Option<&[u8]>) -> Result<Self, DNSProtoErr> {
        let (rest, priority) = parse_priority(data)?;
        let (mut rest, target) = parse_name(rest, original.unwrap_or(&[]))?;
        let mut params = BTreeMap::new();
        // trailing octets of an alias form record are ignored
        if priority != 0 {
            while !rest.is_empty() {
                let (param, next) = SvcParam::parse_next(rest)?;
                let key = param.key();
                if params.contains_key(&key) {
                    return Err(DNSProtoErr::DuplicateParamKey(key));
                }
                params.insert(key, param);
                rest = next;
            }
        }
        Ok(DnsTypeSVCB {
            priority,
            target,
            params,
        })
    }

    fn get_type(&self) -> DNSType {
        DNSType::SVCB
    }

    // rfc9460 forbids compressing the target name
    fn encode(&self, packet: &mut Packet) -> Result<usize, DNSProtoErr> {
        let start = packet.current_write_offset();
        packet.write_u16(self.priority)?;
        packet.write_name(&self.target)?;
        for param in self.params.values() {
            packet.write_bytes(param.serialize()?.as_slice())?;
        }
        Ok(packet.current_write_offset() - start)
    }
}

#[cfg(test)]
mod test {
    use crate::dnsname::DNSName;
    use crate::packet::Packet;
    use crate::qtype::svcb::DnsTypeSVCB;
    use crate::qtype::DNSWireFrame;
    use crate::svcparam::SvcParam;
    use rrlib::errors::DNSProtoErr;
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    fn encode(svcb: &DnsTypeSVCB) -> Vec<u8> {
        let mut packet = Packet::new(true);
        svcb.encode(&mut packet).unwrap();
        packet.into_inner()
    }

    // https://www.rfc-editor.org/rfc/rfc9460.html#name-test-vectors
    fn get_example_svcb() -> Vec<(&'static str, &'static [u8], DnsTypeSVCB, &'static str)> {
        vec![
            (
                "D.1. AliasMode",
                &b"\x00\x00\x03foo\x07example\x03com\x00"[..],
                DnsTypeSVCB::new(0, "foo.example.com").unwrap(),
                "0 foo.example.com.",
            ),
            (
                "D.2.3. TargetName Is '.'",
                &b"\x00\x01\x00"[..],
                DnsTypeSVCB::new(1, ".").unwrap(),
                "1 .",
            ),
            (
                "D.2.4. Specified a Port",
                &b"\x00\x10\x03foo\x07example\x03com\x00\x00\x03\x00\x02\x00\x35"[..],
                DnsTypeSVCB::new(16, "foo.example.com")
                    .unwrap()
                    .with_param(SvcParam::port(53))
                    .unwrap(),
                "16 foo.example.com. port=53",
            ),
            (
                "D.2.7. Two Quoted IPv6 Hints",
                &b"\x00\x01\x03foo\x07example\x03com\x00\x00\x06\x00\x20\
                    \x20\x01\x0d\xb8\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x01\
                    \x20\x01\x0d\xb8\x00\x00\x00\x00\x00\x00\x00\x00\x00\x53\x00\x01"[..],
                DnsTypeSVCB::new(1, "foo.example.com")
                    .unwrap()
                    .with_param(
                        SvcParam::ipv6hint(vec![
                            "2001:db8::1".parse().unwrap(),
                            "2001:db8::53:1".parse().unwrap(),
                        ])
                        .unwrap(),
                    )
                    .unwrap(),
                "1 foo.example.com. ipv6hint=2001:db8::1,2001:db8::53:1",
            ),
            (
                "D.2.10. SvcParamKey Ordering Is Arbitrary in Presentation Format but Sorted in Wire Format",
                &b"\x00\x10\x03foo\x07example\x03org\x00\
                    \x00\x00\x00\x04\x00\x01\x00\x04\
                    \x00\x01\x00\x09\x02h2\x05h3-19\
                    \x00\x04\x00\x04\xc0\x00\x02\x01"[..],
                DnsTypeSVCB::new(16, "foo.example.org")
                    .unwrap()
                    .with_param(SvcParam::ipv4hint(vec![Ipv4Addr::new(192, 0, 2, 1)]).unwrap())
                    .unwrap()
                    .with_param(SvcParam::alpn(vec!["h2", "h3-19"]).unwrap())
                    .unwrap()
                    .with_param(SvcParam::mandatory(vec![4, 1]).unwrap())
                    .unwrap(),
                "16 foo.example.org. mandatory=alpn,ipv4hint alpn=h2,h3-19 ipv4hint=192.0.2.1",
            ),
        ]
    }

    #[test]
    fn test_svcb_rfc_vectors() {
        for (name, wire, svcb, text) in get_example_svcb() {
            assert_eq!(encode(&svcb), wire.to_vec(), "{}", name);
            assert_eq!(DnsTypeSVCB::decode(wire, None).unwrap(), svcb, "{}", name);
            assert_eq!(svcb.to_string(), text, "{}", name);
            assert_eq!(DnsTypeSVCB::from_str(text).unwrap(), svcb, "{}", name);
        }
    }

    #[test]
    fn test_svcb_text_any_order() {
        let svcb = DnsTypeSVCB::from_str(
            "16 foo.example.org. alpn=h2,h3-19 mandatory=ipv4hint,alpn ipv4hint=192.0.2.1",
        )
        .unwrap();
        assert_eq!(svcb, get_example_svcb()[4].2);
        let svcb = DnsTypeSVCB::from_str("1 foo.example.com. alpn=\"h2,h3\" port=\"443\"").unwrap();
        assert_eq!(svcb.param(3), Some(&SvcParam::Port(443)));
        assert_eq!(svcb.params().len(), 2);
    }

    #[test]
    fn test_alias_form_ignores_params() {
        let wire = b"\x00\x00\x03foo\x07example\x03com\x00\x00\x03\x00\x02\x00\x35";
        let svcb = DnsTypeSVCB::decode(wire, None).unwrap();
        assert!(svcb.is_alias_form());
        assert!(svcb.params().is_empty());
        // even garbage after the target
        let svcb = DnsTypeSVCB::decode(b"\x00\x00\x00\xff", None).unwrap();
        assert!(svcb.params().is_empty());
        assert!(DnsTypeSVCB::from_str("0 foo.example.com. port=53").is_err());
    }

    #[test]
    fn test_svcb_decode_failures() {
        let duplicated = b"\x00\x01\x00\x00\x03\x00\x02\x00\x35\x00\x03\x00\x02\x01\xbb";
        assert_eq!(
            DnsTypeSVCB::decode(duplicated, None),
            Err(DNSProtoErr::DuplicateParamKey(3))
        );
        // D.2.6 uses an unregistered key
        let generic = b"\x00\x01\x03foo\x07example\x03com\x00\x02\x9b\x00\x09hello\xd2qoo";
        assert_eq!(
            DnsTypeSVCB::decode(generic, None),
            Err(DNSProtoErr::UnknownParamKey(667))
        );
        let short_param = b"\x00\x01\x00\x00\x03\x00\x04\x00\x35";
        assert!(matches!(
            DnsTypeSVCB::decode(short_param, None),
            Err(DNSProtoErr::TruncatedInput(_))
        ));
        assert!(matches!(
            DnsTypeSVCB::decode(b"\x00", None),
            Err(DNSProtoErr::TruncatedInput(_))
        ));
        assert!(matches!(
            DnsTypeSVCB::decode(b"\x00\x01\x03foo", None),
            Err(DNSProtoErr::TruncatedInput(_))
        ));
    }

    #[test]
    fn test_svcb_compressed_target() {
        // message: "example.com" at 0, then rdata with priority 1 and a
        // pointer to it followed by port=53
        let message = b"\x07example\x03com\x00\x00\x01\xc0\x00\x00\x03\x00\x02\x00\x35";
        let svcb = DnsTypeSVCB::decode(&message[13..], Some(&message[..])).unwrap();
        assert_eq!(svcb.target(), &DNSName::new("example.com.").unwrap());
        assert_eq!(svcb.param(3), Some(&SvcParam::Port(53)));
        // re-encoded in full
        assert_eq!(encode(&svcb).len(), 2 + 13 + 6);
    }

    #[test]
    fn test_svcb_escaped_values() {
        // target label with a dot, alpn ids with space, quote and 0xff,
        // dohpath with a space
        let wire = &b"\x00\x01\x03a.b\x00\x00\x01\x00\x0a\x03h 2\x03a\"b\x01\xff\x00\x07\x00\x04/a b"[..];
        let text = "1 a\\.b. alpn=h\\0322,a\\034b,\\255 dohpath=/a\\032b";
        let svcb = DnsTypeSVCB::decode(wire, None).unwrap();
        assert_eq!(svcb.to_string(), text);
        let parsed = DnsTypeSVCB::from_str(svcb.to_string().as_str()).unwrap();
        assert_eq!(parsed, svcb);
        assert_eq!(encode(&parsed), wire.to_vec());
        assert_eq!(
            parsed.param(1),
            Some(&SvcParam::alpn(vec![&b"h 2"[..], &b"a\"b"[..], &[0xff][..]]).unwrap())
        );
        assert_eq!(parsed.param(7), Some(&SvcParam::dohpath("/a b").unwrap()));
    }

    #[test]
    fn test_svcb_text_failures() {
        assert!(matches!(
            DnsTypeSVCB::from_str("1"),
            Err(DNSProtoErr::MalformedText(_))
        ));
        assert!(matches!(
            DnsTypeSVCB::from_str("x foo.example.com."),
            Err(DNSProtoErr::MalformedText(_))
        ));
        assert_eq!(
            DnsTypeSVCB::from_str("1 foo.example.com. port=53 port=54"),
            Err(DNSProtoErr::DuplicateParamKey(3))
        );
        assert!(matches!(
            DnsTypeSVCB::from_str("1 foo.example.com. alpn=\"h2"),
            Err(DNSProtoErr::MalformedText(_))
        ));
    }

    #[test]
    fn test_svcb_mutation() {
        let mut svcb = DnsTypeSVCB::from_str("1 . port=53").unwrap();
        svcb.insert_param(SvcParam::no_default_alpn()).unwrap();
        assert_eq!(svcb.to_string(), "1 . no-default-alpn port=53");
        assert_eq!(svcb.remove_param(3), Some(SvcParam::Port(53)));
        svcb.set_priority(0);
        assert!(svcb.params().is_empty());
        assert!(svcb.insert_param(SvcParam::port(1)).is_err());
    }
}
