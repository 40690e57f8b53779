use crate::meta::DNSType;
use crate::packet::Packet;
use crate::qtype::DNSWireFrame;
use nom::number::complete::be_u16;
use nom::sequence::tuple;
use nom::IResult;
use rrlib::errors::DNSProtoErr;
use std::fmt::{self, Formatter};
use std::str::FromStr;

const NID_RDATA_LENGTH: usize = 10;

// https://tools.ietf.org/html/rfc6742#section-2.1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |          Preference           |                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
// |                             NodeID                            |
// +                               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// host1.example.com. 86400 IN NID 10 0014:4fff:ff20:ee64
#[derive(Debug, PartialEq, Clone)]
pub struct DnsTypeNID {
    preference: u16,
    node_id: [u16; 4],
}

fn parse_nid(input: &[u8]) -> IResult<&[u8], (u16, u16, u16, u16, u16)> {
    tuple((be_u16, be_u16, be_u16, be_u16, be_u16))(input)
}

fn parse_node_id(node_id: &str) -> Result<[u16; 4], DNSProtoErr> {
    let groups: Vec<&str> = node_id.split(':').collect();
    if groups.len() != 4 {
        return Err(DNSProtoErr::InvalidFieldValue(format!(
            "node id `{}` is not four 16 bit groups",
            node_id
        )));
    }
    let mut result = [0u16; 4];
    for (index, group) in groups.iter().enumerate() {
        if group.is_empty() || group.len() > 4 {
            return Err(DNSProtoErr::InvalidFieldValue(format!(
                "node id group `{}` is not 1 to 4 hex digits",
                group
            )));
        }
        result[index] = u16::from_str_radix(group, 16).map_err(|_| {
            DNSProtoErr::InvalidFieldValue(format!("node id group `{}` is not hex", group))
        })?;
    }
    Ok(result)
}

impl DnsTypeNID {
    pub fn new(preference: u16, node_id: &str) -> Result<Self, DNSProtoErr> {
        Ok(DnsTypeNID {
            preference,
            node_id: parse_node_id(node_id)?,
        })
    }

    pub fn preference(&self) -> u16 {
        self.preference
    }

    pub fn node_id(&self) -> String {
        let groups: Vec<String> = self.node_id.iter().map(|g| format!("{:x}", g)).collect();
        groups.join(":")
    }
}

impl FromStr for DnsTypeNID {
    type Err = DNSProtoErr;

    fn from_str(rdata: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = rdata.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(DNSProtoErr::MalformedText(format!(
                "nid rdata `{}` needs preference and node id",
                rdata
            )));
        }
        DnsTypeNID::new(u16::from_str(tokens[0])?, tokens[1])
    }
}

impl fmt::Display for DnsTypeNID {
    fn fmt(&self, format: &mut Formatter<'_>) -> fmt::Result {
        write!(format, "{} {}", self.preference, self.node_id())
    }
}

impl DNSWireFrame for DnsTypeNID {
    fn decode(data: &[u8], _: Option<&[u8]>) -> Result<Self, DNSProtoErr> {
        let (rest, (preference, g1, g2, g3, g4)) = parse_nid(data)?;
        if !rest.is_empty() {
            return Err(DNSProtoErr::LengthMismatch(format!(
                "nid rdata is {} octets, expect {}",
                data.len(),
                NID_RDATA_LENGTH
            )));
        }
        Ok(DnsTypeNID {
            preference,
            node_id: [g1, g2, g3, g4],
        })
    }

    fn get_type(&self) -> DNSType {
        DNSType::NID
    }

    fn encode(&self, packet: &mut Packet) -> Result<usize, DNSProtoErr> {
        packet.write_u16(self.preference)?;
        for group in self.node_id.iter() {
            packet.write_u16(*group)?;
        }
        Ok(NID_RDATA_LENGTH)
    }
}
