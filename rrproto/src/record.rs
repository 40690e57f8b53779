use crate::dnsname::{expand, DNSName};
use crate::meta::{DNSClass, DNSType, RRClass};
use crate::packet::Packet;
use crate::qtype::{decode_dns_data_from_string, decode_message_data, RData};
use nom::number::complete::{be_u16, be_u32};
use nom::sequence::tuple;
use nom::IResult;
use regex::Regex;
use rrlib::errors::DNSProtoErr;
use rrlib::setting::DEFAULT_TTL;
use std::fmt::{self, Formatter};
use std::str::FromStr;

lazy_static! {
    static ref TTL_TOKEN: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

/// The fixed part of a resource record that precedes the rdata.
#[derive(Debug, PartialEq, Clone)]
pub struct RRHeader {
    pub name: DNSName,
    pub qtype: DNSType,
    pub qclass: RRClass,
    pub ttl: u32,
    pub rdlength: u16,
}

fn parse_rr_header(input: &[u8]) -> IResult<&[u8], (u16, u16, u32, u16)> {
    tuple((be_u16, be_u16, be_u32, be_u16))(input)
}

impl RRHeader {
    /// Decode the header of the record starting at `offset`, returning it
    /// with the offset of its rdata. The rdata must fit in `message`.
    pub fn decode(message: &[u8], offset: usize) -> Result<(RRHeader, usize), DNSProtoErr> {
        let (name, consumed) = expand(message, offset)?;
        let input = &message[offset + consumed..];
        let (rest, (qtype, qclass, ttl, rdlength)) = parse_rr_header(input)?;
        let qtype = DNSType::from_u16(qtype)?;
        let qclass = RRClass::decode(qtype, qclass)?;
        if rest.len() < rdlength as usize {
            return Err(DNSProtoErr::TruncatedInput(format!(
                "rdlength {} but only {} octets left",
                rdlength,
                rest.len()
            )));
        }
        let header = RRHeader {
            name,
            qtype,
            qclass,
            ttl,
            rdlength,
        };
        Ok((header, message.len() - rest.len()))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ResourceRecord {
    pub name: DNSName,
    pub qtype: DNSType,
    pub qclass: RRClass,
    pub ttl: u32,
    pub rdlength: u16,
    pub data: Option<RData>,
}

fn rdata_length(data: &Option<RData>) -> Result<u16, DNSProtoErr> {
    let length = match data {
        Some(data) => data.encode(&mut Packet::new(false))?,
        None => 0,
    };
    if length > u16::MAX as usize {
        return Err(DNSProtoErr::EncodeError(format!(
            "rdata of {} octets does not fit rdlength",
            length
        )));
    }
    Ok(length as u16)
}

// cut a trailing `;` comment, a `;` inside quotes is kept
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    let mut escaped = false;
    for (index, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => return &line[..index],
            _ => {}
        }
    }
    line
}

impl ResourceRecord {
    pub fn new(
        name: &str,
        qclass: DNSClass,
        ttl: u32,
        data: RData,
    ) -> Result<ResourceRecord, DNSProtoErr> {
        let qtype = data.get_type();
        let data = Some(data);
        Ok(ResourceRecord {
            name: DNSName::new(name)?,
            qtype,
            qclass: RRClass::Class(qclass),
            ttl,
            rdlength: rdata_length(&data)?,
            data,
        })
    }

    /// A record with no rdata, as carried by a header whose rdlength is 0.
    pub fn from_header(header: RRHeader) -> ResourceRecord {
        ResourceRecord {
            name: header.name,
            qtype: header.qtype,
            qclass: header.qclass,
            ttl: header.ttl,
            rdlength: header.rdlength,
            data: None,
        }
    }

    /// Decode the record at `offset` of `message`, returning it together
    /// with the offset right after its rdata.
    pub fn decode(message: &[u8], offset: usize) -> Result<(ResourceRecord, usize), DNSProtoErr> {
        let (header, rdata_offset) = RRHeader::decode(message, offset)?;
        let next = rdata_offset + header.rdlength as usize;
        if header.rdlength == 0 {
            return Ok((ResourceRecord::from_header(header), next));
        }
        let rdata = &message[rdata_offset..next];
        let data = decode_message_data(rdata, message, header.qtype)?;
        let mut record = ResourceRecord::from_header(header);
        record.data = Some(data);
        Ok((record, next))
    }

    /// Write the record to `packet`. The rdlength slot is reserved first and
    /// filled once the rdata is written, since compression changes its size.
    pub fn encode(&self, packet: &mut Packet) -> Result<usize, DNSProtoErr> {
        let start = packet.current_write_offset();
        packet.compress(&self.name)?;
        packet.write_u16(self.qtype.into())?;
        packet.write_u16(self.qclass.to_u16())?;
        packet.write_u32(self.ttl)?;
        let position = packet.reserve_u16()?;
        let written = match &self.data {
            Some(data) => data.encode(packet)?,
            None => 0,
        };
        if written > u16::MAX as usize {
            return Err(DNSProtoErr::EncodeError(format!(
                "rdata of {} octets does not fit rdlength",
                written
            )));
        }
        packet.patch_u16(position, written as u16)?;
        Ok(packet.current_write_offset() - start)
    }

    pub fn to_bytes(&self, compression: bool) -> Result<Vec<u8>, DNSProtoErr> {
        let mut packet = Packet::new(compression);
        self.encode(&mut packet)?;
        Ok(packet.into_inner())
    }

    pub fn from_zone_line(line: &str) -> Result<ResourceRecord, DNSProtoErr> {
        ResourceRecord::from_zone_line_with_defaults(line, DEFAULT_TTL, DNSClass::IN)
    }

    /// Parse `owner [ttl] [class] type rdata...`. TTL and class may come in
    /// any order before the type; the defaults fill whichever is missing.
    pub fn from_zone_line_with_defaults(
        line: &str,
        default_ttl: u32,
        default_class: DNSClass,
    ) -> Result<ResourceRecord, DNSProtoErr> {
        let tokens: Vec<&str> = strip_comment(line).split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(DNSProtoErr::MalformedText(format!(
                "`{}` needs at least owner, type and rdata",
                line.trim()
            )));
        }
        let owner = tokens[0].to_lowercase();
        let name = DNSName::new(owner.as_str())?;
        let mut ttl = default_ttl;
        let mut class = default_class;
        let mut qtype = None;
        let mut index = 1;
        while index < tokens.len() {
            let token = tokens[index];
            index += 1;
            if TTL_TOKEN.is_match(token) {
                ttl = u32::from_str(token).map_err(|_| {
                    DNSProtoErr::InvalidFieldValue(format!("ttl {} out of range", token))
                })?;
            } else if let Some(value) = DNSClass::from_mnemonic(token) {
                class = value;
            } else if let Some(value) = DNSType::from_mnemonic(token) {
                qtype = Some(value);
                break;
            } else {
                return Err(DNSProtoErr::UnknownToken(token.to_owned()));
            }
        }
        let qtype = qtype.ok_or_else(|| {
            DNSProtoErr::MalformedText(format!("no record type in `{}`", line.trim()))
        })?;
        let rdata = tokens[index..].join(" ");
        let data = Some(decode_dns_data_from_string(rdata.as_str(), qtype)?);
        Ok(ResourceRecord {
            name,
            qtype,
            qclass: RRClass::Class(class),
            ttl,
            rdlength: rdata_length(&data)?,
            data,
        })
    }
}

impl FromStr for ResourceRecord {
    type Err = DNSProtoErr;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        ResourceRecord::from_zone_line(line)
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, format: &mut Formatter<'_>) -> fmt::Result {
        write!(
            format,
            "{} {} {} {}",
            self.name, self.ttl, self.qclass, self.qtype
        )?;
        if let Some(data) = &self.data {
            let rdata = data.to_string();
            if !rdata.is_empty() {
                write!(format, " {}", rdata)?;
            }
        }
        Ok(())
    }
}

impl Default for ResourceRecord {
    fn default() -> Self {
        ResourceRecord {
            name: DNSName::root(),
            qtype: DNSType::NULL,
            qclass: RRClass::default(),
            ttl: DEFAULT_TTL,
            rdlength: 0,
            data: None,
        }
    }
}
