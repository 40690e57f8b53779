use crate::dnsname::{parse_name, DNSName};
use crate::meta::DNSType;
use crate::packet::Packet;
use crate::qtype::helper::take_bytes;
use crate::qtype::DNSWireFrame;
use data_encoding::{HEXUPPER, HEXUPPER_PERMISSIVE};
use nom::number::complete::{be_u16, be_u8};
use nom::sequence::tuple;
use nom::IResult;
use rrlib::errors::DNSProtoErr;
use std::fmt::{self, Formatter};
use std::str::FromStr;

// https://tools.ietf.org/html/rfc8005#section-5
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |  HIT length   | PK algorithm  |          PK length            |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                                                               |
// ~                           HIT                                 ~
// |                                                               |
// +                     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                     |                                         |
// +-+-+-+-+-+-+-+-+-+-+-+                                         +
// |                           Public Key                          |
// ~                                                               ~
// |                                                               |
// +                               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                               |                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
// |                                                               |
// ~                       Rendezvous Servers                      ~
// |                                                               |
// +             +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |             |
// +-+-+-+-+-+-+-+
//
// www.example.com. IN HIP 2 200100107B1A74DF365639CC39F1D578 AwEAAbdxyhNuSutc5EMzxTs9LBPCIkOFH8cIvM4p9+LrV4e19WzK00+CI6zBCQTdtWsuxKbWIy87UOoJTwkUs7lBu+Upr1gsNrut79ryra+bSRGQb1slImA8YVJyuIDsj7kwzG7jnERNqnWxZ48AWkskmdHaVDP4BcelrTI3rMXdXF5D rvs.example.com.
#[derive(Debug, PartialEq, Clone)]
pub struct DnsTypeHIP {
    pk_algorithm: u8,
    hit: Vec<u8>,
    public_key: Vec<u8>,
    rendezvous_servers: Vec<DNSName>,
}

fn parse_hip_header(input: &[u8]) -> IResult<&[u8], (u8, u8, u16)> {
    tuple((be_u8, be_u8, be_u16))(input)
}

impl DnsTypeHIP {
    pub fn new(
        pk_algorithm: u8,
        hit: &str,        // hex
        public_key: &str, // base64
        rendezvous_servers: &[&str],
    ) -> Result<Self, DNSProtoErr> {
        let hit = HEXUPPER_PERMISSIVE.decode(hit.as_bytes()).map_err(|err| {
            DNSProtoErr::InvalidFieldValue(format!("hit `{}` is not hex: {}", hit, err))
        })?;
        let public_key = base64::decode(public_key).map_err(|err| {
            DNSProtoErr::InvalidFieldValue(format!("public key is not base64: {}", err))
        })?;
        let mut servers = vec![];
        for server in rendezvous_servers {
            servers.push(DNSName::new(server)?);
        }
        let hip = DnsTypeHIP {
            pk_algorithm,
            hit,
            public_key,
            rendezvous_servers: servers,
        };
        hip.check_lengths()?;
        Ok(hip)
    }

    fn check_lengths(&self) -> Result<(), DNSProtoErr> {
        if self.hit.is_empty() || self.hit.len() > u8::MAX as usize {
            return Err(DNSProtoErr::InvalidFieldValue(format!(
                "hit of {} octets not in [1,255]",
                self.hit.len()
            )));
        }
        if self.public_key.is_empty() || self.public_key.len() > u16::MAX as usize {
            return Err(DNSProtoErr::InvalidFieldValue(format!(
                "public key of {} octets not in [1,65535]",
                self.public_key.len()
            )));
        }
        Ok(())
    }

    pub fn pk_algorithm(&self) -> u8 {
        self.pk_algorithm
    }

    pub fn hit_length(&self) -> u8 {
        self.hit.len() as u8
    }

    pub fn pk_length(&self) -> u16 {
        self.public_key.len() as u16
    }

    pub fn hit(&self) -> String {
        HEXUPPER.encode(self.hit.as_slice())
    }

    pub fn public_key(&self) -> String {
        base64::encode(self.public_key.as_slice())
    }

    pub fn rendezvous_servers(&self) -> &[DNSName] {
        self.rendezvous_servers.as_slice()
    }
}

impl FromStr for DnsTypeHIP {
    type Err = DNSProtoErr;

    // lengths are always taken from the decoded hit and key
    fn from_str(rdata: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = rdata.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(DNSProtoErr::MalformedText(format!(
                "hip rdata `{}` needs algorithm, hit and public key",
                rdata
            )));
        }
        DnsTypeHIP::new(u8::from_str(tokens[0])?, tokens[1], tokens[2], &tokens[3..])
    }
}

impl fmt::Display for DnsTypeHIP {
    fn fmt(&self, format: &mut Formatter<'_>) -> fmt::Result {
        write!(
            format,
            "{} {} {}",
            self.pk_algorithm,
            self.hit(),
            self.public_key()
        )?;
        for server in &self.rendezvous_servers {
            write!(format, " {}", server)?;
        }
        Ok(())
    }
}

impl DNSWireFrame for DnsTypeHIP {
    fn decode(data: &[u8], original: Option<&[u8]>) -> Result<Self, DNSProtoErr> {
        let (rest, (hit_length, pk_algorithm, pk_length)) = parse_hip_header(data)?;
        let (rest, hit) = take_bytes(rest, hit_length as usize)?;
        let (mut rest, public_key) = take_bytes(rest, pk_length as usize)?;
        let mut rendezvous_servers = vec![];
        while !rest.is_empty() {
            let (next, server) = parse_name(rest, original.unwrap_or(&[]))?;
            if next.len() >= rest.len() {
                return Err(DNSProtoErr::TruncatedInput(
                    "rendezvous server consumed no octets".to_owned(),
                ));
            }
            rendezvous_servers.push(server);
            rest = next;
        }
        let hip = DnsTypeHIP {
            pk_algorithm,
            hit: hit.to_vec(),
            public_key: public_key.to_vec(),
            rendezvous_servers,
        };
        hip.check_lengths()?;
        Ok(hip)
    }

    fn get_type(&self) -> DNSType {
        DNSType::HIP
    }

    // rendezvous servers must not be compressed (rfc8005 section 5)
    fn encode(&self, packet: &mut Packet) -> Result<usize, DNSProtoErr> {
        self.check_lengths()?;
        let start = packet.current_write_offset();
        packet.write_u8(self.hit_length())?;
        packet.write_u8(self.pk_algorithm)?;
        packet.write_u16(self.pk_length())?;
        packet.write_bytes(self.hit.as_slice())?;
        packet.write_bytes(self.public_key.as_slice())?;
        for server in &self.rendezvous_servers {
            packet.write_name(server)?;
        }
        Ok(packet.current_write_offset() - start)
    }
}
