use crate::meta::DNSType;
use crate::packet::Packet;
use crate::qtype::DNSWireFrame;
use rrlib::errors::DNSProtoErr;
use std::fmt::{self, Formatter};
use std::str::FromStr;

/// NULL rdata is kept as raw octets (rfc1035 section 3.3.10). It has no
/// zone file presentation, so the text form is always empty.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct DnsTypeNULL {
    data: Vec<u8>,
}

impl DnsTypeNULL {
    pub fn new(data: &[u8]) -> Self {
        DnsTypeNULL {
            data: data.to_vec(),
        }
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }
}

impl FromStr for DnsTypeNULL {
    type Err = DNSProtoErr;

    fn from_str(_: &str) -> Result<Self, Self::Err> {
        Ok(DnsTypeNULL::default())
    }
}

impl fmt::Display for DnsTypeNULL {
    fn fmt(&self, _: &mut Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

impl DNSWireFrame for DnsTypeNULL {
    fn decode(data: &[u8], _: Option<&[u8]>) -> Result<Self, DNSProtoErr> {
        Ok(DnsTypeNULL::new(data))
    }

    fn get_type(&self) -> DNSType {
        DNSType::NULL
    }

    fn encode(&self, packet: &mut Packet) -> Result<usize, DNSProtoErr> {
        packet.write_bytes(self.data.as_slice())?;
        Ok(self.data.len())
    }
}
