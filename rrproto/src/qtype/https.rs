use crate::meta::DNSType;
use crate::packet::Packet;
use crate::qtype::svcb::DnsTypeSVCB;
use crate::qtype::DNSWireFrame;
use rrlib::errors::DNSProtoErr;
use std::fmt::{self, Formatter};
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

/// HTTPS shares the SVCB rdata layout and presentation form, only the
/// record type differs (rfc9460 section 9).
#[derive(Debug, PartialEq, Clone)]
pub struct DnsTypeHTTPS(pub DnsTypeSVCB);

impl DnsTypeHTTPS {
    pub fn new(priority: u16, target: &str) -> Result<Self, DNSProtoErr> {
        Ok(DnsTypeHTTPS(DnsTypeSVCB::new(priority, target)?))
    }

    pub fn into_inner(self) -> DnsTypeSVCB {
        self.0
    }
}

impl Deref for DnsTypeHTTPS {
    type Target = DnsTypeSVCB;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DnsTypeHTTPS {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<DnsTypeSVCB> for DnsTypeHTTPS {
    fn from(svcb: DnsTypeSVCB) -> Self {
        DnsTypeHTTPS(svcb)
    }
}

impl FromStr for DnsTypeHTTPS {
    type Err = DNSProtoErr;
    fn from_str(rdata: &str) -> Result<Self, Self::Err> {
        Ok(DnsTypeHTTPS(DnsTypeSVCB::from_str(rdata)?))
    }
}

impl fmt::Display for DnsTypeHTTPS {
    fn fmt(&self, format: &mut Formatter<'_>) -> fmt::Result {
        write!(format, "{}", self.0)
    }
}

impl DNSWireFrame for DnsTypeHTTPS {
    fn decode(data: &[u8], original: Option<&[u8]>) -> Result<Self, DNSProtoErr> {
        Ok(DnsTypeHTTPS(DnsTypeSVCB::decode(data, original)?))
    }

    fn get_type(&self) -> DNSType {
        DNSType::HTTPS
    }

    fn encode(&self, packet: &mut Packet) -> Result<usize, DNSProtoErr> {
        self.0.encode(packet)
    }
}
