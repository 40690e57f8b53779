mod helper;
mod hip;
mod https;
mod nid;
mod null;
mod svcb;

use crate::meta::DNSType;
use crate::packet::Packet;
pub use helper::build_string;
pub use hip::DnsTypeHIP;
pub use https::DnsTypeHTTPS;
pub use nid::DnsTypeNID;
pub use null::DnsTypeNULL;
use rrlib::errors::DNSProtoErr;
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;
pub use svcb::DnsTypeSVCB;

pub trait DNSWireFrame: Debug + Display {
    /// `data` is exactly the rdata slice, `original` the whole message so
    /// compression pointers inside the rdata can be followed.
    fn decode(data: &[u8], original: Option<&[u8]>) -> Result<Self, DNSProtoErr>
    where
        Self: Sized;
    fn get_type(&self) -> DNSType;
    /// Append the rdata to `packet` and return the number of octets written.
    fn encode(&self, packet: &mut Packet) -> Result<usize, DNSProtoErr>;
}

#[derive(Debug, PartialEq, Clone)]
pub enum RData {
    SVCB(DnsTypeSVCB),
    HTTPS(DnsTypeHTTPS),
    HIP(DnsTypeHIP),
    NID(DnsTypeNID),
    NULL(DnsTypeNULL),
}

impl RData {
    fn frame(&self) -> &dyn DNSWireFrame {
        match self {
            RData::SVCB(v) => v,
            RData::HTTPS(v) => v,
            RData::HIP(v) => v,
            RData::NID(v) => v,
            RData::NULL(v) => v,
        }
    }

    pub fn get_type(&self) -> DNSType {
        self.frame().get_type()
    }

    pub fn encode(&self, packet: &mut Packet) -> Result<usize, DNSProtoErr> {
        self.frame().encode(packet)
    }
}

impl fmt::Display for RData {
    fn fmt(&self, format: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self.frame(), format)
    }
}

fn unimplemented(dtype: DNSType) -> DNSProtoErr {
    DNSProtoErr::UnimplementedRecordType(dtype.to_string())
}

pub fn decode_message_data(
    data: &[u8],
    original: &[u8],
    dtype: DNSType,
) -> Result<RData, DNSProtoErr> {
    let original = Some(original);
    Ok(match dtype {
        DNSType::SVCB => RData::SVCB(DnsTypeSVCB::decode(data, original)?),
        DNSType::HTTPS => RData::HTTPS(DnsTypeHTTPS::decode(data, original)?),
        DNSType::HIP => RData::HIP(DnsTypeHIP::decode(data, original)?),
        DNSType::NID => RData::NID(DnsTypeNID::decode(data, original)?),
        DNSType::NULL => RData::NULL(DnsTypeNULL::decode(data, original)?),
        _ => return Err(unimplemented(dtype)),
    })
}

pub fn decode_dns_data_from_string(rdata: &str, dtype: DNSType) -> Result<RData, DNSProtoErr> {
    let rdata = rdata.trim();
    Ok(match dtype {
        DNSType::SVCB => RData::SVCB(DnsTypeSVCB::from_str(rdata)?),
        DNSType::HTTPS => RData::HTTPS(DnsTypeHTTPS::from_str(rdata)?),
        DNSType::HIP => RData::HIP(DnsTypeHIP::from_str(rdata)?),
        DNSType::NID => RData::NID(DnsTypeNID::from_str(rdata)?),
        DNSType::NULL => RData::NULL(DnsTypeNULL::from_str(rdata)?),
        _ => return Err(unimplemented(dtype)),
    })
}
