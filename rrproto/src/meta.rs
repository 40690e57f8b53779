use num_enum::{IntoPrimitive, TryFromPrimitive};
use rrlib::errors::DNSProtoErr;
use std::convert::TryFrom;
use std::fmt::{self, Formatter};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// https://tools.ietf.org/html/rfc1035#section-3.2.4
/// specify the class of the dns record data
#[derive(
    Debug, PartialEq, Eq, Copy, Clone, IntoPrimitive, TryFromPrimitive, EnumString, Display,
)]
#[repr(u16)]
pub enum DNSClass {
    IN = 1,
    // 2 the CSNET class
    CS = 2,
    // 3 the CHAOS class
    CH = 3,
    // 4 Hesiod
    HS = 4,
    // rfc2136
    NONE = 254,
    ANY = 255,
}

impl Default for DNSClass {
    fn default() -> Self {
        DNSClass::IN
    }
}

impl DNSClass {
    /// Mnemonic lookup used by the zone line scanner, case-insensitive.
    pub fn from_mnemonic(token: &str) -> Option<DNSClass> {
        DNSClass::from_str(token.to_uppercase().as_str()).ok()
    }
}

/// The class slot of the common header. For OPT the 16 bits carry the
/// requestor's UDP payload size instead of a class code (rfc6891).
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum RRClass {
    Class(DNSClass),
    PayloadSize(u16),
}

impl RRClass {
    pub fn decode(dtype: DNSType, raw: u16) -> Result<RRClass, DNSProtoErr> {
        if dtype == DNSType::OPT {
            return Ok(RRClass::PayloadSize(raw));
        }
        match DNSClass::try_from(raw) {
            Ok(class) => Ok(RRClass::Class(class)),
            Err(_) => Err(DNSProtoErr::InvalidFieldValue(format!(
                "dns class {} unknown",
                raw
            ))),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            RRClass::Class(class) => class.into(),
            RRClass::PayloadSize(size) => size,
        }
    }
}

impl Default for RRClass {
    fn default() -> Self {
        RRClass::Class(DNSClass::IN)
    }
}

impl fmt::Display for RRClass {
    fn fmt(&self, format: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RRClass::Class(class) => write!(format, "{}", class),
            RRClass::PayloadSize(size) => write!(format, "{}", size),
        }
    }
}

#[derive(
    Debug,
    PartialEq,
    Copy,
    Clone,
    IntoPrimitive,
    TryFromPrimitive,
    Eq,
    Hash,
    EnumString,
    Display,
)]
#[repr(u16)]
pub enum DNSType {
    A = 1,
    NS = 2,
    CNAME = 5,
    SOA = 6,
    NULL = 10,
    PTR = 12,
    HINFO = 13,
    MX = 15,
    TXT = 16,
    AAAA = 28,
    SRV = 33,
    OPT = 41,
    DS = 43,
    RRSIG = 46,
    NSEC = 47,
    DNSKEY = 48,
    NSEC3 = 50,
    NSEC3PARAM = 51,
    HIP = 55,
    SVCB = 64,
    HTTPS = 65,
    NID = 104,
}

impl DNSType {
    pub fn from_u16(raw: u16) -> Result<DNSType, DNSProtoErr> {
        DNSType::try_from(raw)
            .map_err(|_| DNSProtoErr::UnimplementedRecordType(format!("TYPE{}", raw)))
    }

    /// Mnemonic lookup used by the zone line scanner, case-insensitive.
    pub fn from_mnemonic(token: &str) -> Option<DNSType> {
        DNSType::from_str(token.to_uppercase().as_str()).ok()
    }
}
