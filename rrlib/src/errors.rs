use std::net::AddrParseError;
use std::num::ParseIntError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SettingError {
    #[error("parse config file failed: {0}")]
    ParseConfigError(String),
    #[error("validation config setting failed: {0}")]
    ValidationError(String),
}

/// Every failure the record codec can surface. Each one aborts the
/// record being decoded or encoded, sibling records are unaffected.
#[derive(Error, Debug, PartialEq)]
pub enum DNSProtoErr {
    #[error("truncated input: {0}")]
    TruncatedInput(String),

    #[error("length mismatch: {0}")]
    LengthMismatch(String),

    #[error("svc param key{0} appears more than once")]
    DuplicateParamKey(u16),

    #[error("svc param key{0} is not registered")]
    UnknownParamKey(u16),

    #[error("dns type {0} is not implemented")]
    UnimplementedRecordType(String),

    #[error("malformed text: {0}")]
    MalformedText(String),

    #[error("unknown token `{0}` before record type")]
    UnknownToken(String),

    #[error("invalid field value: {0}")]
    InvalidFieldValue(String),

    #[error("packet encode error: {0}")]
    EncodeError(String),
}

impl From<std::io::Error> for DNSProtoErr {
    fn from(err: std::io::Error) -> Self {
        DNSProtoErr::EncodeError(err.to_string())
    }
}

impl From<AddrParseError> for DNSProtoErr {
    fn from(err: AddrParseError) -> Self {
        DNSProtoErr::MalformedText(err.to_string())
    }
}

impl From<ParseIntError> for DNSProtoErr {
    fn from(err: ParseIntError) -> Self {
        DNSProtoErr::MalformedText(err.to_string())
    }
}

// wire parsers are built from nom's complete combinators, so any nom failure
// means a field ran past the end of its slice
impl<I> From<nom::Err<nom::error::Error<I>>> for DNSProtoErr {
    fn from(err: nom::Err<nom::error::Error<I>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => {
                DNSProtoErr::TruncatedInput("input ends inside a field".to_owned())
            }
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                DNSProtoErr::TruncatedInput(format!("{:?} ran out of bytes", e.code))
            }
        }
    }
}
