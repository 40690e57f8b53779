// Strum contains all the trait definitions
extern crate strum;
extern crate itertools;
extern crate regex;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate slog;

pub mod codec;
pub mod dnsname;
pub mod meta;
pub mod packet;
pub mod qtype;
pub mod record;
pub mod svcparam;
pub mod utils;

pub use codec::RecordCodec;
pub use record::ResourceRecord;
pub use rrlib::errors::DNSProtoErr;

pub fn version() -> &'static str {
    "v0.1.0"
}
