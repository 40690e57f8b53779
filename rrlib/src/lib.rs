extern crate config;

pub mod errors;
pub mod setting;
