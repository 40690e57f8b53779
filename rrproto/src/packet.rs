use crate::dnsname::DNSName;
use byteorder::{BigEndian, WriteBytesExt};
use rrlib::errors::DNSProtoErr;
use std::collections::HashMap;
use std::io::{Cursor, Seek, SeekFrom, Write};

/// Write side of a DNS message: a growable buffer plus the name offsets
/// already emitted, so later names can point back at them.
#[derive(Debug)]
pub struct Packet {
    cursor: Cursor<Vec<u8>>,
    names: HashMap<Vec<u8>, usize>,
    compression: bool,
}

impl Default for Packet {
    fn default() -> Self {
        Packet::new(true)
    }
}

impl Packet {
    pub fn new(compression: bool) -> Packet {
        Packet {
            cursor: Cursor::new(Vec::with_capacity(512)),
            names: HashMap::new(),
            compression,
        }
    }

    pub fn compression(&self) -> bool {
        self.compression
    }

    pub fn current_write_offset(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), DNSProtoErr> {
        self.cursor.write_u8(value)?;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), DNSProtoErr> {
        self.cursor.write_u16::<BigEndian>(value)?;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), DNSProtoErr> {
        self.cursor.write_u32::<BigEndian>(value)?;
        Ok(())
    }

    pub fn write_bytes(&mut self, value: &[u8]) -> Result<(), DNSProtoErr> {
        self.cursor.write_all(value)?;
        Ok(())
    }

    /// Write `name` at the current offset, replacing a known suffix with a
    /// pointer when compression is on for this packet. Returns the octets
    /// written.
    pub fn compress(&mut self, name: &DNSName) -> Result<usize, DNSProtoErr> {
        let binary = if self.compression {
            let offset = self.current_write_offset();
            name.to_binary(Some((&mut self.names, offset)))
        } else {
            name.to_binary(None)
        };
        self.write_bytes(binary.as_slice())?;
        Ok(binary.len())
    }

    /// Write `name` in full, for rdata names that must never be compressed.
    pub fn write_name(&mut self, name: &DNSName) -> Result<usize, DNSProtoErr> {
        let binary = name.to_binary(None);
        self.write_bytes(binary.as_slice())?;
        Ok(binary.len())
    }

    /// Leave a two octet hole to be filled by `patch_u16` and return its
    /// position.
    pub fn reserve_u16(&mut self) -> Result<usize, DNSProtoErr> {
        let position = self.current_write_offset();
        self.write_u16(0)?;
        Ok(position)
    }

    pub fn patch_u16(&mut self, position: usize, value: u16) -> Result<(), DNSProtoErr> {
        if position + 2 > self.cursor.get_ref().len() {
            return Err(DNSProtoErr::EncodeError(format!(
                "patch position {} outside of packet",
                position
            )));
        }
        let current = self.cursor.position();
        self.cursor.set_position(position as u64);
        self.cursor.write_u16::<BigEndian>(value)?;
        self.cursor.seek(SeekFrom::Start(current))?;
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        self.cursor.get_ref().as_slice()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner()
    }
}
