use crate::meta::DNSClass;
use crate::packet::Packet;
use crate::record::ResourceRecord;
use rrlib::errors::DNSProtoErr;
use rrlib::setting::CodecSetting;
use slog::{Discard, Logger};

/// Record level entry points carrying the codec settings and a logger.
/// Each call works on its own `Packet`, so a codec can be shared freely.
pub struct RecordCodec {
    default_ttl: u32,
    default_class: DNSClass,
    compression: bool,
    logger: Logger,
}

impl Default for RecordCodec {
    fn default() -> Self {
        let setting = CodecSetting::default();
        RecordCodec {
            default_ttl: setting.default_ttl,
            default_class: DNSClass::IN,
            compression: setting.compression,
            logger: Logger::root(Discard, o!()),
        }
    }
}

impl RecordCodec {
    pub fn new(setting: &CodecSetting, logger: Logger) -> Result<RecordCodec, DNSProtoErr> {
        let default_class = DNSClass::from_mnemonic(setting.default_class.as_str()).ok_or_else(
            || {
                DNSProtoErr::InvalidFieldValue(format!(
                    "default class {} unknown",
                    setting.default_class
                ))
            },
        )?;
        Ok(RecordCodec {
            default_ttl: setting.default_ttl,
            default_class,
            compression: setting.compression,
            logger: logger.new(o!("module" => "codec")),
        })
    }

    pub fn compression(&self) -> bool {
        self.compression
    }

    /// Decode one record at `offset`, returning it and the next offset.
    pub fn decode_record(
        &self,
        message: &[u8],
        offset: usize,
    ) -> Result<(ResourceRecord, usize), DNSProtoErr> {
        match ResourceRecord::decode(message, offset) {
            Ok((record, next)) => {
                debug!(self.logger, "decode record";
                    "owner" => %record.name, "type" => %record.qtype, "rdlength" => record.rdlength);
                Ok((record, next))
            }
            Err(err) => {
                debug!(self.logger, "decode record failed"; "offset" => offset, "error" => %err);
                Err(err)
            }
        }
    }

    /// Decode back to back records from `offset` to the end of `message`.
    pub fn decode_records(
        &self,
        message: &[u8],
        offset: usize,
    ) -> Result<Vec<ResourceRecord>, DNSProtoErr> {
        let mut records = vec![];
        let mut offset = offset;
        while offset < message.len() {
            let (record, next) = self.decode_record(message, offset)?;
            records.push(record);
            offset = next;
        }
        Ok(records)
    }

    /// Encode records into one buffer, owner names share one compression map.
    pub fn encode_records(&self, records: &[ResourceRecord]) -> Result<Vec<u8>, DNSProtoErr> {
        let mut packet = Packet::new(self.compression);
        for record in records {
            if let Err(err) = record.encode(&mut packet) {
                debug!(self.logger, "encode record failed";
                    "owner" => %record.name, "type" => %record.qtype, "error" => %err);
                return Err(err);
            }
            debug!(self.logger, "encode record";
                "owner" => %record.name, "type" => %record.qtype, "offset" => packet.current_write_offset());
        }
        Ok(packet.into_inner())
    }

    /// Parse a zone line, missing TTL and class come from the settings.
    pub fn parse_line(&self, line: &str) -> Result<ResourceRecord, DNSProtoErr> {
        match ResourceRecord::from_zone_line_with_defaults(line, self.default_ttl, self.default_class)
        {
            Ok(record) => {
                debug!(self.logger, "parse line";
                    "owner" => %record.name, "type" => %record.qtype, "rdlength" => record.rdlength);
                Ok(record)
            }
            Err(err) => {
                debug!(self.logger, "parse line failed"; "line" => line, "error" => %err);
                Err(err)
            }
        }
    }
}
