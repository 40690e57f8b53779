// https://tools.ietf.org/html/rfc1035#section-4.1.4
use crate::utils::{is_safe_ascii, push_escaped, MAX_DOMAIN_LENGTH, MAX_LABEL_LENGTH};
use rrlib::errors::DNSProtoErr;
use std::collections::HashMap;
use std::fmt::{self, Formatter};

// a legal message never needs more hops than it has labels, 127 is the
// most labels that fit in 255 octets
const MAX_POINTER_HOPS: usize = 127;
// pointers carry 14 bits of offset
const MAX_POINTER_OFFSET: usize = 0x3fff;

#[derive(Debug, Clone, Default)]
pub struct DNSName {
    pub labels: Vec<Vec<u8>>,
}

impl PartialEq for DNSName {
    fn eq(&self, other: &Self) -> bool {
        self.labels.len() == other.labels.len()
            && self
                .labels
                .iter()
                .zip(other.labels.iter())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl Eq for DNSName {}

impl DNSName {
    pub fn root() -> Self {
        DNSName { labels: Vec::new() }
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn size(&self) -> usize {
        self.labels.len()
    }

    /// Octets the uncompressed wire form takes, root terminator included.
    pub fn wire_len(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    /// Parse a presentation name. Both `example.com` and `example.com.`
    /// are read as absolute; `""` and `"."` are the root. `\.`, `\\` and
    /// `\DDD` put octets into a label that the plain form can not carry.
    pub fn new(domain: &str) -> Result<DNSName, DNSProtoErr> {
        if domain.is_empty() || domain == "." {
            return Ok(DNSName::root());
        }
        let invalid = |reason: &str| {
            DNSProtoErr::MalformedText(format!("domain: `{}` {}", domain, reason))
        };
        let mut labels = vec![];
        let mut current = vec![];
        let mut chars = domain.chars();
        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if current.is_empty() {
                        return Err(invalid("has an empty label"));
                    }
                    labels.push(std::mem::take(&mut current));
                }
                '\\' => push_escaped(&mut chars, &mut current)
                    .map_err(|err| invalid(err.to_string().as_str()))?,
                _ if is_safe_ascii(c, current.is_empty()) => current.push(c as u8),
                _ => return Err(invalid(format!("has an invalid character `{}`", c).as_str())),
            }
            if current.len() > MAX_LABEL_LENGTH {
                return Err(invalid(
                    format!("has a label longer than {} octets", MAX_LABEL_LENGTH).as_str(),
                ));
            }
        }
        if !current.is_empty() {
            labels.push(current);
        }
        let dname = DNSName { labels };
        if dname.wire_len() > MAX_DOMAIN_LENGTH {
            return Err(DNSProtoErr::MalformedText(format!(
                "domain: `{}` is longer than {} octets",
                domain, MAX_DOMAIN_LENGTH
            )));
        }
        Ok(dname)
    }

    // lowercased wire form of the labels from `index` on
    fn suffix_key(&self, index: usize) -> Vec<u8> {
        let mut key = vec![];
        for label in &self.labels[index..] {
            key.push(label.len() as u8);
            key.extend(label.iter().map(|c| c.to_ascii_lowercase()));
        }
        key
    }

    /// Wire form of the name. With a compression map and the offset the
    /// name will be written at, any suffix seen before becomes a pointer
    /// and every new suffix is remembered for later names.
    pub fn to_binary(&self, compression: Option<(&mut HashMap<Vec<u8>, usize>, usize)>) -> Vec<u8> {
        let mut binary_store: Vec<u8> = Vec::with_capacity(self.wire_len());
        match compression {
            Some((store, offset)) => {
                let mut current_offset = 0;
                for (index, label) in self.labels.iter().enumerate() {
                    let current_key = self.suffix_key(index);
                    if let Some(location) = store.get(&current_key) {
                        let pointer = (*location as u16) | 0xc000;
                        binary_store.extend_from_slice(&pointer.to_be_bytes());
                        return binary_store;
                    }
                    if offset + current_offset <= MAX_POINTER_OFFSET {
                        store.insert(current_key, offset + current_offset);
                    }
                    binary_store.push(label.len() as u8);
                    binary_store.extend_from_slice(label);
                    current_offset += label.len() + 1;
                }
                binary_store.push(0x00);
            }
            None => {
                for label in self.labels.iter() {
                    binary_store.push(label.len() as u8);
                    binary_store.extend_from_slice(label)
                }
                binary_store.push(0x00);
            }
        }
        binary_store
    }
}

impl fmt::Display for DNSName {
    fn fmt(&self, format: &mut Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return write!(format, ".");
        }
        for label in &self.labels {
            for (index, octet) in label.iter().enumerate() {
                match *octet {
                    b'.' => write!(format, "\\.")?,
                    b'\\' => write!(format, "\\\\")?,
                    c if is_safe_ascii(c as char, index == 0) => write!(format, "{}", c as char)?,
                    c => write!(format, "\\{:03}", c)?,
                }
            }
            write!(format, ".")?;
        }
        Ok(())
    }
}

// Reads labels from `buf` starting at `pos` until the root terminator or a
// compression pointer. Returns the position just past what was read and the
// pointer target when a pointer ended the run.
fn read_labels(
    buf: &[u8],
    mut pos: usize,
    labels: &mut Vec<Vec<u8>>,
    wire_len: &mut usize,
) -> Result<(usize, Option<usize>), DNSProtoErr> {
    loop {
        let size_or_pointer = match buf.get(pos) {
            Some(v) => *v as usize,
            None => {
                return Err(DNSProtoErr::TruncatedInput(
                    "domain name runs past the end of its buffer".to_owned(),
                ))
            }
        };
        match size_or_pointer >> 6 {
            0 if size_or_pointer == 0 => return Ok((pos + 1, None)),
            0 => {
                let end = pos + 1 + size_or_pointer;
                if end > buf.len() {
                    return Err(DNSProtoErr::TruncatedInput(format!(
                        "label of {} octets runs past the end of its buffer",
                        size_or_pointer
                    )));
                }
                *wire_len += size_or_pointer + 1;
                if *wire_len > MAX_DOMAIN_LENGTH {
                    return Err(DNSProtoErr::InvalidFieldValue(format!(
                        "domain name is longer than {} octets",
                        MAX_DOMAIN_LENGTH
                    )));
                }
                labels.push(buf[pos + 1..end].to_vec());
                pos = end;
            }
            3 => {
                let low = match buf.get(pos + 1) {
                    Some(v) => *v as usize,
                    None => {
                        return Err(DNSProtoErr::TruncatedInput(
                            "compression pointer cut in half".to_owned(),
                        ))
                    }
                };
                let pointer = ((size_or_pointer & 0x3f) << 8) | low;
                return Ok((pos + 2, Some(pointer)));
            }
            _ => {
                return Err(DNSProtoErr::InvalidFieldValue(format!(
                    "unsupported label type 0x{:02x}",
                    size_or_pointer
                )))
            }
        }
    }
}

/// Decode a wire name from the front of `input`, following compression
/// pointers into `original` (the whole message). Returns the bytes left in
/// `input` after the name.
pub fn parse_name<'a>(
    input: &'a [u8],
    original: &'_ [u8],
) -> Result<(&'a [u8], DNSName), DNSProtoErr> {
    let mut labels = vec![];
    let mut wire_len = 1;
    let (end, mut next) = read_labels(input, 0, &mut labels, &mut wire_len)?;
    let mut hops = 0;
    while let Some(pointer) = next {
        hops += 1;
        if hops > MAX_POINTER_HOPS {
            return Err(DNSProtoErr::InvalidFieldValue(
                "compression pointers form a loop".to_owned(),
            ));
        }
        if pointer >= original.len() {
            return Err(DNSProtoErr::TruncatedInput(format!(
                "compression pointer {} outside of message",
                pointer
            )));
        }
        let (_, pointed) = read_labels(original, pointer, &mut labels, &mut wire_len)?;
        next = pointed;
    }
    Ok((&input[end..], DNSName { labels }))
}

/// Decode the name at `offset` of `message` and report how many octets it
/// occupies there (a pointer counts two, whatever it expands to).
pub fn expand(message: &[u8], offset: usize) -> Result<(DNSName, usize), DNSProtoErr> {
    if offset > message.len() {
        return Err(DNSProtoErr::TruncatedInput(format!(
            "name offset {} outside of message",
            offset
        )));
    }
    let input = &message[offset..];
    let (rest, name) = parse_name(input, message)?;
    Ok((name, input.len() - rest.len()))
}
