use rrlib::errors::DNSProtoErr;
use std::str::Chars;

pub const MAX_DOMAIN_LENGTH: usize = 255;
pub const MAX_LABEL_LENGTH: usize = 63;

pub fn is_safe_ascii(c_char: char, is_first: bool) -> bool {
    match c_char {
        check_c_char if !check_c_char.is_ascii() => false,
        check_c_char if check_c_char.is_alphanumeric() => true,
        '-' if !is_first => true, // dash is allowed
        '_' => true,              // SRV and SVCB attrleaf labels
        '*' if is_first => true,  // wildcard
        _ => false,
    }
}

#[test]
fn test_is_safe_ascii() {
    assert_eq!(is_safe_ascii('a', true), true);
    assert_eq!(is_safe_ascii('1', false), true);
    assert_eq!(is_safe_ascii('-', false), true);
    assert_eq!(is_safe_ascii('*', true), true);
    assert_eq!(is_safe_ascii('_', true), true);
    assert_eq!(is_safe_ascii('%', false), false);
    assert_eq!(is_safe_ascii('-', true), false);
    assert_eq!(is_safe_ascii('*', false), false);
}

/// Strips one pair of surrounding double quotes, then turns every `\"`
/// back into a plain quote.
pub fn unquote(value: &str) -> String {
    let inner = if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    };
    inner.replace("\\\"", "\"")
}

#[test]
fn test_unquote() {
    assert_eq!(unquote("\"h2,h3\""), "h2,h3");
    assert_eq!(unquote("h2"), "h2");
    assert_eq!(unquote("\"say \\\"hi\\\"\""), "say \"hi\"");
    assert_eq!(unquote("\""), "\"");
}

/// Decode what follows a `\\`: either exactly three decimal digits giving
/// one octet, or a single character taken literally.
pub fn push_escaped(chars: &mut Chars, out: &mut Vec<u8>) -> Result<(), DNSProtoErr> {
    let first = chars
        .next()
        .ok_or_else(|| DNSProtoErr::MalformedText("dangling `\\` at end of value".to_owned()))?;
    if !first.is_ascii_digit() {
        let mut buf = [0u8; 4];
        out.extend_from_slice(first.encode_utf8(&mut buf).as_bytes());
        return Ok(());
    }
    let mut value = first.to_digit(10).unwrap_or(0);
    for _ in 0..2 {
        match chars.next().and_then(|c| c.to_digit(10)) {
            Some(digit) => value = value * 10 + digit,
            None => {
                return Err(DNSProtoErr::MalformedText(
                    "`\\DDD` escape needs three digits".to_owned(),
                ))
            }
        }
    }
    if value > u8::MAX as u32 {
        return Err(DNSProtoErr::MalformedText(format!(
            "`\\{}` is not an octet",
            value
        )));
    }
    out.push(value as u8);
    Ok(())
}

/// Undo `escape_octets`. With a separator, the value is split on every
/// separator that is not escaped.
pub fn unescape_octets(value: &str, separator: Option<char>) -> Result<Vec<Vec<u8>>, DNSProtoErr> {
    let mut items = vec![];
    let mut current = vec![];
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => push_escaped(&mut chars, &mut current)?,
            _ if Some(c) == separator => items.push(std::mem::take(&mut current)),
            _ => {
                let mut buf = [0u8; 4];
                current.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    items.push(current);
    Ok(items)
}

/// Presentation form of raw octets. Printable ascii stays as is, except
/// quotes, `;` and parentheses. `\\` and the `specials` get a backslash and
/// everything else becomes `\\DDD`, so the result is always one token.
pub fn escape_octets(value: &[u8], specials: &[u8]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for octet in value {
        match *octet {
            b'\\' => escaped.push_str("\\\\"),
            c if specials.contains(&c) => {
                escaped.push('\\');
                escaped.push(c as char);
            }
            b'"' | b';' | b'(' | b')' => escaped.push_str(&format!("\\{:03}", octet)),
            0x21..=0x7e => escaped.push(*octet as char),
            _ => escaped.push_str(&format!("\\{:03}", octet)),
        }
    }
    escaped
}

#[test]
fn test_escape_octets() {
    assert_eq!(escape_octets(b"h2", b","), "h2");
    assert_eq!(escape_octets(b"a,b", b","), "a\\,b");
    assert_eq!(escape_octets(b"a\\b", b""), "a\\\\b");
    assert_eq!(escape_octets(b"h 2", b""), "h\\0322");
    assert_eq!(escape_octets(b"a\"b;", b""), "a\\034b\\059");
    assert_eq!(escape_octets(&[0xff, 0x00], b""), "\\255\\000");
}

#[test]
fn test_unescape_octets() {
    assert_eq!(
        unescape_octets("h2,h3", Some(',')).unwrap(),
        vec![b"h2".to_vec(), b"h3".to_vec()]
    );
    assert_eq!(
        unescape_octets("a\\,b,c", Some(',')).unwrap(),
        vec![b"a,b".to_vec(), b"c".to_vec()]
    );
    assert_eq!(
        unescape_octets("h\\0322,\\255", Some(',')).unwrap(),
        vec![b"h 2".to_vec(), vec![0xff]]
    );
    assert_eq!(
        unescape_octets("a\\\\", None).unwrap(),
        vec![b"a\\".to_vec()]
    );
    for value in [
        &[0u8, 0x7f, 0xff, b'"', b',', b'\\', b' ', b'x'][..],
        "caf\u{e9}".as_bytes(),
    ]
    .iter()
    {
        let text = escape_octets(value, b",");
        assert_eq!(unescape_octets(&text, Some(',')).unwrap(), vec![value.to_vec()]);
    }
    assert!(unescape_octets("a\\25", None).is_err());
    assert!(unescape_octets("a\\256", None).is_err());
    assert!(unescape_octets("a\\", None).is_err());
}
