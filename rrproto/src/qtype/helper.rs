use crate::utils::unquote;
use nom::bytes::complete::take;
use nom::IResult;
use rrlib::errors::DNSProtoErr;

pub fn take_bytes(input: &[u8], count: usize) -> IResult<&[u8], &[u8]> {
    take(count)(input)
}

fn count_unescaped_quotes(chunk: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in chunk.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => count += 1,
            _ => {}
        }
    }
    count
}

/// Rebuild logical fields from whitespace split chunks. A chunk with an
/// odd number of unescaped `"` opens a quoted span, following chunks are
/// joined to it with a single space until one closes it. Surrounding quotes
/// are dropped and `\"` becomes `"` in the result.
pub fn build_string<S: AsRef<str>>(chunks: &[S]) -> Result<Vec<String>, DNSProtoErr> {
    let mut data = vec![];
    let mut current: Option<String> = None;
    for chunk in chunks {
        let chunk = chunk.as_ref().trim();
        if chunk.is_empty() {
            continue;
        }
        let closes_or_opens = count_unescaped_quotes(chunk) % 2 == 1;
        match current.take() {
            Some(mut span) => {
                span.push(' ');
                span.push_str(chunk);
                if closes_or_opens {
                    data.push(span);
                } else {
                    current = Some(span);
                }
            }
            None if closes_or_opens => current = Some(chunk.to_owned()),
            None => data.push(chunk.to_owned()),
        }
    }
    if let Some(span) = current {
        return Err(DNSProtoErr::MalformedText(format!(
            "unbalanced quote in `{}`",
            span
        )));
    }
    Ok(data.iter().map(|s| unquote(s)).collect())
}
