//! Legacy attribute record codec
//!
//! Parses and serializes the bracketed line format used by the old
//! flat-file task database:
//!
//! ```text
//! [description:"pay rent" due:"1734480000" status:"pending" uuid:"..."]
//! ```
//!
//! Values are JSON-string escaped, and the literal brackets `[` / `]`
//! are stored as the entities `&open;` / `&close;`. Unknown keys are
//! preserved verbatim for forward compatibility. `encode` emits keys in
//! sorted order so output is deterministic; `decode(encode(m)) == m`.

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors produced while decoding a single record line.
///
/// Import treats these as per-record failures: the offending line is
/// skipped and the rest of the batch continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("record does not start with '['")]
    NotARecord,

    #[error("record has no closing ']'")]
    Unterminated,

    #[error("empty record")]
    EmptyRecord,

    #[error("expected ':' after attribute name '{0}'")]
    MissingColon(String),

    #[error("expected quoted value for attribute '{0}'")]
    MissingQuote(String),

    #[error("unterminated quoted value for attribute '{0}'")]
    UnterminatedQuote(String),

    #[error("unrecognized characters at end of record: '{0}'")]
    TrailingGarbage(String),
}

/// Decode one bracketed record into an attribute map.
pub fn decode(line: &str) -> Result<BTreeMap<String, String>, ParseError> {
    let line = line.trim();
    if !line.starts_with('[') {
        return Err(ParseError::NotARecord);
    }
    let end = line.rfind(']').ok_or(ParseError::Unterminated)?;
    let inner = &line[1..end];
    if inner.trim().is_empty() {
        return Err(ParseError::EmptyRecord);
    }

    let mut attributes = BTreeMap::new();
    let chars: Vec<char> = inner.chars().collect();
    let mut pos = 0;

    while pos < chars.len() {
        // Skip separating spaces
        while pos < chars.len() && chars[pos] == ' ' {
            pos += 1;
        }
        if pos >= chars.len() {
            break;
        }

        // Attribute name, up to the ':' delimiter
        let name_start = pos;
        while pos < chars.len() && chars[pos] != ':' && chars[pos] != ' ' {
            pos += 1;
        }
        let name: String = chars[name_start..pos].iter().collect();
        if pos >= chars.len() || chars[pos] != ':' || name.is_empty() {
            let seen: String = chars[name_start..].iter().collect();
            return Err(ParseError::MissingColon(seen.trim().to_string()));
        }
        pos += 1;

        // Quoted value
        if pos >= chars.len() || chars[pos] != '"' {
            return Err(ParseError::MissingQuote(name));
        }
        pos += 1;
        let mut raw = String::new();
        let mut closed = false;
        while pos < chars.len() {
            match chars[pos] {
                '"' => {
                    closed = true;
                    pos += 1;
                    break;
                }
                '\\' if pos + 1 < chars.len() => {
                    raw.push('\\');
                    raw.push(chars[pos + 1]);
                    pos += 2;
                }
                c => {
                    raw.push(c);
                    pos += 1;
                }
            }
        }
        if !closed {
            return Err(ParseError::UnterminatedQuote(name));
        }

        // Pairs are separated by spaces; anything glued to the closing
        // quote is not part of this grammar.
        if pos < chars.len() && chars[pos] != ' ' {
            let remainder: String = chars[pos..].iter().collect();
            return Err(ParseError::TrailingGarbage(remainder));
        }

        attributes.insert(name, decode_entities(&unescape(&raw)));
    }

    Ok(attributes)
}

/// Encode an attribute map as one bracketed record line.
///
/// Keys come out in sorted order, so encoding is deterministic.
pub fn encode(attributes: &BTreeMap<String, String>) -> String {
    let mut out = String::from("[");
    let mut first = true;
    for (name, value) in attributes {
        if !first {
            out.push(' ');
        }
        first = false;
        out.push_str(name);
        out.push_str(":\"");
        out.push_str(&escape(&encode_entities(value)));
        out.push('"');
    }
    out.push(']');
    out
}

/// Undo JSON-string escaping in a raw value.
///
/// Unrecognized escapes pass through unchanged rather than failing; the
/// store never rejects a value it can represent.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

// Bracket characters inside values would break the record grammar, so
// they travel as entities.
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value.replace("&open;", "[").replace("&close;", "]")
}

fn encode_entities(value: &str) -> String {
    if !value.contains('[') && !value.contains(']') {
        return value.to_string();
    }
    value.replace('[', "&open;").replace(']', "&close;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_multiple_pairs() {
        let line = r#"[description:"bing" due:"1734480000" status:"pending" uuid:"ad7f7585-bff3-4b57-a116-abfc9f71ee4a"]"#;
        let attrs = decode(line).expect("decode");
        assert_eq!(attrs.get("description").map(String::as_str), Some("bing"));
        assert_eq!(attrs.get("due").map(String::as_str), Some("1734480000"));
        assert_eq!(attrs.get("status").map(String::as_str), Some("pending"));
        assert_eq!(attrs.len(), 4);
    }

    #[test]
    fn decodes_escapes_and_entities() {
        let line = r#"[description:"say \"hi\" &open;now&close;"]"#;
        let attrs = decode(line).expect("decode");
        assert_eq!(
            attrs.get("description").map(String::as_str),
            Some(r#"say "hi" [now]"#)
        );
    }

    #[test]
    fn rejects_non_record() {
        assert_eq!(decode("description:\"x\""), Err(ParseError::NotARecord));
        assert_eq!(decode("[]"), Err(ParseError::EmptyRecord));
        assert_eq!(decode("[description:\"x\""), Err(ParseError::Unterminated));
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!(matches!(
            decode("[description]"),
            Err(ParseError::MissingColon(_))
        ));
        assert!(matches!(
            decode("[description:x]"),
            Err(ParseError::MissingQuote(_))
        ));
        assert!(matches!(
            decode("[description:\"x\" garbage]"),
            Err(ParseError::MissingColon(_))
        ));
        assert!(matches!(
            decode("[description:\"x\"tail]"),
            Err(ParseError::TrailingGarbage(_))
        ));
    }

    #[test]
    fn round_trip_is_stable() {
        let line = r#"[description:"a \"quoted\" &open;value&close;" entry:"1734397061" status:"pending"]"#;
        let attrs = decode(line).expect("decode");
        let encoded = encode(&attrs);
        let again = decode(&encoded).expect("re-decode");
        assert_eq!(attrs, again);
    }

    #[test]
    fn encode_sorts_keys() {
        let mut attrs = BTreeMap::new();
        attrs.insert("uuid".to_string(), "u".to_string());
        attrs.insert("description".to_string(), "d".to_string());
        let encoded = encode(&attrs);
        assert_eq!(encoded, r#"[description:"d" uuid:"u"]"#);
    }
}
