//! Built-in transformers
//!
//! All of them rewrite text and hand every other value back unchanged. Decoders
//! also leave text they cannot decode untouched.

use crate::registry::Registry;
use crate::value::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters query escaping leaves as they are, besides ASCII alphanumerics
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub(crate) fn register(registry: &mut Registry) {
    registry.register_transformer("uppercase", |value| map_text(value, |text| Some(text.to_uppercase())));
    registry.register_transformer("lowercase", |value| map_text(value, |text| Some(text.to_lowercase())));
    registry.register_transformer("trim", |value| map_text(value, |text| Some(text.trim().to_string())));
    registry.register_transformer("trimLeft", |value| {
        map_text(value, |text| Some(text.trim_start_matches(' ').to_string()))
    });
    registry.register_transformer("trimRight", |value| {
        map_text(value, |text| Some(text.trim_end_matches(' ').to_string()))
    });
    registry.register_transformer("base64Encode", |value| map_text(value, |text| Some(STANDARD.encode(text))));
    registry.register_transformer("base64Decode", |value| map_text(value, base64_decode));
    registry.register_transformer("urlEncode", |value| map_text(value, |text| Some(query_escape(text))));
    registry.register_transformer("urlDecode", |value| map_text(value, query_unescape));
}

/// Apply `rewrite` to text values; `None` keeps the original text
fn map_text(value: Value, rewrite: impl Fn(&str) -> Option<String>) -> Value {
    match value {
        Value::Text(text) => match rewrite(&text) {
            Some(rewritten) => Value::Text(rewritten),
            None => Value::Text(text),
        },
        other => other,
    }
}

fn base64_decode(text: &str) -> Option<String> {
    let bytes = STANDARD.decode(text).ok()?;
    String::from_utf8(bytes).ok()
}

/// Form-style escaping: spaces become `+`
fn query_escape(text: &str) -> String {
    utf8_percent_encode(text, QUERY).to_string().replace("%20", "+")
}

/// Inverse of [`query_escape`]; `None` on a malformed `%` escape or invalid UTF-8
fn query_unescape(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    for (i, _) in text.match_indices('%') {
        let escape = bytes.get(i + 1..i + 3)?;
        if !escape.iter().all(u8::is_ascii_hexdigit) {
            return None;
        }
    }
    let spaced = text.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(name: &str, input: impl Into<Value>) -> Value {
        let mut registry = Registry::new();
        register(&mut registry);
        let transform = registry.transformer(name).unwrap();
        transform(input.into())
    }

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(apply("uppercase", "Hello"), Value::from("HELLO"));
        assert_eq!(apply("lowercase", "HeLLo"), Value::from("hello"));
        assert_eq!(apply("trim", " \t hi \n"), Value::from("hi"));
        assert_eq!(apply("trimLeft", "  hi  "), Value::from("hi  "));
        assert_eq!(apply("trimRight", "  hi  "), Value::from("  hi"));
    }

    #[test]
    fn test_non_text_passes_through() {
        for name in ["uppercase", "trim", "base64Encode", "urlDecode"] {
            assert_eq!(apply(name, 42i64), Value::Int(42));
            assert_eq!(apply(name, Value::Null), Value::Null);
        }
    }

    #[test]
    fn test_base64() {
        assert_eq!(apply("base64Encode", "hello"), Value::from("aGVsbG8="));
        assert_eq!(apply("base64Decode", "aGVsbG8="), Value::from("hello"));
        assert_eq!(apply("base64Decode", "not base64!"), Value::from("not base64!"));
    }

    #[test]
    fn test_url_escaping() {
        assert_eq!(apply("urlEncode", "a b&c=d/é~"), Value::from("a+b%26c%3Dd%2F%C3%A9~"));
        assert_eq!(apply("urlDecode", "a+b%26c%3Dd%2F%C3%A9~"), Value::from("a b&c=d/é~"));
        assert_eq!(apply("urlDecode", "100%"), Value::from("100%"));
        assert_eq!(apply("urlDecode", "%zz"), Value::from("%zz"));
    }
}
