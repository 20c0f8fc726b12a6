//! Per-field tag parsing
//!
//! A tag is a comma separated list of `name` or `name:argument` entries, e.g.
//! `"required,minLength:4"`. An argument wrapped in single quotes may contain
//! commas: `"contains:'a,b'"`.

/// One parsed tag entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub name: String,
    /// Empty when the entry has no colon
    pub argument: String,
}

impl TagEntry {
    pub fn new(name: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument: argument.into(),
        }
    }
}

/// Parse raw tag text into its ordered entries
///
/// Blank text yields no entries. Blank entries between commas are skipped.
pub fn parse_tag(raw: &str) -> Vec<TagEntry> {
    split_top_level(raw)
        .into_iter()
        .filter_map(parse_entry)
        .collect()
}

fn split_top_level(raw: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    // last non-whitespace character outside a quoted argument
    let mut previous = None;

    for (offset, ch) in raw.char_indices() {
        match ch {
            '\'' if quoted => quoted = false,
            '\'' if previous == Some(':') => quoted = true,
            ',' if !quoted => {
                pieces.push(&raw[start..offset]);
                start = offset + 1;
            }
            _ => {}
        }
        if !ch.is_whitespace() {
            previous = Some(ch);
        }
    }
    pieces.push(&raw[start..]);
    pieces
}

fn parse_entry(piece: &str) -> Option<TagEntry> {
    let piece = piece.trim();
    if piece.is_empty() {
        return None;
    }

    let entry = match piece.split_once(':') {
        Some((name, argument)) => TagEntry::new(name.trim(), unquote(argument.trim())),
        None => TagEntry::new(piece, ""),
    };
    Some(entry)
}

fn unquote(argument: &str) -> &str {
    argument
        .strip_prefix('\'')
        .and_then(|inner| inner.strip_suffix('\''))
        .unwrap_or(argument)
}
