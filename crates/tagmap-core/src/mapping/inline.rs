//! Inline pipeline specifications for single values
//!
//! ```text
//! spec     := ws? (section (ws | ';')*)*
//! section  := ("validators" | "transformers") ws? ':' ws? quoted
//! quoted   := "'" [^']* "'" | '"' [^"]* '"'
//! ```
//!
//! For example `validators:'required,minLength:3' transformers:"trim,uppercase"`.
//! The quoted body of each section uses the per-field tag syntax.
//!
//! Copyright (c) 2025 Tagmap Team
//! Licensed under the Apache-2.0 license

use super::tags::{parse_tag, TagEntry};
use crate::{Error, Result};

/// Parsed validator and transformer sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineSpec {
    pub validators: Vec<TagEntry>,
    pub transformers: Vec<TagEntry>,
}

/// Parse an inline pipeline specification
pub fn parse_inline_spec(input: &str) -> Result<InlineSpec> {
    Parser::new(input).parse()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Validators,
    Transformers,
}

struct Parser<'a> {
    input: &'a str,
    /// Byte offset of the next unread character
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn parse(mut self) -> Result<InlineSpec> {
        let mut validators = None;
        let mut transformers = None;

        loop {
            self.skip_separators();
            if self.is_at_end() {
                break;
            }

            let start = self.position;
            let section = self.parse_section_name()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let body = self.parse_quoted()?;

            let slot = match section {
                Section::Validators => &mut validators,
                Section::Transformers => &mut transformers,
            };
            if slot.is_some() {
                return Err(self.error_at("section appears more than once", start));
            }
            *slot = Some(parse_tag(body));
        }

        Ok(InlineSpec {
            validators: validators.unwrap_or_default(),
            transformers: transformers.unwrap_or_default(),
        })
    }

    fn parse_section_name(&mut self) -> Result<Section> {
        let start = self.position;
        while matches!(self.current_char(), Some(ch) if ch.is_ascii_alphabetic()) {
            self.advance();
        }
        match &self.input[start..self.position] {
            "validators" => Ok(Section::Validators),
            "transformers" => Ok(Section::Transformers),
            "" => Err(self.error_at("expected 'validators' or 'transformers'", start)),
            other => Err(self.error_at(format!("unknown section '{}'", other), start)),
        }
    }

    fn parse_quoted(&mut self) -> Result<&'a str> {
        let quote = match self.current_char() {
            Some(ch @ ('\'' | '"')) => ch,
            _ => return Err(self.error("expected a quoted list")),
        };
        let open = self.position;
        self.advance();

        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch == quote {
                let body = &self.input[start..self.position];
                self.advance();
                return Ok(body);
            }
            self.advance();
        }
        Err(self.error_at("unterminated quote", open))
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.current_char() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", expected)))
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char(), Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.current_char(), Some(ch) if ch.is_whitespace() || ch == ';') {
            self.advance();
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn error(&self, message: impl Into<String>) -> Error {
        self.error_at(message, self.position)
    }

    fn error_at(&self, message: impl Into<String>, position: usize) -> Error {
        Error::InlineSpec {
            message: message.into(),
            position,
        }
    }
}
