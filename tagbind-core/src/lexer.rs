//! Tokenizer: raw bytes to lexical events.
//!
//! The lexer is a lazy, non-restartable pull iterator over a byte slice.
//! It knows nothing about nesting; it only checks that each construct is
//! lexically well formed.
//!
//! # Event sequences
//!
//! `<a x="1">hi</a>` emits:
//! ```text
//! TagOpen("a")
//! AttrName("x")
//! AttrValue("1")
//! TextRun("hi")
//! TagClose("a")
//! Eof
//! ```
//!
//! A self-closing `<a/>` emits `TagOpen("a")` then `TagClose("a")`.
//! Comments, processing instructions (including the XML declaration) and
//! DOCTYPE declarations are skipped. A DOCTYPE after the first start tag is
//! malformed. CDATA content is emitted verbatim as
//! a `TextRun`.

use std::borrow::Cow;
use std::iter::FusedIterator;

use memchr::{memchr, memmem};
use unicode_xid::UnicodeXID;

use crate::entities;
use crate::error::{Error, Result};
use crate::span::Span;

/// Low-level lexical event. Borrowed from the input where possible.
#[derive(Debug, Clone, PartialEq)]
pub enum LexEvent<'a> {
    /// `<name` of a start tag. Attributes follow as AttrName/AttrValue pairs.
    TagOpen { name: &'a str, span: Span },

    /// `</name>`, or the `/>` of a self-closing tag.
    TagClose { name: &'a str, span: Span },

    /// Attribute name inside a start tag. Always followed by AttrValue.
    AttrName { name: &'a str, span: Span },

    /// Attribute value with references decoded.
    AttrValue { value: Cow<'a, str>, span: Span },

    /// Character data with references decoded.
    TextRun { text: Cow<'a, str>, span: Span },

    /// End of input.
    Eof { span: Span },
}

impl<'a> LexEvent<'a> {
    /// Get the span for this event.
    pub fn span(&self) -> Span {
        match self {
            LexEvent::TagOpen { span, .. } => *span,
            LexEvent::TagClose { span, .. } => *span,
            LexEvent::AttrName { span, .. } => *span,
            LexEvent::AttrValue { span, .. } => *span,
            LexEvent::TextRun { span, .. } => *span,
            LexEvent::Eof { span } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State<'a> {
    /// Between tags.
    Content,
    /// Inside a start tag, after its name.
    InTag { name: &'a str, start: usize },
    Done,
}

/// Pull tokenizer over UTF-8 input.
#[derive(Debug)]
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    state: State<'a>,
    /// AttrValue queued behind the AttrName just returned.
    pending: Option<LexEvent<'a>>,
    /// Attribute names seen in the current start tag.
    seen_attrs: Vec<&'a str>,
    /// Offset of the first invalid UTF-8 byte, reported as the first event.
    invalid_utf8: Option<usize>,
    /// A start tag has been lexed; DOCTYPE is no longer allowed.
    seen_element: bool,
}

impl<'a> Lexer<'a> {
    /// Create a lexer. A leading byte order mark is skipped.
    pub fn new(input: &'a [u8]) -> Self {
        let (src, invalid_utf8) = match std::str::from_utf8(input) {
            Ok(src) => (src, None),
            Err(e) => ("", Some(e.valid_up_to())),
        };
        let pos = if src.starts_with('\u{FEFF}') { 3 } else { 0 };
        Lexer {
            src,
            pos,
            state: State::Content,
            pending: None,
            seen_attrs: Vec::new(),
            invalid_utf8,
            seen_element: false,
        }
    }

    /// Current byte offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn next_event(&mut self) -> Result<Option<LexEvent<'a>>> {
        if let Some(event) = self.pending.take() {
            return Ok(Some(event));
        }
        if let Some(offset) = self.invalid_utf8.take() {
            return Err(Error::malformed("invalid UTF-8", offset));
        }
        loop {
            let event = match self.state {
                State::Done => return Ok(None),
                State::InTag { name, start } => self.lex_in_tag(name, start)?,
                State::Content => self.lex_content()?,
            };
            if event.is_some() {
                return Ok(event);
            }
        }
    }

    // ---- Content ----

    fn lex_content(&mut self) -> Result<Option<LexEvent<'a>>> {
        let bytes = self.bytes();
        if self.pos >= bytes.len() {
            self.state = State::Done;
            return Ok(Some(LexEvent::Eof {
                span: Span::from_range(self.pos, self.pos),
            }));
        }
        if bytes[self.pos] != b'<' {
            return self.lex_text().map(Some);
        }

        let rest = &bytes[self.pos..];
        if rest.starts_with(b"<!--") {
            self.skip_comment()?;
            Ok(None)
        } else if rest.starts_with(b"<![CDATA[") {
            self.lex_cdata().map(Some)
        } else if rest.starts_with(b"<!DOCTYPE") {
            if self.seen_element {
                let reason = "DOCTYPE declaration after the root element";
                return Err(Error::malformed(reason, self.pos));
            }
            self.skip_doctype()?;
            Ok(None)
        } else if rest.starts_with(b"<?") {
            self.skip_processing_instruction()?;
            Ok(None)
        } else if rest.starts_with(b"</") {
            self.lex_end_tag().map(Some)
        } else {
            self.lex_start_tag().map(Some)
        }
    }

    fn lex_text(&mut self) -> Result<LexEvent<'a>> {
        let bytes = self.bytes();
        let start = self.pos;
        let end = memchr(b'<', &bytes[start..]).map_or(bytes.len(), |i| start + i);
        let raw = &self.src[start..end];
        if let Some(gt) = memchr(b'>', raw.as_bytes()) {
            return Err(Error::malformed("bare '>' in content", start + gt));
        }
        let text = entities::decode(raw, start)?;
        self.pos = end;
        Ok(LexEvent::TextRun {
            text,
            span: Span::from_range(start, end),
        })
    }

    fn lex_cdata(&mut self) -> Result<LexEvent<'a>> {
        let start = self.pos;
        let body = start + b"<![CDATA[".len();
        let Some(len) = memmem::find(&self.bytes()[body..], b"]]>") else {
            return Err(Error::malformed("unterminated CDATA section", start));
        };
        self.pos = body + len + 3;
        Ok(LexEvent::TextRun {
            text: Cow::Borrowed(&self.src[body..body + len]),
            span: Span::from_range(start, self.pos),
        })
    }

    fn skip_comment(&mut self) -> Result<()> {
        let start = self.pos;
        let body = start + b"<!--".len();
        let Some(len) = memmem::find(&self.bytes()[body..], b"-->") else {
            return Err(Error::malformed("unterminated comment", start));
        };
        tracing::trace!(position = start, "skipping comment");
        self.pos = body + len + 3;
        Ok(())
    }

    fn skip_processing_instruction(&mut self) -> Result<()> {
        let start = self.pos;
        let Some(len) = memmem::find(&self.bytes()[start + 2..], b"?>") else {
            return Err(Error::malformed("unterminated processing instruction", start));
        };
        tracing::trace!(position = start, "skipping processing instruction");
        self.pos = start + 2 + len + 2;
        Ok(())
    }

    /// Skip `<!DOCTYPE ...>`, including a bracketed internal subset.
    /// Nothing in it is resolved.
    fn skip_doctype(&mut self) -> Result<()> {
        let start = self.pos;
        let body = start + b"<!DOCTYPE".len();
        let mut quote: Option<u8> = None;
        let mut depth = 0usize;
        for (i, &b) in self.bytes()[body..].iter().enumerate() {
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => depth += 1,
                (None, b']') => depth = depth.saturating_sub(1),
                (None, b'>') if depth == 0 => {
                    tracing::trace!(position = start, "skipping DOCTYPE declaration");
                    self.pos = body + i + 1;
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(Error::malformed("unterminated DOCTYPE declaration", start))
    }

    // ---- Tags ----

    fn lex_end_tag(&mut self) -> Result<LexEvent<'a>> {
        let start = self.pos;
        let name_start = start + 2;
        let name_end = self
            .scan_name(name_start)
            .ok_or_else(|| Error::malformed("expected element name after '</'", name_start))?;
        let name = &self.src[name_start..name_end];
        self.pos = name_end;
        self.skip_whitespace();
        match self.bytes().get(self.pos) {
            Some(b'>') => {
                self.pos += 1;
                Ok(LexEvent::TagClose {
                    name,
                    span: Span::from_range(start, self.pos),
                })
            }
            Some(_) => Err(Error::malformed("expected '>' to close end tag", self.pos)),
            None => Err(Error::malformed(format!("unterminated end tag </{name}"), start)),
        }
    }

    fn lex_start_tag(&mut self) -> Result<LexEvent<'a>> {
        let start = self.pos;
        let Some(name_end) = self.scan_name(start + 1) else {
            return Err(Error::malformed("bare '<' in content", start));
        };
        let name = &self.src[start + 1..name_end];
        self.pos = name_end;
        self.seen_attrs.clear();
        self.seen_element = true;
        self.state = State::InTag { name, start };
        Ok(LexEvent::TagOpen {
            name,
            span: Span::from_range(start, name_end),
        })
    }

    fn lex_in_tag(&mut self, name: &'a str, start: usize) -> Result<Option<LexEvent<'a>>> {
        let had_space = self.skip_whitespace();
        let bytes = self.bytes();
        match bytes.get(self.pos) {
            None => Err(Error::malformed(format!("unterminated start tag <{name}>"), start)),
            Some(b'>') => {
                self.pos += 1;
                self.state = State::Content;
                Ok(None)
            }
            Some(b'/') => {
                if bytes.get(self.pos + 1) != Some(&b'>') {
                    return Err(Error::malformed("expected '>' after '/' in tag", self.pos));
                }
                let span = Span::from_range(self.pos, self.pos + 2);
                self.pos += 2;
                self.state = State::Content;
                Ok(Some(LexEvent::TagClose { name, span }))
            }
            Some(_) if !had_space => Err(Error::malformed(
                "expected whitespace before attribute",
                self.pos,
            )),
            Some(_) => self.lex_attribute().map(Some),
        }
    }

    /// Lex `name = "value"`. Returns AttrName and queues AttrValue.
    fn lex_attribute(&mut self) -> Result<LexEvent<'a>> {
        let bytes = self.bytes();
        let name_start = self.pos;
        let name_end = self
            .scan_name(name_start)
            .ok_or_else(|| Error::malformed("unexpected character in tag", name_start))?;
        let name = &self.src[name_start..name_end];
        if self.seen_attrs.contains(&name) {
            return Err(Error::malformed(
                format!("duplicate attribute '{name}'"),
                name_start,
            ));
        }
        self.seen_attrs.push(name);

        self.pos = name_end;
        self.skip_whitespace();
        if bytes.get(self.pos) != Some(&b'=') {
            return Err(Error::malformed(
                format!("expected '=' after attribute '{name}'"),
                self.pos,
            ));
        }
        self.pos += 1;
        self.skip_whitespace();

        let quote = match bytes.get(self.pos) {
            Some(&q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(Error::malformed("attribute value must be quoted", self.pos)),
            None => return Err(Error::malformed("unterminated attribute", name_start)),
        };
        let value_start = self.pos + 1;
        let Some(len) = memchr(quote, &bytes[value_start..]) else {
            return Err(Error::malformed("unterminated attribute value", self.pos));
        };
        let value_end = value_start + len;
        let raw = &self.src[value_start..value_end];
        if let Some(lt) = memchr(b'<', raw.as_bytes()) {
            return Err(Error::malformed("'<' in attribute value", value_start + lt));
        }
        let value = entities::decode(raw, value_start)?;
        self.pos = value_end + 1;

        self.pending = Some(LexEvent::AttrValue {
            value,
            span: Span::from_range(value_start - 1, self.pos),
        });
        Ok(LexEvent::AttrName {
            name,
            span: Span::from_range(name_start, name_end),
        })
    }

    // ---- Helpers ----

    /// Scan a name starting at `start`, returning its end offset.
    fn scan_name(&self, start: usize) -> Option<usize> {
        let mut chars = self.src.get(start..)?.char_indices();
        let (_, first) = chars.next()?;
        if !is_name_start(first) {
            return None;
        }
        let mut end = start + first.len_utf8();
        for (i, c) in chars {
            if !is_name_char(c) {
                break;
            }
            end = start + i + c.len_utf8();
        }
        Some(end)
    }

    /// Skip whitespace, returning whether any was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        let bytes = self.bytes();
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = bytes.get(self.pos) {
            self.pos += 1;
        }
        self.pos > start
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<LexEvent<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_event() {
            Ok(event) => event.map(Ok),
            Err(err) => {
                self.state = State::Done;
                self.pending = None;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Lexer<'_> {}

#[inline]
fn is_name_start(c: char) -> bool {
    c == '_' || c == ':' || UnicodeXID::is_xid_start(c)
}

#[inline]
fn is_name_char(c: char) -> bool {
    matches!(c, '-' | '.' | ':') || UnicodeXID::is_xid_continue(c)
}
