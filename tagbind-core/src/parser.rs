//! Event parser: lexical events to well-formed structural events.
//!
//! [`EventReader`] pulls [`LexEvent`]s from the [`Lexer`] and keeps an
//! explicit stack of open element names. It is both a pull iterator
//! (`Iterator<Item = Result<StructEvent>>`) and a push driver
//! ([`EventReader::parse`]).
//!
//! Apart from the open-element stack, the reader holds at most one
//! lookahead lexical event (needed to see where a start tag's attributes
//! end), one pending text run, and the two or three structural events a
//! single lexical event can produce.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::config::ParseOptions;
use crate::error::{Error, Result};
use crate::event::{Attribute, StructEvent};
use crate::lexer::{LexEvent, Lexer};
use crate::span::Span;

/// Where the reader is relative to the root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Before the root element.
    Prolog,
    /// Inside the root element.
    Body,
    /// After the root element closed.
    Epilog,
    /// DocumentEnd emitted or an error returned.
    Finished,
}

/// Pull parser producing [`StructEvent`]s.
#[derive(Debug)]
pub struct EventReader<'a> {
    lexer: Lexer<'a>,
    options: ParseOptions,
    /// Open element names, innermost last.
    stack: Vec<&'a str>,
    phase: Phase,
    /// Lexical event read past the end of a start tag's attributes.
    lookahead: Option<LexEvent<'a>>,
    /// Text runs not yet flushed as a Characters event.
    text: Option<(Cow<'a, str>, Span)>,
    /// Structural events produced but not yet returned.
    queue: VecDeque<StructEvent<'a>>,
}

impl<'a> EventReader<'a> {
    /// Create a reader with default options.
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    /// Create a reader with the given options.
    pub fn with_options(input: &'a [u8], options: ParseOptions) -> Self {
        EventReader {
            lexer: Lexer::new(input),
            options,
            stack: Vec::with_capacity(16),
            phase: Phase::Prolog,
            lookahead: None,
            text: None,
            queue: VecDeque::with_capacity(4),
        }
    }

    /// Current element nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Drive the parse to completion, pushing each event into `handler`.
    ///
    /// Stops at the first error; events already delivered stay delivered.
    pub fn parse<F>(self, mut handler: F) -> Result<()>
    where
        F: FnMut(StructEvent<'a>),
    {
        for event in self {
            handler(event?);
        }
        Ok(())
    }

    fn next_lex(&mut self) -> Result<LexEvent<'a>> {
        if let Some(event) = self.lookahead.take() {
            return Ok(event);
        }
        match self.lexer.next() {
            Some(event) => event,
            // The lexer always ends with Eof; only reachable after an error.
            None => Ok(LexEvent::Eof {
                span: Span::from_range(self.lexer.position(), self.lexer.position()),
            }),
        }
    }

    /// Consume one lexical event, queueing any structural events it yields.
    fn step(&mut self) -> Result<()> {
        match self.next_lex()? {
            LexEvent::TagOpen { name, span } => self.start_element(name, span),
            LexEvent::TagClose { name, span } => self.end_element(name, span),
            LexEvent::TextRun { text, span } => self.text_run(text, span),
            LexEvent::Eof { span } => self.end_document(span),
            LexEvent::AttrName { span, .. } | LexEvent::AttrValue { span, .. } => Err(
                Error::malformed("attribute outside of a start tag", span.start as usize),
            ),
        }
    }

    fn start_element(&mut self, name: &'a str, span: Span) -> Result<()> {
        self.flush_text();
        match self.phase {
            Phase::Prolog => {
                tracing::debug!(root = name, "document start");
                self.queue.push_back(StructEvent::DocumentStart);
                self.phase = Phase::Body;
            }
            Phase::Epilog => {
                return Err(Error::structure(
                    format!("second root element <{name}>"),
                    span.start as usize,
                ));
            }
            Phase::Body | Phase::Finished => {}
        }

        let mut attributes = Vec::new();
        loop {
            match self.next_lex()? {
                LexEvent::AttrName { name: attr, .. } => match self.next_lex()? {
                    LexEvent::AttrValue { value, .. } => {
                        attributes.push(Attribute { name: attr, value });
                    }
                    other => {
                        return Err(Error::malformed(
                            format!("attribute '{attr}' has no value"),
                            other.span().start as usize,
                        ));
                    }
                },
                other => {
                    self.lookahead = Some(other);
                    break;
                }
            }
        }

        self.stack.push(name);
        self.queue.push_back(StructEvent::ElementStart {
            name,
            attributes,
            span,
        });
        Ok(())
    }

    fn end_element(&mut self, name: &'a str, span: Span) -> Result<()> {
        self.flush_text();
        match self.stack.pop() {
            Some(open) if open == name => {}
            open => {
                return Err(Error::UnbalancedElement {
                    expected: open.map(str::to_string),
                    found: name.to_string(),
                    position: span.start as usize,
                });
            }
        }
        self.queue.push_back(StructEvent::ElementEnd { name, span });
        if self.stack.is_empty() {
            self.phase = Phase::Epilog;
        }
        Ok(())
    }

    fn text_run(&mut self, text: Cow<'a, str>, span: Span) -> Result<()> {
        if self.stack.is_empty() {
            // Whitespace around the root element is insignificant
            if is_whitespace(&text) {
                return Ok(());
            }
            return Err(Error::structure(
                "text outside the root element",
                span.start as usize,
            ));
        }
        self.text = Some(match self.text.take() {
            None => (text, span),
            Some((mut pending, pending_span)) => {
                pending.to_mut().push_str(&text);
                (pending, pending_span.join(span))
            }
        });
        Ok(())
    }

    fn flush_text(&mut self) {
        if let Some((text, span)) = self.text.take() {
            if self.options.ignore_whitespace_text && is_whitespace(&text) {
                return;
            }
            self.queue.push_back(StructEvent::Characters { text, span });
        }
    }

    fn end_document(&mut self, span: Span) -> Result<()> {
        self.flush_text();
        if !self.stack.is_empty() {
            return Err(Error::UnexpectedEof {
                open: self.stack.iter().map(|name| name.to_string()).collect(),
                position: span.start as usize,
            });
        }
        if self.phase == Phase::Prolog {
            return Err(Error::structure("no root element", span.start as usize));
        }
        tracing::debug!(bytes = span.start, "document end");
        self.queue.push_back(StructEvent::DocumentEnd);
        self.phase = Phase::Finished;
        Ok(())
    }
}

impl<'a> Iterator for EventReader<'a> {
    type Item = Result<StructEvent<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Some(Ok(event));
            }
            if self.phase == Phase::Finished {
                return None;
            }
            if let Err(err) = self.step() {
                self.phase = Phase::Finished;
                self.queue.clear();
                return Some(Err(err));
            }
        }
    }
}

impl FusedIterator for EventReader<'_> {}

#[inline]
fn is_whitespace(text: &str) -> bool {
    text.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}
