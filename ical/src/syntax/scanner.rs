// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Scanner for iCalendar content lines.
//!
//! Converts the token stream into owned content lines:
//!
//! ```text
//! contentline = name *(";" param) ":" value CRLF
//! ```
//!
//! Errors are attached to the line they occur on instead of aborting the
//! scan, so one bad line never hides the rest of a message.

use std::iter::Peekable;

use crate::syntax::lexer::{Span, SpannedToken, Token};

/// A scanned iCalendar content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name as written, e.g. `DTSTART`
    pub name: String,

    /// Property parameters in source order
    pub parameters: Vec<ContentParameter>,

    /// Raw property value, with folding removed
    pub value: String,

    /// Span of the entire content line
    pub span: Span,

    /// Error information if scanning this line failed
    pub error: Option<ContentLineError>,
}

impl ContentLine {
    /// Check if this content line is valid (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// First value of the named parameter, compared case-insensitively.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(|p| p.values.first())
            .map(|v| v.value.as_str())
    }
}

/// A scanned parameter, `name=value` or `name=value1,value2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentParameter {
    /// Parameter name, e.g. `TZID`
    pub name: String,

    /// Parameter values (comma-separated in the source)
    pub values: Vec<ContentParameterValue>,
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentParameterValue {
    /// The value without surrounding quotes
    pub value: String,

    /// Whether the value was quoted in the source
    pub quoted: bool,
}

/// Errors that can occur when scanning a content line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentLineError {
    /// `PROPNAME value` instead of `PROPNAME:value`
    #[error("missing colon in property at {expected_at}")]
    MissingColon {
        /// Span where colon was expected
        expected_at: Span,
    },

    /// Line with nothing on it
    #[error("empty content line at {span}")]
    EmptyLine {
        /// Span of the empty line
        span: Span,
    },

    /// Invalid parameter syntax
    #[error("{kind} at {span}")]
    InvalidParameter {
        /// Span of the invalid parameter
        span: Span,
        /// Specific error details
        kind: ParameterErrorKind,
    },

    /// Character not permitted in content lines
    #[error("invalid character at {span}")]
    InvalidCharacter {
        /// Span of the character
        span: Span,
    },

    /// Line does not start with a property name
    #[error("content line without a name at {span}")]
    MissingName {
        /// Span of the line
        span: Span,
    },
}

/// Specific parameter parsing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParameterErrorKind {
    /// `TZID America/New_York`
    #[error("missing equals in parameter")]
    MissingEquals,

    /// `TZID=`
    #[error("missing parameter value")]
    MissingValue,

    /// `;=value`
    #[error("empty parameter name")]
    EmptyName,

    /// `PARAM="unclosed value`
    #[error("unterminated quoted string")]
    UnterminatedQuote,
}

/// Result of scanning content lines.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// All scanned content lines, including ones with errors
    pub lines: Vec<ContentLine>,

    /// Whether any errors were encountered
    pub has_errors: bool,
}

/// Scan a token stream into content lines.
pub fn scan_content_lines<'src>(tokens: impl IntoIterator<Item = SpannedToken<'src>>) -> ScanResult {
    let mut tokens = tokens.into_iter().peekable();
    let mut lines = Vec::new();
    let mut has_errors = false;

    while let Some(line) = scan_one_content_line(&mut tokens) {
        has_errors |= line.error.is_some();
        lines.push(line);
    }

    ScanResult { lines, has_errors }
}

/// Scan a single content line; `None` at end of input.
fn scan_one_content_line<'src>(
    tokens: &mut Peekable<impl Iterator<Item = SpannedToken<'src>>>,
) -> Option<ContentLine> {
    let SpannedToken(first, line_start) = *tokens.peek()?;

    if matches!(first, Token::Newline) {
        tokens.next();
        return Some(ContentLine {
            name: String::new(),
            parameters: Vec::new(),
            value: String::new(),
            span: line_start,
            error: Some(ContentLineError::EmptyLine { span: line_start }),
        });
    }

    let mut line = ContentLine {
        name: collect_words(tokens),
        parameters: Vec::new(),
        value: String::new(),
        span: line_start,
        error: None,
    };

    if line.name.is_empty() {
        let end = consume_until_newline(tokens).unwrap_or(line_start.end);
        line.span = Span::new(line_start.start, end);
        line.error = Some(ContentLineError::MissingName { span: line.span });
        return Some(line);
    }

    while let Some(&SpannedToken(Token::Semicolon, semi_span)) = tokens.peek() {
        tokens.next();
        match scan_parameter(tokens) {
            Ok(param) => line.parameters.push(param),
            Err(kind) => {
                let end = consume_until_newline(tokens).unwrap_or(semi_span.end);
                line.span = Span::new(line_start.start, end);
                line.error = Some(ContentLineError::InvalidParameter {
                    span: semi_span,
                    kind,
                });
                return Some(line);
            }
        }
    }

    match tokens.peek() {
        Some(&SpannedToken(Token::Colon, _)) => {
            tokens.next();
        }
        Some(&SpannedToken(_, span)) => {
            let end = consume_until_newline(tokens).unwrap_or(span.end);
            line.span = Span::new(line_start.start, end);
            line.error = Some(ContentLineError::MissingColon { expected_at: span });
            return Some(line);
        }
        None => {
            line.error = Some(ContentLineError::MissingColon {
                expected_at: Span::new(line_start.end, line_start.end),
            });
            return Some(line);
        }
    }

    let mut end = line_start.end;
    for SpannedToken(token, span) in tokens.by_ref() {
        end = span.end;
        match token {
            Token::Newline => break,
            Token::Error if line.error.is_none() => {
                line.error = Some(ContentLineError::InvalidCharacter { span });
            }
            Token::Error => {}
            token => line.value.push_str(token.text()),
        }
    }
    line.span = Span::new(line_start.start, end);
    Some(line)
}

/// Collect consecutive word tokens; folding may split one name into several.
fn collect_words<'src>(tokens: &mut Peekable<impl Iterator<Item = SpannedToken<'src>>>) -> String {
    let mut text = String::new();
    while let Some(&SpannedToken(Token::Word(word), _)) = tokens.peek() {
        text.push_str(word);
        tokens.next();
    }
    text
}

fn scan_parameter<'src>(
    tokens: &mut Peekable<impl Iterator<Item = SpannedToken<'src>>>,
) -> Result<ContentParameter, ParameterErrorKind> {
    let name = collect_words(tokens);
    if name.is_empty() {
        return Err(ParameterErrorKind::EmptyName);
    }

    match tokens.peek() {
        Some(SpannedToken(Token::Equal, _)) => {
            tokens.next();
        }
        Some(_) | None => return Err(ParameterErrorKind::MissingEquals),
    }

    let mut values = Vec::new();
    loop {
        match scan_parameter_value(tokens)? {
            Some(value) => values.push(value),
            None => break,
        }

        match tokens.peek() {
            Some(&SpannedToken(Token::Comma, _)) => {
                tokens.next();
            }
            _ => break,
        }
    }

    if values.is_empty() {
        return Err(ParameterErrorKind::MissingValue);
    }
    Ok(ContentParameter { name, values })
}

/// Scan one parameter value; `Ok(None)` when nothing is there.
fn scan_parameter_value<'src>(
    tokens: &mut Peekable<impl Iterator<Item = SpannedToken<'src>>>,
) -> Result<Option<ContentParameterValue>, ParameterErrorKind> {
    if let Some(&SpannedToken(Token::DQuote, _)) = tokens.peek() {
        tokens.next();
        let mut value = String::new();
        loop {
            // the line break is left for the caller's recovery
            let Some(&SpannedToken(token, _)) = tokens.peek() else {
                return Err(ParameterErrorKind::UnterminatedQuote);
            };
            match token {
                Token::Newline => return Err(ParameterErrorKind::UnterminatedQuote),
                Token::DQuote => {
                    tokens.next();
                    return Ok(Some(ContentParameterValue {
                        value,
                        quoted: true,
                    }));
                }
                token => {
                    value.push_str(token.text());
                    tokens.next();
                }
            }
        }
    }

    let mut value = String::new();
    while let Some(&SpannedToken(token, _)) = tokens.peek() {
        if matches!(
            token,
            Token::Semicolon | Token::Colon | Token::Comma | Token::Equal | Token::Newline
        ) {
            break;
        }
        value.push_str(token.text());
        tokens.next();
    }

    Ok((!value.is_empty()).then_some(ContentParameterValue {
        value,
        quoted: false,
    }))
}

/// Consume tokens through the next line break, returning the last end offset.
fn consume_until_newline<'src>(
    tokens: &mut Peekable<impl Iterator<Item = SpannedToken<'src>>>,
) -> Option<usize> {
    let mut end = None;
    for SpannedToken(token, span) in tokens.by_ref() {
        end = Some(span.end);
        if matches!(token, Token::Newline) {
            break;
        }
    }
    end
}
