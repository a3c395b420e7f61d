// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Text values as defined in RFC 5545 Section 3.3.11.

use chumsky::extra::ParserExtra;
use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

/// Resolve the escapes of a single TEXT value.
///
/// Unknown escapes are kept verbatim.
#[must_use]
pub fn unescape_text(src: &str) -> String {
    parse_texts(src, false).into_iter().next().unwrap_or_default()
}

/// Split a COMMA-separated list of TEXT values and resolve their escapes.
#[must_use]
pub fn split_text_list(src: &str) -> Vec<String> {
    if src.is_empty() {
        return Vec::new();
    }
    parse_texts(src, true)
}

/// Escape a TEXT value for output.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

fn parse_texts(src: &str, split: bool) -> Vec<String> {
    let stream = Stream::from_iter(src.chars());
    let result = if split {
        values_text::<'_, _, extra::Default>().parse(stream).into_result()
    } else {
        value_text::<'_, _, extra::Default>(false)
            .map(|text| vec![text])
            .parse(stream)
            .into_result()
    };
    // the grammar accepts every input, keep the raw text if that ever changes
    result.unwrap_or_else(|_| vec![src.to_owned()])
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// text       = *(TSAFE-CHAR / ":" / DQUOTE / ESCAPED-CHAR)
/// ; Folded according to description above
///
/// ESCAPED-CHAR = ("\\" / "\;" / "\," / "\N" / "\n")
/// ; \\ encodes \, \N or \n encodes newline
/// ; \; encodes ;, \, encodes ,
/// ```
fn value_text<'src, I, E>(stop_at_comma: bool) -> impl Parser<'src, I, String, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    let plain = any().filter(move |c: &char| *c != '\\' && !(stop_at_comma && *c == ','));

    let escape = just('\\').ignore_then(select! {
        ';' => ";".to_owned(),
        ',' => ",".to_owned(),
        'N' | 'n' => "\n".to_owned(),
        '\\' => "\\".to_owned(),
    });

    // tolerate unknown escapes and a dangling backslash
    let unknown = just('\\')
        .then(any().or_not())
        .map(|(b, c): (char, Option<char>)| c.map_or_else(|| b.to_string(), |c| format!("{b}{c}")));

    choice((plain.map(String::from), escape, unknown))
        .repeated()
        .collect::<Vec<_>>()
        .map(|parts| parts.concat())
}

/// Text multiple values parser.
///
/// If the property permits, multiple TEXT values are specified by a
/// COMMA-separated list of values.
fn values_text<'src, I, E>() -> impl Parser<'src, I, Vec<String>, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    value_text(true).separated_by(just(',')).collect()
}
