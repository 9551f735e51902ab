//! Content line lexer for iCalendar (RFC 5545 §3.1).
//!
//! Handles line unfolding and tokenization of content lines.

use std::iter::Peekable;
use std::str::CharIndices;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{Parameter, Property};

/// Splits input into logical content lines, merging folded continuations.
///
/// Handles both CRLF and bare LF line endings. Lines starting with SP/HTAB are
/// continuations of the previous line; unfolding removes the line break and
/// that single whitespace character (no space is inserted). Blank lines are
/// dropped. Each logical line is paired with the 1-based number of the
/// physical line it started on.
///
/// A continuation with no preceding line is kept verbatim, leading
/// whitespace included, so [`parse_content_line`] rejects it.
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (i, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        if let Some(continuation) = line.strip_prefix([' ', '\t'])
            && let Some((_, prev)) = lines.last_mut()
        {
            prev.push_str(continuation);
        } else {
            lines.push((i + 1, line.to_string()));
        }
    }

    lines
}

/// Parses a single logical content line.
///
/// Format: `name *(";" param) ":" value`
///
/// ## Errors
/// Returns an error carrying the line text if the name is empty or contains
/// invalid characters, a parameter lacks `=VALUE`, a quoted parameter value
/// is never closed, a parameter repeats, or there is no `:` before the value.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<Property> {
    tokenize(line, line_num).map_err(|e| e.with_text(line))
}

fn tokenize(line: &str, line_num: usize) -> ParseResult<Property> {
    let mut chars = line.char_indices().peekable();
    let mut name_end = None;
    let mut colon_pos = None;

    // Find the property name (ends at ';' or ':')
    while let Some(&(i, c)) = chars.peek() {
        if c == ';' || c == ':' {
            name_end = Some(i);
            if c == ':' {
                colon_pos = Some(i);
            }
            chars.next();
            break;
        }
        if !c.is_ascii_alphanumeric() && c != '-' {
            return Err(ParseError::new(
                ParseErrorKind::InvalidPropertyName,
                line_num,
                i + 1,
            ));
        }
        chars.next();
    }

    let Some(name_end) = name_end else {
        return Err(ParseError::new(
            ParseErrorKind::MissingColon,
            line_num,
            line.len(),
        ));
    };

    if name_end == 0 {
        return Err(ParseError::new(
            ParseErrorKind::MissingPropertyName,
            line_num,
            1,
        ));
    }

    let name = &line[..name_end];

    let mut params: Vec<Parameter> = Vec::new();
    while colon_pos.is_none() {
        let start = chars.peek().map_or(line.len(), |&(i, _)| i);
        let (param, terminator) = parse_parameter(&mut chars, line, line_num)?;
        if params.iter().any(|p| p.name == param.name) {
            return Err(
                ParseError::new(ParseErrorKind::DuplicateParameter, line_num, start + 1)
                    .with_context(param.name),
            );
        }
        params.push(param);
        colon_pos = terminator;
    }

    let colon_pos = colon_pos
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, line_num, line.len()))?;

    Ok(Property::with_params(name, params, &line[colon_pos + 1..]))
}

/// Parses a single parameter from the character stream.
///
/// Returns the parameter and, when it was the last one, the byte index of
/// the `:` that ends the parameter list.
fn parse_parameter(
    chars: &mut Peekable<CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> ParseResult<(Parameter, Option<usize>)> {
    let start = chars.peek().map_or(line.len(), |&(i, _)| i);

    // Parse parameter name (up to '=')
    let mut name_end = None;
    while let Some(&(i, c)) = chars.peek() {
        if c == '=' {
            name_end = Some(i);
            chars.next();
            break;
        }
        if !c.is_ascii_alphanumeric() && c != '-' {
            return Err(
                ParseError::new(ParseErrorKind::InvalidParameter, line_num, i + 1)
                    .with_context("parameter is missing =VALUE"),
            );
        }
        chars.next();
    }

    let name_end = match name_end {
        Some(end) if end > start => end,
        _ => {
            return Err(
                ParseError::new(ParseErrorKind::InvalidParameter, line_num, start + 1)
                    .with_context("parameter is missing =VALUE"),
            );
        }
    };

    let param_name = &line[start..name_end];

    // Parse parameter values (comma-separated, may be quoted)
    let mut values = Vec::new();
    loop {
        values.push(parse_param_value(chars, line, line_num)?);

        match chars.next() {
            Some((_, ',')) => {}
            Some((_, ';')) => return Ok((Parameter::with_values(param_name, values), None)),
            Some((i, ':')) => {
                return Ok((Parameter::with_values(param_name, values), Some(i)));
            }
            Some((i, c)) => {
                return Err(
                    ParseError::new(ParseErrorKind::InvalidParameter, line_num, i + 1)
                        .with_context(format!("unexpected character '{c}'")),
                );
            }
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingColon,
                    line_num,
                    line.len(),
                ));
            }
        }
    }
}

/// Parses a parameter value (possibly quoted).
fn parse_param_value(
    chars: &mut Peekable<CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> ParseResult<String> {
    let Some(&(start, first)) = chars.peek() else {
        return Err(ParseError::new(
            ParseErrorKind::MissingColon,
            line_num,
            line.len(),
        ));
    };

    if first != '"' {
        // Unquoted value (ends at ',' ';' or ':')
        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            if c == ',' || c == ';' || c == ':' {
                break;
            }
            end = i + c.len_utf8();
            chars.next();
        }
        return Ok(line[start..end].to_string());
    }

    chars.next(); // opening quote
    let mut value = String::new();

    while let Some((_, c)) = chars.next() {
        match c {
            '"' => return Ok(value),
            // Caret encoding (RFC 6868)
            '^' => match chars.peek().map(|&(_, next)| next) {
                Some('^') => {
                    value.push('^');
                    chars.next();
                }
                Some('n') => {
                    value.push('\n');
                    chars.next();
                }
                Some('\'') => {
                    value.push('"');
                    chars.next();
                }
                _ => value.push('^'),
            },
            other => value.push(other),
        }
    }

    Err(ParseError::new(
        ParseErrorKind::UnclosedQuote,
        line_num,
        start + 1,
    ))
}
