//! Content line folding for iCalendar (RFC 5545 §3.1).

/// Maximum line length in octets (not including CRLF).
const MAX_LINE_OCTETS: usize = 75;

/// Folds a content line to comply with the 75-octet limit and terminates it
/// with CRLF.
///
/// Continuation lines start with a single space, which counts toward their
/// limit. Multi-byte characters are never split.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return format!("{line}\r\n");
    }

    let mut result = String::with_capacity(line.len() + (line.len() / MAX_LINE_OCTETS + 1) * 3);
    let mut rest = line;
    let mut first_line = true;

    while !rest.is_empty() {
        let max_len = if first_line {
            MAX_LINE_OCTETS
        } else {
            MAX_LINE_OCTETS - 1
        };

        let mut end = rest.len().min(max_len);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // A single character wider than the limit; emit it whole.
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }

        if !first_line {
            result.push(' ');
        }
        let (segment, tail) = rest.split_at(end);
        result.push_str(segment);
        result.push_str("\r\n");

        rest = tail;
        first_line = false;
    }

    result
}
