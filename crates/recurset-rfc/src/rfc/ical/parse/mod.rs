//! iCalendar parsing primitives (RFC 5545).
//!
//! - Lexer: content line unfolding and tokenization
//! - Parser: content lines into component trees
//! - Values: DATE and DATE-TIME value parsing

mod error;
mod lexer;
mod parser;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{parse_content_line, split_lines};
pub use parser::{parse, parse_calendar, parse_into};
pub use values::{parse_date, parse_date_or_datetime, parse_datetime, parse_time};
