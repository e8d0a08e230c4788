//! Parser for quoted strings, optionally prefixed with their length.
//!
//! - Enclosed by double quotes
//! - Can contain any raw unescaped code point besides \ and "
//! - Matches the escape sequences \b, \t, \v, \n, \f, \r, \", \', \\ and \/
//! - \ooo (three octal digits) and \xhh (two hex digits) name a single byte
//! - a backslash directly followed by a line break removes both
//! - any other backslash is kept together with the character after it

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_while_m_n};
use nom::character::complete::{anychar, char};
use nom::combinator::{cut, map, map_opt, opt, recognize, value, verify};
use nom::error::context;
use nom::multi::fold_many0;
use nom::sequence::{preceded, terminated};

use crate::blob::verify_length;
use crate::error::PResult;
use crate::number::parse_length;

fn byte_char(digits: &str, radix: u32) -> Option<char> {
    u8::from_str_radix(digits, radix).ok().map(char::from)
}

/// Parse an escaped character: \n, \t, \x41, \101 etc.
fn parse_escaped_char(input: &str) -> PResult<char> {
    preceded(
        char('\\'),
        alt((
            value('\u{08}', char('b')),
            value('\t', char('t')),
            value('\u{0B}', char('v')),
            value('\n', char('n')),
            value('\u{0C}', char('f')),
            value('\r', char('r')),
            value('"', char('"')),
            value('\'', char('\'')),
            value('\\', char('\\')),
            value('/', char('/')),
            map_opt(
                preceded(char('x'), take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit())),
                |digits| byte_char(digits, 16),
            ),
            map_opt(
                take_while_m_n(3, 3, |c: char| ('0'..='7').contains(&c)),
                |digits| byte_char(digits, 8),
            ),
        )),
    )(input)
}

/// A backslash followed by a line break, which is dropped from the value.
fn parse_line_continuation(input: &str) -> PResult<&str> {
    preceded(char('\\'), alt((tag("\r\n"), tag("\n"), tag("\r"))))(input)
}

/// A backslash before a character with no escape meaning, e.g. `C:\work`.
fn parse_unknown_escape(input: &str) -> PResult<&str> {
    recognize(preceded(char('\\'), anychar))(input)
}

/// Parse a non-empty block of text that doesn't include \ or "
fn parse_literal(input: &str) -> PResult<&str> {
    verify(is_not("\"\\"), |s: &str| !s.is_empty())(input)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringFragment<'a> {
    Literal(&'a str),
    EscapedChar(char),
    LineContinuation,
}

fn parse_fragment(input: &str) -> PResult<StringFragment> {
    alt((
        map(parse_literal, StringFragment::Literal),
        map(parse_escaped_char, StringFragment::EscapedChar),
        value(StringFragment::LineContinuation, parse_line_continuation),
        map(parse_unknown_escape, StringFragment::Literal),
    ))(input)
}

/// Parse the body of a quoted string, including both quotes.
fn parse_quoted(input: &str) -> PResult<String> {
    let build_string = fold_many0(parse_fragment, String::new, |mut string, fragment| {
        match fragment {
            StringFragment::Literal(s) => string.push_str(s),
            StringFragment::EscapedChar(c) => string.push(c),
            StringFragment::LineContinuation => {}
        }
        string
    });

    preceded(
        char('"'),
        cut(terminated(build_string, context("closing quote", char('"')))),
    )(input)
}

/// Parse a quoted string with an optional decimal length prefix. The length
/// counts characters of the unescaped value.
pub fn parse_string(input: &str) -> PResult<String> {
    let (rest, declared) = opt(parse_length)(input)?;
    let (rest, string) = parse_quoted(rest)?;

    verify_length(input, declared, string.chars().count())?;

    Ok((rest, string))
}
