use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit0, digit1, multispace0, one_of, satisfy},
    combinator::{cut, map_res, not, opt, peek, recognize},
    error::context,
    multi::many1,
    sequence::{delimited, pair, preceded, terminated, tuple},
};

use crate::error::{Failure, PResult};
use crate::sexpr::is_token_char;

/// `0` or a digit run without a leading zero.
fn unsigned(input: &str) -> PResult<&str> {
    alt((
        tag("0"),
        recognize(pair(satisfy(|c| ('1'..='9').contains(&c)), digit0)),
    ))(input)
}

/// A length prefix as used by raw, base64 and quoted literals.
pub fn parse_length(input: &str) -> PResult<usize> {
    map_res(unsigned, str::parse)(input)
}

/// Parses a decimal integer which is not immediately followed by another
/// token character, so `10k` is left for the token parser.
pub fn parse_integer(input: &str) -> PResult<i64> {
    map_res(
        terminated(
            recognize(tuple((opt(char('-')), unsigned))),
            not(peek(satisfy(is_token_char))),
        ),
        str::parse,
    )(input)
}

/// Parses a real number such as `1.5`, `-2.` or `3.0e-9`.
pub fn parse_real(input: &str) -> PResult<f64> {
    map_res(
        terminated(
            recognize(tuple((
                opt(one_of("+-")),
                digit1,
                char('.'),
                digit0,
                opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
            ))),
            not(peek(satisfy(is_token_char))),
        ),
        str::parse,
    )(input)
}

/// Parses a hexadecimal blob: `#` followed by whitespace separated hex words
/// and a closing `#`. The digits are concatenated into one integer.
pub fn parse_hex(input: &str) -> PResult<i64> {
    let (rest, words) = preceded(
        char('#'),
        cut(terminated(
            many1(delimited(
                multispace0,
                take_while1(|c: char| c.is_ascii_hexdigit()),
                multispace0,
            )),
            context("closing `#`", char('#')),
        )),
    )(input)?;

    let digits = words.concat();

    match i64::from_str_radix(&digits, 16) {
        Ok(value) => Ok((rest, value)),
        Err(_) => Err(nom::Err::Failure(Failure::expected(
            input,
            "hexadecimal value within 64 bits",
        ))),
    }
}
