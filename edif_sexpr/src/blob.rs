//! Binary literals: raw byte strings (`3:abc`) and base64 blobs (`|YWJj|`).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{cut, map, opt},
    error::context,
    multi::many0,
    sequence::{delimited, terminated},
};

use crate::error::{Failure, PResult};
use crate::number::{parse_hex, parse_length};

/// Fails fatally if a declared length does not match the decoded data.
pub(crate) fn verify_length<'a>(
    input: &'a str,
    declared: Option<usize>,
    found: usize,
) -> Result<(), nom::Err<Failure<'a>>> {
    match declared {
        Some(declared) if declared != found => Err(nom::Err::Failure(Failure::length_mismatch(
            input, declared, found,
        ))),
        _ => Ok(()),
    }
}

/// Parses `<decimal>:<bytes>`. The bytes run up to the next whitespace or
/// parenthesis and must number exactly as many as declared.
pub fn parse_raw(input: &str) -> PResult<Vec<u8>> {
    let (rest, declared) = terminated(parse_length, char(':'))(input)?;
    let (rest, data) = take_while(|c: char| !c.is_ascii_whitespace() && c != '(' && c != ')')(rest)?;

    verify_length(input, Some(declared), data.len())?;

    Ok((rest, data.as_bytes().to_vec()))
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='
}

/// Parses an optionally length-prefixed base64 blob. The prefix may be a
/// decimal or a hexadecimal blob. A blob holding only whitespace is empty.
pub fn parse_base64(input: &str) -> PResult<Vec<u8>> {
    let (rest, declared) = opt(alt((
        parse_length,
        map(parse_hex, |value| value as usize),
    )))(input)?;
    let (rest, _) = char('|')(rest)?;
    let (rest, words) = cut(delimited(
        multispace0,
        many0(terminated(take_while1(is_base64_char), multispace0)),
        context("closing `|`", char('|')),
    ))(rest)?;

    let data = STANDARD
        .decode(words.concat())
        .map_err(|_| nom::Err::Failure(Failure::expected(input, "valid base64 data")))?;

    verify_length(input, declared, data.len())?;

    Ok((rest, data))
}
