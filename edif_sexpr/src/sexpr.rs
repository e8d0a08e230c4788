//! EDIF S-Expression Parser

use std::borrow::Cow;
use std::fmt::Display;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1, multispace0},
    combinator::{cut, eof, map, recognize},
    error::context,
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
    Finish,
};

use crate::blob::{parse_base64, parse_raw};
use crate::error::{Failure, PResult, SexprParseError};
use crate::number::{parse_hex, parse_integer, parse_real};
use crate::string::parse_string;

pub type SexprList = Vec<Sexpr>;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value"))]
#[derive(Debug, PartialEq, Clone)]
pub enum Sexpr {
    List(SexprList),
    Integer(i64),
    Real(f64),
    Bytes(Vec<u8>),
    String(String),
    Token(String),
}

impl Display for Sexpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", to_string(self))
    }
}

macro_rules! sexpr_as {
    ($fn_name:ident, $return_type:ty, $variant:ident) => {
        pub fn $fn_name(&self) -> Option<&$return_type> {
            if let Self::$variant(value) = self {
                Some(value)
            } else {
                None
            }
        }
    };
}

macro_rules! sexpr_as_mut {
    ($fn_name:ident, $return_type:ty, $variant:ident) => {
        pub fn $fn_name(&mut self) -> Option<&mut $return_type> {
            if let Self::$variant(value) = self {
                Some(value)
            } else {
                None
            }
        }
    };
}

macro_rules! sexpr_take {
    ($fn_name:ident, $return_type:ty, $variant:ident) => {
        pub fn $fn_name(self) -> Option<$return_type> {
            if let Self::$variant(value) = self {
                Some(value)
            } else {
                None
            }
        }
    };
}

macro_rules! sexpr_construct {
    ($fn_name:ident, $input_type:ty, $variant:ident) => {
        pub fn $fn_name(value: impl Into<$input_type>) -> Self {
            Self::$variant(value.into())
        }
    };
}

impl Sexpr {
    sexpr_as!(as_list, SexprList, List);
    sexpr_as!(as_integer, i64, Integer);
    sexpr_as!(as_real, f64, Real);
    sexpr_as!(as_bytes, Vec<u8>, Bytes);
    sexpr_as!(as_string, String, String);
    sexpr_as!(as_token, String, Token);

    sexpr_as_mut!(as_list_mut, SexprList, List);
    sexpr_as_mut!(as_string_mut, String, String);
    sexpr_as_mut!(as_token_mut, String, Token);

    sexpr_take!(take_list, SexprList, List);
    sexpr_take!(take_bytes, Vec<u8>, Bytes);
    sexpr_take!(take_string, String, String);
    sexpr_take!(take_token, String, Token);

    sexpr_construct!(integer, i64, Integer);
    sexpr_construct!(real, f64, Real);
    sexpr_construct!(bytes, Vec<u8>, Bytes);
    sexpr_construct!(string, String, String);
    sexpr_construct!(token, String, Token);

    /// Takes a list of values and constructs a new [`Sexpr::List`], skipping
    /// every `None`.
    ///
    /// # Example
    ///
    /// ```
    /// use edif_sexpr::Sexpr;
    ///
    /// assert_eq!(
    ///     Sexpr::list([Some(Sexpr::integer(1)), None, Some(Sexpr::token("a"))]),
    ///     Sexpr::List(vec![Sexpr::Integer(1), Sexpr::Token("a".to_string())]),
    /// );
    /// ```
    pub fn list(value: impl Into<Vec<Option<Sexpr>>>) -> Self {
        Self::List(value.into().into_iter().flatten().collect::<Vec<_>>())
    }

    /// Works the same way as [`Sexpr::list`], but puts the given name
    /// as a [`Sexpr::Token`] in the first position of the list.
    ///
    /// # Example
    ///
    /// ```
    /// use edif_sexpr::Sexpr;
    ///
    /// assert_eq!(
    ///     Sexpr::list_with_name("Property", [
    ///         Some(Sexpr::token("Value")),
    ///         Some(Sexpr::string("10k")),
    ///     ]),
    ///     Sexpr::List(vec![
    ///         Sexpr::Token("Property".to_string()),
    ///         Sexpr::Token("Value".to_string()),
    ///         Sexpr::String("10k".to_string()),
    ///     ]),
    /// );
    /// ```
    pub fn list_with_name(name: impl Into<String>, values: impl Into<Vec<Option<Sexpr>>>) -> Self {
        let mut list = vec![Some(Self::token(name.into()))];
        list.extend(values.into());
        Self::list(list)
    }

    /// Returns the value as text if it is an atom that has a textual
    /// reading: tokens, quoted strings, numbers and UTF-8 byte strings.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Token(s) | Self::String(s) => Some(Cow::Borrowed(s.as_str())),
            Self::Integer(i) => Some(Cow::Owned(i.to_string())),
            Self::Real(r) => Some(Cow::Owned(r.to_string())),
            Self::Bytes(bytes) => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            Self::List(_) => None,
        }
    }

    /// Returns true if this is a token or quoted string equal to `name`.
    pub fn is_token(&self, name: &str) -> bool {
        matches!(self, Self::Token(s) | Self::String(s) if s == name)
    }
}

/// Optional grammar features.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Accept real numbers such as `1.5e3`. Off by default, in which case
    /// they are read as tokens.
    pub reals: bool,
}

/// Lists nested deeper than this are rejected with a syntax error. EDIF
/// netlists rarely go past a few dozen levels.
pub const MAX_DEPTH: usize = 128;

/// Characters allowed in a bare token.
pub fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-./_:*+=!<>".contains(c)
}

pub fn from_str(input: &str) -> Result<Sexpr, SexprParseError> {
    from_str_with(input, Dialect::default())
}

pub fn from_str_with(input: &str, dialect: Dialect) -> Result<Sexpr, SexprParseError> {
    let root = delimited(
        multispace0,
        |i| parse_sexpr(i, dialect, 0),
        pair(multispace0, context("end of input", eof)),
    )(input)
    .finish();

    match root {
        Ok((_, sexpr)) => Ok(sexpr),
        Err(failure) => Err(SexprParseError::from_failure(input, failure)),
    }
}

pub fn to_string(sexpr: &Sexpr) -> String {
    to_string_recursive(sexpr, 0)
}

fn to_string_recursive(sexpr: &Sexpr, depth: usize) -> String {
    let mut result = String::new();

    match sexpr {
        Sexpr::List(list) => {
            if depth != 0 {
                result += "\n";
            }

            result.push_str(&" ".repeat(depth * 2));

            result += "(";

            for (i, attribute) in list.iter().enumerate() {
                result += &to_string_recursive(attribute, depth + 1);

                if i != list.len() - 1 {
                    result += " ";
                }
            }

            result += ")";
        }
        Sexpr::Integer(integer) => {
            result += &integer.to_string();
        }
        Sexpr::Real(real) => {
            let real = real.to_string();
            result += &real;
            if !real.contains('.') {
                result += ".0";
            }
        }
        Sexpr::Bytes(bytes) => {
            result += "|";
            result += &STANDARD.encode(bytes);
            result += "|";
        }
        Sexpr::String(string) => {
            result += &quote(string);
        }
        Sexpr::Token(token) => {
            result += token;
        }
    }

    result
}

fn quote(string: &str) -> String {
    let mut quoted = String::with_capacity(string.len() + 2);
    quoted.push('"');

    for c in string.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }

    quoted.push('"');
    quoted
}

fn parse_sexpr(input: &str, dialect: Dialect, depth: usize) -> PResult<Sexpr> {
    context(
        "s-expression",
        alt((
            |i| parse_sexpr_list(i, dialect, depth),
            |i| parse_display_annotated(i, dialect),
            |i| parse_simple(i, dialect),
        )),
    )(input)
}

fn parse_sexpr_list(input: &str, dialect: Dialect, depth: usize) -> PResult<Sexpr> {
    // Parse opening tag
    let (rest, _) = char('(')(input)?;

    if depth >= MAX_DEPTH {
        return Err(nom::Err::Failure(Failure::expected(input, "shallower nesting")));
    }

    // Parse list children, then the closing tag
    let (input, children) = cut(terminated(
        many0(preceded(multispace0, |i| parse_sexpr(i, dialect, depth + 1))),
        preceded(multispace0, context("closing parenthesis", char(')'))),
    ))(rest)?;

    Ok((input, Sexpr::List(children)))
}

/// `[hint] value`: the display hint is parsed and thrown away.
fn parse_display_annotated(input: &str, dialect: Dialect) -> PResult<Sexpr> {
    let (input, _) = delimited(
        pair(char('['), multispace0),
        |i| parse_simple(i, dialect),
        pair(multispace0, context("closing bracket", char(']'))),
    )(input)?;

    preceded(multispace0, |i| parse_simple(i, dialect))(input)
}

fn parse_simple(input: &str, dialect: Dialect) -> PResult<Sexpr> {
    alt((
        map(parse_raw, Sexpr::Bytes),
        map(parse_base64, Sexpr::Bytes),
        map(parse_string, Sexpr::String),
        map(parse_hex, Sexpr::Integer),
        parse_pin,
        |i| parse_number(i, dialect),
        parse_token,
    ))(input)
}

/// `&12` style pin references.
fn parse_pin(input: &str) -> PResult<Sexpr> {
    map(recognize(pair(char('&'), digit1)), Sexpr::token)(input)
}

fn parse_number(input: &str, dialect: Dialect) -> PResult<Sexpr> {
    if dialect.reals {
        if let Ok((rest, real)) = parse_real(input) {
            return Ok((rest, Sexpr::Real(real)));
        }
    }

    map(parse_integer, Sexpr::Integer)(input)
}

fn parse_token(input: &str) -> PResult<Sexpr> {
    map(take_while1(is_token_char), Sexpr::token)(input)
}
