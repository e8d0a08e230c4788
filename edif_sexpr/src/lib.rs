//! A parser for the S-Expression syntax used by EDIF netlists.
//!
//! The grammar follows the canonical S-expression notation: lists, tokens,
//! decimal and hexadecimal numbers, quoted strings, raw byte strings, base64
//! blobs and `[display]` hints, which are parsed and discarded.
//!
//! ```
//! use edif_sexpr::{from_str, Sexpr};
//!
//! let sexpr = from_str(r#"(Property Value "10k")"#).unwrap();
//! assert_eq!(
//!     sexpr,
//!     Sexpr::list_with_name("Property", [
//!         Some(Sexpr::token("Value")),
//!         Some(Sexpr::string("10k")),
//!     ]),
//! );
//! ```

mod blob;
mod error;
mod number;
mod sexpr;
mod string;

pub use error::SexprParseError;
pub use sexpr::{
    from_str, from_str_with, is_token_char, to_string, Dialect, Sexpr, SexprList, MAX_DEPTH,
};
