//! Converts EDIF netlists into LISO circuit description files.
//!
//! The conversion runs as a single pass pipeline:
//!
//! 1. [`edif_sexpr::from_str`] parses the file into a tree of [`Sexpr`].
//! 2. [`reduce::strip_cruft`] removes wrapper forms such as `String`,
//!    `rename` and `PortRef`.
//! 3. [`parts::extract_parts`] collects every `Instance` and its properties.
//! 4. [`nets::connect_parts`] records which net every pin is connected to.
//! 5. [`classify::annotate_parts`] turns each part into a LISO command.
//! 6. [`generate::generate_files`] enumerates switch and output states and
//!    renders one `.fil` file per state.

use edif_sexpr::{Dialect, Sexpr};
use thiserror::Error;

pub mod classify;
pub mod convert;
pub mod generate;
pub mod nets;
pub mod parts;
pub mod reduce;
pub mod states;
pub mod value;

pub use classify::{annotate_parts, Roles};
pub use generate::{generate_files, write_files, GeneratorConfig, LisoFile};
pub use nets::{connect_parts, mangle};
pub use parts::{extract_parts, Part, PartMap};
pub use reduce::strip_cruft;

/// The type of an S-expression without the inner data.
///
/// Used in error messages to indicate what type of S-expression was expected.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum SexprKind {
    List,
    Text,
}

/// Errors that can occur while converting a netlist.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum LisoError {
    #[error(transparent)]
    SexprParseError(#[from] edif_sexpr::SexprParseError),
    #[error("Unexpected end of list")]
    UnexpectedEndOfList,
    #[error("Unexpected sexpr type. Expected: `{expected:?}`")]
    UnexpectedSexprType { expected: SexprKind },
    #[error("Non-matching token. Expected: `{expected}`; Found: `{found}`")]
    NonMatchingToken { found: String, expected: String },
    #[error("Malformed instance: {0}")]
    MalformedInstance(String),
    #[error("Malformed net `{0}`")]
    MalformedNet(String),
    #[error("Invalid pin `{pin}` in net `{net}`")]
    InvalidPin { net: String, pin: String },
    #[error("Net `{net}` references unknown part `{part}`")]
    UnknownPart { part: String, net: String },
    #[error("Missing info about part {part}: `{property}`")]
    MissingProperty { part: String, property: String },
    #[error("Unknown Part: {0}")]
    UnknownPartKind(String),
    #[error("No part named `{0}`")]
    NoSuchPart(String),
    #[error("Malformed constraint `{comment}` on switch {switch}")]
    MalformedConstraint { switch: String, comment: String },
}

/// Parses an EDIF netlist and returns its parts with their nets connected.
pub fn parse_netlist(input: &str) -> Result<PartMap, LisoError> {
    parse_netlist_with(input, Dialect::default())
}

/// Like [`parse_netlist`], with a custom S-expression dialect.
pub fn parse_netlist_with(input: &str, dialect: Dialect) -> Result<PartMap, LisoError> {
    let sexpr = edif_sexpr::from_str_with(input, dialect)?;

    let Sexpr::List(_) = sexpr else {
        return Err(LisoError::UnexpectedSexprType {
            expected: SexprKind::List,
        });
    };

    let netlist = strip_cruft(sexpr);
    log::debug!("Reduced netlist tree");

    let parts = extract_parts(&netlist)?;
    log::info!("Extracted {} parts", parts.len());

    connect_parts(&netlist, parts)
}

/// Runs the whole conversion and returns the LISO files to write, named
/// after `base_name`.
pub fn convert(
    input: &str,
    base_name: &str,
    dialect: Dialect,
    config: &GeneratorConfig,
) -> Result<Vec<LisoFile>, LisoError> {
    let mut parts = parse_netlist_with(input, dialect)?;
    let roles = annotate_parts(&mut parts)?;

    generate_files(base_name, &parts, &roles, config)
}
