//! Parts (`Instance` forms) of a reduced netlist.
//!
//! ```text
//! (Instance partName
//!   (Property propName propValue)
//!   ...
//! )
//! ```
//!
//! Anything else inside an instance is ignored.

use std::collections::BTreeMap;

use edif_sexpr::Sexpr;
use indexmap::IndexMap;

use crate::{
    convert::{visit_lists, FromSexpr, Parser, SexprListExt},
    reduce::Tag,
    LisoError,
};

/// Parts indexed by name, in the order they first appear in the netlist.
pub type PartMap = IndexMap<String, Part>;

/// One placed component.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Part {
    /// Every `Property` declared on the instance.
    pub properties: IndexMap<String, String>,
    /// Net names by pin number, filled in by [`connect_parts`](crate::connect_parts).
    pub nets: BTreeMap<u32, String>,
    /// The LISO command generated for this part, if any.
    pub command: Option<String>,
}

impl Part {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn net(&self, pin: u32) -> Option<&str> {
        self.nets.get(&pin).map(String::as_str)
    }
}

#[derive(Debug, PartialEq, Clone)]
struct Instance {
    name: String,
    properties: Vec<(String, String)>,
}

impl<'a> FromSexpr<'a> for Instance {
    fn from_sexpr(mut parser: Parser<'a>) -> Result<Self, LisoError> {
        parser.expect_token_matching("Instance")?;

        let name = parser
            .expect_text()
            .map_err(|e| LisoError::MalformedInstance(e.to_string()))?
            .into_owned();

        let mut properties = Vec::new();

        for item in parser.remaining_lists() {
            if item.tag() != Tag::Property || item.len() < 3 {
                continue;
            }

            match (item[1].as_text(), item[2].as_text()) {
                (Some(key), Some(value)) => {
                    properties.push((key.into_owned(), value.into_owned()));
                }
                _ => log::debug!("Skipping non-text property {} on {name}", item[1]),
            }
        }

        Ok(Self { name, properties })
    }
}

/// Builds a map of all the parts in the netlist, indexed by their names.
///
/// Instances are searched for at any depth. When two instances share a name
/// the later one replaces the earlier one.
pub fn extract_parts(netlist: &Sexpr) -> Result<PartMap, LisoError> {
    let mut parts = PartMap::new();

    visit_lists(netlist, |list| {
        if list.tag() != Tag::Instance {
            return Ok(false);
        }

        let Instance { name, properties } = Instance::from_sexpr(Parser::new(list))?;

        let part = Part {
            properties: properties.into_iter().collect(),
            ..Part::default()
        };

        if parts.insert(name.clone(), part).is_some() {
            log::debug!("Instance {name} is declared twice, keeping the last one");
        }

        Ok(true)
    })?;

    Ok(parts)
}
