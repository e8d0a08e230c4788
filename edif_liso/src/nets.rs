//! Net connections of a reduced netlist.
//!
//! Once the `Joined`, `PortRef` and `InstanceRef` wrappers are gone a net
//! reads:
//!
//! ```text
//! (Net netName
//!   (
//!     (&pinNum partName)
//!     ...
//!   )
//! )
//! ```

use std::borrow::Cow;

use edif_sexpr::Sexpr;

use crate::{
    convert::{visit_lists, FromSexpr, Parser, SexprListExt},
    reduce::Tag,
    LisoError, PartMap,
};

/// Net names this long or longer are replaced by a hash.
const MAX_NET_NAME_LEN: usize = 15;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Shortens excessively long net names.
///
/// Names shorter than 15 characters are returned unchanged. Longer ones
/// become `n` followed by the decimal 32-bit FNV-1a hash of the name, which is
/// the same on every run and every platform.
///
/// ```
/// use edif_liso::mangle;
///
/// assert_eq!(mangle("VOUT"), "VOUT");
/// assert!(mangle("LongNetNameExceedingFifteenChars").starts_with('n'));
/// ```
pub fn mangle(name: &str) -> Cow<'_, str> {
    if name.chars().count() < MAX_NET_NAME_LEN {
        return Cow::Borrowed(name);
    }

    Cow::Owned(format!("n{}", fnv1a(name.as_bytes())))
}

#[derive(Debug, PartialEq, Clone)]
struct Connection<'a> {
    pin: u32,
    part: Cow<'a, str>,
}

#[derive(Debug, PartialEq, Clone)]
struct Net<'a> {
    name: Cow<'a, str>,
    connections: Vec<Connection<'a>>,
}

/// Parses the number of a pin reference such as `&12`.
fn parse_pin(pin: &str) -> Option<u32> {
    let mut chars = pin.chars();
    let sigil = chars.next()?;
    let digits = chars.as_str();

    if sigil.is_ascii_digit() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    digits.parse().ok()
}

impl<'a> FromSexpr<'a> for Net<'a> {
    fn from_sexpr(mut parser: Parser<'a>) -> Result<Self, LisoError> {
        parser.expect_token_matching("Net")?;

        let name = parser
            .expect_text()
            .map_err(|_| LisoError::MalformedNet(String::from("<unnamed>")))?;

        let malformed = || LisoError::MalformedNet(name.to_string());

        let nodes = parser.expect_list().map_err(|_| malformed())?;

        let connections = nodes
            .remaining_lists()
            .map(|node| -> Result<Connection<'a>, LisoError> {
                let mut node = Parser::new(node);

                let pin = node.expect_text().map_err(|_| malformed())?;
                let part = node.expect_text().map_err(|_| malformed())?;

                let pin = parse_pin(&pin).ok_or_else(|| LisoError::InvalidPin {
                    net: name.to_string(),
                    pin: pin.to_string(),
                })?;

                Ok(Connection { pin, part })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { name, connections })
    }
}

/// Records, for every part, which net each of its pins is connected to.
///
/// Nets are searched for at any depth. A net that references a part missing
/// from `parts` is an error.
pub fn connect_parts(netlist: &Sexpr, mut parts: PartMap) -> Result<PartMap, LisoError> {
    let mut count = 0usize;

    visit_lists(netlist, |list| {
        if list.tag() != Tag::Net {
            return Ok(false);
        }

        let net = Net::from_sexpr(Parser::new(list))?;
        let mangled = mangle(&net.name);

        if mangled != net.name {
            log::debug!("Net {} renamed to {mangled}", net.name);
        }

        for Connection { pin, part } in net.connections {
            let Some(entry) = parts.get_mut(part.as_ref()) else {
                return Err(LisoError::UnknownPart {
                    part: part.into_owned(),
                    net: net.name.to_string(),
                });
            };

            entry.nets.insert(pin, mangled.clone().into_owned());
        }

        count += 1;
        Ok(true)
    })?;

    log::info!("Connected {count} nets");

    Ok(parts)
}
