//! Assigns a LISO command to every part.
//!
//! Parts are recognised by their `Simulation`, `Part` or `Description`
//! property:
//!
//! | property                                       | LISO command                       |
//! |------------------------------------------------|------------------------------------|
//! | `Simulation` `RESISTOR`, `CAP`, `INDUCTOR`     | `R`, `C` or `L name value n1 n2`   |
//! | `Part` `Op Amp`                                | `OP name type n+ n- nOut`          |
//! | `Description` `Multicell Battery`              | input: `name [n1] [n2] impedance`  |
//! | `Description` `Tie Point`                      | output, chosen by the part's name  |
//! | `Description` `Single-Pole, Single-Throw Switch` | none, rendered per state         |

use crate::{value::normalize_value, LisoError, Part, PartMap};

/// What a part contributes to the generated files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartRole {
    /// A circuit element or input, written to every file.
    Element,
    /// An output. Each file selects one output when there are several.
    Output,
    /// A switch, written as a resistor whose value depends on the state.
    Switch,
}

/// Names of the parts that need per-state handling, in netlist order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Roles {
    pub outputs: Vec<String>,
    pub switches: Vec<String>,
}

fn property<'p>(name: &str, part: &'p Part, property: &str) -> Result<&'p str, LisoError> {
    part.property(property).ok_or_else(|| LisoError::MissingProperty {
        part: name.to_string(),
        property: property.to_string(),
    })
}

fn pin<'p>(name: &str, part: &'p Part, pin: u32) -> Result<&'p str, LisoError> {
    part.net(pin).ok_or_else(|| LisoError::MissingProperty {
        part: name.to_string(),
        property: format!("pin {pin}"),
    })
}

/// Returns the two nets of a two-terminal part.
pub(crate) fn terminals<'p>(
    name: &str,
    part: &'p Part,
) -> Result<(&'p str, &'p str), LisoError> {
    Ok((pin(name, part, 1)?, pin(name, part, 2)?))
}

fn two_terminal(kind: char, name: &str, part: &Part) -> Result<String, LisoError> {
    let value = property(name, part, "Value")?;
    let (n1, n2) = terminals(name, part)?;

    Ok(format!("{kind} {name} {value} {n1} {n2}\n"))
}

fn output(name: &str, part: &Part) -> Result<String, LisoError> {
    let upper = name.to_uppercase();

    let command = if upper.starts_with("IOUTPUT") {
        format!("IOUTPUT {}\n", property(name, part, "Comment")?)
    } else if upper.starts_with("UOUTPUT") {
        let net = pin(name, part, 1)?;
        format!("UOUTPUT {net}{}\n", property(name, part, "Comment")?)
    } else if upper.starts_with("NOISE") {
        let comment = property(name, part, "Comment")?;
        match part.net(1) {
            Some(net) => format!("NOISE {net} {comment}\nNOISY ALL\n"),
            None => format!("NOISE {comment}\nNOISY ALL\n"),
        }
    } else {
        log::debug!("Output {name} has no recognised prefix");
        String::new()
    };

    Ok(command)
}

/// Works out the role of a part and the command it contributes on its own.
///
/// Switches have no command of their own.
pub fn classify_part(name: &str, part: &Part) -> Result<(PartRole, Option<String>), LisoError> {
    let simulation = part.property("Simulation");
    let description = part.property("Description");

    let classified = match simulation {
        Some("RESISTOR") => (PartRole::Element, Some(two_terminal('R', name, part)?)),
        Some("CAP") => (PartRole::Element, Some(two_terminal('C', name, part)?)),
        Some("INDUCTOR") => (PartRole::Element, Some(two_terminal('L', name, part)?)),
        _ if part.property("Part") == Some("Op Amp") => {
            let kind = property(name, part, "Comment")?;
            let plus = pin(name, part, 3)?;
            let minus = pin(name, part, 2)?;
            let out = pin(name, part, 6)?;

            let command = format!("OP {name} {kind} {plus} {minus} {out}\n");
            (PartRole::Element, Some(command))
        }
        _ if description == Some("Multicell Battery") => {
            let impedance = property(name, part, "Comment")?;

            let words = [Some(name), part.net(1), part.net(2)]
                .into_iter()
                .flatten()
                .chain(Some(impedance).filter(|s| !s.is_empty()))
                .collect::<Vec<_>>();

            (PartRole::Element, Some(words.join(" ") + "\n"))
        }
        _ if description == Some("Tie Point") => (PartRole::Output, Some(output(name, part)?)),
        _ if description == Some("Single-Pole, Single-Throw Switch") => (PartRole::Switch, None),
        _ => return Err(LisoError::UnknownPartKind(name.to_string())),
    };

    Ok(classified)
}

/// Normalises part values, stores the LISO command on every part and returns
/// the outputs and switches.
///
/// `Value` is normalised in place. A `VALUE` property takes precedence and is
/// copied, normalised, into `Value`.
pub fn annotate_parts(parts: &mut PartMap) -> Result<Roles, LisoError> {
    let mut roles = Roles::default();

    for (name, part) in parts.iter_mut() {
        if let Some(value) = part.properties.get_mut("Value") {
            *value = normalize_value(value);
        }

        if let Some(value) = part.properties.get("VALUE") {
            let value = normalize_value(value);
            part.properties.insert("Value".to_string(), value);
        }

        let (role, command) = classify_part(name, part).inspect_err(|e| {
            if let LisoError::MissingProperty { property, .. } = e {
                log::error!("Missing info about part {name}: {property}");
            }
        })?;

        match role {
            PartRole::Element => {}
            PartRole::Output => roles.outputs.push(name.clone()),
            PartRole::Switch => roles.switches.push(name.clone()),
        }

        part.command = command;
    }

    log::debug!(
        "Found {} outputs and {} switches",
        roles.outputs.len(),
        roles.switches.len()
    );

    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(properties: &[(&str, &str)], nets: &[(u32, &str)]) -> Part {
        Part {
            properties: properties
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            nets: nets.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            command: None,
        }
    }

    fn command(name: &str, part: &Part) -> String {
        classify_part(name, part).unwrap().1.unwrap()
    }

    #[test]
    fn test_two_terminal_elements() {
        let nets = [(1, "a"), (2, "b")];

        assert_eq!(
            command("R1", &part(&[("Simulation", "RESISTOR"), ("Value", "10k")], &nets)),
            "R R1 10k a b\n"
        );
        assert_eq!(
            command("C1", &part(&[("Simulation", "CAP"), ("Value", "1n")], &nets)),
            "C C1 1n a b\n"
        );
        assert_eq!(
            command("L1", &part(&[("Simulation", "INDUCTOR"), ("Value", "1m")], &nets)),
            "L L1 1m a b\n"
        );
    }

    #[test]
    fn test_op_amp() {
        let op = part(
            &[("Part", "Op Amp"), ("Comment", "OP27")],
            &[(2, "inm"), (3, "inp"), (6, "out"), (7, "vcc")],
        );

        assert_eq!(command("U1", &op), "OP U1 OP27 inp inm out\n");
    }

    #[test]
    fn test_battery() {
        let full = part(
            &[("Description", "Multicell Battery"), ("Comment", "50")],
            &[(1, "in"), (2, "gnd")],
        );
        assert_eq!(command("UINPUT", &full), "UINPUT in gnd 50\n");

        let bare = part(&[("Description", "Multicell Battery"), ("Comment", "")], &[(1, "in")]);
        assert_eq!(command("UINPUT", &bare), "UINPUT in\n");

        let missing = part(&[("Description", "Multicell Battery")], &[(1, "in")]);
        assert_eq!(
            classify_part("UINPUT", &missing),
            Err(LisoError::MissingProperty {
                part: "UINPUT".to_string(),
                property: "Comment".to_string(),
            })
        );
    }

    #[test]
    fn test_outputs() {
        let tie = |comment, nets: &[(u32, &str)]| {
            part(&[("Description", "Tie Point"), ("Comment", comment)], nets)
        };

        assert_eq!(
            classify_part("IOutput1", &tie("R1", &[])).unwrap(),
            (PartRole::Output, Some("IOUTPUT R1\n".to_string()))
        );
        assert_eq!(
            command("UOUTPUT", &tie(":db:deg", &[(1, "out")])),
            "UOUTPUT out:db:deg\n"
        );
        assert_eq!(command("noise1", &tie("U1 R1", &[])), "NOISE U1 R1\nNOISY ALL\n");
        assert_eq!(
            command("NOISE2", &tie("U1", &[(1, "out")])),
            "NOISE out U1\nNOISY ALL\n"
        );
        assert_eq!(command("TP1", &tie("x", &[])), "");
    }

    #[test]
    fn test_switch_and_unknown() {
        let switch = part(&[("Description", "Single-Pole, Single-Throw Switch")], &[]);
        assert_eq!(classify_part("S1", &switch), Ok((PartRole::Switch, None)));

        let unknown = part(&[("Description", "Diode")], &[]);
        assert_eq!(
            classify_part("D1", &unknown),
            Err(LisoError::UnknownPartKind("D1".to_string()))
        );
    }

    #[test]
    fn test_missing_pin() {
        let r = part(&[("Simulation", "RESISTOR"), ("Value", "1k")], &[(1, "a")]);

        assert_eq!(
            classify_part("R1", &r),
            Err(LisoError::MissingProperty {
                part: "R1".to_string(),
                property: "pin 2".to_string(),
            })
        );
    }

    #[test]
    fn test_annotate_parts() {
        let mut parts = PartMap::new();
        let nets = [(1, "a"), (2, "b")];
        parts.insert(
            "R1".to_string(),
            part(&[("Simulation", "RESISTOR"), ("Value", "4K7")], &nets),
        );
        parts.insert(
            "C1".to_string(),
            part(&[("Simulation", "CAP"), ("Value", "x"), ("VALUE", "100 nF")], &nets),
        );
        parts.insert(
            "S1".to_string(),
            part(&[("Description", "Single-Pole, Single-Throw Switch")], &nets),
        );
        parts.insert(
            "UOUTPUT1".to_string(),
            part(&[("Description", "Tie Point"), ("Comment", "")], &nets),
        );

        let roles = annotate_parts(&mut parts).unwrap();

        assert_eq!(roles.outputs, ["UOUTPUT1"]);
        assert_eq!(roles.switches, ["S1"]);
        assert_eq!(parts["R1"].property("Value"), Some("4.7k"));
        assert_eq!(parts["R1"].command.as_deref(), Some("R R1 4.7k a b\n"));
        assert_eq!(parts["C1"].command.as_deref(), Some("C C1 100n a b\n"));
        assert_eq!(parts["S1"].command, None);
        assert_eq!(parts["UOUTPUT1"].command.as_deref(), Some("UOUTPUT a\n"));
    }
}
