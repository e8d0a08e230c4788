//! Switch positions and output choices, one combination per generated file.

use indexmap::IndexMap;
use itertools::Itertools;

use crate::{LisoError, PartMap};

/// One choice made by a state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    Switch { name: String, closed: bool },
    Output(String),
}

/// Selections in the order they appear in file names and file contents.
pub type State = Vec<Selection>;

/// Which switches are enumerated and which ones follow another switch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SwitchPlan {
    /// Switches that are opened and closed independently.
    pub free: Vec<String>,
    /// Constrained switches, keyed by the switch they follow.
    pub followers: IndexMap<String, Vec<String>>,
}

impl SwitchPlan {
    pub fn followers_of(&self, leader: &str) -> &[String] {
        self.followers
            .get(leader)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Sorts switches into free and constrained ones.
///
/// A switch whose `Comment` starts with `CONSTRAINT` (in any case) is set
/// like the switch named after the `=` sign, e.g. `CONSTRAINT = S1`.
pub fn plan_switches(parts: &PartMap, switches: &[String]) -> Result<SwitchPlan, LisoError> {
    let mut plan = SwitchPlan::default();

    for name in switches {
        let comment = parts
            .get(name)
            .and_then(|part| part.property("Comment"))
            .filter(|comment| comment.to_uppercase().starts_with("CONSTRAINT"));

        let Some(comment) = comment else {
            plan.free.push(name.clone());
            continue;
        };

        let leader = comment
            .split('=')
            .nth(1)
            .ok_or_else(|| LisoError::MalformedConstraint {
                switch: name.clone(),
                comment: comment.to_string(),
            })?
            .trim();

        log::debug!("Switch {name} follows {leader}");

        plan.followers
            .entry(leader.to_string())
            .or_default()
            .push(name.clone());
    }

    for leader in plan.followers.keys() {
        if !plan.free.contains(leader) {
            log::warn!("Switches constrained to follow {leader} will not be set");
        }
    }

    Ok(plan)
}

/// Enumerates every combination of free switch positions and outputs.
///
/// Each free switch contributes an open and a closed position, and all the
/// outputs together contribute one choice of output. Without any free switch
/// or output there is nothing to enumerate and no state is returned.
pub fn enumerate_states(plan: &SwitchPlan, outputs: &[String]) -> Vec<State> {
    let mut dimensions: Vec<Vec<Selection>> = plan
        .free
        .iter()
        .map(|name| {
            [false, true]
                .into_iter()
                .map(|closed| Selection::Switch {
                    name: name.clone(),
                    closed,
                })
                .collect()
        })
        .collect();

    if !outputs.is_empty() {
        dimensions.push(outputs.iter().cloned().map(Selection::Output).collect());
    }

    if dimensions.is_empty() {
        return Vec::new();
    }

    dimensions.into_iter().multi_cartesian_product().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Part;

    fn switch(comment: Option<&str>) -> Part {
        let mut part = Part::default();
        part.properties.insert(
            "Description".to_string(),
            "Single-Pole, Single-Throw Switch".to_string(),
        );
        if let Some(comment) = comment {
            part.properties.insert("Comment".to_string(), comment.to_string());
        }
        part
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn open(name: &str) -> Selection {
        Selection::Switch {
            name: name.to_string(),
            closed: false,
        }
    }

    fn closed(name: &str) -> Selection {
        Selection::Switch {
            name: name.to_string(),
            closed: true,
        }
    }

    fn output(name: &str) -> Selection {
        Selection::Output(name.to_string())
    }

    #[test]
    fn test_plan_switches() {
        let mut parts = PartMap::new();
        parts.insert("S1".to_string(), switch(None));
        parts.insert("S2".to_string(), switch(Some("constraint = S1")));
        parts.insert("S3".to_string(), switch(Some("CONSTRAINT=S1")));
        parts.insert("S4".to_string(), switch(Some("normally open")));

        let plan = plan_switches(&parts, &names(&["S1", "S2", "S3", "S4"])).unwrap();

        assert_eq!(plan.free, ["S1", "S4"]);
        assert_eq!(plan.followers_of("S1"), ["S2", "S3"]);
        assert!(plan.followers_of("S4").is_empty());
    }

    #[test]
    fn test_malformed_constraint() {
        let mut parts = PartMap::new();
        parts.insert("S1".to_string(), switch(Some("Constraint S2")));

        assert_eq!(
            plan_switches(&parts, &names(&["S1"])),
            Err(LisoError::MalformedConstraint {
                switch: "S1".to_string(),
                comment: "Constraint S2".to_string(),
            })
        );
    }

    #[test]
    fn test_no_states() {
        assert!(enumerate_states(&SwitchPlan::default(), &[]).is_empty());
    }

    #[test]
    fn test_outputs_only() {
        let states = enumerate_states(&SwitchPlan::default(), &names(&["A", "B"]));

        assert_eq!(states, [vec![output("A")], vec![output("B")]]);
    }

    #[test]
    fn test_switches_and_outputs() {
        let plan = SwitchPlan {
            free: names(&["S1", "S2"]),
            followers: IndexMap::new(),
        };

        let states = enumerate_states(&plan, &names(&["A", "B"]));

        assert_eq!(states.len(), 8);
        assert_eq!(states[0], [open("S1"), open("S2"), output("A")]);
        assert_eq!(states[1], [open("S1"), open("S2"), output("B")]);
        assert_eq!(states[2], [open("S1"), closed("S2"), output("A")]);
        assert_eq!(states[7], [closed("S1"), closed("S2"), output("B")]);
    }

    #[test]
    fn test_single_switch_without_outputs() {
        let plan = SwitchPlan {
            free: names(&["S1"]),
            followers: IndexMap::new(),
        };

        assert_eq!(
            enumerate_states(&plan, &[]),
            [vec![open("S1")], vec![closed("S1")]]
        );
    }
}
