//! Renders annotated parts into LISO `.fil` files.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::Local;

use crate::{
    classify::terminals,
    states::{enumerate_states, plan_switches, Selection, State, SwitchPlan},
    LisoError, Part, PartMap, Roles,
};

/// Settings shared by every generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Argument of the `FREQ` command.
    pub frequency: String,
    /// Comment line written at the top of every file.
    pub header: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            frequency: "LOG 0.1 100k 300".to_string(),
            header: None,
        }
    }
}

impl GeneratorConfig {
    /// Adds a header recording the current local time and how the files were
    /// generated.
    pub fn with_autogenerated_header(mut self, invocation: &str) -> Self {
        let now = Local::now().format("%Y-%m-%d %H:%M");
        self.header = Some(format!("# Autogenerated on {now} by {invocation}"));
        self
    }
}

/// A generated file, not yet written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LisoFile {
    pub file_name: String,
    pub contents: String,
}

fn lookup<'p>(parts: &'p PartMap, name: &str) -> Result<&'p Part, LisoError> {
    parts
        .get(name)
        .ok_or_else(|| LisoError::NoSuchPart(name.to_string()))
}

/// Renders a switch as a resistor that is either shorted or practically open.
fn switch_line(parts: &PartMap, name: &str, closed: bool) -> Result<String, LisoError> {
    let (n1, n2) = terminals(name, lookup(parts, name)?)?;
    let resistance = if closed { "0" } else { "999M" };

    Ok(format!("R {name} {resistance} {n1} {n2}\n"))
}

fn file_name(base: &str, state: &State) -> String {
    let mut name = base.to_string();

    for selection in state {
        match selection {
            Selection::Switch { name: switch, closed } => {
                name += &format!("_{switch}-{}", u8::from(*closed));
            }
            Selection::Output(output) => {
                name.push('_');
                name += output;
            }
        }
    }

    name + ".fil"
}

fn render_state(
    parts: &PartMap,
    plan: &SwitchPlan,
    common: &str,
    state: &State,
) -> Result<String, LisoError> {
    let mut contents = common.to_string();

    for selection in state {
        match selection {
            Selection::Switch { name, closed } => {
                contents += &switch_line(parts, name, *closed)?;

                for follower in plan.followers_of(name) {
                    contents += &switch_line(parts, follower, *closed)?;
                }
            }
            Selection::Output(name) => {
                contents += lookup(parts, name)?.command.as_deref().unwrap_or_default();
            }
        }
    }

    Ok(contents)
}

/// Generates the LISO files for a netlist whose parts have been annotated.
///
/// All files start with the header, the `FREQ` command and the commands of
/// every ordinary part. When switches or several outputs make more than one
/// state, each state gets its own file named after its selections, e.g.
/// `filter_S1-1_UOUTPUT.fil`. Otherwise a single `<base>.fil` holds every
/// output.
pub fn generate_files(
    base: &str,
    parts: &PartMap,
    roles: &Roles,
    config: &GeneratorConfig,
) -> Result<Vec<LisoFile>, LisoError> {
    let plan = plan_switches(parts, &roles.switches)?;

    let mut common = String::new();
    if let Some(header) = &config.header {
        common += header;
        common.push('\n');
    }
    common += &format!("FREQ {}\n", config.frequency);

    for (name, part) in parts {
        if roles.outputs.contains(name) || roles.switches.contains(name) {
            continue;
        }
        common += part.command.as_deref().unwrap_or_default();
    }

    let states = enumerate_states(&plan, &roles.outputs);
    log::info!("Generating files for {} states", states.len());

    if states.len() <= 1 {
        let mut contents = common;
        for name in &roles.outputs {
            contents += lookup(parts, name)?.command.as_deref().unwrap_or_default();
        }

        return Ok(vec![LisoFile {
            file_name: format!("{base}.fil"),
            contents,
        }]);
    }

    states
        .iter()
        .map(|state| -> Result<LisoFile, LisoError> {
            Ok(LisoFile {
                file_name: file_name(base, state),
                contents: render_state(parts, &plan, &common, state)?,
            })
        })
        .collect()
}

/// Writes the files into `dir`, replacing existing files of the same name.
///
/// Every file is first written under a temporary name. The files only take
/// their real names once all of them were written, so a failed write leaves
/// no new output behind.
pub fn write_files(files: &[LisoFile], dir: &Path) -> io::Result<()> {
    let mut staged = Vec::with_capacity(files.len());

    for file in files {
        let temp = dir.join(format!(".{}.tmp", file.file_name));

        if let Err(error) = fs::write(&temp, &file.contents) {
            discard(staged.iter().map(|(temp, _)| temp));
            return Err(error);
        }

        staged.push((temp, dir.join(&file.file_name)));
    }

    for (temp, path) in &staged {
        fs::rename(temp, path)?;
        log::info!("Wrote {}", path.display());
    }

    Ok(())
}

fn discard<'p>(paths: impl Iterator<Item = &'p PathBuf>) {
    for path in paths {
        if let Err(error) = fs::remove_file(path) {
            log::warn!("Failed to remove {}: {error}", path.display());
        }
    }
}
