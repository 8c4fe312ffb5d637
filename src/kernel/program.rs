use serde::{Deserialize, Serialize};

/// Input entry points that do not follow `process_<id>_input`.
const INPUT_ENTRY_EXCEPTIONS: &[(&str, &str)] = &[("minigame", "process_minigame_guess")];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationMode {
    /// The call returns after the unit has produced all of its output.
    #[default]
    Sync,
    /// Fire-and-forget: output arrives later through the sink.
    Async,
}

impl InvocationMode {
    pub fn is_async(self) -> bool {
        matches!(self, InvocationMode::Async)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDescriptor {
    pub id: String,
    pub display_name: String,
    pub description: Option<String>,
    pub load_location: String,
    pub args: Vec<String>,
    pub source_listing_location: Option<String>,
    pub init_entry_override: Option<String>,
    pub input_entry_override: Option<String>,
    pub invocation_mode: InvocationMode,
}

impl ProgramDescriptor {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        load_location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: None,
            load_location: load_location.into(),
            args: Vec::new(),
            source_listing_location: None,
            init_entry_override: None,
            input_entry_override: None,
            invocation_mode: InvocationMode::Sync,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source_listing(mut self, location: impl Into<String>) -> Self {
        self.source_listing_location = Some(location.into());
        self
    }

    pub fn with_init_entry(mut self, name: impl Into<String>) -> Self {
        self.init_entry_override = Some(name.into());
        self
    }

    pub fn with_input_entry(mut self, name: impl Into<String>) -> Self {
        self.input_entry_override = Some(name.into());
        self
    }

    pub fn with_mode(mut self, mode: InvocationMode) -> Self {
        self.invocation_mode = mode;
        self
    }

    pub fn entry_points(&self) -> EntryPoints {
        EntryPoints {
            init: init_entry_name(&self.id, self.init_entry_override.as_deref()),
            input: input_entry_name(&self.id, self.input_entry_override.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoints {
    pub init: String,
    pub input: String,
}

pub fn init_entry_name(program_id: &str, override_name: Option<&str>) -> String {
    match override_name {
        Some(name) => name.to_string(),
        None => format!("init_{program_id}"),
    }
}

pub fn input_entry_name(program_id: &str, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_string();
    }

    INPUT_ENTRY_EXCEPTIONS
        .iter()
        .find(|(id, _)| *id == program_id)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("process_{program_id}_input"))
}

/// Resolves an auxiliary file next to the unit: everything up to and including the
/// last `/` of the load location, followed by `name`.
pub fn auxiliary_location(load_location: &str, name: &str) -> String {
    let dir_end = load_location.rfind('/').map(|idx| idx + 1).unwrap_or(0);
    format!("{}{}", &load_location[..dir_end], name)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/program.rs"]
mod tests;
