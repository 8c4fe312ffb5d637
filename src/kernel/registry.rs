//! Program registry: the static list of programs the gallery offers.

use super::program::{InvocationMode, ProgramDescriptor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEMO_UNIT_BINARY: &str = "cshowcase-unit";

/// Listing locations under this prefix name sources compiled into the binary.
pub const BUILTIN_LISTING_SCHEME: &str = "builtin:";

const BUILTIN_LISTINGS: &[(&str, &str)] = &[
    ("inventory", include_str!("../bin/cshowcase_unit/inventory.rs")),
    ("jukebox", include_str!("../bin/cshowcase_unit/jukebox.rs")),
    ("minigame", include_str!("../bin/cshowcase_unit/minigame.rs")),
    ("grades", include_str!("../bin/cshowcase_unit/grades.rs")),
];

pub fn builtin_listing(location: &str) -> Option<&'static str> {
    let name = location.strip_prefix(BUILTIN_LISTING_SCHEME)?;
    BUILTIN_LISTINGS
        .iter()
        .find(|(id, _)| *id == name)
        .map(|(_, text)| *text)
}

fn builtin_listing_location(id: &str) -> String {
    format!("{BUILTIN_LISTING_SCHEME}{id}")
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("program #{index} has an empty id")]
    EmptyId { index: usize },
    #[error("duplicate program id: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub programs: Vec<ProgramEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub init_entry: Option<String>,
    #[serde(default)]
    pub input_entry: Option<String>,
    #[serde(default)]
    pub mode: InvocationMode,
}

impl ProgramEntry {
    fn into_descriptor(self, base_dir: &Path) -> ProgramDescriptor {
        ProgramDescriptor {
            id: self.id,
            display_name: self.name,
            description: self.description,
            load_location: resolve_location(base_dir, &self.location),
            args: self.args,
            source_listing_location: self.source.map(|s| {
                if s.starts_with(BUILTIN_LISTING_SCHEME) {
                    s
                } else {
                    resolve_location(base_dir, &s)
                }
            }),
            init_entry_override: self.init_entry,
            input_entry_override: self.input_entry,
            invocation_mode: self.mode,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgramRegistry {
    programs: Vec<ProgramDescriptor>,
}

impl ProgramRegistry {
    pub fn new(programs: Vec<ProgramDescriptor>) -> Result<Self, RegistryError> {
        for (index, program) in programs.iter().enumerate() {
            if program.id.trim().is_empty() {
                return Err(RegistryError::EmptyId { index });
            }
            if programs[..index].iter().any(|p| p.id == program.id) {
                return Err(RegistryError::DuplicateId(program.id.clone()));
            }
        }
        Ok(Self { programs })
    }

    /// The bundled gallery, served by the demo unit binary found in `unit_dir`.
    pub fn builtin(unit_dir: &Path) -> Self {
        let binary = format!("{DEMO_UNIT_BINARY}{}", std::env::consts::EXE_SUFFIX);
        let location = unit_dir.join(binary).to_string_lossy().to_string();
        let programs = vec![
            ProgramDescriptor::new("inventory", "Inventory Management System", location.clone())
                .with_description("An interactive inventory management system.")
                .with_args(["inventory"])
                .with_source_listing(builtin_listing_location("inventory")),
            ProgramDescriptor::new("jukebox", "Jukebox", location.clone())
                .with_description("Select a song to see its lyrics.")
                .with_args(["jukebox"])
                .with_source_listing(builtin_listing_location("jukebox"))
                .with_mode(InvocationMode::Async),
            ProgramDescriptor::new("minigame", "Code Guessing Minigame", location.clone())
                .with_description("Try to guess the 3-digit secret code.")
                .with_args(["minigame"])
                .with_source_listing(builtin_listing_location("minigame")),
            ProgramDescriptor::new("grades", "Dynamic Grade Management", location)
                .with_description("Record student grades and compute averages.")
                .with_args(["grades"])
                .with_source_listing(builtin_listing_location("grades")),
        ];
        Self { programs }
    }

    pub fn from_file(file: RegistryFile, base_dir: &Path) -> Result<Self, RegistryError> {
        let programs = file
            .programs
            .into_iter()
            .map(|entry| entry.into_descriptor(base_dir))
            .collect();
        Self::new(programs)
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let data = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: RegistryFile =
            serde_json::from_str(&data).map_err(|source| RegistryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_file(file, base_dir)
    }

    pub fn get(&self, id: &str) -> Option<&ProgramDescriptor> {
        self.programs.iter().find(|p| p.id == id)
    }

    pub fn programs(&self) -> &[ProgramDescriptor] {
        &self.programs
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

fn resolve_location(base_dir: &Path, location: &str) -> String {
    let path = Path::new(location);
    if path.is_absolute() {
        return location.to_string();
    }
    base_dir.join(path).to_string_lossy().to_string()
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/registry.rs"]
mod tests;
