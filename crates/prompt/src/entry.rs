//! Command-keyed prompt entries.
//!
//! User entries are loaded first; built-in entries are then merged without overriding a user
//! entry that has the same command.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Optional JSON file with user prompt entries.
pub const ENV_PROMPTS_FILE: &str = "PORTRAYAL_PROMPTS_FILE";

/// Whether to merge the built-in entries (default true).
pub const ENV_LOAD_BUILTIN_PROMPTS: &str = "PORTRAYAL_LOAD_BUILTIN_PROMPTS";

/// Built-in entries shipped with the crate.
pub const BUILTIN_PROMPTS_JSON: &str = include_str!("../builtin_prompts.json");

/// A system prompt template selected by a command word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptEntry {
    pub command: String,
    pub content: String,
}

impl PromptEntry {
    pub fn new(command: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            content: content.into(),
        }
    }

    /// Markdown block: `### command`, blank line, fenced content.
    fn to_markdown(&self) -> String {
        format!("### {}\n\n```\n{}\n```", self.command, self.content.trim())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptRegistry {
    entries: Vec<PromptEntry>,
}

impl PromptRegistry {
    pub fn new(entries: Vec<PromptEntry>) -> Self {
        Self { entries }
    }

    /// User entries from `PORTRAYAL_PROMPTS_FILE` (if set), then built-ins unless
    /// `PORTRAYAL_LOAD_BUILTIN_PROMPTS` is false.
    pub fn from_env() -> Result<Self> {
        let mut registry = match env::var(ENV_PROMPTS_FILE) {
            Ok(path) if !path.trim().is_empty() => Self::new(Self::load_file(&path)?),
            _ => Self::default(),
        };

        let load_builtin = env::var(ENV_LOAD_BUILTIN_PROMPTS)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(true);
        if load_builtin {
            registry.load_builtin()?;
        }

        debug!(commands = ?registry.commands(), "Prompt commands registered");
        Ok(registry)
    }

    /// Reads a JSON list of `{command, content}` objects.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<PromptEntry>> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompts file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse prompts file {}", path.display()))
    }

    /// Merges the built-in entries; returns the commands that were added.
    pub fn load_builtin(&mut self) -> Result<Vec<String>> {
        let builtin: Vec<PromptEntry> =
            serde_json::from_str(BUILTIN_PROMPTS_JSON).context("Built-in prompts are malformed")?;
        Ok(self.add_entries(builtin))
    }

    /// Appends entries whose command is not registered yet; returns the commands added.
    pub fn add_entries(&mut self, items: impl IntoIterator<Item = PromptEntry>) -> Vec<String> {
        let mut existing: HashSet<String> =
            self.entries.iter().map(|e| e.command.clone()).collect();
        let mut added = Vec::new();

        for item in items {
            if !existing.insert(item.command.clone()) {
                continue;
            }
            added.push(item.command.clone());
            self.entries.push(item);
        }

        if !added.is_empty() {
            info!(commands = ?added, "Prompt entries added");
        }
        added
    }

    pub fn get_entry(&self, command: &str) -> Option<&PromptEntry> {
        self.entries.iter().find(|e| e.command == command)
    }

    /// The template registered for `command`.
    pub fn match_prompt_by_cmd(&self, command: &str) -> Option<&str> {
        self.get_entry(command).map(|e| e.content.as_str())
    }

    pub fn commands(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.command.as_str()).collect()
    }

    /// Markdown view of one entry (`Some(command)`) or of all entries, blocks separated by
    /// three blank lines. Empty when nothing matches.
    pub fn view_entry(&self, command: Option<&str>) -> String {
        self.entries
            .iter()
            .filter(|e| command.map_or(true, |c| e.command == c))
            .map(PromptEntry::to_markdown)
            .collect::<Vec<_>>()
            .join("\n\n\n\n")
    }

    pub fn entries(&self) -> &[PromptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
