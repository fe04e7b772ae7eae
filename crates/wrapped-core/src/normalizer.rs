//! Sender name normalization.
//!
//! Chat exports label the same person differently depending on whether the
//! exporting phone had them saved as a contact: `"~ callum"` for an unsaved
//! number, `"Callum"` for a contact. [`AliasTable`] folds those labels into a
//! single canonical name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, WrappedError};

/// Prefix the export puts in front of senders that are not saved contacts.
pub const SENDER_MARKER: &str = "~ ";

/// Strip [`SENDER_MARKER`] from the front of `name`, if present.
pub fn strip_marker(name: &str) -> &str {
    name.strip_prefix(SENDER_MARKER).unwrap_or(name)
}

/// Mapping from sender labels to canonical names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::from_pairs([("~ callum", "Callum 🇿🇦"), ("Callum", "Callum 🇿🇦")])
    }
}

impl AliasTable {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            aliases: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a JSON object of `"label": "canonical name"` pairs.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let object = value.as_object().ok_or_else(|| {
            WrappedError::Config("alias file must contain a JSON object".to_string())
        })?;

        let mut aliases = HashMap::with_capacity(object.len());
        for (label, canonical) in object {
            let canonical = canonical.as_str().ok_or_else(|| {
                WrappedError::Config(format!("alias for \"{}\" must be a string", label))
            })?;
            aliases.insert(label.clone(), canonical.to_string());
        }
        Ok(Self { aliases })
    }

    /// Load a table from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| WrappedError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json_str(&content)?;
        debug!("Loaded {} aliases from {}", table.len(), path.display());
        Ok(table)
    }

    /// Default on-disk location: `~/.chat-wrapped/aliases.json`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".chat-wrapped")
            .join("aliases.json")
    }

    /// Resolve the table to use for a run.
    ///
    /// An explicit path must load. Without one, the default path is used when
    /// it exists, otherwise the built-in table.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        let fallback = Self::default_path();
        if fallback.exists() {
            Self::load_from(&fallback)
        } else {
            Ok(Self::default())
        }
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Canonical name for a sender label.
    ///
    /// Tries the label as exported, then without the marker, then the first
    /// word of the unmarked label. Unknown names come back without the marker.
    pub fn normalize(&self, name: &str) -> String {
        let stripped = strip_marker(name);
        let first_word = stripped.split(' ').next().unwrap_or(stripped);

        [name, stripped, first_word]
            .into_iter()
            .find_map(|key| self.aliases.get(key))
            .cloned()
            .unwrap_or_else(|| stripped.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
