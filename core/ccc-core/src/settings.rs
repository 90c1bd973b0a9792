//! Permission settings model (`settings.json` / `settings.local.json`).
//!
//! Only the three permission lists are interpreted, and only by string
//! equality. Every other key is carried through untouched so a rewrite never
//! drops configuration this tool doesn't understand.

use crate::error::{CccError, Result};
use fs_err as fs;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// The permission lists compared by the dedup engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionCategory {
    Allow,
    Deny,
    Ask,
}

impl PermissionCategory {
    pub const ALL: [PermissionCategory; 3] = [
        PermissionCategory::Allow,
        PermissionCategory::Deny,
        PermissionCategory::Ask,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionCategory::Allow => "allow",
            PermissionCategory::Deny => "deny",
            PermissionCategory::Ask => "ask",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Permissions::is_blank"
    )]
    pub permissions: Permissions,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub allow: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub deny: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub ask: Vec<String>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// `null` reads the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Permissions {
    pub fn list(&self, category: PermissionCategory) -> &[String] {
        match category {
            PermissionCategory::Allow => &self.allow,
            PermissionCategory::Deny => &self.deny,
            PermissionCategory::Ask => &self.ask,
        }
    }

    pub fn list_mut(&mut self, category: PermissionCategory) -> &mut Vec<String> {
        match category {
            PermissionCategory::Allow => &mut self.allow,
            PermissionCategory::Deny => &mut self.deny,
            PermissionCategory::Ask => &mut self.ask,
        }
    }

    /// No lists and no extra keys: nothing worth writing back.
    fn is_blank(&self) -> bool {
        PermissionCategory::ALL
            .iter()
            .all(|c| self.list(*c).is_empty())
            && self.other.is_empty()
    }
}

impl Settings {
    /// Loads settings from `path`.
    ///
    /// A missing or zero-byte file is an empty settings object. Malformed
    /// JSON is an error.
    pub fn load(path: &Path) -> Result<Settings> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Settings::default()),
            Err(e) => return Err(CccError::io("reading settings", e)),
        };

        if data.is_empty() {
            return Ok(Settings::default());
        }

        serde_json::from_slice(&data).map_err(|source| CccError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes settings as pretty JSON via temp file + rename in the same
    /// directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self).map_err(|source| CccError::Json {
            context: format!("serializing {}", path.display()),
            source,
        })?;
        content.push('\n');

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)
            .map_err(|e| CccError::io(format!("creating temp file in {}", dir.display()), e))?;
        temp.write_all(content.as_bytes())
            .map_err(|e| CccError::io("writing settings", e))?;
        temp.flush()
            .map_err(|e| CccError::io("flushing settings", e))?;
        temp.persist(path)
            .map_err(|e| CccError::io(format!("persisting {}", path.display()), e.error))?;
        Ok(())
    }

    /// Entries in `self` that are absent from `other`, per category.
    /// The result carries permission lists only.
    pub fn diff(&self, other: &Settings) -> Settings {
        let mut result = Settings::default();
        for category in PermissionCategory::ALL {
            *result.permissions.list_mut(category) = diff_entries(
                self.permissions.list(category),
                other.permissions.list(category),
            );
        }
        result
    }

    /// True if all permission lists are empty.
    pub fn is_empty(&self) -> bool {
        PermissionCategory::ALL
            .iter()
            .all(|c| self.permissions.list(*c).is_empty())
    }
}

/// Elements of `a` not present in `b`, preserving the order of `a`.
pub(crate) fn diff_entries(a: &[String], b: &[String]) -> Vec<String> {
    if a.is_empty() {
        return Vec::new();
    }
    let exclude: HashSet<&str> = b.iter().map(String::as_str).collect();
    a.iter()
        .filter(|v| !exclude.contains(v.as_str()))
        .cloned()
        .collect()
}
