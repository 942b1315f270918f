//! Folding descriptors and their persistence.
//!
//! A [`FoldingDescriptor`] is an enable-able rule naming the structural tags whose leaves are
//! eligible for folding. The enabled descriptors' tag sets are unioned by the folding policy.
//!
//! Descriptor lists are stored outside the core through a [`DescriptorStore`]. Two stores are
//! provided: [`MemoryDescriptorStore`] and [`JsonDescriptorFile`], which keeps a human-readable
//! JSON list on disk.

use crate::error::DescriptorError;
use crate::tags::Tag;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A folding rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FoldingDescriptor {
    /// Stable identifier (e.g. `"fold-parens"`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Short human-readable name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    /// Longer description for preference pages.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Whether the rule participates in folding.
    pub enabled: bool,
    /// Tags selecting eligible leaves.
    pub loc_tags: BTreeSet<Tag>,
}

impl FoldingDescriptor {
    /// Create an anonymous descriptor.
    pub fn new(enabled: bool, loc_tags: impl IntoIterator<Item = Tag>) -> Self {
        Self {
            id: String::new(),
            label: String::new(),
            description: String::new(),
            enabled,
            loc_tags: loc_tags.into_iter().collect(),
        }
    }

    /// Attach an id and a label.
    pub fn with_id(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.id = id.into();
        self.label = label.into();
        self
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The stock descriptor set: parens folded, collections and strings available but off.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(true, [Tag::PAREN])
                .with_id("fold-parens", "Fold parens")
                .with_description("Fold multi-line forms delimited by parentheses."),
            Self::new(false, [Tag::BRACKET, Tag::BRACE])
                .with_id("fold-collections", "Fold collections")
                .with_description("Fold multi-line vectors, maps and sets."),
            Self::new(false, [Tag::STRING_DELIMITER])
                .with_id("fold-strings", "Fold strings")
                .with_description("Fold multi-line string and regex literals."),
        ]
    }
}

/// Union of `loc_tags` over the enabled descriptors.
pub fn eligible_tags(descriptors: &[FoldingDescriptor]) -> BTreeSet<Tag> {
    descriptors
        .iter()
        .filter(|d| d.enabled)
        .flat_map(|d| d.loc_tags.iter().cloned())
        .collect()
}

/// External storage for descriptor lists.
pub trait DescriptorStore: Send + Sync {
    /// Load the stored list. An absent entry loads as an empty list.
    fn load(&self) -> Result<Vec<FoldingDescriptor>, DescriptorError>;

    /// Replace the stored list.
    fn save(&self, descriptors: &[FoldingDescriptor]) -> Result<(), DescriptorError>;
}

/// Load descriptors, falling back to [`FoldingDescriptor::defaults`].
///
/// An empty stored list and a store that cannot be read both yield the defaults; the latter is
/// logged.
pub fn load_or_default(store: &dyn DescriptorStore) -> Vec<FoldingDescriptor> {
    match store.load() {
        Ok(descriptors) if !descriptors.is_empty() => descriptors,
        Ok(_) => FoldingDescriptor::defaults(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to load folding descriptors; using defaults");
            FoldingDescriptor::defaults()
        }
    }
}

/// An in-process [`DescriptorStore`].
#[derive(Debug, Default)]
pub struct MemoryDescriptorStore {
    descriptors: Mutex<Vec<FoldingDescriptor>>,
}

impl MemoryDescriptorStore {
    /// Create a store holding `descriptors`.
    pub fn new(descriptors: Vec<FoldingDescriptor>) -> Self {
        Self {
            descriptors: Mutex::new(descriptors),
        }
    }
}

impl DescriptorStore for MemoryDescriptorStore {
    fn load(&self) -> Result<Vec<FoldingDescriptor>, DescriptorError> {
        Ok(self.descriptors.lock().clone())
    }

    fn save(&self, descriptors: &[FoldingDescriptor]) -> Result<(), DescriptorError> {
        *self.descriptors.lock() = descriptors.to_vec();
        Ok(())
    }
}

/// A [`DescriptorStore`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonDescriptorFile {
    path: PathBuf,
}

impl JsonDescriptorFile {
    /// Use the file at `path`. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DescriptorStore for JsonDescriptorFile {
    fn load(&self) -> Result<Vec<FoldingDescriptor>, DescriptorError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, descriptors: &[FoldingDescriptor]) -> Result<(), DescriptorError> {
        let json = serde_json::to_string_pretty(descriptors)?;
        let temp = self.temp_path();
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            count = descriptors.len(),
            "saved folding descriptors"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_eligible_tags_union_enabled_only() {
        let descriptors = vec![
            FoldingDescriptor::new(true, [Tag::PAREN]),
            FoldingDescriptor::new(false, [Tag::STRING_DELIMITER]),
            FoldingDescriptor::new(true, [Tag::BRACKET, Tag::PAREN]),
        ];
        let tags = eligible_tags(&descriptors);
        assert_eq!(tags, BTreeSet::from([Tag::BRACKET, Tag::PAREN]));
    }

    #[test]
    fn test_defaults_enable_parens_only() {
        let tags = eligible_tags(&FoldingDescriptor::defaults());
        assert_eq!(tags, BTreeSet::from([Tag::PAREN]));
    }

    #[test]
    fn test_json_uses_kebab_case_and_plain_tags() {
        let json = serde_json::to_string(&FoldingDescriptor::new(true, [Tag::PAREN])).unwrap();
        assert_eq!(json, r#"{"enabled":true,"loc-tags":["paren"]}"#);

        let decoded: FoldingDescriptor =
            serde_json::from_str(r#"{"id":"x","enabled":false,"loc-tags":["list","paren"]}"#)
                .unwrap();
        assert_eq!(decoded.id, "x");
        assert!(!decoded.enabled);
        assert_eq!(decoded.loc_tags, BTreeSet::from([Tag::LIST, Tag::PAREN]));
    }

    #[test]
    fn test_memory_store_round_trip_and_default_fallback() {
        let store = MemoryDescriptorStore::default();
        assert!(store.load().unwrap().is_empty());
        assert_eq!(load_or_default(&store), FoldingDescriptor::defaults());

        let custom = vec![FoldingDescriptor::new(true, [Tag::BRACE])];
        store.save(&custom).unwrap();
        assert_eq!(load_or_default(&store), custom);
    }

    #[test]
    fn test_json_file_missing_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDescriptorFile::new(dir.path().join("folding.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_json_file_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDescriptorFile::new(dir.path().join("folding.json"));
        let descriptors = FoldingDescriptor::defaults();

        store.save(&descriptors).unwrap();
        assert_eq!(store.load().unwrap(), descriptors);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_json_file_corrupt_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folding.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonDescriptorFile::new(&path);
        assert!(matches!(store.load(), Err(DescriptorError::Json(_))));
        assert_eq!(load_or_default(&store), FoldingDescriptor::defaults());
    }
}
