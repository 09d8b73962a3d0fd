//! The key palette shared by every sheet of a document.

use crate::constants::{KEY_ID_EMPTY, KEY_ID_KNIT_DEFAULT, KEY_ID_PURL_DEFAULT};
use crate::models::key::generate_key_id;
use crate::models::{Abbreviation, CellContent, KeyColor, KeyDefinition};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered collection of key definitions, looked up by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyPalette {
    keys: Vec<KeyDefinition>,
}

impl KeyPalette {
    /// Creates a palette from key definitions, keeping the first of any duplicate ids.
    ///
    /// Oversized keys are shrunk to the maximum key size.
    #[must_use]
    pub fn new(keys: Vec<KeyDefinition>) -> Self {
        let mut palette = Self::default();
        for mut key in keys {
            if !palette.contains(&key.id) {
                key.enforce_size_limit();
                palette.keys.push(key);
            }
        }
        palette
    }

    /// The built-in palette: Knit (base stitch), Purl and No Stitch.
    #[must_use]
    pub fn initial() -> Self {
        Self::new(vec![
            Self::base_key(),
            KeyDefinition::new(KEY_ID_PURL_DEFAULT, "Purl")
                .with_abbreviation(Abbreviation::Text("P".into()))
                .with_cell(0, 0, CellContent::Text("•".into())),
            KeyDefinition::new(KEY_ID_EMPTY, "No Stitch")
                .with_abbreviation(Abbreviation::Omit)
                .with_colors(KeyColor::GridLine, KeyColor::default_symbol()),
        ])
    }

    /// Definition of the default base stitch every cell starts as.
    #[must_use]
    pub fn base_key() -> KeyDefinition {
        KeyDefinition::new(KEY_ID_KNIT_DEFAULT, "Knit")
            .with_abbreviation(Abbreviation::Text("K".into()))
    }

    /// Looks up a key by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&KeyDefinition> {
        self.keys.iter().find(|k| k.id == id)
    }

    /// Whether a key with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the palette has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates keys in palette order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyDefinition> {
        self.keys.iter()
    }

    /// Id-indexed view used by hot loops (compiler, eviction scans).
    #[must_use]
    pub fn index(&self) -> HashMap<&str, &KeyDefinition> {
        self.keys.iter().map(|k| (k.id.as_str(), k)).collect()
    }

    /// Adds a key or replaces the key with the same id in place.
    ///
    /// The "no stitch" key is always kept out of instructions, and keys
    /// over the maximum key size are shrunk to it.
    pub fn add_or_update(&mut self, mut key: KeyDefinition) {
        if key.id == KEY_ID_EMPTY {
            key.abbreviation = Abbreviation::Omit;
        }
        if key.enforce_size_limit() {
            tracing::warn!(key_id = %key.id, "Key exceeded the maximum size; shrunk it");
        }
        match self.keys.iter_mut().find(|k| k.id == key.id) {
            Some(existing) => *existing = key,
            None => self.keys.push(key),
        }
    }

    /// Adds every key whose id is not present yet; returns the ids added.
    pub fn merge_missing<'a>(
        &mut self,
        keys: impl IntoIterator<Item = &'a KeyDefinition>,
    ) -> Vec<String> {
        let mut added = Vec::new();
        for key in keys {
            if !self.contains(&key.id) {
                let mut key = key.clone();
                if key.enforce_size_limit() {
                    tracing::warn!(key_id = %key.id, "Key exceeded the maximum size; shrunk it");
                }
                added.push(key.id.clone());
                self.keys.push(key);
            }
        }
        added
    }

    /// Removes a key from the palette.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist, is the last key, or is
    /// the base stitch every cell defaults to.
    pub fn remove(&mut self, id: &str) -> Result<KeyDefinition> {
        if self.keys.len() <= 1 {
            anyhow::bail!("Cannot delete the last key");
        }
        if id == KEY_ID_KNIT_DEFAULT {
            anyhow::bail!("Cannot delete the base stitch key");
        }
        let Some(position) = self.keys.iter().position(|k| k.id == id) else {
            anyhow::bail!("Key '{}' not found in palette", id);
        };
        Ok(self.keys.remove(position))
    }

    /// Copies a key under a fresh id and a unique "(Copy)" name.
    ///
    /// Returns the new key's id, or `None` if the source key does not exist.
    pub fn duplicate(&mut self, id: &str) -> Option<String> {
        let source = self.get(id)?;

        let mut name = format!("{} (Copy)", source.name);
        let mut suffix = 1;
        while self.keys.iter().any(|k| k.name == name) {
            suffix += 1;
            name = format!("{} (Copy {})", source.name, suffix);
        }

        let mut copy = source.clone();
        copy.id = generate_key_id();
        copy.name = name;
        let new_id = copy.id.clone();
        self.keys.push(copy);
        Some(new_id)
    }

    /// Re-adds the base stitch key if it is missing.
    pub fn ensure_base_key(&mut self) -> bool {
        if self.contains(KEY_ID_KNIT_DEFAULT) {
            return false;
        }
        self.keys.insert(0, Self::base_key());
        true
    }
}
