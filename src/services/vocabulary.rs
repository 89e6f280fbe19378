//! Keyword tables behind query parsing and tag inference.
//!
//! The built-in tables ship in `data/vocabulary.json` and are parsed once. A
//! deployment can point `vocabulary_path` at its own file with the same shape.

use crate::error::{ApiError, Result};
use lazy_static::lazy_static;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

pub const TAG_SPICY: &str = "spicy";
pub const TAG_VEGETARIAN: &str = "vegetarian";
pub const TAG_VEGAN: &str = "vegan";
pub const TAG_DRINK: &str = "drink";

lazy_static! {
    static ref BUILTIN: Vocabulary =
        Vocabulary::from_json(include_str!("../../data/vocabulary.json"))
            .expect("built-in vocabulary.json must parse");
}

#[derive(Debug, Clone, Deserialize)]
pub struct Vocabulary {
    pub spicy: Vec<String>,
    pub vegetarian: Vec<String>,
    pub vegan: Vec<String>,
    pub drinks: Vec<String>,
    /// Query-only drink triggers: misspellings and synonyms of "refreshing"/"hydrating".
    pub drink_synonyms: Vec<String>,
    pub meat: Vec<String>,
    pub non_vegan: Vec<String>,
    pub stop_words: HashSet<String>,
    pub ingredient_tags: BTreeMap<String, Vec<String>>,
}

impl Vocabulary {
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Load from `path` when given, otherwise use the built-in tables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    ApiError::ConfigError(format!(
                        "Failed to read vocabulary {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                let vocabulary = Self::from_json(&raw)?;
                info!("Loaded vocabulary from {}", path.display());
                Ok(vocabulary)
            }
            None => Ok(Self::builtin()),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let vocabulary: Vocabulary = serde_json::from_str(raw)?;
        Ok(vocabulary.normalized())
    }

    fn normalized(self) -> Self {
        fn lower(words: Vec<String>) -> Vec<String> {
            words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        }

        Self {
            spicy: lower(self.spicy),
            vegetarian: lower(self.vegetarian),
            vegan: lower(self.vegan),
            drinks: lower(self.drinks),
            drink_synonyms: lower(self.drink_synonyms),
            meat: lower(self.meat),
            non_vegan: lower(self.non_vegan),
            stop_words: self
                .stop_words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .collect(),
            ingredient_tags: self
                .ingredient_tags
                .into_iter()
                .map(|(ingredient, tags)| (ingredient.trim().to_lowercase(), lower(tags)))
                .collect(),
        }
    }

    /// Drink words plus the query-only synonyms.
    pub fn drink_query_words(&self) -> impl Iterator<Item = &str> {
        self.drinks
            .iter()
            .chain(self.drink_synonyms.iter())
            .map(String::as_str)
    }
}

/// First keyword in `words` that occurs as a substring of `text`.
pub fn find_any<'a>(text: &str, words: &'a [String]) -> Option<&'a str> {
    words
        .iter()
        .find(|word| text.contains(word.as_str()))
        .map(String::as_str)
}

pub fn contains_any(text: &str, words: &[String]) -> bool {
    find_any(text, words).is_some()
}
