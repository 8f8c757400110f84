//! Local recipe persistence.
//!
//! Recipes are plain text files under one directory, named by a slug of the
//! recipe title (`Salmon Cakes` → `salmon_cakes.txt`) with a short
//! timestamped header. The store owns its directory and creates it on
//! construction.

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// A row in the recipe listing.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeListing {
    pub name: String,
    pub filename: String,
    pub size_kb: f64,
    pub modified: String,
}

/// File-backed store for saved recipes.
pub struct RecipeStore {
    dir: PathBuf,
}

/// Lowercased filename slug: spaces and slashes become underscores.
fn slug(recipe_name: &str) -> String {
    let mut safe = recipe_name.to_lowercase().replace([' ', '/'], "_");
    if !safe.ends_with(".txt") {
        safe.push_str(".txt");
    }
    safe
}

/// `salmon_cakes` → `Salmon Cakes`.
fn title_case(stem: &str) -> String {
    stem.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl RecipeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create recipe directory {:?}", dir))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Writes a recipe file, returning its path.
    pub fn save(&self, recipe_name: &str, recipe_content: &str) -> Result<PathBuf> {
        let path = self.dir.join(slug(recipe_name));
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let full_content = format!(
            "# {}\n# Created: {}\n# Source: PantryBot\n\n{}\n",
            title_case(&slug(recipe_name).trim_end_matches(".txt")),
            timestamp,
            recipe_content
        );
        fs::write(&path, full_content)
            .with_context(|| format!("Failed to write recipe to {:?}", path))?;
        Ok(path)
    }

    /// Reads a recipe back by name. `Ok(None)` means not found.
    pub fn get(&self, recipe_name: &str) -> Result<Option<String>> {
        let path = self.dir.join(slug(recipe_name));
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read recipe from {:?}", path))?;
        Ok(Some(content))
    }

    /// Names of every saved recipe, for "did you mean" listings.
    pub fn available_names(&self) -> Result<Vec<String>> {
        Ok(self.list()?.into_iter().map(|r| r.name).collect())
    }

    /// All saved recipes sorted by filename.
    pub fn list(&self) -> Result<Vec<RecipeListing>> {
        let mut listings = Vec::new();
        if !self.dir.exists() {
            return Ok(listings);
        }
        let mut entries: Vec<PathBuf> = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list recipe directory {:?}", self.dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        entries.sort();

        for path in entries {
            let metadata = fs::metadata(&path)?;
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let modified: chrono::DateTime<Local> = metadata.modified()?.into();
            listings.push(RecipeListing {
                name: title_case(&stem),
                filename: path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_string(),
                size_kb: (metadata.len() as f64 / 1024.0 * 100.0).round() / 100.0,
                modified: modified.format("%Y-%m-%d %H:%M").to_string(),
            });
        }
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_normalizes_names() {
        assert_eq!(slug("Salmon Cakes"), "salmon_cakes.txt");
        assert_eq!(slug("mac/cheese"), "mac_cheese.txt");
        assert_eq!(slug("chili.txt"), "chili.txt");
    }

    #[test]
    fn title_case_round_trips_slug() {
        assert_eq!(title_case("salmon_cakes"), "Salmon Cakes");
    }

    #[test]
    fn save_get_list_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecipeStore::new(dir.path()).unwrap();

        store.save("Salmon Cakes", "Mix and fry.").unwrap();
        let content = store.get("salmon cakes").unwrap().expect("recipe saved");
        assert!(content.contains("# Salmon Cakes"));
        assert!(content.contains("Mix and fry."));

        let listings = store.list().unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].name, "Salmon Cakes");
        assert_eq!(listings[0].filename, "salmon_cakes.txt");
    }

    #[test]
    fn get_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecipeStore::new(dir.path()).unwrap();
        assert!(store.get("nothing here").unwrap().is_none());
        assert!(store.available_names().unwrap().is_empty());
    }
}
