use std::{io::Read, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// One row of the ingredient corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    /// Display name of the dish, when the corpus provides one
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text ingredient list
    pub ingredients: String,
}

/// Static reference list of ingredient entries, loaded once at startup.
///
/// Never empty, and every entry has non-blank ingredient text.
#[derive(Debug, Clone)]
pub struct IngredientCorpus {
    entries: Vec<CorpusEntry>,
}

impl IngredientCorpus {
    /// Builds a corpus from already-loaded entries
    pub fn new(entries: Vec<CorpusEntry>) -> AppResult<Self> {
        if entries.is_empty() {
            return Err(AppError::Corpus("corpus has no entries".to_string()));
        }

        if let Some(row) = entries.iter().position(|e| e.ingredients.trim().is_empty()) {
            return Err(AppError::Corpus(format!(
                "entry {} has no ingredient text",
                row
            )));
        }

        Ok(Self { entries })
    }

    /// Loads the corpus from a CSV file with an `ingredients` column and an optional `name` column
    pub fn from_csv_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::Corpus(format!("cannot open {}: {}", path.display(), e))
        })?;

        let corpus = Self::from_csv_reader(file)?;

        tracing::info!(
            path = %path.display(),
            entries = corpus.len(),
            "Ingredient corpus loaded"
        );

        Ok(corpus)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let entries = csv_reader
            .deserialize::<CorpusEntry>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Corpus(format!("malformed corpus row: {}", e)))?;

        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CorpusEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Ingredient text of every entry, in corpus order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.ingredients.as_str())
    }
}
