use serde::Serialize;

use super::{
    corpus::{CorpusEntry, IngredientCorpus},
    vectorizer::{NormalizedVector, Vocabulary},
};

/// A corpus entry selected by the ranker
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedEntry {
    pub index: usize,
    pub score: f64,
    pub entry: CorpusEntry,
}

/// Outcome of ranking a user's ingredients against the corpus
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Ranking {
    /// Selected entries, lowest similarity first
    pub matches: Vec<RankedEntry>,
    /// Query tokens the corpus vocabulary does not contain
    pub unknown_tokens: Vec<String>,
    /// True when no query token was recognized; every score is then zero
    pub degenerate: bool,
}

impl Ranking {
    pub fn indices(&self) -> Vec<usize> {
        self.matches.iter().map(|m| m.index).collect()
    }
}

/// Pre-vectorized corpus used to rank ingredient queries by cosine similarity.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug)]
pub struct SimilarityIndex {
    corpus: IngredientCorpus,
    vocabulary: Vocabulary,
    vectors: Vec<NormalizedVector>,
}

impl SimilarityIndex {
    pub fn build(corpus: IngredientCorpus) -> Self {
        let vocabulary = Vocabulary::fit(corpus.texts());
        let vectors = vocabulary
            .transform(corpus.texts())
            .into_iter()
            .map(|v| v.vector.normalized())
            .collect();

        tracing::info!(
            entries = corpus.len(),
            vocabulary = vocabulary.len(),
            "Similarity index built"
        );

        Self {
            corpus,
            vocabulary,
            vectors,
        }
    }

    pub fn corpus(&self) -> &IngredientCorpus {
        &self.corpus
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Cosine similarity of the normalized query against every corpus entry, in corpus order
    pub fn scores(&self, query: &NormalizedVector) -> Vec<f64> {
        self.vectors.iter().map(|v| query.dot(v)).collect()
    }

    /// Returns the `count` entries most similar to the combined ingredient list.
    ///
    /// Entries come back in ascending score order; equal scores keep corpus order.
    pub fn rank(&self, ingredients: &[String], count: usize) -> Ranking {
        let query = self.vocabulary.vectorize(&ingredients.join(", "));
        let scores = self.scores(&query.vector.normalized());

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

        let keep = count.min(order.len());
        let matches = order[order.len() - keep..]
            .iter()
            .filter_map(|&index| {
                self.corpus.get(index).map(|entry| RankedEntry {
                    index,
                    score: scores[index],
                    entry: entry.clone(),
                })
            })
            .collect();

        let degenerate = query.vector.is_zero();
        if degenerate {
            tracing::warn!(
                unknown = ?query.unknown_tokens,
                "No ingredient in the query matched the corpus vocabulary"
            );
        }

        Ranking {
            matches,
            unknown_tokens: query.unknown_tokens,
            degenerate,
        }
    }
}
