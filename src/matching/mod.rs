/// Ingredient similarity matching over a static corpus.
///
/// The corpus is loaded from CSV, tokenized into a fixed vocabulary, and every
/// entry is vectorized once. Queries are ranked by cosine similarity.
pub mod corpus;
pub mod ranker;
pub mod stop_words;
pub mod vectorizer;

pub use corpus::{CorpusEntry, IngredientCorpus};
pub use ranker::{RankedEntry, Ranking, SimilarityIndex};
pub use vectorizer::{NormalizedVector, SparseVector, Vectorized, Vocabulary};
